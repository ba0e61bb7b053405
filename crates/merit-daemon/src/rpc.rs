//! JSON-RPC server over Unix socket.
//!
//! Listens on a Unix domain socket, accepts connections, and dispatches
//! line-delimited JSON-RPC 2.0 calls to the command handlers.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;
use tracing::{debug, error, info, warn};

use crate::commands;
use crate::DaemonState;

/// JSON-RPC request.
#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    /// JSON-RPC version (must be "2.0").
    pub jsonrpc: String,
    /// Caller-chosen request ID, echoed back in the response.
    pub id: serde_json::Value,
    /// Method name.
    pub method: String,
    /// Method parameters; absent params deserialize as `Null`.
    #[serde(default)]
    pub params: serde_json::Value,
}

/// JSON-RPC response. Exactly one of `result` and `error` is present.
#[derive(Debug, Serialize)]
pub struct RpcResponse {
    /// JSON-RPC version.
    pub jsonrpc: String,
    /// ID of the request being answered.
    pub id: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

/// JSON-RPC error object.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RpcError {
    /// Error code.
    pub code: i32,
    /// Error name.
    pub message: String,
    /// Optional structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RpcResponse {
    /// Create a success response.
    pub fn success(id: serde_json::Value, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: serde_json::Value, error: RpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

impl RpcError {
    // Standard JSON-RPC errors

    /// Parse error (-32700).
    pub fn parse_error() -> Self {
        Self {
            code: -32700,
            message: "PARSE_ERROR".to_string(),
            data: None,
        }
    }

    /// Invalid request (-32600).
    pub fn invalid_request() -> Self {
        Self {
            code: -32600,
            message: "INVALID_REQUEST".to_string(),
            data: None,
        }
    }

    /// Method not found (-32601).
    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: "METHOD_NOT_FOUND".to_string(),
            data: Some(serde_json::json!({"method": method})),
        }
    }

    /// Invalid params (-32602).
    pub fn invalid_params(detail: &str) -> Self {
        Self {
            code: -32602,
            message: "INVALID_PARAMS".to_string(),
            data: Some(serde_json::json!({"detail": detail})),
        }
    }

    /// Internal error (-32603).
    pub fn internal_error(detail: &str) -> Self {
        Self {
            code: -32603,
            message: "INTERNAL_ERROR".to_string(),
            data: Some(serde_json::json!({"detail": detail})),
        }
    }

    // Domain errors

    /// Referenced user, tag, or vote does not exist (-32020).
    pub fn not_found(what: &str) -> Self {
        Self {
            code: -32020,
            message: "NOT_FOUND".to_string(),
            data: Some(serde_json::json!({"detail": what})),
        }
    }

    /// A live vote already exists for this (author, target, tag) edge
    /// (-32021).
    pub fn duplicate_vote(author_id: &str, target_id: &str, tag_id: &str) -> Self {
        Self {
            code: -32021,
            message: "DUPLICATE_VOTE".to_string(),
            data: Some(serde_json::json!({
                "author_id": author_id,
                "target_id": target_id,
                "tag_id": tag_id,
            })),
        }
    }

    /// Users cannot vote for themselves (-32022).
    pub fn self_vote() -> Self {
        Self {
            code: -32022,
            message: "SELF_VOTE".to_string(),
            data: None,
        }
    }

    /// The reputation write lost to concurrent writers (-32023).
    pub fn write_conflict(user_id: &str, tag_id: &str) -> Self {
        Self {
            code: -32023,
            message: "WRITE_CONFLICT".to_string(),
            data: Some(serde_json::json!({"user_id": user_id, "tag_id": tag_id})),
        }
    }

    /// Malformed community configuration, e.g. a bad decay table (-32024).
    pub fn invalid_config(detail: &str) -> Self {
        Self {
            code: -32024,
            message: "INVALID_CONFIG".to_string(),
            data: Some(serde_json::json!({"detail": detail})),
        }
    }
}

impl From<merit_db::DbError> for RpcError {
    fn from(err: merit_db::DbError) -> Self {
        match err {
            merit_db::DbError::NotFound(what) => RpcError::not_found(&what),
            merit_db::DbError::Constraint(detail) => RpcError::invalid_params(&detail),
            other => RpcError::internal_error(&format!("db error: {other}")),
        }
    }
}

impl From<merit_engine::EngineError> for RpcError {
    fn from(err: merit_engine::EngineError) -> Self {
        match err {
            merit_engine::EngineError::Config(detail) => RpcError::invalid_config(&detail),
            merit_engine::EngineError::WriteConflict { user_id, tag_id } => {
                RpcError::write_conflict(&user_id, &tag_id)
            }
            merit_engine::EngineError::Store(err) => {
                RpcError::internal_error(&format!("db error: {err}"))
            }
        }
    }
}

/// The RPC server.
pub struct RpcServer {
    state: Arc<DaemonState>,
    socket_path: PathBuf,
}

impl RpcServer {
    /// Create a new RPC server.
    pub fn new(state: Arc<DaemonState>, socket_path: PathBuf) -> Self {
        Self { state, socket_path }
    }

    /// Run the server, accepting connections until the task is dropped.
    pub async fn run(&self) -> anyhow::Result<()> {
        // A stale socket from an unclean shutdown would block the bind.
        let _ = std::fs::remove_file(&self.socket_path);

        let listener = UnixListener::bind(&self.socket_path)?;
        info!("RPC server listening on {:?}", self.socket_path);

        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    let state = self.state.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(state, stream).await {
                            warn!("Connection error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    error!("Accept failed: {}", e);
                }
            }
        }
    }
}

/// Serve one client: one JSON-RPC call per line, one response per line.
async fn handle_connection(
    state: Arc<DaemonState>,
    stream: tokio::net::UnixStream,
) -> anyhow::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            // Client closed the connection.
            break;
        }

        let response = match serde_json::from_str::<RpcRequest>(&line) {
            Ok(request) => dispatch_request(state.clone(), request).await,
            Err(_) => RpcResponse::error(serde_json::Value::Null, RpcError::parse_error()),
        };

        let mut payload = serde_json::to_vec(&response)?;
        payload.push(b'\n');
        writer.write_all(&payload).await?;
        writer.flush().await?;
    }

    Ok(())
}

/// Dispatch a JSON-RPC request to the appropriate command handler.
async fn dispatch_request(state: Arc<DaemonState>, request: RpcRequest) -> RpcResponse {
    let id = request.id.clone();
    let method = request.method.as_str();

    debug!("Dispatching RPC method: {}", method);

    if request.jsonrpc != "2.0" {
        return RpcResponse::error(id, RpcError::invalid_request());
    }

    let result = match method {
        // User commands
        "register_user" => commands::users::register_user(&state, &request.params).await,
        "get_user" => commands::users::get_user(&state, &request.params).await,

        // Tag commands
        "create_tag" => commands::tags::create_tag(&state, &request.params).await,
        "update_tag_config" => commands::tags::update_tag_config(&state, &request.params).await,
        "get_tag" => commands::tags::get_tag(&state, &request.params).await,
        "get_tag_stats" => commands::tags::get_tag_stats(&state, &request.params).await,

        // Vote commands
        "cast_vote" => commands::votes::cast_vote(&state, &request.params).await,
        "retract_vote" => commands::votes::retract_vote(&state, &request.params).await,

        // Reputation commands
        "get_reputation" => commands::reputation::get_reputation(&state, &request.params).await,
        "get_or_compute_reputation" => {
            commands::reputation::get_or_compute_reputation(&state, &request.params).await
        }
        "recompute_reputation" => {
            commands::reputation::recompute_reputation(&state, &request.params).await
        }

        // Service commands
        "get_service_info" => commands::service::get_service_info(&state).await,
        "shutdown" => commands::service::shutdown(&state).await,

        _ => Err(RpcError::method_not_found(method)),
    };

    match result {
        Ok(value) => RpcResponse::success(id, value),
        Err(err) => RpcResponse::error(id, err),
    }
}
