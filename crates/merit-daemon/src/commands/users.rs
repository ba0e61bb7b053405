//! User command handlers.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::rpc::RpcError;
use crate::DaemonState;

type Result = std::result::Result<Value, RpcError>;

/// Register a new user.
pub async fn register_user(state: &Arc<DaemonState>, params: &Value) -> Result {
    let handle = params
        .get("handle")
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params("handle required"))?;
    let display_name = params
        .get("display_name")
        .and_then(|v| v.as_str())
        .unwrap_or(handle);

    let mut id_bytes = [0u8; 16];
    rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut id_bytes);
    let user_id = hex::encode(id_bytes);

    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    let db = state.db.lock().await;
    merit_db::queries::users::insert(&db, &user_id, handle, display_name, now)?;

    info!(handle, "user registered");

    Ok(serde_json::json!({"user_id": user_id}))
}

/// Look up a user by id or handle.
pub async fn get_user(state: &Arc<DaemonState>, params: &Value) -> Result {
    let db = state.db.lock().await;
    let user = if let Some(user_id) = params.get("user_id").and_then(|v| v.as_str()) {
        merit_db::queries::users::find(&db, user_id)?
    } else if let Some(handle) = params.get("handle").and_then(|v| v.as_str()) {
        merit_db::queries::users::find_by_handle(&db, handle)?
    } else {
        return Err(RpcError::invalid_params("user_id or handle required"));
    };

    Ok(serde_json::json!({
        "user_id": user.user_id,
        "handle": user.handle,
        "display_name": user.display_name,
        "created_at": user.created_at,
    }))
}
