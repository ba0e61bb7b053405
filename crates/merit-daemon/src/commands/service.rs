//! Service lifecycle command handlers.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::rpc::RpcError;
use crate::DaemonState;

type Result = std::result::Result<Value, RpcError>;

/// Report daemon version and storage location.
pub async fn get_service_info(state: &Arc<DaemonState>) -> Result {
    Ok(serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "data_dir": state.config.data_dir().display().to_string(),
    }))
}

/// Ask the daemon to shut down after in-flight requests complete.
pub async fn shutdown(state: &Arc<DaemonState>) -> Result {
    info!("Shutdown requested over RPC");
    let _ = state.shutdown_tx.send(());
    Ok(serde_json::json!({"shutting_down": true}))
}
