//! merit-daemon: the Merit reputation service daemon.
//!
//! Single OS process running a Tokio async runtime. Clients talk to the
//! daemon over line-delimited JSON-RPC 2.0 on a Unix socket: they register
//! users and tags, append votes to the ledger, and read or request
//! reputation records. The engine itself runs synchronously behind the
//! connection lock; the daemon is the single writer on the database.

mod commands;
mod config;
mod rpc;

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{error, info};

use crate::config::DaemonConfig;
use crate::rpc::RpcServer;

/// Daemon-wide shared state.
pub struct DaemonState {
    /// Database connection. Held behind an async mutex so every RPC
    /// handler, and the reputation pipeline inside it, runs serialized.
    pub db: Arc<tokio::sync::Mutex<rusqlite::Connection>>,
    /// Parsed configuration, fixed for the lifetime of the process.
    pub config: DaemonConfig,
    /// Broadcast side of the shutdown signal; the `shutdown` RPC fires it.
    pub shutdown_tx: broadcast::Sender<()>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Tracing first so config/database failures are visible
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("merit=info".parse()?),
        )
        .init();

    info!("Merit daemon starting");

    // 1. Load config and make sure the data directory exists
    let config = DaemonConfig::load()?;
    let data_dir = config.data_dir();
    std::fs::create_dir_all(&data_dir)?;

    // 2. Open database (runs pending migrations)
    let db_path = data_dir.join(&config.storage.database_file);
    let conn = merit_db::open(&db_path)?;
    let db = Arc::new(tokio::sync::Mutex::new(conn));

    // 3. Create shutdown channel
    let (shutdown_tx, _shutdown_rx) = broadcast::channel(1);

    // 4. Build daemon state
    let socket_path = data_dir.join(&config.service.socket_file);
    let state = Arc::new(DaemonState {
        db,
        config,
        shutdown_tx: shutdown_tx.clone(),
    });

    // 5. Serve until something asks us to stop
    let rpc_server = RpcServer::new(state, socket_path.clone());

    info!("Serving JSON-RPC on {}", socket_path.display());

    let mut shutdown_rx = shutdown_tx.subscribe();
    tokio::select! {
        result = rpc_server.run() => {
            if let Err(e) = result {
                error!("RPC server failed: {}", e);
            }
        }
        _ = shutdown_rx.recv() => {
            info!("Shutdown requested over RPC");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
        }
    }

    // Remove the socket so the next start can bind cleanly.
    let _ = std::fs::remove_file(&socket_path);

    info!("Merit daemon stopped");
    Ok(())
}
