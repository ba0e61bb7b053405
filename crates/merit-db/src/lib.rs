//! # merit-db
//!
//! SQLite persistence for the Merit daemon: one database file holding
//! the user/tag registry, the append-only vote ledger, and the cached
//! reputation records.
//!
//! Storage conventions:
//!
//! - WAL journal, foreign keys enforced, `busy_timeout` for the rare
//!   out-of-process reader
//! - Timestamps are Unix epoch seconds (`u64` in the domain, `INTEGER`
//!   in SQLite)
//! - Schema version lives in `PRAGMA user_version`
//! - Votes are never updated in place: retraction sets `is_deleted`
//! - Reputation rows carry a `version` column for optimistic writes

pub mod migrations;
pub mod queries;
pub mod schema;

use rusqlite::Connection;
use std::path::Path;

/// Current schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Database error types.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("migration failed: {0}")]
    Migration(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, DbError>;

/// Open or create the Merit database at `path` and bring its schema up
/// to [`SCHEMA_VERSION`].
pub fn open(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    configure(&conn)?;
    migrations::run(&conn)?;
    Ok(conn)
}

/// Open a fresh in-memory database with the full schema (tests).
pub fn open_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure(&conn)?;
    migrations::run(&conn)?;
    Ok(conn)
}

fn configure(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = 5000;
         PRAGMA synchronous = NORMAL;
         PRAGMA cache_size = -8000;",
    )?;
    Ok(())
}
