//! Schema migrations.
//!
//! Forward-only, tracked in `PRAGMA user_version`. There is no rollback
//! path: the vote ledger is the source of truth, so recovery from a bad
//! migration is rebuild-and-recompute.

use rusqlite::Connection;

use crate::{schema, DbError, Result, SCHEMA_VERSION};

/// Bring the database up to [`SCHEMA_VERSION`].
pub fn run(conn: &Connection) -> Result<()> {
    let mut version: u32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(DbError::Sqlite)?;

    if version > SCHEMA_VERSION {
        return Err(DbError::Migration(format!(
            "database is at v{version}, newer than the supported v{SCHEMA_VERSION}"
        )));
    }

    if version == 0 {
        tracing::info!("Initializing database schema v{SCHEMA_VERSION}");
        conn.execute_batch(schema::SCHEMA_V1).map_err(DbError::Sqlite)?;
        version = SCHEMA_VERSION;
        conn.pragma_update(None, "user_version", version)
            .map_err(DbError::Sqlite)?;
    }

    while version < SCHEMA_VERSION {
        let next = version + 1;
        tracing::info!("Running migration to v{next}");
        apply_migration(conn, next)?;
        conn.pragma_update(None, "user_version", next)
            .map_err(DbError::Sqlite)?;
        version = next;
    }

    Ok(())
}

fn apply_migration(_conn: &Connection, version: u32) -> Result<()> {
    match version {
        // Incremental migrations land here as the schema grows:
        // 2 => migrate_v2(_conn),
        _ => Err(DbError::Migration(format!(
            "no migration defined for v{version}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_conn() -> Connection {
        let conn = Connection::open_in_memory().expect("open");
        conn.execute_batch("PRAGMA foreign_keys = ON;").expect("pragma");
        conn
    }

    #[test]
    fn test_fresh_database_reaches_current_version() {
        let conn = bare_conn();
        run(&conn).expect("migrate");

        let version: u32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .expect("version");
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn test_rerun_is_a_noop() {
        let conn = bare_conn();
        run(&conn).expect("first run");
        run(&conn).expect("second run");
    }

    #[test]
    fn test_schema_objects_created() {
        let conn = bare_conn();
        run(&conn).expect("migrate");

        for table in ["users", "tags", "votes", "reputations"] {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    [table],
                    |row| row.get(0),
                )
                .expect("table lookup");
            assert_eq!(count, 1, "table '{table}' should exist");
        }

        // The live-edge unique index is what enforces one vote per edge.
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master
                 WHERE type = 'index' AND name = 'idx_votes_live_edge'",
                [],
                |row| row.get(0),
            )
            .expect("index lookup");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_future_version_rejected() {
        let conn = bare_conn();
        conn.pragma_update(None, "user_version", SCHEMA_VERSION + 1)
            .expect("set version");
        let result = run(&conn);
        assert!(matches!(result, Err(DbError::Migration(_))));
    }
}
