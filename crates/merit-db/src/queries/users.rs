//! User query functions.

use merit_types::user::User;
use rusqlite::Connection;

use crate::{DbError, Result};

/// Insert a new user.
pub fn insert(
    conn: &Connection,
    user_id: &str,
    handle: &str,
    display_name: &str,
    created_at: u64,
) -> Result<()> {
    conn.execute(
        "INSERT INTO users (user_id, handle, display_name, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![user_id, handle, display_name, created_at as i64],
    )
    .map_err(map_unique_violation("handle already registered"))?;
    Ok(())
}

/// Get a user by id.
pub fn find(conn: &Connection, user_id: &str) -> Result<User> {
    conn.query_row(
        "SELECT user_id, handle, display_name, created_at
         FROM users WHERE user_id = ?1",
        [user_id],
        row_to_user,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => DbError::NotFound("user".into()),
        other => DbError::Sqlite(other),
    })
}

/// Get a user by handle.
pub fn find_by_handle(conn: &Connection, handle: &str) -> Result<User> {
    conn.query_row(
        "SELECT user_id, handle, display_name, created_at
         FROM users WHERE handle = ?1",
        [handle],
        row_to_user,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => DbError::NotFound("user".into()),
        other => DbError::Sqlite(other),
    })
}

/// Whether a user id exists.
pub fn exists(conn: &Connection, user_id: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE user_id = ?1",
        [user_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        user_id: row.get(0)?,
        handle: row.get(1)?,
        display_name: row.get(2)?,
        created_at: row.get::<_, i64>(3)? as u64,
    })
}

fn map_unique_violation(message: &'static str) -> impl Fn(rusqlite::Error) -> DbError {
    move |e| match e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            DbError::Constraint(message.into())
        }
        other => DbError::Sqlite(other),
    }
}
