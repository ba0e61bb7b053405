//! Vote ledger query functions.
//!
//! The ledger is the authoritative input to reputation computations. All
//! reads filter soft-deleted votes and return rows in a deterministic
//! order; read failures propagate unchanged with no retries here.

use merit_types::vote::{Vote, VoteSign};
use rusqlite::Connection;

use crate::{DbError, Result};

/// Append a vote to the ledger.
///
/// The partial unique index rejects a second live vote for the same
/// (author, target, tag) edge.
pub fn insert(conn: &Connection, vote: &Vote) -> Result<()> {
    conn.execute(
        "INSERT INTO votes (vote_id, author_id, target_id, tag_id, sign, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            vote.vote_id,
            vote.author_id,
            vote.target_id,
            vote.tag_id,
            i64::from(vote.sign.as_i8()),
            vote.created_at as i64,
        ],
    )
    .map_err(|e| match e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            DbError::Constraint("live vote already exists for this edge".into())
        }
        other => DbError::Sqlite(other),
    })?;
    Ok(())
}

/// Get a live vote by id.
pub fn find(conn: &Connection, vote_id: &str) -> Result<Vote> {
    conn.query_row(
        "SELECT vote_id, author_id, target_id, tag_id, sign, created_at
         FROM votes WHERE vote_id = ?1 AND is_deleted = 0",
        [vote_id],
        row_to_vote,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => DbError::NotFound("vote".into()),
        other => DbError::Sqlite(other),
    })
}

/// All live votes received by `target_id` within `tag_id`.
pub fn incoming(conn: &Connection, target_id: &str, tag_id: &str) -> Result<Vec<Vote>> {
    let mut stmt = conn.prepare(
        "SELECT vote_id, author_id, target_id, tag_id, sign, created_at
         FROM votes WHERE target_id = ?1 AND tag_id = ?2 AND is_deleted = 0
         ORDER BY created_at, vote_id",
    )?;

    let rows = stmt
        .query_map([target_id, tag_id], row_to_vote)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// All live votes cast by `author_id` within `tag_id`.
pub fn outgoing(conn: &Connection, author_id: &str, tag_id: &str) -> Result<Vec<Vote>> {
    let mut stmt = conn.prepare(
        "SELECT vote_id, author_id, target_id, tag_id, sign, created_at
         FROM votes WHERE author_id = ?1 AND tag_id = ?2 AND is_deleted = 0
         ORDER BY created_at, vote_id",
    )?;

    let rows = stmt
        .query_map([author_id, tag_id], row_to_vote)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Soft-delete a vote. Fails if the vote is missing or already deleted.
pub fn soft_delete(conn: &Connection, vote_id: &str, deleted_at: u64) -> Result<()> {
    let updated = conn.execute(
        "UPDATE votes SET is_deleted = 1, deleted_at = ?1 WHERE vote_id = ?2 AND is_deleted = 0",
        rusqlite::params![deleted_at as i64, vote_id],
    )?;
    if updated == 0 {
        return Err(DbError::NotFound("vote not found or already deleted".into()));
    }
    Ok(())
}

fn row_to_vote(row: &rusqlite::Row<'_>) -> rusqlite::Result<Vote> {
    let raw_sign: i64 = row.get(4)?;
    let sign = VoteSign::from_i8(raw_sign as i8)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(4, raw_sign))?;
    Ok(Vote {
        vote_id: row.get(0)?,
        author_id: row.get(1)?,
        target_id: row.get(2)?,
        tag_id: row.get(3)?,
        sign,
        created_at: row.get::<_, i64>(5)? as u64,
    })
}
