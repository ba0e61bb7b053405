//! Reputation cache query functions.
//!
//! One row per (user, tag). Rows are written only by the reputation
//! pipeline, in a single statement guarded by the `version` column:
//! `insert_new` claims the row for a first computation, `update_versioned`
//! replaces it only if nobody wrote since it was read. Both report
//! whether the write landed so the caller can re-run and retry.

use merit_types::reputation::Reputation;
use rusqlite::{Connection, OptionalExtension};

use crate::Result;

/// Get the cached reputation record for (user, tag), if one exists.
///
/// A missing record is a normal state (the user was never computed in
/// this tag), so this returns `None` rather than an error.
pub fn find(conn: &Connection, user_id: &str, tag_id: &str) -> Result<Option<ReputationRow>> {
    let row = conn
        .query_row(
            "SELECT user_id, tag_id, basis_reputation, vote_weight,
                    voting_reward_reputation, effective_reputation, is_trusted,
                    last_calculated_at, version
             FROM reputations WHERE user_id = ?1 AND tag_id = ?2",
            [user_id, tag_id],
            row_to_reputation,
        )
        .optional()?;
    Ok(row)
}

/// Count of currently trusted users in a tag.
///
/// Read through to the authoritative rows on every call; there is no
/// separate counter to drift out of sync.
pub fn count_trusted(conn: &Connection, tag_id: &str) -> Result<u32> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM reputations WHERE tag_id = ?1 AND is_trusted = 1",
        [tag_id],
        |row| row.get(0),
    )?;
    Ok(count as u32)
}

/// Count of users with a computed record in a tag.
pub fn count_records(conn: &Connection, tag_id: &str) -> Result<u32> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM reputations WHERE tag_id = ?1",
        [tag_id],
        |row| row.get(0),
    )?;
    Ok(count as u32)
}

/// Insert a first record for (user, tag) at version 1.
///
/// Returns `false` without touching the table when a record appeared
/// since the caller read none.
pub fn insert_new(conn: &Connection, rep: &Reputation) -> Result<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO reputations
             (user_id, tag_id, basis_reputation, vote_weight,
              voting_reward_reputation, effective_reputation, is_trusted,
              last_calculated_at, version)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 1)",
        rusqlite::params![
            rep.user_id,
            rep.tag_id,
            rep.basis_reputation,
            rep.vote_weight,
            rep.voting_reward_reputation,
            rep.effective_reputation,
            rep.is_trusted,
            rep.last_calculated_at as i64,
        ],
    )?;
    Ok(inserted == 1)
}

/// Replace the record for (user, tag) if it is still at `expected_version`.
///
/// All fields land in one statement; a concurrent writer makes this a
/// no-op returning `false` and the caller recomputes from fresh reads.
pub fn update_versioned(
    conn: &Connection,
    rep: &Reputation,
    expected_version: i64,
) -> Result<bool> {
    let updated = conn.execute(
        "UPDATE reputations
         SET basis_reputation = ?1, vote_weight = ?2,
             voting_reward_reputation = ?3, effective_reputation = ?4,
             is_trusted = ?5, last_calculated_at = ?6, version = version + 1
         WHERE user_id = ?7 AND tag_id = ?8 AND version = ?9",
        rusqlite::params![
            rep.basis_reputation,
            rep.vote_weight,
            rep.voting_reward_reputation,
            rep.effective_reputation,
            rep.is_trusted,
            rep.last_calculated_at as i64,
            rep.user_id,
            rep.tag_id,
            expected_version,
        ],
    )?;
    Ok(updated == 1)
}

fn row_to_reputation(row: &rusqlite::Row<'_>) -> rusqlite::Result<ReputationRow> {
    Ok(ReputationRow {
        user_id: row.get(0)?,
        tag_id: row.get(1)?,
        basis_reputation: row.get(2)?,
        vote_weight: row.get(3)?,
        voting_reward_reputation: row.get(4)?,
        effective_reputation: row.get(5)?,
        is_trusted: row.get(6)?,
        last_calculated_at: row.get::<_, i64>(7)? as u64,
        version: row.get(8)?,
    })
}

/// A raw reputation row, including its concurrency version.
#[derive(Debug, Clone)]
pub struct ReputationRow {
    pub user_id: String,
    pub tag_id: String,
    pub basis_reputation: f64,
    pub vote_weight: f64,
    pub voting_reward_reputation: f64,
    pub effective_reputation: f64,
    pub is_trusted: bool,
    pub last_calculated_at: u64,
    pub version: i64,
}

impl ReputationRow {
    /// Strip the storage version off into the domain record.
    pub fn into_reputation(self) -> Reputation {
        Reputation {
            user_id: self.user_id,
            tag_id: self.tag_id,
            basis_reputation: self.basis_reputation,
            vote_weight: self.vote_weight,
            voting_reward_reputation: self.voting_reward_reputation,
            effective_reputation: self.effective_reputation,
            is_trusted: self.is_trusted,
            last_calculated_at: self.last_calculated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::{tags, users};
    use merit_types::tag::TagConfig;

    fn test_db() -> Connection {
        let conn = crate::open_memory().expect("open test db");
        users::insert(&conn, "u-alice", "alice", "Alice", 100).expect("user");
        users::insert(&conn, "u-bob", "bob", "Bob", 100).expect("user");
        let config = TagConfig::with_defaults("t-rust".to_string());
        tags::insert(&conn, "rust", "u-alice", &config, 100).expect("tag");
        conn
    }

    fn rep(user: &str, basis: f64, trusted: bool) -> Reputation {
        Reputation {
            user_id: user.to_string(),
            tag_id: "t-rust".to_string(),
            basis_reputation: basis,
            vote_weight: 0.5,
            voting_reward_reputation: 0.2,
            effective_reputation: basis + 0.2,
            is_trusted: trusted,
            last_calculated_at: 1000,
        }
    }

    #[test]
    fn test_find_missing_is_none() {
        let conn = test_db();
        let row = find(&conn, "u-alice", "t-rust").expect("find");
        assert!(row.is_none());
    }

    #[test]
    fn test_insert_and_find() {
        let conn = test_db();
        assert!(insert_new(&conn, &rep("u-alice", 12.0, true)).expect("insert"));

        let row = find(&conn, "u-alice", "t-rust").expect("find").expect("some");
        assert!((row.basis_reputation - 12.0).abs() < f64::EPSILON);
        assert!(row.is_trusted);
        assert_eq!(row.version, 1);
    }

    #[test]
    fn test_insert_new_does_not_clobber() {
        let conn = test_db();
        assert!(insert_new(&conn, &rep("u-alice", 12.0, true)).expect("first"));
        assert!(!insert_new(&conn, &rep("u-alice", 99.0, false)).expect("second"));

        let row = find(&conn, "u-alice", "t-rust").expect("find").expect("some");
        assert!((row.basis_reputation - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_update_versioned() {
        let conn = test_db();
        insert_new(&conn, &rep("u-alice", 12.0, true)).expect("insert");

        assert!(update_versioned(&conn, &rep("u-alice", 15.0, true), 1).expect("update"));
        let row = find(&conn, "u-alice", "t-rust").expect("find").expect("some");
        assert!((row.basis_reputation - 15.0).abs() < f64::EPSILON);
        assert_eq!(row.version, 2);
    }

    #[test]
    fn test_update_stale_version_is_noop() {
        let conn = test_db();
        insert_new(&conn, &rep("u-alice", 12.0, true)).expect("insert");
        update_versioned(&conn, &rep("u-alice", 15.0, true), 1).expect("bump to v2");

        assert!(!update_versioned(&conn, &rep("u-alice", 99.0, false), 1).expect("stale"));
        let row = find(&conn, "u-alice", "t-rust").expect("find").expect("some");
        assert!((row.basis_reputation - 15.0).abs() < f64::EPSILON);
        assert_eq!(row.version, 2);
    }

    #[test]
    fn test_count_trusted() {
        let conn = test_db();
        insert_new(&conn, &rep("u-alice", 12.0, true)).expect("insert");
        insert_new(&conn, &rep("u-bob", 3.0, false)).expect("insert");

        assert_eq!(count_trusted(&conn, "t-rust").expect("count"), 1);
        assert_eq!(count_records(&conn, "t-rust").expect("count"), 2);
        assert_eq!(count_trusted(&conn, "t-other").expect("count"), 0);
    }
}
