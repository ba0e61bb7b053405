//! Tag query functions.
//!
//! A tag row carries the community's reputation configuration; the decay
//! table is stored as a JSON column and parsed on demand into a
//! [`TagConfig`] snapshot.

use merit_types::tag::{DecayPeriod, TagConfig};
use rusqlite::Connection;

use crate::{DbError, Result};

/// Insert a new tag with its reputation configuration.
pub fn insert(
    conn: &Connection,
    handle: &str,
    founder_id: &str,
    config: &TagConfig,
    created_at: u64,
) -> Result<()> {
    let decay_json = serde_json::to_string(&config.decay_periods)
        .map_err(|e| DbError::Serialization(e.to_string()))?;

    conn.execute(
        "INSERT INTO tags (tag_id, handle, founder_id, reputation_threshold,
                           vote_reward, min_trusted_users, decay_periods, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        rusqlite::params![
            config.tag_id,
            handle,
            founder_id,
            config.reputation_threshold,
            config.vote_reward,
            config.min_trusted_users,
            decay_json,
            created_at as i64,
        ],
    )
    .map_err(|e| match e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            DbError::Constraint("tag handle already registered".into())
        }
        other => DbError::Sqlite(other),
    })?;
    Ok(())
}

/// Get a tag by id.
pub fn find(conn: &Connection, tag_id: &str) -> Result<TagRow> {
    conn.query_row(
        "SELECT tag_id, handle, founder_id, reputation_threshold, vote_reward,
                min_trusted_users, decay_periods, created_at
         FROM tags WHERE tag_id = ?1",
        [tag_id],
        row_to_tag,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => DbError::NotFound("tag".into()),
        other => DbError::Sqlite(other),
    })
}

/// Get a tag by handle.
pub fn find_by_handle(conn: &Connection, handle: &str) -> Result<TagRow> {
    conn.query_row(
        "SELECT tag_id, handle, founder_id, reputation_threshold, vote_reward,
                min_trusted_users, decay_periods, created_at
         FROM tags WHERE handle = ?1",
        [handle],
        row_to_tag,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => DbError::NotFound("tag".into()),
        other => DbError::Sqlite(other),
    })
}

/// Replace a tag's reputation configuration.
///
/// Computations already in progress keep the snapshot they read; the new
/// values apply from the next snapshot onward.
pub fn update_config(conn: &Connection, config: &TagConfig) -> Result<()> {
    let decay_json = serde_json::to_string(&config.decay_periods)
        .map_err(|e| DbError::Serialization(e.to_string()))?;

    let updated = conn.execute(
        "UPDATE tags SET reputation_threshold = ?1, vote_reward = ?2,
                         min_trusted_users = ?3, decay_periods = ?4
         WHERE tag_id = ?5",
        rusqlite::params![
            config.reputation_threshold,
            config.vote_reward,
            config.min_trusted_users,
            decay_json,
            config.tag_id,
        ],
    )?;
    if updated == 0 {
        return Err(DbError::NotFound("tag".into()));
    }
    Ok(())
}

fn row_to_tag(row: &rusqlite::Row<'_>) -> rusqlite::Result<TagRow> {
    Ok(TagRow {
        tag_id: row.get(0)?,
        handle: row.get(1)?,
        founder_id: row.get(2)?,
        reputation_threshold: row.get(3)?,
        vote_reward: row.get(4)?,
        min_trusted_users: row.get::<_, i64>(5)? as u32,
        decay_periods_json: row.get(6)?,
        created_at: row.get::<_, i64>(7)? as u64,
    })
}

/// A raw tag row from the database.
#[derive(Debug)]
pub struct TagRow {
    pub tag_id: String,
    pub handle: String,
    pub founder_id: String,
    pub reputation_threshold: f64,
    pub vote_reward: f64,
    pub min_trusted_users: u32,
    pub decay_periods_json: String,
    pub created_at: u64,
}

impl TagRow {
    /// Parse the stored decay table and assemble the configuration
    /// snapshot handed to reputation computations.
    pub fn config(&self) -> Result<TagConfig> {
        let decay_periods: Vec<DecayPeriod> = serde_json::from_str(&self.decay_periods_json)
            .map_err(|e| DbError::Serialization(e.to_string()))?;
        Ok(TagConfig {
            tag_id: self.tag_id.clone(),
            reputation_threshold: self.reputation_threshold,
            vote_reward: self.vote_reward,
            min_trusted_users: self.min_trusted_users,
            decay_periods,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::users;

    fn test_db() -> Connection {
        let conn = crate::open_memory().expect("open test db");
        users::insert(&conn, "u-founder", "founder", "Founder", 100).expect("founder");
        conn
    }

    #[test]
    fn test_insert_and_find() {
        let conn = test_db();
        let config = TagConfig::with_defaults("t-rust".to_string());
        insert(&conn, "rust", "u-founder", &config, 1000).expect("insert");

        let tag = find(&conn, "t-rust").expect("find");
        assert_eq!(tag.handle, "rust");
        assert_eq!(tag.founder_id, "u-founder");
        assert!((tag.reputation_threshold - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_config_round_trip() {
        let conn = test_db();
        let config = TagConfig::with_defaults("t-rust".to_string());
        insert(&conn, "rust", "u-founder", &config, 1000).expect("insert");

        let parsed = find(&conn, "t-rust").expect("find").config().expect("config");
        assert_eq!(parsed.decay_periods, config.decay_periods);
        assert_eq!(parsed.min_trusted_users, config.min_trusted_users);
    }

    #[test]
    fn test_update_config() {
        let conn = test_db();
        let mut config = TagConfig::with_defaults("t-rust".to_string());
        insert(&conn, "rust", "u-founder", &config, 1000).expect("insert");

        config.reputation_threshold = 25.0;
        config.decay_periods = vec![DecayPeriod { span_months: 999, multiplier: 1.0 }];
        update_config(&conn, &config).expect("update");

        let parsed = find(&conn, "t-rust").expect("find").config().expect("config");
        assert!((parsed.reputation_threshold - 25.0).abs() < f64::EPSILON);
        assert_eq!(parsed.decay_periods.len(), 1);
    }

    #[test]
    fn test_update_missing_tag() {
        let conn = test_db();
        let config = TagConfig::with_defaults("t-missing".to_string());
        let result = update_config(&conn, &config);
        assert!(matches!(result, Err(DbError::NotFound(_))));
    }

    #[test]
    fn test_duplicate_handle_rejected() {
        let conn = test_db();
        let config = TagConfig::with_defaults("t-1".to_string());
        insert(&conn, "rust", "u-founder", &config, 1000).expect("insert");

        let config2 = TagConfig::with_defaults("t-2".to_string());
        let result = insert(&conn, "rust", "u-founder", &config2, 1001);
        assert!(matches!(result, Err(DbError::Constraint(_))));
    }
}
