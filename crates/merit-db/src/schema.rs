//! SQL schema definitions.

/// Complete schema for the Merit v1 database.
pub const SCHEMA_V1: &str = r#"
-- ============================================================
-- Users & Tags
-- ============================================================

CREATE TABLE IF NOT EXISTS users (
    user_id TEXT PRIMARY KEY,
    handle TEXT NOT NULL UNIQUE,
    display_name TEXT NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS tags (
    tag_id TEXT PRIMARY KEY,
    handle TEXT NOT NULL UNIQUE,
    founder_id TEXT NOT NULL REFERENCES users(user_id),
    reputation_threshold REAL NOT NULL DEFAULT 10.0,
    vote_reward REAL NOT NULL DEFAULT 0.1,
    min_trusted_users INTEGER NOT NULL DEFAULT 5,
    decay_periods TEXT NOT NULL,
    created_at INTEGER NOT NULL
);

-- ============================================================
-- Vote ledger
-- ============================================================

-- Votes are immutable; retraction flips is_deleted. At most one live
-- vote per (author, target, tag) edge, enforced by the partial unique
-- index so a retracted edge can be re-cast.
CREATE TABLE IF NOT EXISTS votes (
    vote_id TEXT PRIMARY KEY,
    author_id TEXT NOT NULL REFERENCES users(user_id),
    target_id TEXT NOT NULL REFERENCES users(user_id),
    tag_id TEXT NOT NULL REFERENCES tags(tag_id),
    sign INTEGER NOT NULL CHECK (sign IN (-1, 1)),
    created_at INTEGER NOT NULL,
    is_deleted INTEGER NOT NULL DEFAULT 0,
    deleted_at INTEGER,
    CHECK (author_id <> target_id)
);

CREATE INDEX IF NOT EXISTS idx_votes_incoming ON votes(target_id, tag_id) WHERE is_deleted = 0;
CREATE INDEX IF NOT EXISTS idx_votes_outgoing ON votes(author_id, tag_id) WHERE is_deleted = 0;
CREATE UNIQUE INDEX IF NOT EXISTS idx_votes_live_edge ON votes(author_id, target_id, tag_id) WHERE is_deleted = 0;

-- ============================================================
-- Reputation cache
-- ============================================================

CREATE TABLE IF NOT EXISTS reputations (
    user_id TEXT NOT NULL REFERENCES users(user_id),
    tag_id TEXT NOT NULL REFERENCES tags(tag_id),
    basis_reputation REAL NOT NULL DEFAULT 0.0,
    vote_weight REAL NOT NULL DEFAULT 0.0,
    voting_reward_reputation REAL NOT NULL DEFAULT 0.0,
    effective_reputation REAL NOT NULL DEFAULT 0.0,
    is_trusted INTEGER NOT NULL DEFAULT 0,
    last_calculated_at INTEGER NOT NULL,
    version INTEGER NOT NULL DEFAULT 1,
    PRIMARY KEY (user_id, tag_id)
);

CREATE INDEX IF NOT EXISTS idx_reputations_trusted ON reputations(tag_id) WHERE is_trusted = 1;
"#;
