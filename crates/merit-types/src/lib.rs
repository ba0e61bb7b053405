//! # merit-types
//!
//! Shared domain types used across the Merit workspace: users, tags,
//! votes, and the computed reputation records cached per (user, tag).

pub mod reputation;
pub mod tag;
pub mod user;
pub mod vote;

/// Common identifier aliases. Ids are opaque lowercase-hex strings
/// minted by the daemon.
pub type UserId = String;
pub type TagId = String;
pub type VoteId = String;

/// Default basis-reputation threshold above which a user counts as
/// trusted within a tag (inclusive).
pub const DEFAULT_REPUTATION_THRESHOLD: f64 = 10.0;

/// Default reward credited per outgoing vote (before decay).
pub const DEFAULT_VOTE_REWARD: f64 = 0.1;

/// Default trusted-user count at which a tag leaves its bootstrap phase.
pub const DEFAULT_MIN_TRUSTED_USERS: u32 = 5;
