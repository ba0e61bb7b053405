//! # merit-engine
//!
//! Per-tag reputation computation over the vote ledger.
//!
//! A user's reputation inside a tag is recomputed on demand from the
//! votes they received and cast, never incrementally patched. Incoming
//! votes are weighted by age decay and by the *cached* record of each
//! vote's author, which bounds every computation to a single (user, tag)
//! pair: trust cycles resolve through the cache, at the cost of eventual
//! rather than immediate consistency across the graph.
//!
//! ## Modules
//!
//! - [`decay`] — calendar-month age decay with a per-tag period table.
//! - [`weight`] — normalized per-vote influence of a voter.
//! - [`basis`] — aggregation of incoming votes into a basis score.
//! - [`gate`] — trust threshold and bootstrap/restricted phase.
//! - [`reward`] — participation rewards for outgoing votes.
//! - [`compute`] — the orchestrating pipeline and its persistence step.

pub mod basis;
pub mod compute;
pub mod decay;
pub mod gate;
pub mod reward;
pub mod weight;

/// Error types for reputation computation.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The tag supplied a malformed decay table. Fatal for the request;
    /// never retried.
    #[error("invalid decay configuration: {0}")]
    Config(String),

    /// A store read or write failed; propagated unchanged. Retry policy
    /// belongs to the caller.
    #[error("store error: {0}")]
    Store(#[from] merit_db::DbError),

    /// The versioned persist lost to a concurrent writer twice in a row.
    #[error("write conflict persisting reputation for user '{user_id}' in tag '{tag_id}'")]
    WriteConflict { user_id: String, tag_id: String },
}

pub type Result<T> = std::result::Result<T, EngineError>;
