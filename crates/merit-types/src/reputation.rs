//! Computed reputation records.

use serde::{Deserialize, Serialize};

use crate::{TagId, UserId};

/// Cached result of one reputation computation for a (user, tag) pair.
///
/// `effective_reputation` is the figure other computations read when this
/// user appears as a vote author. It equals `basis_reputation` plus
/// `voting_reward_reputation` when the reward gate admitted rewards, and
/// `basis_reputation` alone otherwise (in which case
/// `voting_reward_reputation` is stored as zero).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Reputation {
    pub user_id: UserId,
    pub tag_id: TagId,
    /// Aggregate of incoming votes: sign x decay x author weight x
    /// author reputation.
    pub basis_reputation: f64,
    /// 1 / (decayed outgoing vote count); 0.0 for a user who has cast
    /// no votes in this tag.
    pub vote_weight: f64,
    /// Gated participation rewards for outgoing votes.
    pub voting_reward_reputation: f64,
    pub effective_reputation: f64,
    /// Whether `basis_reputation` met the tag's threshold (inclusive).
    pub is_trusted: bool,
    pub last_calculated_at: u64,
}
