//! Participation rewards for outgoing votes.

use merit_types::vote::Vote;

use crate::decay::DecayTable;

/// Decayed participation reward earned by casting `outgoing` votes:
/// `Σ vote_reward * multiplier` over the author's live votes.
///
/// Always computed in full; whether it reaches the user's effective
/// score is the orchestrator's gating decision, not this component's.
pub fn aggregate(outgoing: &[Vote], table: &DecayTable, vote_reward: f64, now: u64) -> f64 {
    outgoing
        .iter()
        .map(|v| vote_reward * table.multiplier(v.created_at, now))
        .sum()
}
