//! Basis aggregation over incoming votes.
//!
//! The basis score is the decayed, author-weighted sum of the votes a
//! user received. Author figures come from their cached records as
//! persisted, never recomputed here, which is what turns the cyclic
//! trust graph into a bounded, terminating computation.

use std::collections::HashMap;

use merit_types::vote::Vote;
use merit_types::UserId;

use crate::decay::DecayTable;

/// The slice of an author's cached record that feeds other users' basis
/// scores. The default (all zero) is exactly the influence of an author
/// with no record.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AuthorInfluence {
    /// The author's persisted effective reputation.
    pub reputation: f64,
    /// The author's persisted normalized per-vote weight.
    pub vote_weight: f64,
}

/// Fold incoming votes into a basis score.
///
/// Each vote contributes `sign * multiplier * vote_weight * reputation`,
/// with the author pair looked up in `authors` (fetched once per unique
/// author by the caller). An author missing from the map contributes
/// zero; that is the normal state for authors never computed in this
/// tag, not an error.
pub fn aggregate(
    incoming: &[Vote],
    authors: &HashMap<UserId, AuthorInfluence>,
    table: &DecayTable,
    now: u64,
) -> f64 {
    let mut basis = 0.0;
    for vote in incoming {
        let author = authors.get(&vote.author_id).copied().unwrap_or_default();
        basis += vote.sign.value()
            * table.multiplier(vote.created_at, now)
            * author.vote_weight
            * author.reputation;
    }
    basis
}
