//! Vote weight normalization.
//!
//! A voter's per-vote influence is the reciprocal of their decayed
//! outgoing vote mass, so casting more votes dilutes each one and the
//! voter's total influence on others stays pinned to their own
//! reputation. Vote spamming buys nothing.

use merit_types::vote::Vote;

use crate::decay::DecayTable;

/// Normalized per-vote influence for the author of `outgoing`.
///
/// `1 / Σ multiplier` over the author's live outgoing votes. A user with
/// no outgoing votes (or a fully decayed-to-zero history) has weight 0.0;
/// that is a normal state, not an error.
pub fn normalize(outgoing: &[Vote], table: &DecayTable, now: u64) -> f64 {
    let total_weighted: f64 = outgoing
        .iter()
        .map(|v| table.multiplier(v.created_at, now))
        .sum();

    if total_weighted > 0.0 {
        1.0 / total_weighted
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use merit_types::tag::DecayPeriod;
    use merit_types::vote::VoteSign;

    const NOW: u64 = 1_705_276_800; // 2024-01-15T00:00:00Z

    fn flat_table() -> DecayTable {
        DecayTable::new(&[DecayPeriod { span_months: 999, multiplier: 1.0 }]).expect("table")
    }

    fn vote(id: u32, created_at: u64) -> Vote {
        Vote {
            vote_id: format!("v-{id}"),
            author_id: "u-author".to_string(),
            target_id: format!("u-target-{id}"),
            tag_id: "t-rust".to_string(),
            sign: VoteSign::Up,
            created_at,
        }
    }

    #[test]
    fn test_no_outgoing_votes_is_zero() {
        assert!((normalize(&[], &flat_table(), NOW) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_single_fresh_vote_has_full_weight() {
        let votes = vec![vote(1, NOW)];
        assert!((normalize(&votes, &flat_table(), NOW) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_normalization_law() {
        // All votes cast at the same instant: weight times total decayed
        // mass must come back to exactly 1.
        let table = flat_table();
        for n in [1usize, 3, 20, 100] {
            let votes: Vec<Vote> = (0..n as u32).map(|i| vote(i, NOW)).collect();
            let weight = normalize(&votes, &table, NOW);
            let total: f64 = votes.iter().map(|v| table.multiplier(v.created_at, NOW)).sum();
            assert!(
                (weight * total - 1.0).abs() < 1e-9,
                "normalization law violated for {n} votes"
            );
        }
    }

    #[test]
    fn test_zero_multiplier_history_is_zero_weight() {
        let table =
            DecayTable::new(&[DecayPeriod { span_months: 999, multiplier: 0.0 }]).expect("table");
        let votes = vec![vote(1, NOW), vote(2, NOW)];
        assert!((normalize(&votes, &table, NOW) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_older_votes_count_for_less_mass() {
        // One fresh vote and one decayed vote: total mass 1.5, weight 2/3.
        let table = DecayTable::new(&[
            DecayPeriod { span_months: 1, multiplier: 1.0 },
            DecayPeriod { span_months: 999, multiplier: 0.5 },
        ])
        .expect("table");
        // 2023-10-01T00:00:00Z is age 3 at NOW.
        let votes = vec![vote(1, NOW), vote(2, 1_696_118_400)];
        let weight = normalize(&votes, &table, NOW);
        assert!((weight - 1.0 / 1.5).abs() < 1e-12);
    }
}
