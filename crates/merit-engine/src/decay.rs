//! Calendar-month age decay for votes.
//!
//! A vote's influence falls off with age so that reputation reflects
//! recent behavior. Age is counted in whole calendar months and ignores
//! the day-of-month entirely: two timestamps in the same month are age 0
//! apart, and crossing any month boundary (even by a single second)
//! adds one month.

use chrono::{DateTime, Datelike, Utc};
use merit_types::tag::DecayPeriod;

use crate::{EngineError, Result};

/// A validated decay table.
///
/// Construction rejects an empty table and zero-length spans up front,
/// so lookup never has to handle a malformed table mid-computation.
#[derive(Clone, Debug)]
pub struct DecayTable {
    periods: Vec<DecayPeriod>,
}

impl DecayTable {
    /// Validate `periods` and snapshot them.
    pub fn new(periods: &[DecayPeriod]) -> Result<Self> {
        if periods.is_empty() {
            return Err(EngineError::Config("decay table is empty".into()));
        }
        for (i, period) in periods.iter().enumerate() {
            if period.span_months == 0 {
                return Err(EngineError::Config(format!(
                    "decay period {i} has a zero month span"
                )));
            }
        }
        Ok(Self {
            periods: periods.to_vec(),
        })
    }

    /// Decay multiplier for a vote cast at `vote_ts`, evaluated at `now`.
    ///
    /// Walks the table accumulating spans and returns the first period
    /// whose cumulative span meets or exceeds the vote's age. A vote
    /// older than the whole table keeps the last period's multiplier;
    /// the conventional `span_months = 999` tail makes that explicit.
    pub fn multiplier(&self, vote_ts: u64, now: u64) -> f64 {
        let age = u64::from(age_in_months(vote_ts, now));

        let mut cumulative = 0u64;
        for period in &self.periods {
            cumulative += u64::from(period.span_months);
            if cumulative >= age {
                return period.multiplier;
            }
        }

        self.periods[self.periods.len() - 1].multiplier
    }
}

/// Whole-month age of `vote_ts` at `now`. A vote timestamped in the
/// future (clock skew between writers) clamps to age 0.
fn age_in_months(vote_ts: u64, now: u64) -> u32 {
    let diff = month_index(now) - month_index(vote_ts);
    diff.clamp(0, i64::from(u32::MAX)) as u32
}

/// Months since year 0 for the calendar month containing `ts`.
fn month_index(ts: u64) -> i64 {
    match DateTime::<Utc>::from_timestamp(ts as i64, 0) {
        Some(dt) => i64::from(dt.year()) * 12 + i64::from(dt.month0()),
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-01-15T00:00:00Z
    const JAN_15: u64 = 1_705_276_800;
    // 2024-01-31T00:00:00Z
    const JAN_31: u64 = 1_706_659_200;
    // 2024-02-01T00:00:00Z
    const FEB_01: u64 = 1_706_745_600;
    // 2024-03-01T00:00:00Z
    const MAR_01: u64 = 1_709_251_200;
    // 2024-03-15T00:00:00Z
    const MAR_15: u64 = 1_710_460_800;
    // 2023-12-31T00:00:00Z
    const DEC_31: u64 = 1_703_980_800;
    // 2023-06-01T00:00:00Z
    const JUN_01_PRIOR: u64 = 1_685_577_600;

    fn table(entries: &[(u32, f64)]) -> DecayTable {
        let periods: Vec<DecayPeriod> = entries
            .iter()
            .map(|&(span_months, multiplier)| DecayPeriod {
                span_months,
                multiplier,
            })
            .collect();
        DecayTable::new(&periods).expect("valid table")
    }

    #[test]
    fn test_same_month_is_age_zero() {
        assert_eq!(age_in_months(JAN_15, JAN_31), 0);
        assert_eq!(age_in_months(JAN_15, JAN_15), 0);
    }

    #[test]
    fn test_month_boundary_increments_age() {
        // One day apart, but a month boundary in between.
        assert_eq!(age_in_months(JAN_31, FEB_01), 1);
        // Year boundary behaves the same way.
        assert_eq!(age_in_months(DEC_31, JAN_15), 1);
        assert_eq!(age_in_months(JAN_15, MAR_01), 2);
    }

    #[test]
    fn test_future_vote_clamps_to_zero() {
        assert_eq!(age_in_months(FEB_01, JAN_15), 0);
    }

    #[test]
    fn test_fresh_vote_gets_first_multiplier() {
        let t = table(&[(1, 1.0), (1, 0.9), (999, 0.5)]);
        assert!((t.multiplier(JAN_15, JAN_31) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_walk_selects_by_cumulative_span() {
        let t = table(&[(1, 1.0), (1, 0.9), (999, 0.5)]);
        // Age 1: first period's cumulative span (1) already covers it.
        assert!((t.multiplier(JAN_31, FEB_01) - 1.0).abs() < f64::EPSILON);
        // Age 2: needs the second period (cumulative span 2).
        assert!((t.multiplier(JAN_15, MAR_01) - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn test_age_beyond_table_uses_last_multiplier() {
        let t = table(&[(1, 1.0), (1, 0.5)]);
        // Age 3 exceeds the cumulative span (2) of the whole table.
        assert!((t.multiplier(DEC_31, MAR_01) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_decay_ordering_for_non_increasing_table() {
        let t = table(&[(1, 1.0), (2, 0.8), (3, 0.6), (999, 0.2)]);
        // Ages 0, 1, 2, 3, 9 at the evaluation instant.
        let votes_newest_first = [MAR_01, FEB_01, JAN_15, DEC_31, JUN_01_PRIOR];
        let now = MAR_15;
        let mut last = f64::INFINITY;
        for ts in votes_newest_first {
            let m = t.multiplier(ts, now);
            assert!(m <= last, "older vote decayed less than younger one");
            last = m;
        }
        // The oldest vote fell through to the unbounded tail.
        assert!((t.multiplier(JUN_01_PRIOR, now) - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_table_rejected() {
        let result = DecayTable::new(&[]);
        assert!(matches!(result, Err(EngineError::Config(_))));
    }

    #[test]
    fn test_zero_span_rejected() {
        let periods = [
            DecayPeriod { span_months: 1, multiplier: 1.0 },
            DecayPeriod { span_months: 0, multiplier: 0.5 },
        ];
        let result = DecayTable::new(&periods);
        assert!(matches!(result, Err(EngineError::Config(_))));
    }

    #[test]
    fn test_default_table_accepted() {
        let periods = merit_types::tag::default_decay_periods();
        DecayTable::new(&periods).expect("default table is valid");
    }
}
