//! Per-tag (community) reputation configuration.

use serde::{Deserialize, Serialize};

use crate::{TagId, DEFAULT_MIN_TRUSTED_USERS, DEFAULT_REPUTATION_THRESHOLD, DEFAULT_VOTE_REWARD};

/// One period of an age-decay table.
///
/// `span_months` is how many whole calendar months the period covers.
/// The final period conventionally uses 999 months as an unbounded tail.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecayPeriod {
    pub span_months: u32,
    pub multiplier: f64,
}

/// Immutable snapshot of a tag's reputation parameters.
///
/// A snapshot is taken once per computation; configuration changes made
/// mid-flight only affect the next computation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TagConfig {
    pub tag_id: TagId,
    pub reputation_threshold: f64,
    pub vote_reward: f64,
    pub min_trusted_users: u32,
    pub decay_periods: Vec<DecayPeriod>,
}

impl TagConfig {
    /// Snapshot carrying the default parameters for `tag_id`.
    pub fn with_defaults(tag_id: TagId) -> Self {
        Self {
            tag_id,
            reputation_threshold: DEFAULT_REPUTATION_THRESHOLD,
            vote_reward: DEFAULT_VOTE_REWARD,
            min_trusted_users: DEFAULT_MIN_TRUSTED_USERS,
            decay_periods: default_decay_periods(),
        }
    }
}

/// The default decay table. A fresh vote carries full strength; strength
/// steps down as the vote crosses calendar-month boundaries and bottoms
/// out at a tenth in the 999-month tail.
pub fn default_decay_periods() -> Vec<DecayPeriod> {
    vec![
        DecayPeriod { span_months: 1, multiplier: 1.0 },
        DecayPeriod { span_months: 1, multiplier: 0.9 },
        DecayPeriod { span_months: 1, multiplier: 0.8 },
        DecayPeriod { span_months: 3, multiplier: 0.6 },
        DecayPeriod { span_months: 6, multiplier: 0.4 },
        DecayPeriod { span_months: 12, multiplier: 0.25 },
        DecayPeriod { span_months: 24, multiplier: 0.15 },
        DecayPeriod { span_months: 999, multiplier: 0.1 },
    ]
}
