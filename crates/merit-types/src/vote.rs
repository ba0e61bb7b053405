//! Votes: signed trust edges between users, scoped to a tag.

use serde::{Deserialize, Serialize};

use crate::{TagId, UserId, VoteId};

/// Direction of a vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteSign {
    Up,
    Down,
}

impl VoteSign {
    /// Contribution factor: +1.0 for up, -1.0 for down.
    pub fn value(self) -> f64 {
        match self {
            VoteSign::Up => 1.0,
            VoteSign::Down => -1.0,
        }
    }

    /// Storage encoding (+1 / -1).
    pub fn as_i8(self) -> i8 {
        match self {
            VoteSign::Up => 1,
            VoteSign::Down => -1,
        }
    }

    pub fn from_i8(raw: i8) -> Option<Self> {
        match raw {
            1 => Some(VoteSign::Up),
            -1 => Some(VoteSign::Down),
            _ => None,
        }
    }
}

/// A trust edge: `author` vouches for (or against) `target` within `tag`.
///
/// Votes are immutable once cast. Retraction is a soft delete in the
/// ledger, never an in-place update, so a retracted edge may later be
/// re-cast as a new vote.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Vote {
    pub vote_id: VoteId,
    pub author_id: UserId,
    pub target_id: UserId,
    pub tag_id: TagId,
    pub sign: VoteSign,
    pub created_at: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_factors() {
        assert!((VoteSign::Up.value() - 1.0).abs() < f64::EPSILON);
        assert!((VoteSign::Down.value() + 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_sign_storage_round_trip() {
        assert_eq!(VoteSign::from_i8(VoteSign::Up.as_i8()), Some(VoteSign::Up));
        assert_eq!(VoteSign::from_i8(VoteSign::Down.as_i8()), Some(VoteSign::Down));
        assert_eq!(VoteSign::from_i8(0), None);
        assert_eq!(VoteSign::from_i8(2), None);
    }
}
