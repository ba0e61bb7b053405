//! Trust threshold and community phase.

/// Whether a basis score meets the tag's trust threshold (inclusive).
pub fn is_trusted(basis: f64, threshold: f64) -> bool {
    basis >= threshold
}

/// Reward-gating phase of a tag.
///
/// There is no stored phase field: the phase is re-derived from the live
/// trusted count on every evaluation, so a community that loses trusted
/// members falls back into bootstrap by itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Fewer trusted members than the configured minimum; every member
    /// earns voting rewards so the community can get off the ground.
    Bootstrap,
    /// Enough trusted members; only trusted users earn voting rewards.
    Restricted,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Bootstrap => "bootstrap",
            Phase::Restricted => "restricted",
        }
    }
}

/// Phase from the live trusted count.
pub fn phase(trusted_count: u32, min_trusted_users: u32) -> Phase {
    if trusted_count < min_trusted_users {
        Phase::Bootstrap
    } else {
        Phase::Restricted
    }
}
