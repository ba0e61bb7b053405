//! User records.

use serde::{Deserialize, Serialize};

use crate::UserId;

/// A registered user. Reputation is tracked per (user, tag) in separate
/// records; this one only anchors identity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub handle: String,
    pub display_name: String,
    pub created_at: u64,
}
