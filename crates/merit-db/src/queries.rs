//! Database query functions organized by domain.

pub mod reputations;
pub mod tags;
pub mod users;
pub mod votes;
