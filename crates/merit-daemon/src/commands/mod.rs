//! RPC command handlers.
//!
//! Each submodule implements the methods for one area of the service.

pub mod reputation;
pub mod service;
pub mod tags;
pub mod users;
pub mod votes;
