//! Integration test crate for the Merit reputation engine.
//!
//! There is no library code here; the tests/ directory drives full
//! reputation flows (votes, recomputation, phase transitions) across
//! the workspace crates.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p merit-integration-tests
//! ```
