//! matinee/crates/integration-tests/src/lib.rs
//!
//! End-to-end tests live in `tests/`; this crate exists only to anchor them
//! in the workspace.
