//! matinee/crates/domains/src/lib.rs
//!
//! The central domain definitions for Matinee: content models, the error
//! taxonomy, and the port traits every storage adapter implements.

pub mod error;
pub mod models;
pub mod traits;

// Re-exporting for easier access in other crates
pub use error::{DataError, Result};
pub use models::*;
