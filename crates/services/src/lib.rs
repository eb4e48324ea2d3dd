//! matinee/crates/services/src/lib.rs
//!
//! The tiered content store and its supporting pieces: availability
//! tracking, the embedded seed snapshot, and export.

pub mod availability;
pub mod embedded;
pub mod tiered;

pub use availability::Availability;
pub use tiered::{CachePolicy, TieredStore};
