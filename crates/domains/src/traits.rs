//! # Core Traits (Ports)
//!
//! Any storage adapter must implement these traits to be used by the
//! tiered store. The remote port is a uniform request contract over one
//! configured backend; the cache port mirrors a browser key-value shim.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Post, PostPatch, Settings, Snapshot};

/// Cache key for the serialized post collection.
pub const CACHE_POSTS: &str = "posts";
/// Cache key for the serialized settings record.
pub const CACHE_SETTINGS: &str = "settings";

/// Uniform request contract against the configured remote backend.
///
/// Implementations map transport failure to `DataError::Transport`, a
/// non-success status to `DataError::Status` (or `NotFound` for post point
/// operations answering 404), and never retry internally. No call here
/// touches the cache or the in-memory state.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// One-round-trip fetch of the whole dataset (`GET /data`).
    async fn fetch_all(&self) -> Result<Snapshot>;

    /// `GET /posts`. Doubles as the startup availability probe.
    async fn list_posts(&self) -> Result<Vec<Post>>;

    /// `GET /posts/{id}`. 404 maps to `NotFound`.
    async fn get_post(&self, id: &str) -> Result<Post>;

    /// `POST /posts` with the fully-formed record (id and timestamps are
    /// client-assigned). Returns the record as echoed back by the backend.
    async fn create_post(&self, post: &Post) -> Result<Post>;

    /// `PUT /posts/{id}` with a partial body. 404 maps to `NotFound`.
    async fn update_post(&self, id: &str, patch: &PostPatch) -> Result<Post>;

    /// `DELETE /posts/{id}`. 404 maps to `NotFound`.
    async fn delete_post(&self, id: &str) -> Result<()>;

    /// `GET /settings`.
    async fn fetch_settings(&self) -> Result<Settings>;

    /// `PUT /settings` with the full merged record.
    async fn put_settings(&self, settings: &Settings) -> Result<Settings>;

    /// `POST /reset`: clears posts and restores default settings.
    async fn reset(&self) -> Result<()>;
}

/// Key-value persistence shim holding the last known-good snapshot.
///
/// Failures are non-fatal by contract: `load` answers `None` on any read or
/// parse problem, `save` reports success as a bool. Callers proceed without
/// caching when a save fails.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn load(&self, key: &str) -> Option<String>;
    async fn save(&self, key: &str, value: &str) -> bool;
}
