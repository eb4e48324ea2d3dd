//! matinee/crates/storage-adapters/src/lib.rs
//!
//! Concrete implementations of the `domains` storage ports: the HTTP remote
//! backend client and the local key-value caches.

pub mod cache_file;
pub mod cache_memory;
pub mod remote_http;

pub use cache_file::FileCache;
pub use cache_memory::MemoryCache;
pub use remote_http::HttpRemoteStore;
