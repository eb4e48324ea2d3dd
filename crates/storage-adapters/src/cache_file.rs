//! # File Cache
//!
//! `CacheStore` backed by one JSON file per key under a cache directory —
//! the native analogue of the browser localStorage shim the site originally
//! used. All failures are swallowed into `None`/`false` and logged; a broken
//! cache must never take an operation down with it.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use domains::traits::CacheStore;
use tokio::fs;

pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are internal constants ("posts", "settings"), not user input.
        self.dir.join(format!("{key}.json"))
    }

    async fn ensure_dir(&self) -> bool {
        match fs::create_dir_all(&self.dir).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(dir = %self.dir.display(), error = %e, "cache directory unavailable");
                false
            }
        }
    }
}

#[async_trait]
impl CacheStore for FileCache {
    async fn load(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match fs::read_to_string(&path).await {
            Ok(contents) => Some(contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cache read failed");
                None
            }
        }
    }

    async fn save(&self, key: &str, value: &str) -> bool {
        if !self.ensure_dir().await {
            return false;
        }
        let path = self.path_for(key);
        match fs::write(&path, value).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cache write failed");
                false
            }
        }
    }
}

impl FileCache {
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
