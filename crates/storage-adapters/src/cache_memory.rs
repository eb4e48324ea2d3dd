//! In-memory `CacheStore` for tests and cacheless/ephemeral deployments.

use async_trait::async_trait;
use dashmap::DashMap;
use domains::traits::CacheStore;

#[derive(Default)]
pub struct MemoryCache {
    entries: DashMap<String, String>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn load(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    async fn save(&self, key: &str, value: &str) -> bool {
        self.entries.insert(key.to_string(), value.to_string());
        true
    }
}
