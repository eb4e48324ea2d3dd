//! # Tiered Store
//!
//! The state reconciler at the heart of Matinee's data layer. Owns the
//! in-memory mirror of posts + settings, decides per operation which source
//! is authoritative, refreshes state before every read, and performs writes
//! against the authoritative store followed by a forced refresh.
//!
//! Source order for reads: remote backend (when available), then the local
//! cache (policy permitting), then the embedded seed. Writes never fall back
//! silently: in remote mode a write that cannot reach the backend fails
//! loudly; only in local-only deployments (no backend configured) is the
//! cache the sole store.
//!
//! Interleaved public operations are not mutually exclusive; if two writes
//! race, the last one to land at the authoritative store wins. Acceptable
//! for a single-admin tool.

use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use domains::error::{DataError, Result};
use domains::models::{NewPost, Post, PostPatch, Settings, SettingsPatch, Snapshot};
use domains::traits::{CacheStore, RemoteStore, CACHE_POSTS, CACHE_SETTINGS};
use tokio::sync::RwLock;

use crate::availability::Availability;

/// When the local cache may serve reads. Applies to deployments with a
/// remote backend; in local-only mode the cache *is* the store and the
/// policy is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Single-client deployments: the cache may serve any failed read.
    Fallback,
    /// Shared-backend deployments: the cache serves reads only while the
    /// backend has never been reached this session. Once it has, a stale
    /// cache would invisibly diverge from other clients' writes.
    FirstRunOnly,
    /// The cache is neither read nor written.
    Disabled,
}

impl FromStr for CachePolicy {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value {
            "fallback" => Ok(Self::Fallback),
            "first-run-only" => Ok(Self::FirstRunOnly),
            "disabled" => Ok(Self::Disabled),
            other => Err(format!("unknown cache policy '{other}'")),
        }
    }
}

/// Reconciler-owned in-memory mirror. Nothing outside this module mutates it.
struct State {
    admin_pin: String,
    posts: Vec<Post>,
    settings: Settings,
}

pub struct TieredStore {
    remote: Option<Arc<dyn RemoteStore>>,
    cache: Arc<dyn CacheStore>,
    policy: CachePolicy,
    seed: Snapshot,
    availability: Availability,
    state: RwLock<State>,
}

impl TieredStore {
    /// Assembles a store without probing. State starts from the seed; call
    /// `probe` + `refresh` (or use [`TieredStore::init`]) before serving.
    pub fn new(
        remote: Option<Arc<dyn RemoteStore>>,
        cache: Arc<dyn CacheStore>,
        policy: CachePolicy,
        seed: Snapshot,
    ) -> Self {
        let state = State {
            admin_pin: seed.admin_pin.clone(),
            posts: seed.posts.clone(),
            settings: seed.settings.clone().unwrap_or_default(),
        };
        Self {
            remote,
            cache,
            policy,
            seed,
            availability: Availability::new(),
            state: RwLock::new(state),
        }
    }

    /// Standard session start: one availability probe, then an initial
    /// refresh from the best available source.
    pub async fn init(
        remote: Option<Arc<dyn RemoteStore>>,
        cache: Arc<dyn CacheStore>,
        policy: CachePolicy,
        seed: Snapshot,
    ) -> Self {
        let store = Self::new(remote, cache, policy, seed);
        store.probe().await;
        store.refresh().await;
        tracing::info!(
            mode = if store.remote.is_some() { "remote" } else { "local-only" },
            online = store.is_online(),
            "content store ready"
        );
        store
    }

    pub fn is_online(&self) -> bool {
        self.availability.is_online()
    }

    /// Re-runs the lightweight existence check against the backend. The
    /// offline latch never resets on its own; this is the explicit way back.
    pub async fn probe(&self) -> bool {
        let Some(remote) = &self.remote else {
            return false;
        };
        match remote.list_posts().await {
            Ok(_) => {
                self.availability.mark_reached();
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "availability probe failed");
                self.availability.mark_failed();
                false
            }
        }
    }

    /// Replaces state wholesale from the best available source and returns
    /// the resulting snapshot. Remote failures demote availability and are
    /// logged, never raised: reads always produce something.
    pub async fn refresh(&self) -> Snapshot {
        if let Some(remote) = &self.remote {
            if self.availability.is_online() {
                match remote.fetch_all().await {
                    Ok(snapshot) => {
                        self.availability.mark_reached();
                        self.adopt_remote(snapshot).await;
                        return self.current().await;
                    }
                    Err(e) => {
                        self.availability.mark_failed();
                        tracing::warn!(error = %e, "backend refresh failed, falling back");
                    }
                }
            }
            self.refresh_from_fallback().await;
        } else {
            self.refresh_from_local().await;
        }
        self.current().await
    }

    // ── Reads ───────────────────────────────────────────────────────────

    pub async fn get_posts(&self) -> Vec<Post> {
        self.refresh().await.posts
    }

    pub async fn get_post_by_id(&self, id: &str) -> Option<Post> {
        self.get_posts().await.into_iter().find(|post| post.id == id)
    }

    pub async fn get_settings(&self) -> Settings {
        self.refresh().await.settings.unwrap_or_default()
    }

    /// Case-insensitive substring match over title, description, category.
    pub async fn search(&self, query: &str) -> Vec<Post> {
        let needle = query.to_lowercase();
        self.get_posts()
            .await
            .into_iter()
            .filter(|post| {
                post.title.to_lowercase().contains(&needle)
                    || post.description.to_lowercase().contains(&needle)
                    || post.category.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Plain string compare against the PIN sourced at init. Not a security
    /// boundary; gate for the admin surface only.
    pub async fn verify_pin(&self, pin: &str) -> bool {
        self.state.read().await.admin_pin == pin
    }

    /// Snapshot of current state, stamped for backup or re-embedding as a
    /// new seed. Round-trips through the embedded snapshot loader.
    pub async fn export_snapshot(&self) -> Snapshot {
        let mut snapshot = self.refresh().await;
        snapshot.exported_at = Some(Utc::now());
        snapshot
    }

    // ── Writes ──────────────────────────────────────────────────────────

    pub async fn add_post(&self, input: NewPost) -> Result<Post> {
        input.validate()?;
        let post = input.into_post(Utc::now());

        match &self.remote {
            Some(remote) => {
                self.ensure_online()?;
                let created = remote.create_post(&post).await.map_err(|e| self.noted(e))?;
                self.refresh().await;
                Ok(created)
            }
            None => {
                let now = post.created_at;
                let snapshot = self.refresh().await;
                let mut posts = snapshot.posts;
                posts.push(post.clone());
                let mut settings = snapshot.settings.unwrap_or_default();
                settings.last_modified = now;
                self.persist_local(&posts, &settings).await?;
                self.refresh().await;
                Ok(post)
            }
        }
    }

    pub async fn update_post(&self, id: &str, patch: PostPatch) -> Result<Post> {
        match &self.remote {
            Some(remote) => {
                self.ensure_online()?;
                let updated = remote.update_post(id, &patch).await.map_err(|e| self.noted(e))?;
                self.refresh().await;
                Ok(updated)
            }
            None => {
                let now = Utc::now();
                let snapshot = self.refresh().await;
                let mut posts = snapshot.posts;
                let Some(existing) = posts.iter_mut().find(|post| post.id == id) else {
                    return Err(DataError::NotFound("post".into(), id.into()));
                };
                patch.apply(existing, now);
                let updated = existing.clone();
                let mut settings = snapshot.settings.unwrap_or_default();
                settings.last_modified = now;
                self.persist_local(&posts, &settings).await?;
                self.refresh().await;
                Ok(updated)
            }
        }
    }

    /// Deleting an id the authoritative store doesn't have fails with
    /// `NotFound` in every deployment mode; a stale admin view learns it is
    /// stale instead of seeing a phantom success.
    pub async fn delete_post(&self, id: &str) -> Result<()> {
        match &self.remote {
            Some(remote) => {
                self.ensure_online()?;
                remote.delete_post(id).await.map_err(|e| self.noted(e))?;
                self.refresh().await;
                Ok(())
            }
            None => {
                let now = Utc::now();
                let snapshot = self.refresh().await;
                let mut posts = snapshot.posts;
                let before = posts.len();
                posts.retain(|post| post.id != id);
                if posts.len() == before {
                    return Err(DataError::NotFound("post".into(), id.into()));
                }
                let mut settings = snapshot.settings.unwrap_or_default();
                settings.last_modified = now;
                self.persist_local(&posts, &settings).await?;
                self.refresh().await;
                Ok(())
            }
        }
    }

    pub async fn update_settings(&self, patch: SettingsPatch) -> Result<Settings> {
        let now = Utc::now();
        let mut settings = self.get_settings().await;
        patch.apply(&mut settings, now);

        match &self.remote {
            Some(remote) => {
                self.ensure_online()?;
                let stored = remote.put_settings(&settings).await.map_err(|e| self.noted(e))?;
                self.refresh().await;
                Ok(stored)
            }
            None => {
                self.persist_local_settings(&settings).await?;
                self.refresh().await;
                Ok(settings)
            }
        }
    }

    /// Destructive: clears posts and restores default settings at the
    /// authoritative store. Confirmation is the caller's job.
    pub async fn reset_all(&self) -> Result<()> {
        match &self.remote {
            Some(remote) => {
                self.ensure_online()?;
                remote.reset().await.map_err(|e| self.noted(e))?;
            }
            None => {
                let settings = Settings { last_modified: Utc::now(), ..Settings::default() };
                self.persist_local(&[], &settings).await?;
            }
        }
        self.refresh().await;
        Ok(())
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn ensure_online(&self) -> Result<()> {
        if self.availability.is_online() {
            Ok(())
        } else {
            Err(DataError::Transport(
                "backend is marked unavailable; probe before retrying writes".into(),
            ))
        }
    }

    fn noted(&self, err: DataError) -> DataError {
        if err.is_remote_failure() {
            self.availability.mark_failed();
        }
        err
    }

    async fn current(&self) -> Snapshot {
        let state = self.state.read().await;
        Snapshot {
            admin_pin: state.admin_pin.clone(),
            posts: state.posts.clone(),
            settings: Some(state.settings.clone()),
            exported_at: None,
        }
    }

    /// Wholesale replace from a successful backend fetch, with an
    /// opportunistic cache write-through.
    async fn adopt_remote(&self, snapshot: Snapshot) {
        {
            let mut state = self.state.write().await;
            if !snapshot.admin_pin.is_empty() {
                state.admin_pin = snapshot.admin_pin;
            }
            state.posts = snapshot.posts;
            state.settings = snapshot.settings.unwrap_or_default();
        }

        if self.policy != CachePolicy::Disabled {
            let state = self.state.read().await;
            self.backup_to_cache(&state.posts, &state.settings).await;
        }
    }

    /// Remote-mode fallback: cache (policy permitting, non-empty), then the
    /// embedded seed. When the policy forbids cache reads, no cache I/O is
    /// issued at all.
    async fn refresh_from_fallback(&self) {
        let cache_allowed = match self.policy {
            CachePolicy::Fallback => true,
            CachePolicy::FirstRunOnly => !self.availability.ever_reached(),
            CachePolicy::Disabled => false,
        };
        let (cached_posts, cached_settings) = if cache_allowed {
            (self.load_cached_posts().await, self.load_cached_settings().await)
        } else {
            (None, None)
        };

        let mut state = self.state.write().await;
        state.posts = match cached_posts {
            Some(posts) if !posts.is_empty() => posts,
            _ => self.seed.posts.clone(),
        };
        state.settings = cached_settings
            .unwrap_or_else(|| self.seed.settings.clone().unwrap_or_default());
    }

    /// Local-only refresh: the cache is authoritative, so a present key wins
    /// even when empty; only an absent key falls back to the seed.
    async fn refresh_from_local(&self) {
        let posts = self.load_cached_posts().await;
        let settings = self.load_cached_settings().await;

        let mut state = self.state.write().await;
        state.posts = posts.unwrap_or_else(|| self.seed.posts.clone());
        state.settings =
            settings.unwrap_or_else(|| self.seed.settings.clone().unwrap_or_default());
    }

    async fn load_cached_posts(&self) -> Option<Vec<Post>> {
        let raw = self.cache.load(CACHE_POSTS).await?;
        match serde_json::from_str(&raw) {
            Ok(posts) => Some(posts),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable cached posts");
                None
            }
        }
    }

    async fn load_cached_settings(&self) -> Option<Settings> {
        let raw = self.cache.load(CACHE_SETTINGS).await?;
        match serde_json::from_str(&raw) {
            Ok(settings) => Some(settings),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable cached settings");
                None
            }
        }
    }

    /// Best-effort backup after a successful remote fetch. A failed save is
    /// logged and ignored.
    async fn backup_to_cache(&self, posts: &[Post], settings: &Settings) {
        match serde_json::to_string(posts) {
            Ok(raw) => {
                if !self.cache.save(CACHE_POSTS, &raw).await {
                    tracing::debug!("post cache backup skipped");
                }
            }
            Err(e) => tracing::warn!(error = %e, "could not serialize posts for cache"),
        }
        match serde_json::to_string(settings) {
            Ok(raw) => {
                if !self.cache.save(CACHE_SETTINGS, &raw).await {
                    tracing::debug!("settings cache backup skipped");
                }
            }
            Err(e) => tracing::warn!(error = %e, "could not serialize settings for cache"),
        }
    }

    /// Local-only commit path: here the cache is the sole store, so a failed
    /// save is an error, not an inconvenience. Both keys are attempted even
    /// when the first save fails; the commit is still not atomic across the
    /// two keys, so a failure can leave one of them a generation behind.
    async fn persist_local(&self, posts: &[Post], settings: &Settings) -> Result<()> {
        let raw_posts = serde_json::to_string(posts)?;
        let raw_settings = serde_json::to_string(settings)?;
        let posts_saved = self.cache.save(CACHE_POSTS, &raw_posts).await;
        let settings_saved = self.cache.save(CACHE_SETTINGS, &raw_settings).await;
        if !posts_saved {
            return Err(DataError::Cache("failed to persist posts".into()));
        }
        if !settings_saved {
            return Err(DataError::Cache("failed to persist settings".into()));
        }
        Ok(())
    }

    async fn persist_local_settings(&self, settings: &Settings) -> Result<()> {
        let raw = serde_json::to_string(settings)?;
        if !self.cache.save(CACHE_SETTINGS, &raw).await {
            return Err(DataError::Cache("failed to persist settings".into()));
        }
        Ok(())
    }
}
