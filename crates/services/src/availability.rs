//! # Availability
//!
//! Binary Available/Unavailable latch for the remote backend. Backends in
//! this domain are typically reachable for a whole session or absent
//! entirely, so a fail-fast flag beats a circuit breaker here: any remote
//! failure flips the flag off, and only an explicit probe flips it back.
//! A second bit remembers whether the backend was *ever* reached this
//! session — the cache read policy for shared deployments hangs off it.

use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug)]
pub struct Availability {
    online: AtomicBool,
    ever_reached: AtomicBool,
}

impl Availability {
    /// Starts pessimistic; the startup probe promotes to online.
    pub fn new() -> Self {
        Self {
            online: AtomicBool::new(false),
            ever_reached: AtomicBool::new(false),
        }
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Relaxed)
    }

    pub fn ever_reached(&self) -> bool {
        self.ever_reached.load(Ordering::Relaxed)
    }

    pub fn mark_reached(&self) {
        if !self.online.swap(true, Ordering::Relaxed) {
            tracing::info!("backend reachable, remote store is authoritative");
        }
        self.ever_reached.store(true, Ordering::Relaxed);
    }

    pub fn mark_failed(&self) {
        if self.online.swap(false, Ordering::Relaxed) {
            tracing::warn!("backend unreachable, degrading to local sources");
        }
    }
}

impl Default for Availability {
    fn default() -> Self {
        Self::new()
    }
}
