//! # Embedded Seed Snapshot
//!
//! A read-only dataset baked into the binary at build time: the default
//! admin PIN, one welcome post, and default settings. It is the last-resort
//! read source (first run, fully offline) and is never written at runtime —
//! `cmd/seed` regenerates `seed/snapshot.json` offline from live state.

use domains::models::Snapshot;
use once_cell::sync::Lazy;

const SEED_JSON: &str = include_str!("../seed/snapshot.json");

static SEED: Lazy<Snapshot> =
    Lazy::new(|| Snapshot::from_json(SEED_JSON).expect("embedded seed snapshot is valid JSON"));

/// The build-time-baked dataset.
pub fn seed() -> &'static Snapshot {
    &SEED
}
