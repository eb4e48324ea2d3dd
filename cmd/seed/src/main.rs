//! # seed
//!
//! Regenerates the embedded seed snapshot from a live backend. Run this
//! offline against current data, rebuild, and the new dataset ships baked
//! into the binary as the last-resort read source.
//!
//!     seed <backend-url> [output-path]
//!
//! Default output is the seed file the services crate compiles in.

use anyhow::{Context, Result};
use domains::traits::RemoteStore;
use storage_adapters::HttpRemoteStore;

const DEFAULT_OUTPUT: &str = "crates/services/seed/snapshot.json";

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let backend_url = args.next().context("usage: seed <backend-url> [output-path]")?;
    let output = args.next().unwrap_or_else(|| DEFAULT_OUTPUT.to_string());

    let store = HttpRemoteStore::new(&backend_url).context("building backend client")?;
    let snapshot = store
        .fetch_all()
        .await
        .with_context(|| format!("fetching dataset from {backend_url}"))?;

    std::fs::write(&output, snapshot.to_json_pretty()?).with_context(|| format!("writing {output}"))?;
    println!("wrote {} posts to {output}", snapshot.posts.len());
    Ok(())
}
