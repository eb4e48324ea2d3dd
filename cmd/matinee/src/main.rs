//! # Matinee CLI
//!
//! Operator entry point: assembles the tiered store from configuration and
//! runs one data operation. Backend presence comes from configuration alone;
//! no backend URL means local-only mode with the cache as the sole store.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use configs::AppConfig;
use domains::traits::{CacheStore, RemoteStore};
use secrecy::ExposeSecret;
use services::{embedded, CachePolicy, TieredStore};
use storage_adapters::{FileCache, HttpRemoteStore, MemoryCache};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: matinee <command>

commands:
  list              print all posts
  show <id>         print one post as JSON
  search <query>    case-insensitive substring search
  settings          print current settings as JSON
  export [path]     write a portable snapshot (stdout when no path)
  probe             re-check backend availability
  reset --yes       clear all posts and restore default settings";

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = AppConfig::load().context("loading configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cfg.log_level.clone())),
        )
        .init();

    let store = build_store(&cfg).await?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("list") => {
            for post in store.get_posts().await {
                println!("{}  {} ({})", post.id, post.title, post.category);
            }
        }
        Some("show") => {
            let id = args.get(1).context("show requires a post id")?;
            match store.get_post_by_id(id).await {
                Some(post) => println!("{}", serde_json::to_string_pretty(&post)?),
                None => bail!("no post with id {id}"),
            }
        }
        Some("search") => {
            let query = args.get(1).context("search requires a query")?;
            for post in store.search(query).await {
                println!("{}  {} ({})", post.id, post.title, post.category);
            }
        }
        Some("settings") => {
            println!("{}", serde_json::to_string_pretty(&store.get_settings().await)?);
        }
        Some("export") => {
            let snapshot = store.export_snapshot().await;
            let json = snapshot.to_json_pretty()?;
            match args.get(1) {
                Some(path) => {
                    std::fs::write(path, &json).with_context(|| format!("writing {path}"))?;
                    tracing::info!(path, posts = snapshot.posts.len(), "snapshot exported");
                }
                None => println!("{json}"),
            }
        }
        Some("probe") => {
            let online = store.probe().await;
            println!("backend: {}", if online { "available" } else { "unavailable" });
        }
        Some("reset") => {
            // Destructive and irreversible; the store performs no
            // confirmation of its own.
            if args.get(1).map(String::as_str) != Some("--yes") {
                bail!("reset is irreversible; pass --yes to confirm");
            }
            store.reset_all().await?;
            println!("reset complete");
        }
        _ => bail!("{USAGE}"),
    }

    Ok(())
}

async fn build_store(cfg: &AppConfig) -> Result<TieredStore> {
    let policy: CachePolicy = cfg.cache_policy.parse().map_err(anyhow::Error::msg)?;

    let remote: Option<Arc<dyn RemoteStore>> = match cfg.backend_url() {
        Some(url) => Some(Arc::new(
            HttpRemoteStore::with_timeout(url, Duration::from_secs(cfg.request_timeout_secs))
                .context("building backend client")?,
        )),
        None => None,
    };

    // Local-only with the cache disabled leaves only memory + the seed.
    let cache: Arc<dyn CacheStore> = if remote.is_none() && policy == CachePolicy::Disabled {
        Arc::new(MemoryCache::new())
    } else {
        Arc::new(FileCache::new(&cfg.cache_dir))
    };

    let mut seed = embedded::seed().clone();
    if let Some(pin) = &cfg.admin_pin {
        seed.admin_pin = pin.expose_secret().to_string();
    }

    Ok(TieredStore::init(remote, cache, policy, seed).await)
}
