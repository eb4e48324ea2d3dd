//! matinee/crates/configs/src/lib.rs
//!
//! Startup configuration for the Matinee binaries. Backend presence is one
//! explicit value here — `MATINEE_BACKEND_URL` — never guessed from the
//! environment at runtime. Sources: `config/default.toml` (optional), then
//! `MATINEE_*` environment variables (dotenv honored), env winning.

use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

const CACHE_POLICIES: [&str; 3] = ["fallback", "first-run-only", "disabled"];

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Base URL of the remote backend. Unset or empty means local-only mode.
    #[serde(default)]
    pub backend_url: Option<String>,
    pub request_timeout_secs: u64,
    pub cache_dir: String,
    /// One of "fallback", "first-run-only", "disabled".
    pub cache_policy: String,
    /// Overrides the seed snapshot's admin PIN when set.
    #[serde(default)]
    pub admin_pin: Option<SecretString>,
    pub log_level: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let raw = config::Config::builder()
            .set_default("request_timeout_secs", 10)?
            .set_default("cache_dir", ".matinee-cache")?
            .set_default("cache_policy", "first-run-only")?
            .set_default("log_level", "info")?
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::Environment::with_prefix("MATINEE"))
            .build()?;

        let cfg: AppConfig = raw.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !CACHE_POLICIES.contains(&self.cache_policy.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "cache_policy must be one of {CACHE_POLICIES:?}, got '{}'",
                self.cache_policy
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("request_timeout_secs must be positive".into()));
        }
        Ok(())
    }

    /// Normalized backend URL: empty strings count as "no backend".
    pub fn backend_url(&self) -> Option<&str> {
        self.backend_url.as_deref().filter(|url| !url.trim().is_empty())
    }
}
