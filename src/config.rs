//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Secrets (API keys) are referenced by env-var name in the config and
//! resolved at runtime via `std::env::var`. A missing config file falls
//! back to compiled defaults so the engine runs out of the box in demo
//! mode with no live quote provider.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub poller: PollerConfig,
    pub quotes: QuotesConfig,
    pub sentiment: SentimentConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PollerConfig {
    /// Seconds between feed refresh cycles.
    pub interval_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct QuotesConfig {
    /// Seconds a cached quote stays valid.
    pub ttl_secs: u64,
    /// Whether to attempt the live Finnhub source at all.
    pub live_enabled: bool,
    /// Env var holding the Finnhub API key.
    pub finnhub_key_env: String,
    /// Per-request timeout for the live source.
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SentimentConfig {
    /// Maximum labels retained per ticker.
    pub history_cap: usize,
    /// Probability that a ticker repeats its most recent label.
    pub persistence: f64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self { interval_secs: 30 }
    }
}

impl Default for QuotesConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 60,
            live_enabled: true,
            finnhub_key_env: "FINNHUB_API_KEY".to_string(),
            timeout_secs: 5,
        }
    }
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self { history_cap: 20, persistence: 0.6 }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self { enabled: true, port: 8080 }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            poller: PollerConfig::default(),
            quotes: QuotesConfig::default(),
            sentiment: SentimentConfig::default(),
            dashboard: DashboardConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the given path, or fall back to defaults if the file
    /// doesn't exist (demo mode).
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            let config = AppConfig::default();
            config.validate()?;
            Ok(config)
        }
    }

    /// Reject configurations the engines cannot run with. Called once at
    /// startup so misconfiguration fails fast rather than per-call.
    pub fn validate(&self) -> Result<()> {
        if self.poller.interval_secs == 0 {
            bail!("poller.interval_secs must be positive");
        }
        if self.quotes.ttl_secs == 0 {
            bail!("quotes.ttl_secs must be positive");
        }
        if self.quotes.timeout_secs == 0 {
            bail!("quotes.timeout_secs must be positive");
        }
        if self.sentiment.history_cap == 0 {
            bail!("sentiment.history_cap must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.sentiment.persistence) {
            bail!(
                "sentiment.persistence must be in [0, 1], got {}",
                self.sentiment.persistence
            );
        }
        Ok(())
    }

    /// Resolve an environment variable name to its value.
    /// Useful for loading secrets referenced in the config.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }
}
