//! MARKETPULSE — Market Sentiment Dashboard Feed Engine
//!
//! Entry point. Loads configuration, initialises structured logging,
//! wires the quote cache and sentiment engine into the aggregator, and
//! runs the poll loop with graceful shutdown. The dashboard API serves
//! whatever the latest completed cycle produced.

use anyhow::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use marketpulse::config::AppConfig;
use marketpulse::dashboard::{routes::DashboardState, spawn_dashboard};
use marketpulse::feed::Aggregator;
use marketpulse::quotes::finnhub::FinnhubSource;
use marketpulse::quotes::{QuoteCache, QuoteSource};
use marketpulse::sentiment::SentimentEngine;

const BANNER: &str = r#"
  ____  _   _ _     ____  _____
 |  _ \| | | | |   / ___|| ____|
 | |_) | | | | |   \___ \|  _|
 |  __/| |_| | |___ ___) | |___
 |_|    \___/|_____|____/|_____|

  MARKETPULSE — Market Sentiment Feed Engine
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    // Load configuration; missing file means demo-mode defaults.
    // Validation rejects unrunnable settings here, not per-call.
    let cfg = AppConfig::load_or_default("config.toml")?;

    init_logging();

    println!("{BANNER}");
    info!(
        interval_secs = cfg.poller.interval_secs,
        quote_ttl_secs = cfg.quotes.ttl_secs,
        history_cap = cfg.sentiment.history_cap,
        "MARKETPULSE starting up"
    );

    // -- Initialise components -------------------------------------------

    let source = build_quote_source(&cfg);

    let quotes = Arc::new(QuoteCache::new(
        source,
        Duration::from_secs(cfg.quotes.ttl_secs),
    ));
    let sentiment = Arc::new(SentimentEngine::new(
        cfg.sentiment.history_cap,
        cfg.sentiment.persistence,
    ));
    let aggregator = Aggregator::new(quotes.clone(), sentiment.clone());

    // A snapshot older than three missed cycles reads as stale on the API.
    let stale_after = chrono::Duration::seconds((cfg.poller.interval_secs * 3) as i64);
    let state = Arc::new(DashboardState::new(sentiment, stale_after));

    if cfg.dashboard.enabled {
        spawn_dashboard(state.clone(), cfg.dashboard.port);
    }

    // -- Main loop -------------------------------------------------------

    let mut interval = tokio::time::interval(Duration::from_secs(cfg.poller.interval_secs));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(
        interval_secs = cfg.poller.interval_secs,
        "Entering poll loop. Press Ctrl+C to stop."
    );

    let mut cycle: u64 = 0;
    loop {
        tokio::select! {
            _ = interval.tick() => {
                cycle += 1;
                let started = Instant::now();
                let snapshot = aggregator.refresh().await;
                info!(
                    cycle,
                    companies = snapshot.companies.len(),
                    sectors = snapshot.sectors.len(),
                    posts = snapshot.posts.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Cycle complete"
                );
                state.publish(snapshot);
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received.");
                break;
            }
        }
    }

    info!(cycles = cycle, "MARKETPULSE shut down cleanly.");
    Ok(())
}

/// Build the optional live quote source from config + environment.
/// Returns `None` (demo mode) when disabled or no API key is set.
fn build_quote_source(cfg: &AppConfig) -> Option<Arc<dyn QuoteSource>> {
    if !cfg.quotes.live_enabled {
        info!("Live quotes disabled in config — running on synthetic quotes");
        return None;
    }

    let key = std::env::var(&cfg.quotes.finnhub_key_env).unwrap_or_default();
    if key.is_empty() {
        warn!(
            env = %cfg.quotes.finnhub_key_env,
            "No Finnhub API key configured — running on synthetic quotes"
        );
        return None;
    }

    match FinnhubSource::new(key, Duration::from_secs(cfg.quotes.timeout_secs)) {
        Ok(source) => {
            info!("Live quote source: Finnhub");
            Some(Arc::new(source))
        }
        Err(e) => {
            warn!(error = %e, "Failed to build Finnhub client — running on synthetic quotes");
            None
        }
    }
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("marketpulse=info"));

    let json_logging = std::env::var("MARKETPULSE_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
