//! Quote acquisition and caching.
//!
//! Defines the `QuoteSource` trait for pluggable live providers and the
//! `QuoteCache` engine: a TTL cache that consults the live source on a
//! miss and falls back to deterministic synthesis when the source is
//! absent, failing, or returns a degenerate reading. `get_quote` never
//! fails; every lookup produces a renderable quote.

pub mod finnhub;
pub mod synth;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

use crate::types::{Quote, SourceError};

#[cfg(test)]
use mockall::automock;

/// Abstraction over live quote providers.
///
/// Implementors fetch a single symbol's quote; the cache owns retry and
/// fallback policy, so a source just reports what it saw.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetch the current quote for one symbol.
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, SourceError>;

    /// Provider name for logging and identification.
    fn name(&self) -> &str;
}

/// One cached quote behind a per-symbol lock. Holding the lock across a
/// refresh serializes concurrent callers of the same symbol; different
/// symbols never contend.
type Slot = Arc<tokio::sync::Mutex<Option<Quote>>>;

/// TTL quote cache with live-source passthrough and synthetic fallback.
pub struct QuoteCache {
    ttl: ChronoDuration,
    source: Option<Arc<dyn QuoteSource>>,
    slots: Mutex<HashMap<String, Slot>>,
    rng: Mutex<StdRng>,
}

impl QuoteCache {
    /// Create a cache with the given TTL and an optional live source.
    pub fn new(source: Option<Arc<dyn QuoteSource>>, ttl: Duration) -> Self {
        Self::with_rng(source, ttl, StdRng::from_entropy())
    }

    /// Create a cache with a fixed RNG seed (reproducible synthesis).
    pub fn with_seed(source: Option<Arc<dyn QuoteSource>>, ttl: Duration, seed: u64) -> Self {
        Self::with_rng(source, ttl, StdRng::seed_from_u64(seed))
    }

    fn with_rng(source: Option<Arc<dyn QuoteSource>>, ttl: Duration, rng: StdRng) -> Self {
        Self {
            ttl: ChronoDuration::from_std(ttl).unwrap_or(ChronoDuration::seconds(60)),
            source,
            slots: Mutex::new(HashMap::new()),
            rng: Mutex::new(rng),
        }
    }

    /// Get a quote for `symbol`, from cache if fresh, refreshing otherwise.
    ///
    /// Never fails: source errors and degenerate readings reduce to
    /// deterministic synthesis. Two calls within the TTL window return
    /// identical quotes.
    pub async fn get_quote(&self, symbol: &str) -> Quote {
        let slot = self.slot(symbol);
        let mut entry = slot.lock().await;

        if let Some(quote) = entry.as_ref() {
            if Utc::now() - quote.timestamp < self.ttl {
                return quote.clone();
            }
        }

        let quote = match self.fetch_live(symbol).await {
            Ok(quote) => {
                debug!(symbol, source = "live", price = %quote.current_price, "Quote refreshed");
                quote
            }
            Err(SourceError::Disabled) => self.synthesize(symbol),
            Err(e) => {
                warn!(symbol, error = %e, "Live quote unavailable, synthesizing");
                self.synthesize(symbol)
            }
        };

        *entry = Some(quote.clone());
        quote
    }

    /// Drop all cached quotes. Sentiment state is untouched.
    pub fn clear(&self) {
        self.slots.lock().expect("quote slot index poisoned").clear();
    }

    /// Number of symbols currently holding a slot (fresh or expired).
    pub fn cached_symbols(&self) -> usize {
        self.slots.lock().expect("quote slot index poisoned").len()
    }

    /// Fetch or create the per-symbol slot. The outer map lock is held
    /// only for this lookup, never across a refresh.
    fn slot(&self, symbol: &str) -> Slot {
        let mut slots = self.slots.lock().expect("quote slot index poisoned");
        slots
            .entry(symbol.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(None)))
            .clone()
    }

    async fn fetch_live(&self, symbol: &str) -> Result<Quote, SourceError> {
        let source = self.source.as_ref().ok_or(SourceError::Disabled)?;
        source.fetch_quote(symbol).await
    }

    fn synthesize(&self, symbol: &str) -> Quote {
        let mut rng = self.rng.lock().expect("synthesis rng poisoned");
        synth::synthesize(symbol, Utc::now(), &mut *rng)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
