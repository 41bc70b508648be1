//! Mock quote source for integration testing.
//!
//! Provides a deterministic `QuoteSource` implementation that serves
//! known quotes, counts calls, and can be forced into error or
//! degenerate-reading modes — all in-memory with no external
//! dependencies.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use marketpulse::quotes::QuoteSource;
use marketpulse::types::{Quote, SourceError};

/// A deterministic mock quote source.
///
/// Every symbol gets the same fixed price shape, so cache behavior is
/// directly observable through the call counter.
pub struct MockQuoteSource {
    name: String,
    calls: AtomicUsize,
    /// If set, all fetches return this provider error.
    force_error: Mutex<Option<String>>,
    /// Symbols that report a zero-price (unknown-symbol) reading.
    degenerate: Mutex<HashSet<String>>,
}

impl MockQuoteSource {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            calls: AtomicUsize::new(0),
            force_error: Mutex::new(None),
            degenerate: Mutex::new(HashSet::new()),
        }
    }

    /// Total fetches served (including errored ones).
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Force all subsequent fetches to fail.
    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    /// Clear any forced error.
    pub fn clear_error(&self) {
        *self.force_error.lock().unwrap() = None;
    }

    /// Mark a symbol as returning a degenerate (all-zero) reading.
    pub fn mark_degenerate(&self, symbol: &str) {
        self.degenerate.lock().unwrap().insert(symbol.to_string());
    }

    /// The fixed quote this mock serves for any healthy symbol.
    pub fn canned_quote(symbol: &str) -> Quote {
        let current_price = dec!(150.25);
        let previous_close = dec!(148.00);
        let change = current_price - previous_close;
        let change_percent =
            (change / previous_close * Decimal::ONE_HUNDRED).round_dp(2);
        Quote {
            symbol: symbol.to_string(),
            current_price,
            change,
            change_percent,
            previous_close,
            open: dec!(148.40),
            high: dec!(151.00),
            low: dec!(147.90),
            volume: 2_000_000,
            timestamp: Utc::now(),
        }
    }
}

#[async_trait]
impl QuoteSource for MockQuoteSource {
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(msg) = self.force_error.lock().unwrap().as_ref() {
            return Err(SourceError::Provider {
                provider: self.name.clone(),
                message: msg.clone(),
            });
        }

        if self.degenerate.lock().unwrap().contains(symbol) {
            return Err(SourceError::Degenerate { symbol: symbol.to_string() });
        }

        Ok(Self::canned_quote(symbol))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_serves_consistent_quotes() {
        let source = MockQuoteSource::new("mock");
        let quote = source.fetch_quote("AAPL").await.unwrap();
        assert_eq!(quote.symbol, "AAPL");
        assert!(quote.is_consistent());
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_forced_error() {
        let source = MockQuoteSource::new("mock");
        source.set_error("simulated outage");

        let err = source.fetch_quote("AAPL").await.unwrap_err();
        assert!(matches!(err, SourceError::Provider { .. }));

        source.clear_error();
        assert!(source.fetch_quote("AAPL").await.is_ok());
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_degenerate_symbol() {
        let source = MockQuoteSource::new("mock");
        source.mark_degenerate("ZZZZ");

        let err = source.fetch_quote("ZZZZ").await.unwrap_err();
        assert!(matches!(err, SourceError::Degenerate { .. }));
        assert!(source.fetch_quote("AAPL").await.is_ok());
    }
}
