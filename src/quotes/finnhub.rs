//! Finnhub live quote source.
//!
//! Uses the `/quote` endpoint only — one symbol per call, current price
//! plus the day's OHLC and previous close. Volume is not part of the
//! basic quote payload and is reported as zero.
//!
//! API docs: https://finnhub.io/docs/api
//! Rate limit: 60 requests/minute on the free tier.
//! Auth: `token` query parameter.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::QuoteSource;
use crate::types::{d, Quote, SourceError};

const BASE_URL: &str = "https://finnhub.io/api/v1";
const PROVIDER_NAME: &str = "finnhub";

// ---------------------------------------------------------------------------
// API response types (Finnhub JSON → Rust)
// ---------------------------------------------------------------------------

/// Finnhub `/quote` response. Field names follow the API's single-letter
/// convention; unknown symbols come back as all zeros rather than an error.
#[derive(Debug, Default, Deserialize)]
struct FinnhubQuote {
    /// Current price
    c: Option<f64>,
    /// High price of the day
    h: Option<f64>,
    /// Low price of the day
    l: Option<f64>,
    /// Open price of the day
    o: Option<f64>,
    /// Previous close price
    pc: Option<f64>,
    // Note: d (change), dp (percent change), t (timestamp) exist but the
    // change fields are rederived from rounded prices instead.
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// Finnhub-backed `QuoteSource`.
pub struct FinnhubSource {
    http: Client,
    api_key: Secret<String>,
}

impl FinnhubSource {
    /// Create a new Finnhub source with a per-request timeout.
    pub fn new(api_key: String, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent("marketpulse/0.1")
            .build()?;
        Ok(Self { http, api_key: Secret::new(api_key) })
    }

    fn provider_error(message: impl Into<String>) -> SourceError {
        SourceError::Provider {
            provider: PROVIDER_NAME.to_string(),
            message: message.into(),
        }
    }
}

/// Map a raw Finnhub payload into a cache-ready quote.
///
/// A zero/negative current price or previous close is how Finnhub reports
/// an unknown symbol; callers treat that as a miss. The change fields are
/// recomputed from the 2-dp rounded prices so the quote is exactly
/// internally consistent.
fn map_quote(symbol: &str, raw: &FinnhubQuote) -> Result<Quote, SourceError> {
    let current_f = raw.c.unwrap_or_default();
    let previous_f = raw.pc.unwrap_or_default();
    if current_f <= 0.0 || previous_f <= 0.0 {
        return Err(SourceError::Degenerate { symbol: symbol.to_string() });
    }

    let current_price = d(current_f).round_dp(2);
    let previous_close = d(previous_f).round_dp(2);
    let change = current_price - previous_close;
    let change_percent = (change / previous_close * Decimal::ONE_HUNDRED).round_dp(2);

    Ok(Quote {
        symbol: symbol.to_uppercase(),
        current_price,
        change,
        change_percent,
        previous_close,
        open: d(raw.o.unwrap_or(current_f)).round_dp(2),
        high: d(raw.h.unwrap_or(current_f)).round_dp(2),
        low: d(raw.l.unwrap_or(current_f)).round_dp(2),
        volume: 0, // not provided by the basic quote endpoint
        timestamp: Utc::now(),
    })
}

#[async_trait]
impl QuoteSource for FinnhubSource {
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, SourceError> {
        let url = format!(
            "{BASE_URL}/quote?symbol={}&token={}",
            urlencoding::encode(symbol),
            self.api_key.expose_secret(),
        );

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Self::provider_error(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::provider_error(format!("HTTP {}", response.status())));
        }

        let raw: FinnhubQuote = response
            .json()
            .await
            .map_err(|e| Self::provider_error(format!("bad payload: {e}")))?;

        let quote = map_quote(symbol, &raw)?;
        debug!(symbol, price = %quote.current_price, "Finnhub quote fetched");
        Ok(quote)
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_map_quote_valid() {
        let raw: FinnhubQuote = serde_json::from_str(
            r#"{"c":189.8456,"h":191.10,"l":188.02,"o":188.50,"pc":187.33,"t":1716400000}"#,
        )
        .unwrap();
        let quote = map_quote("aapl", &raw).unwrap();

        assert_eq!(quote.symbol, "AAPL");
        assert_eq!(quote.current_price, dec!(189.85));
        assert_eq!(quote.previous_close, dec!(187.33));
        assert_eq!(quote.change, dec!(2.52));
        assert!(quote.is_consistent());
    }

    #[test]
    fn test_map_quote_zero_price_degenerate() {
        let raw: FinnhubQuote =
            serde_json::from_str(r#"{"c":0,"h":0,"l":0,"o":0,"pc":0}"#).unwrap();
        let err = map_quote("ZZZZ", &raw).unwrap_err();
        assert!(matches!(err, SourceError::Degenerate { .. }));
    }

    #[test]
    fn test_map_quote_missing_fields_degenerate() {
        let raw: FinnhubQuote = serde_json::from_str("{}").unwrap();
        assert!(map_quote("AAPL", &raw).is_err());
    }

    #[test]
    fn test_map_quote_missing_ohlc_defaults_to_current() {
        let raw: FinnhubQuote = serde_json::from_str(r#"{"c":50.0,"pc":49.0}"#).unwrap();
        let quote = map_quote("TGT", &raw).unwrap();
        assert_eq!(quote.open, dec!(50.00));
        assert_eq!(quote.high, dec!(50.00));
        assert_eq!(quote.low, dec!(50.00));
    }

    #[test]
    fn test_source_construction() {
        let source = FinnhubSource::new("test-key".to_string(), Duration::from_secs(5)).unwrap();
        assert_eq!(source.name(), "finnhub");
    }
}
