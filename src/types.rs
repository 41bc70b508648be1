//! Shared types for the MARKETPULSE feed engine.
//!
//! These types form the data model used across all modules.
//! They are designed to be stable so that the quote, sentiment,
//! and feed modules can depend on them without circular references.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::universe::Sector;

/// Convert an `f64` into a `Decimal`, tolerating the full float range.
pub fn d(x: f64) -> Decimal {
    Decimal::from_f64_retain(x).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Quote
// ---------------------------------------------------------------------------

/// A point-in-time stock quote, either fetched live or synthesized.
///
/// All monetary fields are rounded to 2 decimal places, so
/// `change == current_price - previous_close` holds exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub current_price: Decimal,
    pub change: Decimal,
    pub change_percent: Decimal,
    pub previous_close: Decimal,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub volume: u64,
    /// When this quote was captured into the cache.
    pub timestamp: DateTime<Utc>,
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.change >= Decimal::ZERO { "+" } else { "" };
        write!(
            f,
            "{} ${} ({sign}{} / {sign}{}%)",
            self.symbol, self.current_price, self.change, self.change_percent,
        )
    }
}

impl Quote {
    /// Whether the price fields satisfy the change/percent relationship.
    pub fn is_consistent(&self) -> bool {
        if self.previous_close <= Decimal::ZERO {
            return false;
        }
        let expected_change = self.current_price - self.previous_close;
        let expected_pct =
            (expected_change / self.previous_close * Decimal::ONE_HUNDRED).round_dp(2);
        self.change == expected_change && self.change_percent == expected_pct
    }

    /// Age of this quote relative to now.
    pub fn age(&self) -> chrono::Duration {
        Utc::now() - self.timestamp
    }

    /// Helper to build a consistent test quote.
    #[cfg(test)]
    pub fn sample(symbol: &str) -> Self {
        use rust_decimal_macros::dec;
        Quote {
            symbol: symbol.to_string(),
            current_price: dec!(102.50),
            change: dec!(2.50),
            change_percent: dec!(2.50),
            previous_close: dec!(100.00),
            open: dec!(100.75),
            high: dec!(103.10),
            low: dec!(99.80),
            volume: 1_250_000,
            timestamp: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Sentiment
// ---------------------------------------------------------------------------

/// Sentiment classification of a post or a ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    /// All labels (useful for iteration).
    pub const ALL: &'static [SentimentLabel] = &[
        SentimentLabel::Positive,
        SentimentLabel::Neutral,
        SentimentLabel::Negative,
    ];
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentimentLabel::Positive => write!(f, "positive"),
            SentimentLabel::Neutral => write!(f, "neutral"),
            SentimentLabel::Negative => write!(f, "negative"),
        }
    }
}

impl std::str::FromStr for SentimentLabel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "positive" | "bullish" => Ok(SentimentLabel::Positive),
            "neutral" => Ok(SentimentLabel::Neutral),
            "negative" | "bearish" => Ok(SentimentLabel::Negative),
            _ => Err(anyhow::anyhow!("Unknown sentiment label: {s}")),
        }
    }
}

/// Where a synthetic post claims to come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Twitter,
    Reddit,
    Stocktwits,
    News,
}

impl Source {
    pub const ALL: &'static [Source] =
        &[Source::Twitter, Source::Reddit, Source::Stocktwits, Source::News];

    /// Human-readable label for the UI.
    pub fn label(&self) -> &'static str {
        match self {
            Source::Twitter => "Twitter",
            Source::Reddit => "Reddit",
            Source::Stocktwits => "StockTwits",
            Source::News => "News",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Twitter => write!(f, "twitter"),
            Source::Reddit => write!(f, "reddit"),
            Source::Stocktwits => write!(f, "stocktwits"),
            Source::News => write!(f, "news"),
        }
    }
}

impl std::str::FromStr for Source {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "twitter" => Ok(Source::Twitter),
            "reddit" => Ok(Source::Reddit),
            "stocktwits" => Ok(Source::Stocktwits),
            "news" => Ok(Source::News),
            _ => Err(anyhow::anyhow!("Unknown post source: {s}")),
        }
    }
}

/// A synthetic social-media/news post emitted alongside a sentiment update.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Unique per emission: `{ticker}-{uuid}`.
    pub id: String,
    pub ticker: String,
    pub company: String,
    pub content: String,
    pub sentiment: SentimentLabel,
    /// Integer percentage in 50–95.
    pub confidence: u8,
    pub source: Source,
    pub timestamp: DateTime<Utc>,
    pub author: String,
    pub engagement: u32,
    pub sector: Sector,
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] @{} ({}, {}%): {}",
            self.source, self.author, self.sentiment, self.confidence, self.content,
        )
    }
}

/// The result of advancing a ticker's sentiment simulation by one step.
///
/// Ephemeral: produced fresh on each call and handed to the caller; the
/// engine retains only the label history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentUpdate {
    pub ticker: String,
    pub sentiment: SentimentLabel,
    /// Integer percentage in 50–95.
    pub confidence: u8,
    pub posts: Vec<Post>,
}

impl fmt::Display for SentimentUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} → {} ({}%, {} posts)",
            self.ticker,
            self.sentiment,
            self.confidence,
            self.posts.len(),
        )
    }
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

/// Integer-percentage sentiment distribution.
///
/// Each share is rounded independently, so the three values may sum to
/// 100 ± 1. Consumers treat them as display figures, not exact weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentBreakdown {
    pub positive: u8,
    pub neutral: u8,
    pub negative: u8,
}

impl SentimentBreakdown {
    /// Compute a breakdown from raw label counts.
    pub fn from_counts(positive: usize, neutral: usize, negative: usize) -> Self {
        let total = (positive + neutral + negative).max(1) as f64;
        let pct = |n: usize| ((n as f64 / total) * 100.0).round() as u8;
        SentimentBreakdown {
            positive: pct(positive),
            neutral: pct(neutral),
            negative: pct(negative),
        }
    }

    /// The label that dominates this distribution.
    ///
    /// Ties favor positive first, then negative: positive wins whenever it
    /// is at least as large as both others; otherwise negative wins whenever
    /// it is at least as large as neutral. Comparisons are on the rounded
    /// percentage figures.
    pub fn dominant(&self) -> SentimentLabel {
        if self.positive >= self.neutral && self.positive >= self.negative {
            SentimentLabel::Positive
        } else if self.negative >= self.neutral {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

impl fmt::Display for SentimentBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "+{}% ={}% -{}%",
            self.positive, self.neutral, self.negative,
        )
    }
}

/// Per-company record merged from a quote and a sentiment update.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySnapshot {
    pub ticker: String,
    pub company: String,
    pub sector: Sector,
    pub sentiment: SentimentLabel,
    pub confidence: u8,
    pub price: Decimal,
    /// Day change as a percentage (what the dashboard shows next to price).
    #[serde(rename = "change")]
    pub change_percent: Decimal,
}

/// Per-sector aggregate, recomputed wholesale on every refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorSummary {
    pub sector: Sector,
    pub label: String,
    pub icon: String,
    pub sentiment: SentimentBreakdown,
    pub dominant: SentimentLabel,
    pub companies: Vec<CompanySnapshot>,
}

/// One full refresh cycle's output: everything the dashboard renders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedSnapshot {
    pub companies: Vec<CompanySnapshot>,
    pub sectors: Vec<SectorSummary>,
    /// All posts from this cycle, newest first.
    pub posts: Vec<Post>,
    /// Market-wide distribution across all companies.
    pub overall: SentimentBreakdown,
    pub generated_at: DateTime<Utc>,
}

impl FeedSnapshot {
    /// Whether this snapshot is older than the given duration.
    pub fn is_stale(&self, max_age: chrono::Duration) -> bool {
        Utc::now() - self.generated_at > max_age
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Failures of the optional live quote source. All variants are recovered
/// internally by fallback synthesis; none reach the feed consumer.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("no live quote source configured")]
    Disabled,

    #[error("quote source error ({provider}): {message}")]
    Provider { provider: String, message: String },

    #[error("degenerate quote for {symbol}: zero price, treating as unknown symbol")]
    Degenerate { symbol: String },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
