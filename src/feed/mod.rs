//! Feed aggregation — one refresh cycle over the whole universe.
//!
//! For every tracked company the aggregator merges a cached quote with a
//! sentiment update into a company snapshot, groups snapshots into sector
//! summaries, and flattens all emitted posts into a single newest-first
//! list. Summaries are recomputed wholesale each cycle; a refresh is
//! best-effort eventually consistent, never transactional.

use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;
use tracing::info;

use crate::quotes::QuoteCache;
use crate::sentiment::SentimentEngine;
use crate::types::{CompanySnapshot, FeedSnapshot, Post, SectorSummary, SentimentBreakdown};
use crate::universe::{CompanyInfo, Sector, UNIVERSE};

/// Count labels across company snapshots into an integer-percentage
/// breakdown. Each share rounds independently; the three figures may sum
/// to 100 ± 1 and are published as-is.
fn breakdown_of(companies: &[CompanySnapshot]) -> SentimentBreakdown {
    use crate::types::SentimentLabel::*;
    let count = |target| companies.iter().filter(|c| c.sentiment == target).count();
    SentimentBreakdown::from_counts(count(Positive), count(Neutral), count(Negative))
}

/// Drives the two engines across the company universe.
pub struct Aggregator {
    quotes: Arc<QuoteCache>,
    sentiment: Arc<SentimentEngine>,
    universe: Vec<CompanyInfo>,
}

impl Aggregator {
    /// Aggregator over the built-in company universe.
    pub fn new(quotes: Arc<QuoteCache>, sentiment: Arc<SentimentEngine>) -> Self {
        Self::with_universe(quotes, sentiment, UNIVERSE.to_vec())
    }

    /// Aggregator over a custom universe (tests, trimmed-down deployments).
    pub fn with_universe(
        quotes: Arc<QuoteCache>,
        sentiment: Arc<SentimentEngine>,
        universe: Vec<CompanyInfo>,
    ) -> Self {
        Self { quotes, sentiment, universe }
    }

    /// Run one full refresh cycle and build the dashboard snapshot.
    ///
    /// Companies refresh concurrently; per-key locks inside the engines
    /// serialize same-key access.
    pub async fn refresh(&self) -> FeedSnapshot {
        let results = join_all(self.universe.iter().map(|info| self.company_record(info))).await;

        let mut companies = Vec::with_capacity(results.len());
        let mut posts: Vec<Post> = Vec::new();
        for (snapshot, company_posts) in results {
            companies.push(snapshot);
            posts.extend(company_posts);
        }

        let sectors: Vec<SectorSummary> = Sector::ALL
            .iter()
            .filter_map(|sector| {
                let members: Vec<CompanySnapshot> = companies
                    .iter()
                    .filter(|c| c.sector == *sector)
                    .cloned()
                    .collect();
                // Sectors with no constituents are omitted entirely.
                if members.is_empty() {
                    return None;
                }
                let sentiment = breakdown_of(&members);
                Some(SectorSummary {
                    sector: *sector,
                    label: sector.label().to_string(),
                    icon: sector.icon().to_string(),
                    sentiment,
                    dominant: sentiment.dominant(),
                    companies: members,
                })
            })
            .collect();

        posts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        let overall = breakdown_of(&companies);

        info!(
            companies = companies.len(),
            sectors = sectors.len(),
            posts = posts.len(),
            overall = %overall,
            "Feed refreshed"
        );

        FeedSnapshot {
            companies,
            sectors,
            posts,
            overall,
            generated_at: Utc::now(),
        }
    }

    async fn company_record(&self, info: &CompanyInfo) -> (CompanySnapshot, Vec<Post>) {
        let quote = self.quotes.get_quote(info.ticker).await;
        let update = self.sentiment.update(info.ticker, info.company, info.sector);

        let snapshot = CompanySnapshot {
            ticker: info.ticker.to_string(),
            company: info.company.to_string(),
            sector: info.sector,
            sentiment: update.sentiment,
            confidence: update.confidence,
            price: quote.current_price,
            change_percent: quote.change_percent,
        };
        (snapshot, update.posts)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
