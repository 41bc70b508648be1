//! Dashboard API route handlers and shared state.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use crate::sentiment::SentimentEngine;
use crate::types::{
    CompanySnapshot, FeedSnapshot, Post, SentimentLabel, Source,
};
use crate::universe;

/// Shared dashboard state: the latest snapshot plus the sentiment engine
/// (for per-ticker overall views).
pub struct DashboardState {
    snapshot: RwLock<Option<FeedSnapshot>>,
    sentiment: Arc<SentimentEngine>,
    /// A snapshot older than this reads as stale on `/api/feed`.
    stale_after: chrono::Duration,
}

pub type AppState = Arc<DashboardState>;

impl DashboardState {
    pub fn new(sentiment: Arc<SentimentEngine>, stale_after: chrono::Duration) -> Self {
        Self {
            snapshot: RwLock::new(None),
            sentiment,
            stale_after,
        }
    }

    /// Replace the published snapshot with a fresh one.
    pub fn publish(&self, snapshot: FeedSnapshot) {
        *self.snapshot.write().expect("snapshot lock poisoned") = Some(snapshot);
    }

    /// Clone of the latest snapshot, if any cycle has completed.
    pub fn latest(&self) -> Option<FeedSnapshot> {
        self.snapshot.read().expect("snapshot lock poisoned").clone()
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct FeedResponse {
    /// True when the poller has missed several cycles; the UI shows a
    /// stale-data indicator rather than blanking the screen.
    stale: bool,
    feed: FeedSnapshot,
}

#[derive(Debug, Serialize)]
struct PostsResponse {
    posts: Vec<Post>,
    total: usize,
    limit: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OverallSentiment {
    sentiment: SentimentLabel,
    confidence: u8,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompanyDetail {
    ticker: String,
    company: String,
    sector: crate::universe::Sector,
    snapshot: Option<CompanySnapshot>,
    overall: OverallSentiment,
    posts: Vec<Post>,
}

#[derive(Debug, Serialize)]
struct ApiError {
    error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ApiError { error: message.into() })).into_response()
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /health`
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// `GET /api/feed` — the latest snapshot with a staleness flag.
pub async fn get_feed(State(state): State<AppState>) -> Response {
    match state.latest() {
        Some(feed) => {
            let stale = feed.is_stale(state.stale_after);
            Json(FeedResponse { stale, feed }).into_response()
        }
        None => error_response(StatusCode::SERVICE_UNAVAILABLE, "no feed data yet"),
    }
}

/// Query parameters for `GET /api/posts`. Multi-value filters are
/// comma-separated lists; unknown values are a 400, not a silent no-op.
#[derive(Debug, Default, Deserialize)]
pub struct PostsQuery {
    sentiments: Option<String>,
    sources: Option<String>,
    tickers: Option<String>,
    search: Option<String>,
    limit: Option<usize>,
}

/// Maximum posts returned in one page.
const MAX_POSTS_LIMIT: usize = 500;
const DEFAULT_POSTS_LIMIT: usize = 100;

/// `GET /api/posts`
pub async fn get_posts(
    State(state): State<AppState>,
    Query(query): Query<PostsQuery>,
) -> Response {
    let Some(feed) = state.latest() else {
        return error_response(StatusCode::SERVICE_UNAVAILABLE, "no feed data yet");
    };

    let sentiments = match parse_csv::<SentimentLabel>(query.sentiments.as_deref()) {
        Ok(v) => v,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
    };
    let sources = match parse_csv::<Source>(query.sources.as_deref()) {
        Ok(v) => v,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
    };
    let tickers: Vec<String> = csv_tokens(query.tickers.as_deref())
        .map(|t| t.to_uppercase())
        .collect();
    let search = query.search.as_deref().unwrap_or("").to_lowercase();
    let limit = query.limit.unwrap_or(DEFAULT_POSTS_LIMIT).min(MAX_POSTS_LIMIT);

    let matching: Vec<&Post> = feed
        .posts
        .iter()
        .filter(|p| sentiments.is_empty() || sentiments.contains(&p.sentiment))
        .filter(|p| sources.is_empty() || sources.contains(&p.source))
        .filter(|p| tickers.is_empty() || tickers.iter().any(|t| t == &p.ticker))
        .filter(|p| search.is_empty() || p.content.to_lowercase().contains(&search))
        .collect();

    let total = matching.len();
    let posts: Vec<Post> = matching.into_iter().take(limit).cloned().collect();

    Json(PostsResponse { posts, total, limit }).into_response()
}

/// `GET /api/sectors`
pub async fn get_sectors(State(state): State<AppState>) -> Response {
    match state.latest() {
        Some(feed) => Json(feed.sectors).into_response(),
        None => error_response(StatusCode::SERVICE_UNAVAILABLE, "no feed data yet"),
    }
}

/// `GET /api/company/{ticker}`
pub async fn get_company(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Response {
    let Some(info) = universe::find(&ticker) else {
        return error_response(StatusCode::NOT_FOUND, format!("unknown ticker: {ticker}"));
    };

    let feed = state.latest();
    let snapshot = feed.as_ref().and_then(|f| {
        f.companies.iter().find(|c| c.ticker == info.ticker).cloned()
    });
    let posts: Vec<Post> = feed
        .as_ref()
        .map(|f| {
            f.posts
                .iter()
                .filter(|p| p.ticker == info.ticker)
                .cloned()
                .collect()
        })
        .unwrap_or_default();

    let (sentiment, confidence) = state.sentiment.overall(info.ticker);

    Json(CompanyDetail {
        ticker: info.ticker.to_string(),
        company: info.company.to_string(),
        sector: info.sector,
        snapshot,
        overall: OverallSentiment { sentiment, confidence },
        posts,
    })
    .into_response()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn csv_tokens(raw: Option<&str>) -> impl Iterator<Item = &str> {
    raw.unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Parse a comma-separated filter list into typed values.
fn parse_csv<T>(raw: Option<&str>) -> Result<Vec<T>, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    csv_tokens(raw)
        .map(|token| token.parse::<T>().map_err(|e| e.to_string()))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_valid() {
        let labels = parse_csv::<SentimentLabel>(Some("positive, negative")).unwrap();
        assert_eq!(labels, vec![SentimentLabel::Positive, SentimentLabel::Negative]);
    }

    #[test]
    fn test_parse_csv_empty_and_none() {
        assert!(parse_csv::<Source>(None).unwrap().is_empty());
        assert!(parse_csv::<Source>(Some("")).unwrap().is_empty());
        assert!(parse_csv::<Source>(Some(" , ,")).unwrap().is_empty());
    }

    #[test]
    fn test_parse_csv_invalid_token() {
        assert!(parse_csv::<SentimentLabel>(Some("positive,wild")).is_err());
    }

    #[test]
    fn test_csv_tokens_trims() {
        let tokens: Vec<_> = csv_tokens(Some(" aapl , msft ")).collect();
        assert_eq!(tokens, vec!["aapl", "msft"]);
    }
}
