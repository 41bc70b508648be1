//! Sentiment simulation engine.
//!
//! Maintains a bounded per-ticker history of sentiment labels and advances
//! it one step per update using a momentum-biased transition rule: labels
//! tend to persist, sustained runs mean-revert toward neutral, and anything
//! else is a uniform random walk. Confidence reflects how consistent the
//! recent signal has been, and each update emits a small batch of synthetic
//! posts matching the new label. `update` never fails.

pub mod templates;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;
use uuid::Uuid;

use crate::types::{Post, SentimentLabel, SentimentUpdate, Source};
use crate::universe::Sector;

/// Chance that a label run reverts to neutral rather than flipping.
const REVERSAL_TO_NEUTRAL: f64 = 0.7;

/// How many recent labels the trend and confidence rules look at.
const RECENT_WINDOW: usize = 5;

/// Confidence returned for tickers with too little history to judge.
const COLD_START_CONFIDENCE: std::ops::RangeInclusive<u8> = 60..=80;

// ---------------------------------------------------------------------------
// Transition and confidence rules
// ---------------------------------------------------------------------------

/// Draw the next label for a history.
///
/// Empty history draws from a neutral-skewed distribution (40/30/30).
/// Otherwise the last label repeats with probability `persistence`;
/// failing that, a run of 3+ positives (or negatives) in the last five
/// biases strongly toward reversion, and anything else is uniform.
fn next_label(history: &[SentimentLabel], persistence: f64, rng: &mut impl Rng) -> SentimentLabel {
    if history.is_empty() {
        let roll: f64 = rng.gen();
        return if roll < 0.4 {
            SentimentLabel::Neutral
        } else if roll < 0.7 {
            SentimentLabel::Positive
        } else {
            SentimentLabel::Negative
        };
    }

    let last = history[history.len() - 1];
    if rng.gen::<f64>() < persistence {
        return last;
    }

    let window = &history[history.len().saturating_sub(RECENT_WINDOW)..];
    let positives = window.iter().filter(|l| **l == SentimentLabel::Positive).count();
    let negatives = window.iter().filter(|l| **l == SentimentLabel::Negative).count();

    if positives >= 3 {
        return if rng.gen::<f64>() < REVERSAL_TO_NEUTRAL {
            SentimentLabel::Neutral
        } else {
            SentimentLabel::Negative
        };
    }
    if negatives >= 3 {
        return if rng.gen::<f64>() < REVERSAL_TO_NEUTRAL {
            SentimentLabel::Neutral
        } else {
            SentimentLabel::Positive
        };
    }

    SentimentLabel::ALL[rng.gen_range(0..SentimentLabel::ALL.len())]
}

/// Confidence for a freshly appended label, from the post-append history.
///
/// Short histories get a flat cold-start band; otherwise confidence maps
/// the fraction of the recent window matching the new label into 50–90,
/// plus a ±5 jitter, clamped to [50, 95].
fn confidence(history: &[SentimentLabel], label: SentimentLabel, rng: &mut impl Rng) -> u8 {
    if history.len() < 3 {
        return rng.gen_range(COLD_START_CONFIDENCE);
    }

    let window = &history[history.len().saturating_sub(RECENT_WINDOW)..];
    let matching = window.iter().filter(|l| **l == label).count();
    let consistency = matching as f64 / window.len() as f64;

    let base = 50.0 + consistency * 40.0;
    let jitter = (rng.gen::<f64>() - 0.5) * 10.0;
    ((base + jitter).floor()).clamp(50.0, 95.0) as u8
}

/// Majority label and dominance-based confidence over a recent window.
/// Used for the "where does this ticker stand overall" view; strict
/// majorities only, anything contested reads as neutral.
fn overall_of(history: &[SentimentLabel]) -> (SentimentLabel, u8) {
    if history.is_empty() {
        return (SentimentLabel::Neutral, 60);
    }

    let window = &history[history.len().saturating_sub(RECENT_WINDOW)..];
    let count = |target| window.iter().filter(|l| **l == target).count();
    let positives = count(SentimentLabel::Positive);
    let negatives = count(SentimentLabel::Negative);
    let neutrals = count(SentimentLabel::Neutral);

    let label = if positives > negatives && positives > neutrals {
        SentimentLabel::Positive
    } else if negatives > positives && negatives > neutrals {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    };

    let dominance = positives.max(negatives).max(neutrals) as f64 / window.len() as f64;
    (label, (50.0 + dominance * 40.0).floor() as u8)
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// One ticker's label history behind its own lock; same two-level locking
/// discipline as the quote cache, without await points.
type HistorySlot = Arc<Mutex<Vec<SentimentLabel>>>;

/// Per-ticker sentiment simulation with bounded history.
pub struct SentimentEngine {
    cap: usize,
    persistence: f64,
    histories: Mutex<HashMap<String, HistorySlot>>,
    rng: Mutex<StdRng>,
}

impl SentimentEngine {
    /// Create an engine. `cap` must be at least 1 and `persistence` in
    /// [0, 1] — both are enforced by config validation before this is
    /// reached, and asserted here so a bad caller fails at startup.
    pub fn new(cap: usize, persistence: f64) -> Self {
        Self::with_rng(cap, persistence, StdRng::from_entropy())
    }

    /// Create an engine with a fixed RNG seed (reproducible sequences).
    pub fn with_seed(cap: usize, persistence: f64, seed: u64) -> Self {
        Self::with_rng(cap, persistence, StdRng::seed_from_u64(seed))
    }

    fn with_rng(cap: usize, persistence: f64, rng: StdRng) -> Self {
        assert!(cap >= 1, "history cap must be at least 1");
        assert!((0.0..=1.0).contains(&persistence), "persistence must be in [0, 1]");
        Self {
            cap,
            persistence,
            histories: Mutex::new(HashMap::new()),
            rng: Mutex::new(rng),
        }
    }

    /// Advance `ticker`'s simulation one step and emit posts for it.
    pub fn update(&self, ticker: &str, company: &str, sector: Sector) -> SentimentUpdate {
        let slot = self.history_slot(ticker);
        let mut history = slot.lock().expect("sentiment history poisoned");
        let mut rng = self.rng.lock().expect("sentiment rng poisoned");

        let label = next_label(&history, self.persistence, &mut *rng);
        history.push(label);
        while history.len() > self.cap {
            history.remove(0);
        }

        let confidence = confidence(&history, label, &mut *rng);
        let posts = make_posts(ticker, company, sector, label, confidence, &mut *rng);

        debug!(ticker, %label, confidence, posts = posts.len(), "Sentiment advanced");

        SentimentUpdate {
            ticker: ticker.to_string(),
            sentiment: label,
            confidence,
            posts,
        }
    }

    /// Majority sentiment for a ticker over its recent history.
    /// Unseen tickers read as neutral at baseline confidence.
    pub fn overall(&self, ticker: &str) -> (SentimentLabel, u8) {
        match self.existing_slot(ticker) {
            Some(slot) => {
                let history = slot.lock().expect("sentiment history poisoned");
                overall_of(&history)
            }
            None => (SentimentLabel::Neutral, 60),
        }
    }

    /// Current history length for a ticker (0 if unseen).
    pub fn history_len(&self, ticker: &str) -> usize {
        match self.existing_slot(ticker) {
            Some(slot) => slot.lock().expect("sentiment history poisoned").len(),
            None => 0,
        }
    }

    fn history_slot(&self, ticker: &str) -> HistorySlot {
        let mut histories = self.histories.lock().expect("history index poisoned");
        histories
            .entry(ticker.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Vec::new())))
            .clone()
    }

    fn existing_slot(&self, ticker: &str) -> Option<HistorySlot> {
        self.histories
            .lock()
            .expect("history index poisoned")
            .get(ticker)
            .cloned()
    }
}

/// Emit 1–3 posts consistent with the new label.
fn make_posts(
    ticker: &str,
    company: &str,
    sector: Sector,
    label: SentimentLabel,
    update_confidence: u8,
    rng: &mut impl Rng,
) -> Vec<Post> {
    let count = rng.gen_range(1..=3);
    let now = Utc::now();

    (0..count)
        .map(|_| {
            let pool = templates::pool(label);
            let content = pool[rng.gen_range(0..pool.len())];
            let author = templates::AUTHORS[rng.gen_range(0..templates::AUTHORS.len())];
            let source = Source::ALL[rng.gen_range(0..Source::ALL.len())];

            let jittered = update_confidence as f64 + (rng.gen::<f64>() - 0.5) * 10.0;
            let post_confidence = jittered.floor().clamp(50.0, 95.0) as u8;

            Post {
                id: format!("{ticker}-{}", Uuid::new_v4()),
                ticker: ticker.to_string(),
                company: company.to_string(),
                content: format!("${ticker} {content}"),
                sentiment: label,
                confidence: post_confidence,
                source,
                // Posts arrive asynchronously: stamp within the last 5 minutes.
                timestamp: now - chrono::Duration::seconds(rng.gen_range(0..300)),
                author: format!("{author}{}", rng.gen_range(0..1000)),
                engagement: rng.gen_range(10..510),
                sector,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
