//! Deterministic fallback quote synthesis.
//!
//! When no live source is available (or it fails), quotes are derived from
//! the symbol itself: a rolling string hash fixes a base price and a
//! volatility band, a slow sine of wall-clock time adds drift within the
//! band, and a small random perturbation adds tick-to-tick texture. The
//! same symbol therefore lands in the same price band across restarts,
//! and repeated calls within a short window move only slightly.

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;

use crate::types::{d, Quote};

/// Rolling 31× hash over the symbol's bytes.
fn symbol_seed(symbol: &str) -> u32 {
    symbol
        .bytes()
        .fold(0u32, |hash, b| hash.wrapping_mul(31).wrapping_add(b as u32))
}

/// Stable base price for a symbol: 50–1049 dollars.
pub fn base_price(symbol: &str) -> f64 {
    50.0 + (symbol_seed(symbol) % 1000) as f64
}

/// Stable volatility band for a symbol: 0.01–1.00 dollars.
pub fn volatility(symbol: &str) -> f64 {
    ((symbol_seed(symbol) % 100) + 1) as f64 / 100.0
}

/// Build a fully-populated mock quote for `symbol` at time `now`.
///
/// The previous close is pinned to the base price, so change and percent
/// change follow directly from the synthesized current price. All price
/// fields are rounded to 2 decimal places before the change fields are
/// derived, keeping the quote internally consistent at wire precision.
pub fn synthesize(symbol: &str, now: DateTime<Utc>, rng: &mut impl Rng) -> Quote {
    let base = base_price(symbol);
    let vol = volatility(symbol);

    let oscillation = (now.timestamp_millis() as f64 / 100_000.0).sin() * vol;
    let perturbation = (rng.gen::<f64>() - 0.5) * vol * 2.0;

    let current_f = base + oscillation + perturbation;
    let open_f = base + (rng.gen::<f64>() - 0.5) * vol;
    let high_f = current_f.max(open_f) + rng.gen::<f64>() * vol;
    let low_f = current_f.min(open_f) - rng.gen::<f64>() * vol;

    let current_price = d(current_f).round_dp(2);
    let previous_close = d(base).round_dp(2);
    let change = current_price - previous_close;
    let change_percent = (change / previous_close * Decimal::ONE_HUNDRED).round_dp(2);

    Quote {
        symbol: symbol.to_string(),
        current_price,
        change,
        change_percent,
        previous_close,
        open: d(open_f).round_dp(2),
        high: d(high_f).round_dp(2),
        low: d(low_f).round_dp(2),
        volume: rng.gen_range(0..10_000_000),
        timestamp: now,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
