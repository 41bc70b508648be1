//! Content pools for synthetic post generation.
//!
//! One template pool per sentiment label plus a shared pool of author
//! handles. Templates read like real retail-investor chatter so the
//! dashboard feed looks plausible at a glance.

use crate::types::SentimentLabel;

pub const POSITIVE: &[&str] = &[
    "Strong earnings beat expectations! 🚀",
    "Bullish momentum building on recent news",
    "Great fundamentals, looking for a breakout",
    "Loving the direction this company is heading",
    "Solid Q4 results, expecting more upside",
    "Technical analysis shows strong support levels",
    "Market sentiment shifting positive on this one",
    "Institutional buying pressure increasing",
    "Revenue growth exceeding forecasts",
    "Innovation pipeline looking very promising",
];

pub const NEGATIVE: &[&str] = &[
    "Concerned about recent regulatory issues",
    "Earnings miss has me worried about Q1",
    "Technical indicators showing bearish divergence",
    "Competition heating up in this space",
    "Management guidance disappointing investors",
    "Market headwinds affecting sector outlook",
    "Valuation looking stretched at these levels",
    "Supply chain disruptions impacting margins",
    "Insider selling activity raising red flags",
    "Macro environment not favorable for growth",
];

pub const NEUTRAL: &[&str] = &[
    "Waiting for more clarity on earnings guidance",
    "Mixed signals from recent market data",
    "Holding position, watching key support levels",
    "Neutral stance until next earnings call",
    "Sideways action expected in near term",
    "Monitoring industry trends before position",
    "Fair value around current price levels",
    "Waiting for technical confirmation",
    "Range-bound trading likely to continue",
    "Market consensus aligns with my view",
];

pub const AUTHORS: &[&str] = &[
    "MarketMaven", "TechAnalyst", "ValueInvestor", "QuantTrader", "StockGuru",
    "FinanceExpert", "MarketWatcher", "TradingPro", "InvestmentBear", "BullRunner",
    "ChartMaster", "FundamentalsFan", "OptionsTrader", "DividendHunter", "GrowthSeeker",
];

/// The template pool for a given label.
pub fn pool(label: SentimentLabel) -> &'static [&'static str] {
    match label {
        SentimentLabel::Positive => POSITIVE,
        SentimentLabel::Neutral => NEUTRAL,
        SentimentLabel::Negative => NEGATIVE,
    }
}
