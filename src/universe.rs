//! The fixed company universe the dashboard tracks.
//!
//! Thirty large-cap tickers across six sectors, compiled into the binary.
//! Sectors are a closed enumeration so an unknown category is a parse
//! error, never a silently missing map entry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Industry sector, used to group companies into dashboard cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sector {
    Technology,
    Finance,
    Healthcare,
    Energy,
    Retail,
    Aerospace,
}

impl Sector {
    /// All known sectors, in display order.
    pub const ALL: &'static [Sector] = &[
        Sector::Technology,
        Sector::Finance,
        Sector::Healthcare,
        Sector::Energy,
        Sector::Retail,
        Sector::Aerospace,
    ];

    /// Human-readable label for the UI.
    pub fn label(&self) -> &'static str {
        match self {
            Sector::Technology => "Technology",
            Sector::Finance => "Finance",
            Sector::Healthcare => "Healthcare",
            Sector::Energy => "Energy",
            Sector::Retail => "Retail",
            Sector::Aerospace => "Aerospace",
        }
    }

    /// Display icon shown on the sector card.
    pub fn icon(&self) -> &'static str {
        match self {
            Sector::Technology => "💻",
            Sector::Finance => "🏦",
            Sector::Healthcare => "🏥",
            Sector::Energy => "⚡",
            Sector::Retail => "🛍️",
            Sector::Aerospace => "✈️",
        }
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sector::Technology => write!(f, "technology"),
            Sector::Finance => write!(f, "finance"),
            Sector::Healthcare => write!(f, "healthcare"),
            Sector::Energy => write!(f, "energy"),
            Sector::Retail => write!(f, "retail"),
            Sector::Aerospace => write!(f, "aerospace"),
        }
    }
}

impl std::str::FromStr for Sector {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "technology" | "tech" => Ok(Sector::Technology),
            "finance" | "financials" => Ok(Sector::Finance),
            "healthcare" | "health" => Ok(Sector::Healthcare),
            "energy" => Ok(Sector::Energy),
            "retail" => Ok(Sector::Retail),
            "aerospace" | "defense" => Ok(Sector::Aerospace),
            _ => Err(anyhow::anyhow!("Unknown sector: {s}")),
        }
    }
}

/// One tracked company.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompanyInfo {
    pub ticker: &'static str,
    pub company: &'static str,
    pub sector: Sector,
}

/// The tracked universe: five constituents per sector.
pub const UNIVERSE: &[CompanyInfo] = &[
    // Technology
    CompanyInfo { ticker: "AAPL", company: "Apple Inc.", sector: Sector::Technology },
    CompanyInfo { ticker: "GOOGL", company: "Alphabet Inc.", sector: Sector::Technology },
    CompanyInfo { ticker: "MSFT", company: "Microsoft Corp.", sector: Sector::Technology },
    CompanyInfo { ticker: "NVDA", company: "NVIDIA Corp.", sector: Sector::Technology },
    CompanyInfo { ticker: "TSLA", company: "Tesla Inc.", sector: Sector::Technology },
    // Finance
    CompanyInfo { ticker: "JPM", company: "JPMorgan Chase & Co.", sector: Sector::Finance },
    CompanyInfo { ticker: "BAC", company: "Bank of America Corp.", sector: Sector::Finance },
    CompanyInfo { ticker: "GS", company: "Goldman Sachs Group Inc.", sector: Sector::Finance },
    CompanyInfo { ticker: "WFC", company: "Wells Fargo & Co.", sector: Sector::Finance },
    CompanyInfo { ticker: "MS", company: "Morgan Stanley", sector: Sector::Finance },
    // Healthcare
    CompanyInfo { ticker: "JNJ", company: "Johnson & Johnson", sector: Sector::Healthcare },
    CompanyInfo { ticker: "PFE", company: "Pfizer Inc.", sector: Sector::Healthcare },
    CompanyInfo { ticker: "UNH", company: "UnitedHealth Group Inc.", sector: Sector::Healthcare },
    CompanyInfo { ticker: "ABT", company: "Abbott Laboratories", sector: Sector::Healthcare },
    CompanyInfo { ticker: "MRK", company: "Merck & Co. Inc.", sector: Sector::Healthcare },
    // Energy
    CompanyInfo { ticker: "XOM", company: "Exxon Mobil Corp.", sector: Sector::Energy },
    CompanyInfo { ticker: "CVX", company: "Chevron Corp.", sector: Sector::Energy },
    CompanyInfo { ticker: "COP", company: "ConocoPhillips", sector: Sector::Energy },
    CompanyInfo { ticker: "SLB", company: "Schlumberger NV", sector: Sector::Energy },
    CompanyInfo { ticker: "EOG", company: "EOG Resources Inc.", sector: Sector::Energy },
    // Retail
    CompanyInfo { ticker: "AMZN", company: "Amazon.com Inc.", sector: Sector::Retail },
    CompanyInfo { ticker: "WMT", company: "Walmart Inc.", sector: Sector::Retail },
    CompanyInfo { ticker: "HD", company: "Home Depot Inc.", sector: Sector::Retail },
    CompanyInfo { ticker: "COST", company: "Costco Wholesale Corp.", sector: Sector::Retail },
    CompanyInfo { ticker: "TGT", company: "Target Corp.", sector: Sector::Retail },
    // Aerospace
    CompanyInfo { ticker: "BA", company: "Boeing Co.", sector: Sector::Aerospace },
    CompanyInfo { ticker: "LMT", company: "Lockheed Martin Corp.", sector: Sector::Aerospace },
    CompanyInfo { ticker: "RTX", company: "Raytheon Technologies", sector: Sector::Aerospace },
    CompanyInfo { ticker: "NOC", company: "Northrop Grumman Corp.", sector: Sector::Aerospace },
    CompanyInfo { ticker: "GD", company: "General Dynamics Corp.", sector: Sector::Aerospace },
];

/// Look up a universe constituent by ticker (case-insensitive).
pub fn find(ticker: &str) -> Option<&'static CompanyInfo> {
    UNIVERSE.iter().find(|c| c.ticker.eq_ignore_ascii_case(ticker))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_universe_five_per_sector() {
        for sector in Sector::ALL {
            let count = UNIVERSE.iter().filter(|c| c.sector == *sector).count();
            assert_eq!(count, 5, "sector {sector} should have 5 constituents");
        }
        assert_eq!(UNIVERSE.len(), 30);
    }

    #[test]
    fn test_universe_tickers_unique() {
        let mut tickers: Vec<_> = UNIVERSE.iter().map(|c| c.ticker).collect();
        tickers.sort_unstable();
        tickers.dedup();
        assert_eq!(tickers.len(), UNIVERSE.len());
    }

    #[test]
    fn test_find_case_insensitive() {
        assert_eq!(find("aapl").unwrap().company, "Apple Inc.");
        assert_eq!(find("AAPL").unwrap().sector, Sector::Technology);
        assert!(find("ZZZZ").is_none());
    }

    #[test]
    fn test_sector_display_and_from_str() {
        for sector in Sector::ALL {
            let parsed: Sector = sector.to_string().parse().unwrap();
            assert_eq!(parsed, *sector);
        }
        assert_eq!("tech".parse::<Sector>().unwrap(), Sector::Technology);
        assert_eq!("defense".parse::<Sector>().unwrap(), Sector::Aerospace);
        assert!("crypto".parse::<Sector>().is_err());
    }

    #[test]
    fn test_sector_serialization() {
        assert_eq!(serde_json::to_string(&Sector::Healthcare).unwrap(), "\"healthcare\"");
        let parsed: Sector = serde_json::from_str("\"energy\"").unwrap();
        assert_eq!(parsed, Sector::Energy);
    }

    #[test]
    fn test_sector_labels_and_icons() {
        assert_eq!(Sector::Technology.label(), "Technology");
        assert_eq!(Sector::Finance.icon(), "🏦");
        for sector in Sector::ALL {
            assert!(!sector.icon().is_empty());
            assert!(!sector.label().is_empty());
        }
    }
}
