//! Domain types shared by the client, the metrics engine and the store

use crate::error::{Result, StockError};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Tickers offered when nothing is stored for a user yet
pub const DEFAULT_WATCHLIST: [&str; 5] = ["AAPL", "MSFT", "GOOGL", "AMZN", "META"];

/// Well-known tickers listed next to the watchlist
pub const POPULAR_TICKERS: [&str; 15] = [
    "AAPL", "MSFT", "GOOGL", "AMZN", "META", "TSLA", "NVDA", "JPM", "DIS", "NFLX", "INTC", "AMD",
    "BA", "KO", "PEP",
];

/// Ticker used when preferences carry none
pub const FALLBACK_TICKER: &str = "AAPL";

static TICKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^[A-Z0-9^][A-Z0-9.\-=]{0,14}$").unwrap()
});

/// Trim and uppercase a ticker, rejecting anything that is not a symbol
pub fn normalize_ticker(input: &str) -> Result<String> {
    let ticker = input.trim().to_uppercase();
    if TICKER_RE.is_match(&ticker) {
        Ok(ticker)
    } else {
        Err(StockError::InvalidSymbol(input.trim().to_string()))
    }
}

/// One trading day of OHLCV data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Descriptive company metadata; every field may be missing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub symbol: String,
    pub name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub country: Option<String>,
    pub exchange: Option<String>,
    pub currency: Option<String>,
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    pub summary: Option<String>,
}

impl CompanyProfile {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Default::default()
        }
    }

    /// True when nothing beyond the symbol is known
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.sector.is_none()
            && self.industry.is_none()
            && self.country.is_none()
            && self.exchange.is_none()
            && self.currency.is_none()
            && self.market_cap.is_none()
            && self.pe_ratio.is_none()
            && self.dividend_yield.is_none()
            && self.fifty_two_week_high.is_none()
            && self.fifty_two_week_low.is_none()
            && self.summary.is_none()
    }
}

/// Look-back window selectable in the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1 Month")]
    OneMonth,
    #[serde(rename = "3 Months")]
    ThreeMonths,
    #[serde(rename = "6 Months")]
    SixMonths,
    #[default]
    #[serde(rename = "1 Year")]
    OneYear,
    #[serde(rename = "2 Years")]
    TwoYears,
    #[serde(rename = "5 Years")]
    FiveYears,
}

impl Period {
    pub const ALL: [Period; 6] = [
        Period::OneMonth,
        Period::ThreeMonths,
        Period::SixMonths,
        Period::OneYear,
        Period::TwoYears,
        Period::FiveYears,
    ];

    /// Calendar days covered by the period
    pub fn days(self) -> i64 {
        match self {
            Period::OneMonth => 30,
            Period::ThreeMonths => 90,
            Period::SixMonths => 180,
            Period::OneYear => 365,
            Period::TwoYears => 730,
            Period::FiveYears => 1825,
        }
    }

    /// Stored and displayed label
    pub fn label(self) -> &'static str {
        match self {
            Period::OneMonth => "1 Month",
            Period::ThreeMonths => "3 Months",
            Period::SixMonths => "6 Months",
            Period::OneYear => "1 Year",
            Period::TwoYears => "2 Years",
            Period::FiveYears => "5 Years",
        }
    }

    fn short_label(self) -> &'static str {
        match self {
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::FiveYears => "5y",
        }
    }

    /// `(start, end)` ending at `end`
    pub fn range_ending(self, end: NaiveDate) -> (NaiveDate, NaiveDate) {
        (end - Duration::days(self.days()), end)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Period {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        let compact: String = wanted.chars().filter(|c| !c.is_whitespace()).collect();
        Period::ALL
            .into_iter()
            .find(|p| {
                let label = p.label().to_lowercase();
                label == wanted
                    || label.replace(' ', "") == compact
                    || p.short_label() == compact
            })
            .ok_or_else(|| StockError::InvalidPeriod(s.trim().to_string()))
    }
}

/// Colour theme preference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(StockError::Config(format!("Unknown theme: {other}"))),
        }
    }
}

/// A ticker a user keeps an eye on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub user_id: String,
    pub ticker: String,
    pub added_at: DateTime<Utc>,
}

/// One entry of the append-only search log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHistoryRecord {
    pub user_id: String,
    pub ticker: String,
    pub searched_at: DateTime<Utc>,
}

/// Per-user dashboard preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    pub user_id: String,
    pub default_ticker: String,
    pub default_period: Period,
    pub theme: Theme,
    pub show_ma50: bool,
    pub show_ma200: bool,
    pub updated_at: DateTime<Utc>,
}

impl UserPreferences {
    /// Defaults for `user_id`
    pub fn defaults_for(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            default_ticker: FALLBACK_TICKER.to_string(),
            default_period: Period::default(),
            theme: Theme::default(),
            show_ma50: true,
            show_ma200: true,
            updated_at: Utc::now(),
        }
    }
}
