//! Market data access
//!
//! [`MarketDataProvider`] is the fallible seam to the external data source.
//! [`MarketDataClient`] wraps a provider and never fails: a provider error is
//! logged and surfaces as "no data" (an empty series or an absent profile).

pub mod yahoo;

use crate::error::Result;
use crate::models::{CompanyProfile, PriceBar};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use tracing::{debug, warn};

pub use yahoo::YahooFinanceClient;

/// Days looked back when checking that a ticker still trades
const RECENT_DATA_DAYS: i64 = 7;

/// Source of price history and company metadata
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Daily bars between `start` and `end`, both inclusive, oldest first
    async fn price_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>>;

    /// Descriptive metadata, `None` when the provider knows nothing
    async fn company_profile(&self, ticker: &str) -> Result<Option<CompanyProfile>>;
}

/// Degrading front of a [`MarketDataProvider`]
pub struct MarketDataClient<P> {
    provider: P,
}

impl<P: MarketDataProvider> MarketDataClient<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Price history for `ticker`; empty when unavailable for any reason
    pub async fn fetch_price_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<PriceBar> {
        if start > end {
            warn!(ticker, %start, %end, "Start date is after end date");
            return Vec::new();
        }

        match self.provider.price_history(ticker, start, end).await {
            Ok(bars) => {
                debug!(ticker, bars = bars.len(), "Fetched price history");
                bars
            }
            Err(e) => {
                warn!(ticker, error = %e, "Error fetching price history");
                Vec::new()
            }
        }
    }

    /// Company profile for `ticker`; `None` when unavailable or empty
    pub async fn fetch_company_profile(&self, ticker: &str) -> Option<CompanyProfile> {
        match self.provider.company_profile(ticker).await {
            Ok(profile) => profile.filter(|p| !p.is_empty()),
            Err(e) => {
                warn!(ticker, error = %e, "Error fetching company info");
                None
            }
        }
    }

    /// Whether `ticker` produced at least one bar in the week up to `today`
    pub async fn has_recent_data(&self, ticker: &str, today: NaiveDate) -> bool {
        let start = today - Duration::days(RECENT_DATA_DAYS);
        !self.fetch_price_history(ticker, start, today).await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StockError;

    fn bar(date: NaiveDate, close: f64) -> PriceBar {
        PriceBar {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 10,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_price_history_passes_bars_through() {
        let mut provider = MockMarketDataProvider::new();
        provider
            .expect_price_history()
            .withf(|ticker, start, end| ticker == "AAPL" && *start == day(1) && *end == day(3))
            .times(1)
            .returning(|_, _, _| Ok(vec![bar(day(2), 1.0), bar(day(3), 2.0)]));

        let client = MarketDataClient::new(provider);
        let bars = client.fetch_price_history("AAPL", day(1), day(3)).await;
        assert_eq!(bars.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_price_history_degrades_to_empty() {
        let mut provider = MockMarketDataProvider::new();
        provider
            .expect_price_history()
            .returning(|_, _, _| Err(StockError::Provider("no data".to_string())));

        let client = MarketDataClient::new(provider);
        assert!(client.fetch_price_history("NOPE", day(1), day(3)).await.is_empty());
    }

    #[tokio::test]
    async fn test_inverted_range_skips_provider() {
        let mut provider = MockMarketDataProvider::new();
        provider.expect_price_history().never();

        let client = MarketDataClient::new(provider);
        assert!(client.fetch_price_history("AAPL", day(5), day(1)).await.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_company_profile_degrades_to_none() {
        let mut provider = MockMarketDataProvider::new();
        provider
            .expect_company_profile()
            .returning(|_| Err(StockError::Provider("timeout".to_string())));

        let client = MarketDataClient::new(provider);
        assert!(client.fetch_company_profile("AAPL").await.is_none());
    }

    #[tokio::test]
    async fn test_empty_profile_is_absent() {
        let mut provider = MockMarketDataProvider::new();
        provider
            .expect_company_profile()
            .returning(|t| Ok(Some(CompanyProfile::new(t))));

        let client = MarketDataClient::new(provider);
        assert!(client.fetch_company_profile("AAPL").await.is_none());
    }

    #[tokio::test]
    async fn test_has_recent_data() {
        let mut provider = MockMarketDataProvider::new();
        provider
            .expect_price_history()
            .withf(|ticker, start, end| {
                ticker == "AAPL" && *end == day(10) && *start == day(3)
            })
            .returning(|_, _, end| Ok(vec![bar(end, 5.0)]));
        provider
            .expect_price_history()
            .withf(|ticker, _, _| ticker == "ZZZZ")
            .returning(|_, _, _| Ok(Vec::new()));

        let client = MarketDataClient::new(provider);
        assert!(client.has_recent_data("AAPL", day(10)).await);
        assert!(!client.has_recent_data("ZZZZ", day(10)).await);
    }
}
