//! Configuration for the market data client and the dashboard

use crate::error::{Result, StockError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable overriding the HTTP timeout (seconds)
pub const HTTP_TIMEOUT_ENV: &str = "STOCK_ANALYZER_HTTP_TIMEOUT_SECS";

/// Configuration for stock analyzer operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockConfig {
    /// User agent sent with chart requests
    pub user_agent: String,

    /// Base URL of the Yahoo chart endpoint (ticker is appended)
    pub chart_url: String,

    /// Request timeout duration
    pub request_timeout: Duration,

    /// Short moving-average window in bars
    pub short_ma_window: usize,

    /// Long moving-average window in bars
    pub long_ma_window: usize,

    /// Number of bins of the daily-returns histogram
    pub histogram_bins: usize,

    /// How many search-history records are read back
    pub recent_search_limit: usize,

    /// How many distinct recent tickers are shown
    pub recent_display_limit: usize,

    /// Rows of the recent price table
    pub recent_bars: usize,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (compatible; stock-analyzer/0.1)".to_string(),
            chart_url: "https://query1.finance.yahoo.com/v8/finance/chart".to_string(),
            request_timeout: Duration::from_secs(30),
            short_ma_window: 50,
            long_ma_window: 200,
            histogram_bins: 50,
            recent_search_limit: 5,
            recent_display_limit: 6,
            recent_bars: 10,
        }
    }
}

impl StockConfig {
    /// Create a new configuration builder
    pub fn builder() -> StockConfigBuilder {
        StockConfigBuilder::default()
    }

    /// Load the HTTP timeout from environment
    pub fn with_env(mut self) -> Result<Self> {
        if let Ok(raw) = std::env::var(HTTP_TIMEOUT_ENV) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                StockError::Config(format!("{HTTP_TIMEOUT_ENV} must be a number of seconds"))
            })?;
            self.request_timeout = Duration::from_secs(secs);
        }
        self.validate()?;
        Ok(self)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.short_ma_window == 0 || self.long_ma_window == 0 {
            return Err(StockError::Config(
                "moving-average windows must be greater than 0".to_string(),
            ));
        }

        if self.histogram_bins == 0 {
            return Err(StockError::Config(
                "histogram_bins must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(StockError::Config(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for StockConfig
#[derive(Debug, Default)]
pub struct StockConfigBuilder {
    user_agent: Option<String>,
    chart_url: Option<String>,
    request_timeout: Option<Duration>,
    histogram_bins: Option<usize>,
    recent_search_limit: Option<usize>,
}

impl StockConfigBuilder {
    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Set the chart endpoint
    pub fn chart_url(mut self, url: impl Into<String>) -> Self {
        self.chart_url = Some(url.into());
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the histogram bin count
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = Some(bins);
        self
    }

    /// Set how many search records are read back
    pub fn recent_search_limit(mut self, limit: usize) -> Self {
        self.recent_search_limit = Some(limit);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<StockConfig> {
        let defaults = StockConfig::default();

        let config = StockConfig {
            user_agent: self.user_agent.unwrap_or(defaults.user_agent),
            chart_url: self.chart_url.unwrap_or(defaults.chart_url),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            histogram_bins: self.histogram_bins.unwrap_or(defaults.histogram_bins),
            recent_search_limit: self
                .recent_search_limit
                .unwrap_or(defaults.recent_search_limit),
            ..defaults
        };

        config.validate()?;
        Ok(config)
    }
}
