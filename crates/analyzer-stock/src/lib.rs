//! Stock analysis dashboard
//!
//! This crate provides everything behind the `stock-analyzer` binary:
//!
//! - Price history and company metadata from Yahoo Finance
//! - Return and risk metrics (daily, monthly, YTD, annual, volatility, Sharpe)
//! - Chart series: candles, volume, moving averages, returns histogram
//! - Per-user watchlist, search history and preferences in SQLite
//! - A command-driven dashboard with plain-text and JSON output
//!
//! # Architecture
//!
//! The [`Dashboard`] reads market data through a [`MarketDataClient`], which
//! wraps any [`MarketDataProvider`] and turns provider failures into "no
//! data". User state goes through the [`Store`], which turns storage failures
//! into defaults. Neither kind of failure ends the session.
//!
//! # Example
//!
//! ```rust,ignore
//! use analyzer_stock::{Dashboard, FormatterFactory, StockConfig, Store, YahooFinanceClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = StockConfig::default().with_env()?;
//!     let provider = YahooFinanceClient::new(&config)?;
//!     let store = Store::open("./data/stockanalyzer.db");
//!
//!     let dashboard = Dashboard::new(provider, store, config, FormatterFactory::create(false));
//!     let mut session = dashboard.start_session("default_user");
//!     let response = dashboard.handle(&mut session, "/all").await;
//!     println!("{response:?}");
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod metrics;
pub mod models;
pub mod session;
pub mod store;

// Re-export main types for convenience
pub use api::{MarketDataClient, MarketDataProvider, YahooFinanceClient};
pub use chart::ChartData;
pub use config::StockConfig;
pub use dashboard::{Command, Dashboard, FormatterFactory, Response};
pub use error::{Result, StockError};
pub use metrics::PerformanceMetrics;
pub use models::{CompanyProfile, Period, PriceBar, Theme, UserPreferences};
pub use session::SessionContext;
pub use store::Store;
