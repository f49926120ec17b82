//! Stock analysis dashboard
//!
//! Command-driven front end over the market data client, the metrics engine
//! and the user store.
//!
//! # Example
//!
//! ```rust,ignore
//! use analyzer_stock::dashboard::{Dashboard, FormatterFactory, Response};
//!
//! let dashboard = Dashboard::new(provider, store, config, FormatterFactory::create(false));
//! let mut session = dashboard.start_session("default_user");
//! if let Response::Text(text) = dashboard.handle(&mut session, "/metrics").await {
//!     println!("{text}");
//! }
//! ```

pub mod commands;
pub mod formatter;

use crate::api::{MarketDataClient, MarketDataProvider};
use crate::chart::{ChartData, histogram};
use crate::config::StockConfig;
use crate::error::Result;
use crate::metrics::PerformanceMetrics;
use crate::models::{DEFAULT_WATCHLIST, POPULAR_TICKERS, Period, PriceBar, Theme};
use crate::session::SessionContext;
use crate::store::Store;
use chrono::{Local, NaiveDate, Utc};
use std::collections::BTreeSet;
use tracing::{info, warn};

pub use commands::Command;
pub use formatter::{CliFormatter, Formatter, FormatterFactory, JsonFormatter};

/// Result of one dashboard interaction
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Text to print; the session continues
    Text(String),
    /// The user asked to leave
    Exit,
}

/// Stock analysis dashboard
pub struct Dashboard<P> {
    client: MarketDataClient<P>,
    store: Store,
    config: StockConfig,
    formatter: Box<dyn Formatter>,
    clock: fn() -> NaiveDate,
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

impl<P: MarketDataProvider> Dashboard<P> {
    pub fn new(
        provider: P,
        store: Store,
        config: StockConfig,
        formatter: Box<dyn Formatter>,
    ) -> Self {
        Self {
            client: MarketDataClient::new(provider),
            store,
            config,
            formatter,
            clock: local_today,
        }
    }

    /// Replace the source of "today"
    pub fn with_clock(mut self, clock: fn() -> NaiveDate) -> Self {
        self.clock = clock;
        self
    }

    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn formatter(&self) -> &dyn Formatter {
        self.formatter.as_ref()
    }

    /// Build the session for `user_id` from stored state
    pub fn start_session(&self, user_id: &str) -> SessionContext {
        let preferences = self.store.get_user_preferences(user_id);

        let mut watchlist = self.store.get_watchlist(user_id);
        if watchlist.is_empty() {
            watchlist = DEFAULT_WATCHLIST.iter().map(ToString::to_string).collect();
            if self.store.is_connected() {
                for ticker in &watchlist {
                    self.store.add_to_watchlist(user_id, ticker);
                }
            }
        }

        let session =
            SessionContext::new(preferences, watchlist, self.today(), self.store.is_connected());
        info!(
            session_id = %session.session_id,
            user_id,
            ticker = %session.selected_ticker,
            fallback = self.store.is_fallback(),
            "Session started"
        );
        session
    }

    /// Parse and execute `input`, rendering errors through the formatter
    pub async fn handle(&self, session: &mut SessionContext, input: &str) -> Response {
        match self.process_input(session, input).await {
            Ok(response) => response,
            Err(e) => Response::Text(self.formatter.format_error(&e.to_string())),
        }
    }

    /// Process user input and return a response
    pub async fn process_input(
        &self,
        session: &mut SessionContext,
        input: &str,
    ) -> Result<Response> {
        let command = Command::parse(input)?;
        self.execute_command(session, command).await
    }

    /// Execute a parsed command
    pub async fn execute_command(
        &self,
        session: &mut SessionContext,
        command: Command,
    ) -> Result<Response> {
        let text = match command {
            Command::Ticker { symbol } => self.select_ticker(session, symbol),
            Command::Period { period } => {
                session.set_period(period, self.today());
                self.formatter.format_session(session)
            }
            Command::Range { start, end } => {
                session.set_range(start, end)?;
                self.formatter.format_session(session)
            }
            Command::ToggleMa50 => {
                session.show_ma50 = !session.show_ma50;
                self.formatter.format_session(session)
            }
            Command::ToggleMa200 => {
                session.show_ma200 = !session.show_ma200;
                self.formatter.format_session(session)
            }
            Command::Chart => {
                let bars = self.load_bars(session).await;
                self.render_chart(session, &bars)?
            }
            Command::Profile => self.render_profile(session).await,
            Command::Metrics => {
                let bars = self.load_bars(session).await;
                self.render_metrics(session, &bars)
            }
            Command::All => self.render_all(session).await?,
            Command::Watch { symbol } => self.watch(session, symbol).await,
            Command::Unwatch { symbol } => self.unwatch(session, &symbol),
            Command::Watchlist => self.formatter.format_list("Watchlist", &session.watchlist),
            Command::Recent => self
                .formatter
                .format_list("Recent Searches", &self.recent_searches(session)),
            Command::Tickers => self
                .formatter
                .format_list("Tickers", &self.available_tickers(session)),
            Command::Prefs => self.formatter.format_preferences(&session.preferences),
            Command::Save {
                theme,
                ticker,
                period,
            } => self.save_preferences(session, theme, ticker, period),
            Command::Help => self.formatter.format_help(),
            Command::Exit => return Ok(Response::Exit),
        };
        Ok(Response::Text(text))
    }

    fn select_ticker(&self, session: &mut SessionContext, symbol: String) -> String {
        if session.select(symbol) && session.db_connected {
            self.store
                .add_to_search_history(&session.user_id, &session.selected_ticker);
        }
        self.formatter.format_session(session)
    }

    async fn load_bars(&self, session: &SessionContext) -> Vec<PriceBar> {
        self.client
            .fetch_price_history(&session.selected_ticker, session.start, session.end)
            .await
    }

    fn render_chart(&self, session: &SessionContext, bars: &[PriceBar]) -> Result<String> {
        if bars.is_empty() {
            return Ok(self.formatter.format_no_data(&session.selected_ticker));
        }
        let chart = ChartData::build(
            session.selected_ticker.clone(),
            bars,
            &session.moving_averages(&self.config),
        )?;
        Ok(self.formatter.format_chart(&chart, self.config.recent_bars))
    }

    async fn render_profile(&self, session: &SessionContext) -> String {
        let profile = self
            .client
            .fetch_company_profile(&session.selected_ticker)
            .await;
        self.formatter
            .format_profile(&session.selected_ticker, profile.as_ref())
    }

    fn render_metrics(&self, session: &SessionContext, bars: &[PriceBar]) -> String {
        if bars.is_empty() {
            return self.formatter.format_no_data(&session.selected_ticker);
        }
        let metrics = PerformanceMetrics::calculate_as_of(bars, self.today());
        let bins = histogram(&metrics.returns, self.config.histogram_bins);
        self.formatter
            .format_metrics(&session.selected_ticker, &metrics, &bins)
    }

    async fn render_all(&self, session: &SessionContext) -> Result<String> {
        let bars = self.load_bars(session).await;
        if bars.is_empty() {
            return Ok(self.formatter.format_no_data(&session.selected_ticker));
        }
        Ok([
            self.formatter.format_session(session),
            self.render_chart(session, &bars)?,
            self.render_profile(session).await,
            self.render_metrics(session, &bars),
        ]
        .join("\n\n"))
    }

    async fn watch(&self, session: &mut SessionContext, symbol: String) -> String {
        if session.watchlist.contains(&symbol) {
            return self
                .formatter
                .format_message(&format!("{symbol} is already in your watchlist"));
        }

        if !self.client.has_recent_data(&symbol, self.today()).await {
            return self.formatter.format_no_data(&symbol);
        }

        if session.db_connected && !self.store.add_to_watchlist(&session.user_id, &symbol) {
            warn!(ticker = %symbol, "Watchlist entry kept for this session only");
        }
        session.watch(symbol.clone());
        self.formatter
            .format_message(&format!("Added {symbol} to your watchlist"))
    }

    fn unwatch(&self, session: &mut SessionContext, symbol: &str) -> String {
        if !session.watchlist.iter().any(|s| s == symbol) {
            return self
                .formatter
                .format_message(&format!("{symbol} is not in your watchlist"));
        }

        let removed = !session.db_connected
            || self
                .store
                .remove_from_watchlist(&session.user_id, symbol)
                .is_some();
        if !removed {
            return self
                .formatter
                .format_error(&format!("Could not remove {symbol} from your watchlist"));
        }

        session.unwatch(symbol);
        self.formatter
            .format_message(&format!("Removed {symbol} from your watchlist"))
    }

    /// Distinct recent tickers, newest first, without the selected one
    pub fn recent_searches(&self, session: &SessionContext) -> Vec<String> {
        if !session.db_connected {
            return Vec::new();
        }

        let records = self
            .store
            .get_recent_searches(&session.user_id, self.config.recent_search_limit);

        let mut tickers: Vec<String> = Vec::new();
        for record in records {
            if record.ticker != session.selected_ticker && !tickers.contains(&record.ticker) {
                tickers.push(record.ticker);
            }
        }
        tickers.truncate(self.config.recent_display_limit);
        tickers
    }

    /// Popular tickers plus the watchlist, sorted and de-duplicated
    pub fn available_tickers(&self, session: &SessionContext) -> Vec<String> {
        POPULAR_TICKERS
            .iter()
            .map(ToString::to_string)
            .chain(session.watchlist.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn save_preferences(
        &self,
        session: &mut SessionContext,
        theme: Option<Theme>,
        ticker: Option<String>,
        period: Option<Period>,
    ) -> String {
        let mut prefs = session.preferences.clone();
        if let Some(theme) = theme {
            prefs.theme = theme;
        }
        if let Some(ticker) = ticker {
            prefs.default_ticker = ticker;
        }
        if let Some(period) = period {
            prefs.default_period = period;
        }
        prefs.show_ma50 = session.show_ma50;
        prefs.show_ma200 = session.show_ma200;
        prefs.updated_at = Utc::now();

        if session.db_connected && !self.store.update_user_preferences(&prefs) {
            return self.formatter.format_error("Could not save preferences");
        }

        session.preferences = prefs;
        let note = if session.db_connected {
            "Preferences saved"
        } else {
            "Preferences saved for this session only"
        };
        self.formatter.format_message(note)
    }
}
