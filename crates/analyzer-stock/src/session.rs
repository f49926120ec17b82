//! Per-user dashboard session state

use crate::config::StockConfig;
use crate::error::{Result, StockError};
use crate::models::{FALLBACK_TICKER, Period, UserPreferences};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// State of one interactive session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionContext {
    pub session_id: Uuid,
    pub user_id: String,
    pub watchlist: Vec<String>,
    pub preferences: UserPreferences,
    pub selected_ticker: String,
    pub period: Period,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub show_ma50: bool,
    pub show_ma200: bool,
    pub db_connected: bool,
}

impl SessionContext {
    /// Session seeded from stored preferences, range ending at `today`
    pub fn new(
        preferences: UserPreferences,
        watchlist: Vec<String>,
        today: NaiveDate,
        db_connected: bool,
    ) -> Self {
        let selected_ticker = if preferences.default_ticker.trim().is_empty() {
            FALLBACK_TICKER.to_string()
        } else {
            preferences.default_ticker.clone()
        };
        let period = preferences.default_period;
        let (start, end) = period.range_ending(today);

        Self {
            session_id: Uuid::new_v4(),
            user_id: preferences.user_id.clone(),
            watchlist,
            show_ma50: preferences.show_ma50,
            show_ma200: preferences.show_ma200,
            preferences,
            selected_ticker,
            period,
            start,
            end,
            db_connected,
        }
    }

    /// Select `ticker`; returns whether the selection changed
    pub fn select(&mut self, ticker: impl Into<String>) -> bool {
        let ticker = ticker.into();
        if ticker == self.selected_ticker {
            return false;
        }
        self.selected_ticker = ticker;
        true
    }

    /// Switch period and recompute the range ending at `today`
    pub fn set_period(&mut self, period: Period, today: NaiveDate) {
        self.period = period;
        let (start, end) = period.range_ending(today);
        self.start = start;
        self.end = end;
    }

    /// Explicit inclusive range
    pub fn set_range(&mut self, start: NaiveDate, end: NaiveDate) -> Result<()> {
        if start > end {
            return Err(StockError::InvalidDate(format!(
                "start {start} is after end {end}"
            )));
        }
        self.start = start;
        self.end = end;
        Ok(())
    }

    pub fn watch(&mut self, symbol: impl Into<String>) {
        let symbol = symbol.into();
        if !self.watchlist.contains(&symbol) {
            self.watchlist.push(symbol);
        }
    }

    pub fn unwatch(&mut self, symbol: &str) -> bool {
        if let Some(pos) = self.watchlist.iter().position(|s| s == symbol) {
            self.watchlist.remove(pos);
            true
        } else {
            false
        }
    }

    /// `(window, enabled)` pairs for the chart overlays
    pub fn moving_averages(&self, config: &StockConfig) -> [(usize, bool); 2] {
        [
            (config.short_ma_window, self.show_ma50),
            (config.long_ma_window, self.show_ma200),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    #[test]
    fn test_new_session_follows_preferences() {
        let mut prefs = UserPreferences::defaults_for("u1");
        prefs.default_ticker = "MSFT".to_string();
        prefs.default_period = Period::OneMonth;
        prefs.show_ma200 = false;

        let session = SessionContext::new(prefs, vec!["AAPL".to_string()], today(), true);
        assert_eq!(session.user_id, "u1");
        assert_eq!(session.selected_ticker, "MSFT");
        assert_eq!(session.start, NaiveDate::from_ymd_opt(2024, 5, 31).unwrap());
        assert_eq!(session.end, today());
        assert!(session.show_ma50);
        assert!(!session.show_ma200);
    }

    #[test]
    fn test_blank_default_ticker_falls_back() {
        let mut prefs = UserPreferences::defaults_for("u1");
        prefs.default_ticker = String::new();
        let session = SessionContext::new(prefs, Vec::new(), today(), false);
        assert_eq!(session.selected_ticker, "AAPL");
    }

    #[test]
    fn test_select_reports_change() {
        let mut session =
            SessionContext::new(UserPreferences::defaults_for("u1"), Vec::new(), today(), true);
        assert!(!session.select("AAPL"));
        assert!(session.select("TSLA"));
        assert_eq!(session.selected_ticker, "TSLA");
    }

    #[test]
    fn test_range_rejects_inverted_dates() {
        let mut session =
            SessionContext::new(UserPreferences::defaults_for("u1"), Vec::new(), today(), true);
        let later = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        assert!(session.set_range(later, today()).is_err());
        assert!(session.set_range(today(), today()).is_ok());
        assert_eq!(session.start, today());
    }

    #[test]
    fn test_watch_unwatch() {
        let mut session =
            SessionContext::new(UserPreferences::defaults_for("u1"), Vec::new(), today(), true);
        session.watch("AAPL");
        session.watch("AAPL");
        assert_eq!(session.watchlist, vec!["AAPL"]);
        assert!(session.unwatch("AAPL"));
        assert!(!session.unwatch("AAPL"));
    }
}
