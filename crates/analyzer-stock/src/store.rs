//! Storage façade that never fails
//!
//! Wraps [`Database`] so that every storage problem is logged and replaced by
//! a safe value: empty lists, `false` for writes, default preferences.

use crate::db::Database;
use crate::error::Result;
use crate::models::{SearchHistoryRecord, UserPreferences};
use std::path::Path;
use tracing::{info, warn};

/// User-state store used by the dashboard
pub struct Store {
    db: Option<Database>,
    fallback: bool,
}

impl Store {
    /// Open the database file, falling back to memory and then to no storage
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::open_file(path) {
            Ok(db) => {
                info!(path = %path.display(), "Database opened");
                Self {
                    db: Some(db),
                    fallback: false,
                }
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Error opening database, using in-memory fallback");
                Self::in_memory_fallback()
            }
        }
    }

    /// Store backed by a fresh in-memory database
    pub fn in_memory() -> Self {
        let mut store = Self::in_memory_fallback();
        store.fallback = false;
        store
    }

    /// Store without any backing database
    pub fn disconnected() -> Self {
        Self {
            db: None,
            fallback: false,
        }
    }

    fn open_file(path: &Path) -> Result<Database> {
        let db = Database::open(path)?;
        db.init_schema()?;
        Ok(db)
    }

    fn in_memory_fallback() -> Self {
        let opened = Database::open_in_memory().and_then(|db| {
            db.init_schema()?;
            Ok(db)
        });
        match opened {
            Ok(db) => Self {
                db: Some(db),
                fallback: true,
            },
            Err(e) => {
                warn!(error = %e, "In-memory database unavailable, running without storage");
                Self::disconnected()
            }
        }
    }

    /// Whether a database (file or fallback) is available
    pub fn is_connected(&self) -> bool {
        self.db.is_some()
    }

    /// Whether the in-memory fallback replaced the file database
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    /// Run `op`, logging and replacing failures with `default`
    fn with_db<T>(&self, op: &str, default: T, f: impl FnOnce(&Database) -> Result<T>) -> T {
        let Some(db) = &self.db else {
            return default;
        };
        match f(db) {
            Ok(value) => value,
            Err(e) => {
                warn!(operation = op, error = %e, "Storage operation failed");
                default
            }
        }
    }

    /// Watchlist tickers; empty on failure
    pub fn get_watchlist(&self, user_id: &str) -> Vec<String> {
        self.with_db("get_watchlist", Vec::new(), |db| db.get_watchlist(user_id))
    }

    /// Insert-if-absent; `true` only when a row was added
    pub fn add_to_watchlist(&self, user_id: &str, ticker: &str) -> bool {
        self.with_db("add_to_watchlist", false, |db| {
            db.add_to_watchlist(user_id, ticker)
        })
    }

    /// `Some(removed)` once the delete ran; `None` on failure
    pub fn remove_from_watchlist(&self, user_id: &str, ticker: &str) -> Option<bool> {
        self.with_db("remove_from_watchlist", None, |db| {
            db.remove_from_watchlist(user_id, ticker).map(Some)
        })
    }

    /// Append to the search log; `false` on failure
    pub fn add_to_search_history(&self, user_id: &str, ticker: &str) -> bool {
        self.with_db("add_to_search_history", false, |db| {
            db.add_to_search_history(user_id, ticker).map(|()| true)
        })
    }

    /// Newest `limit` searches; empty on failure
    pub fn get_recent_searches(&self, user_id: &str, limit: usize) -> Vec<SearchHistoryRecord> {
        self.with_db("get_recent_searches", Vec::new(), |db| {
            db.get_recent_searches(user_id, limit)
        })
    }

    /// Stored preferences, creating the default row on first use
    pub fn get_user_preferences(&self, user_id: &str) -> UserPreferences {
        self.with_db(
            "get_user_preferences",
            UserPreferences::defaults_for(user_id),
            |db| match db.get_user_preferences(user_id)? {
                Some(prefs) => Ok(prefs),
                None => {
                    let prefs = UserPreferences::defaults_for(user_id);
                    db.upsert_user_preferences(&prefs)?;
                    Ok(prefs)
                }
            },
        )
    }

    /// Upsert by user id; `false` on failure
    pub fn update_user_preferences(&self, prefs: &UserPreferences) -> bool {
        self.with_db("update_user_preferences", false, |db| {
            db.upsert_user_preferences(prefs).map(|()| true)
        })
    }
}
