//! SQLite storage for watchlists, search history and preferences
//!
//! Every method here is fallible; the [`crate::store::Store`] façade is what
//! turns failures into defaults.

mod preferences;
mod search_history;
mod watchlist;

use crate::error::Result;
use rusqlite::Connection;
use std::path::Path;
use tracing::debug;

const SCHEMA_SQL: &str = r"
CREATE TABLE IF NOT EXISTS watchlists (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    ticker TEXT NOT NULL,
    added_at TIMESTAMP NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_watchlists_user_ticker
    ON watchlists (user_id, ticker);

CREATE TABLE IF NOT EXISTS search_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    ticker TEXT NOT NULL,
    searched_at TIMESTAMP NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_search_history_user_time
    ON search_history (user_id, searched_at);

CREATE TABLE IF NOT EXISTS user_preferences (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL UNIQUE,
    default_ticker TEXT NOT NULL DEFAULT 'AAPL',
    default_period TEXT NOT NULL DEFAULT '1 Year',
    theme TEXT NOT NULL DEFAULT 'light',
    show_ma50 INTEGER NOT NULL DEFAULT 1,
    show_ma200 INTEGER NOT NULL DEFAULT 1,
    updated_at TIMESTAMP NOT NULL
);
";

/// Database wrapper for user state
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Create the tables if they do not exist yet
    pub fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA_SQL)?;
        debug!("Database schema initialized");
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(db: &Database) -> Vec<String> {
        let mut stmt = db
            .conn
            .prepare(
                "SELECT name FROM sqlite_master WHERE type = 'table' \
                 AND name NOT LIKE 'sqlite_%' ORDER BY name",
            )
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .collect::<rusqlite::Result<Vec<String>>>()
            .unwrap()
    }

    #[test]
    fn test_init_schema_creates_tables() {
        let db = Database::open_in_memory().unwrap();
        db.init_schema().unwrap();
        assert_eq!(
            table_names(&db),
            vec!["search_history", "user_preferences", "watchlists"]
        );
    }

    #[test]
    fn test_init_schema_is_repeatable() {
        let db = Database::open_in_memory().unwrap();
        db.init_schema().unwrap();
        db.init_schema().unwrap();
        assert_eq!(table_names(&db).len(), 3);
    }

    #[test]
    fn test_open_file_creates_parent_dir() {
        let dir = std::env::temp_dir().join(format!("sa-db-{}", uuid::Uuid::new_v4()));
        let path = dir.join("nested").join("stockanalyzer.db");

        let db = Database::open(&path).unwrap();
        db.init_schema().unwrap();
        assert!(path.exists());

        drop(db);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
