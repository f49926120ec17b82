use super::Database;
use crate::error::Result;
use chrono::Utc;
use rusqlite::params;

impl Database {
    /// Tickers on `user_id`'s watchlist, in insertion order
    pub fn get_watchlist(&self, user_id: &str) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT ticker FROM watchlists WHERE user_id = ?1 ORDER BY id")?;
        let tickers = stmt
            .query_map(params![user_id], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(tickers)
    }

    /// Insert unless already present; returns whether a row was added
    pub fn add_to_watchlist(&self, user_id: &str, ticker: &str) -> Result<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO watchlists (user_id, ticker, added_at) VALUES (?1, ?2, ?3)",
            params![user_id, ticker, Utc::now()],
        )?;
        Ok(inserted == 1)
    }

    /// Delete the entry; returns whether a row was removed
    pub fn remove_from_watchlist(&self, user_id: &str, ticker: &str) -> Result<bool> {
        let removed = self.conn.execute(
            "DELETE FROM watchlists WHERE user_id = ?1 AND ticker = ?2",
            params![user_id, ticker],
        )?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WatchlistEntry;

    fn db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.init_schema().unwrap();
        db
    }

    fn entries(db: &Database, user_id: &str) -> Vec<WatchlistEntry> {
        let mut stmt = db
            .conn
            .prepare("SELECT user_id, ticker, added_at FROM watchlists WHERE user_id = ?1")
            .unwrap();
        stmt.query_map(params![user_id], |row| {
            Ok(WatchlistEntry {
                user_id: row.get(0)?,
                ticker: row.get(1)?,
                added_at: row.get(2)?,
            })
        })
        .unwrap()
        .collect::<rusqlite::Result<Vec<_>>>()
        .unwrap()
    }

    #[test]
    fn test_add_is_idempotent() {
        let db = db();
        assert!(db.add_to_watchlist("u1", "AAPL").unwrap());
        assert!(!db.add_to_watchlist("u1", "AAPL").unwrap());

        assert_eq!(db.get_watchlist("u1").unwrap(), vec!["AAPL"]);
        assert_eq!(entries(&db, "u1").len(), 1);
    }

    #[test]
    fn test_watchlists_are_per_user() {
        let db = db();
        db.add_to_watchlist("u1", "AAPL").unwrap();
        db.add_to_watchlist("u1", "MSFT").unwrap();
        db.add_to_watchlist("u2", "AAPL").unwrap();

        assert_eq!(db.get_watchlist("u1").unwrap(), vec!["AAPL", "MSFT"]);
        assert_eq!(db.get_watchlist("u2").unwrap(), vec!["AAPL"]);
        assert!(db.get_watchlist("u3").unwrap().is_empty());
    }

    #[test]
    fn test_remove() {
        let db = db();
        db.add_to_watchlist("u1", "AAPL").unwrap();

        assert!(db.remove_from_watchlist("u1", "AAPL").unwrap());
        assert!(!db.remove_from_watchlist("u1", "AAPL").unwrap());
        assert!(db.get_watchlist("u1").unwrap().is_empty());
    }

    #[test]
    fn test_entry_timestamp_round_trips() {
        let db = db();
        let before = Utc::now();
        db.add_to_watchlist("u1", "NVDA").unwrap();
        let entry = &entries(&db, "u1")[0];
        assert_eq!(entry.ticker, "NVDA");
        assert!(entry.added_at >= before - chrono::Duration::seconds(1));
    }
}
