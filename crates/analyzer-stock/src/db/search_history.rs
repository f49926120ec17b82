use super::Database;
use crate::error::Result;
use crate::models::SearchHistoryRecord;
use chrono::Utc;
use rusqlite::params;

impl Database {
    /// Append a search; never deduplicates
    pub fn add_to_search_history(&self, user_id: &str, ticker: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO search_history (user_id, ticker, searched_at) VALUES (?1, ?2, ?3)",
            params![user_id, ticker, Utc::now()],
        )?;
        Ok(())
    }

    /// Latest `limit` searches, newest first
    pub fn get_recent_searches(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<SearchHistoryRecord>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = self.conn.prepare(
            "SELECT user_id, ticker, searched_at FROM search_history \
             WHERE user_id = ?1 ORDER BY searched_at DESC, id DESC LIMIT ?2",
        )?;
        let records = stmt
            .query_map(params![user_id, limit], |row| {
                Ok(SearchHistoryRecord {
                    user_id: row.get(0)?,
                    ticker: row.get(1)?,
                    searched_at: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }
}
