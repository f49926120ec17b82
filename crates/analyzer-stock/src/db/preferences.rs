use super::Database;
use crate::error::Result;
use crate::models::{Period, Theme, UserPreferences};
use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, params};
use tracing::warn;

impl Database {
    /// Stored preferences for `user_id`, if any
    pub fn get_user_preferences(&self, user_id: &str) -> Result<Option<UserPreferences>> {
        let row = self
            .conn
            .query_row(
                "SELECT user_id, default_ticker, default_period, theme, show_ma50, show_ma200, \
                 updated_at FROM user_preferences WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, i64>(4)?,
                        row.get::<_, i64>(5)?,
                        row.get::<_, DateTime<Utc>>(6)?,
                    ))
                },
            )
            .optional()?;

        Ok(row.map(
            |(user_id, default_ticker, period, theme, show_ma50, show_ma200, updated_at)| {
                UserPreferences {
                    user_id,
                    default_ticker,
                    default_period: period.parse().unwrap_or_else(|_| {
                        warn!(period = %period, "Unknown stored period, using default");
                        Period::default()
                    }),
                    theme: theme.parse().unwrap_or_else(|_| {
                        warn!(theme = %theme, "Unknown stored theme, using default");
                        Theme::default()
                    }),
                    show_ma50: show_ma50 != 0,
                    show_ma200: show_ma200 != 0,
                    updated_at,
                }
            },
        ))
    }

    /// Insert or overwrite the single preferences row of `prefs.user_id`
    pub fn upsert_user_preferences(&self, prefs: &UserPreferences) -> Result<()> {
        self.conn.execute(
            "INSERT INTO user_preferences \
             (user_id, default_ticker, default_period, theme, show_ma50, show_ma200, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) \
             ON CONFLICT(user_id) DO UPDATE SET \
                 default_ticker = excluded.default_ticker, \
                 default_period = excluded.default_period, \
                 theme = excluded.theme, \
                 show_ma50 = excluded.show_ma50, \
                 show_ma200 = excluded.show_ma200, \
                 updated_at = excluded.updated_at",
            params![
                prefs.user_id,
                prefs.default_ticker,
                prefs.default_period.label(),
                prefs.theme.as_str(),
                i64::from(prefs.show_ma50),
                i64::from(prefs.show_ma200),
                prefs.updated_at,
            ],
        )?;
        Ok(())
    }
}
