//! Application configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "STOCK_ANALYZER_DATA_DIR";
/// Environment variable overriding the user id
pub const USER_ENV: &str = "STOCK_ANALYZER_USER";

/// File name of the embedded database inside the data directory
const DATABASE_FILE: &str = "stockanalyzer.db";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Application name
    pub app_name: String,
    /// Directory holding the database file
    pub data_dir: PathBuf,
    /// Id of the user whose state is loaded
    pub user_id: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "stock-analyzer".to_string(),
            data_dir: PathBuf::from("./data"),
            user_id: "default_user".to_string(),
        }
    }
}

impl Config {
    /// Defaults overridden by `STOCK_ANALYZER_DATA_DIR` / `STOCK_ANALYZER_USER`
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// Apply environment overrides on top of `self`
    pub fn with_env(mut self) -> Self {
        if let Some(dir) = non_empty_var(DATA_DIR_ENV) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(user) = non_empty_var(USER_ENV) {
            self.user_id = user;
        }
        self
    }

    /// Set the data directory
    pub fn data_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.data_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set the user id
    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Full path of the database file
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
