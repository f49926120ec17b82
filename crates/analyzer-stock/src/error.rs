//! Error types for stock analyzer operations

use thiserror::Error;

/// Stock analyzer specific errors
#[derive(Debug, Error)]
pub enum StockError {
    /// Data not available for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable {
        symbol: String,
        reason: String,
    },

    /// Invalid stock symbol provided
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Unknown period label
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    /// Unparseable or inconsistent date input
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Market data provider answered with an error
    #[error("Provider error: {0}")]
    Provider(String),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Embedded database error
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Technical indicator calculation error
    #[error("Indicator error: {0}")]
    Indicator(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed user command
    #[error("Command error: {0}")]
    Command(String),
}

/// Result type alias for stock analyzer operations
pub type Result<T> = std::result::Result<T, StockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StockError::InvalidSymbol("$$$".to_string());
        assert_eq!(err.to_string(), "Invalid symbol: $$$");

        let err = StockError::DataUnavailable {
            symbol: "AAPL".to_string(),
            reason: "No data found".to_string(),
        };
        assert_eq!(err.to_string(), "Data not available for AAPL: No data found");
    }

    #[test]
    fn test_storage_error_conversion() {
        let err: StockError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, StockError::Storage(_)));
        assert!(err.to_string().starts_with("Storage error"));
    }
}
