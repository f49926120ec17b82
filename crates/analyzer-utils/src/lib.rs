//! Shared utilities for stock-analyzer
//!
//! This crate provides the pieces every binary in the workspace needs before
//! the dashboard starts: logging setup and the application configuration
//! (where data lives and which user the session belongs to).

pub mod config;
pub mod logging;

pub use config::Config;
pub use logging::{DEFAULT_DIRECTIVE, init_tracing};
