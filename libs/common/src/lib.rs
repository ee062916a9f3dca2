//! bodylogger basic library
//!
//! Provides functions shared by the store and the CLI:
//! - logging initialization
//! - layered configuration loading
//! - SQLite client

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub mod config;
pub mod logging;

pub use config::{AppConfig, ConfigOverrides, CONFIG_FILE_NAME, ENV_PREFIX};

// Re-export common dependencies
pub use anyhow;
pub use serde;
