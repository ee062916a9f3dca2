//! Command context
//!
//! Everything a command needs from the environment, resolved once in `main`
//! and passed down explicitly.

use body_store::UserDirectory;
use chrono::NaiveDate;
use common::AppConfig;

/// Resolved configuration plus the current date
#[derive(Debug, Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub users: UserDirectory,
    /// Default date for new records
    pub today: NaiveDate,
}

impl AppContext {
    pub fn new(config: AppConfig, today: NaiveDate) -> Self {
        let users = UserDirectory::new(&config.data_dir);
        Self {
            config,
            users,
            today,
        }
    }
}
