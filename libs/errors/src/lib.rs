//! Unified error handling for bodylogger
//!
//! One error type shared by the configuration layer, the record store and the
//! CLI. The statistics pipeline keeps its own gating errors (`body_trend`),
//! which never escape as failures.

use thiserror::Error;

// ============================================================================
// BodyLoggerError - Main error type
// ============================================================================

/// Main error type for the store, configuration and command layers
#[derive(Debug, Error)]
pub enum BodyLoggerError {
    // ======================================
    // Configuration Errors
    // ======================================
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    // ======================================
    // Database Errors
    // ======================================
    #[error("Database error: {0}")]
    Database(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] sqlx::Error),

    // ======================================
    // Validation Errors
    // ======================================
    #[error("Invalid date '{input}': expected YYYY-MM-DD")]
    InvalidDate { input: String },

    #[error("Invalid user name '{0}': use letters, digits, '.', '_' or '-'")]
    InvalidUser(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    // ======================================
    // Resource Errors
    // ======================================
    #[error("User does not exist: {0}")]
    UserNotFound(String),

    #[error("Record with date {date} does not exist")]
    RecordNotFound { date: String },

    // ======================================
    // File & I/O Errors
    // ======================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ======================================
    // Catch-all for other errors
    // ======================================
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using BodyLoggerError
pub type Result<T> = std::result::Result<T, BodyLoggerError>;

impl BodyLoggerError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn invalid_date(input: impl Into<String>) -> Self {
        Self::InvalidDate {
            input: input.into(),
        }
    }

    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn user_not_found(user: impl Into<String>) -> Self {
        Self::UserNotFound(user.into())
    }

    pub fn record_not_found(date: impl Into<String>) -> Self {
        Self::RecordNotFound { date: date.into() }
    }

    /// Stable machine-readable code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::InvalidConfig { .. } => "INVALID_CONFIG",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Sqlite(_) => "SQLITE_ERROR",
            Self::InvalidDate { .. } => "INVALID_DATE",
            Self::InvalidUser(_) => "INVALID_USER",
            Self::InvalidValue { .. } => "INVALID_VALUE",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::RecordNotFound { .. } => "RECORD_NOT_FOUND",
            Self::Io(_) => "IO_ERROR",
            Self::Other(_) => "UNKNOWN_ERROR",
        }
    }

    /// Whether the error comes from bad user input rather than the environment
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidDate { .. }
                | Self::InvalidUser(_)
                | Self::InvalidValue { .. }
                | Self::UserNotFound(_)
                | Self::RecordNotFound { .. }
        )
    }

    /// Whether the error means "nothing stored under that key"
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UserNotFound(_) | Self::RecordNotFound { .. })
    }
}

impl From<figment::Error> for BodyLoggerError {
    fn from(err: figment::Error) -> Self {
        Self::Configuration(err.to_string())
    }
}

impl From<std::num::ParseFloatError> for BodyLoggerError {
    fn from(err: std::num::ParseFloatError) -> Self {
        Self::invalid_value("number", err.to_string())
    }
}

// Helper macros for creating errors
#[macro_export]
macro_rules! config_error {
    ($msg:expr) => {
        $crate::BodyLoggerError::Configuration($msg.to_string())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::BodyLoggerError::Configuration(format!($fmt, $($arg)*))
    };
}
