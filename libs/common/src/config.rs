//! Layered configuration for bodylogger
//!
//! Priority (highest to lowest):
//! 1. Command-line overrides
//! 2. Environment variables prefixed with `BODYLOGGER_`
//! 3. Config file (`--config`, or `<data_dir>/config.toml`)
//! 4. Default values

use std::path::{Path, PathBuf};

use errors::{config_error, BodyLoggerError, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Config file looked up inside the data directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Environment variable prefix, e.g. `BODYLOGGER_DATA_DIR`
pub const ENV_PREFIX: &str = "BODYLOGGER_";

/// Data directory name under the home directory
pub const DEFAULT_DIR_NAME: &str = ".bodylogger";

/// Resolved application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Root of all user stores and logs
    pub data_dir: PathBuf,
    /// Log filter used when `RUST_LOG` is unset
    pub log_level: String,
    /// Also write logs to `<data_dir>/logs`
    pub log_to_file: bool,
    /// Default number of rows printed by `list`
    pub list_count: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            data_dir: home.join(DEFAULT_DIR_NAME),
            log_level: "warn".to_string(),
            log_to_file: false,
            list_count: 7,
        }
    }
}

/// Values given on the command line; `None` leaves lower layers alone
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    /// Explicit config file; not itself a config value
    #[serde(skip)]
    pub config_file: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from all layers
    pub fn load(overrides: &ConfigOverrides) -> Result<Self> {
        Self::load_with_prefix(overrides, ENV_PREFIX)
    }

    /// Load configuration reading environment variables with `env_prefix`
    pub fn load_with_prefix(overrides: &ConfigOverrides, env_prefix: &str) -> Result<Self> {
        // The data directory decides where the default config file lives,
        // so resolve it from the layers above the file first
        let data_dir = match &overrides.data_dir {
            Some(dir) => dir.clone(),
            None => Figment::new()
                .merge(Serialized::defaults(AppConfig::default()))
                .merge(Env::prefixed(env_prefix).only(&["data_dir"]))
                .extract_inner::<PathBuf>("data_dir")?,
        };

        let config_path = match &overrides.config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(config_error!("config file not found: {}", path.display()));
                }
                path.clone()
            },
            None => data_dir.join(CONFIG_FILE_NAME),
        };

        let figment = Figment::new()
            .merge(Serialized::defaults(AppConfig::default()))
            .merge(file_provider(&config_path)?)
            .merge(Env::prefixed(env_prefix))
            .merge(Serialized::defaults(overrides));

        let config: AppConfig = figment.extract()?;
        config.validate()?;

        debug!(
            "configuration loaded: data_dir={}, file={}",
            config.data_dir.display(),
            config_path.display()
        );
        Ok(config)
    }

    /// Reject values the commands cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.list_count == 0 {
            return Err(BodyLoggerError::InvalidConfig {
                field: "list_count".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.log_level.trim().is_empty() {
            return Err(BodyLoggerError::InvalidConfig {
                field: "log_level".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Directory for daily log files
    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

/// Pick the figment provider by file extension
fn file_provider(path: &Path) -> Result<Figment> {
    let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("toml");

    match extension {
        "toml" => Ok(Figment::from(Toml::file(path))),
        "yaml" | "yml" => Ok(Figment::from(Yaml::file(path))),
        other => Err(config_error!("Unsupported config file format: {}", other)),
    }
}
