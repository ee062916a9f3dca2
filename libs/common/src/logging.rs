//! Logging setup for bodylogger
//!
//! Console output goes to stderr so command output on stdout stays clean.
//! File output is optional and rolls daily under `<data_dir>/logs`.

use std::path::{Path, PathBuf};

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::Writer, FmtContext, FormatEvent, FormatFields},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Prefix of the daily log files, e.g. `bodylogger.2024-01-29`
pub const LOG_FILE_PREFIX: &str = "bodylogger";

/// Custom format for log level with brackets: `[INFO]`, `[WARN]`, etc.
fn format_level(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => "[TRACE]",
        Level::DEBUG => "[DEBUG]",
        Level::INFO => "[INFO]",
        Level::WARN => "[WARN]",
        Level::ERROR => "[ERROR]",
    }
}

/// Event formatter that outputs: `timestamp [LEVEL] message`
///
/// Example output: `2024-01-29T08:15:02.118204Z [DEBUG] opened store`
pub struct BracketedLevelFormat;

impl<S, N> FormatEvent<S, N> for BracketedLevelFormat
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let now = chrono::Utc::now();
        write!(writer, "{} ", now.format("%Y-%m-%dT%H:%M:%S%.6fZ"))?;

        let level = *event.metadata().level();
        if writer.has_ansi_escapes() {
            let color = match level {
                Level::TRACE => "\x1b[35m", // magenta
                Level::DEBUG => "\x1b[34m", // blue
                Level::INFO => "\x1b[32m",  // green
                Level::WARN => "\x1b[33m",  // yellow
                Level::ERROR => "\x1b[31m", // red
            };
            write!(writer, "{}{}\x1b[0m ", color, format_level(&level))?;
        } else {
            write!(writer, "{} ", format_level(&level))?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

/// Options for `init_cli_logging`
#[derive(Debug, Clone)]
pub struct CliLogOptions {
    /// Filter used when `RUST_LOG` is not set
    pub level: String,
    /// Emit ANSI colors on the console
    pub ansi: bool,
    /// Also write to a daily file in this directory
    pub log_dir: Option<PathBuf>,
}

impl Default for CliLogOptions {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            ansi: true,
            log_dir: None,
        }
    }
}

/// Resolve the filter directive
///
/// `RUST_LOG` wins, then `--verbose`, then the configured level.
pub fn resolve_filter(configured: &str, verbose: bool, rust_log: Option<&str>) -> String {
    match rust_log {
        Some(env) if !env.trim().is_empty() => env.to_string(),
        _ if verbose => "debug".to_string(),
        _ => configured.to_string(),
    }
}

/// Path of the log file written today
pub fn log_file_path(log_dir: &Path, date: chrono::NaiveDate) -> PathBuf {
    log_dir.join(format!("{}.{}", LOG_FILE_PREFIX, date.format("%Y-%m-%d")))
}

/// Install the global subscriber for the CLI
///
/// Returns the file writer guard when file logging is on; it must be kept
/// alive until the process exits or buffered lines are lost.
pub fn init_cli_logging(options: &CliLogOptions) -> anyhow::Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_new(&options.level)
        .map_err(|e| anyhow::anyhow!("Invalid log level '{}': {}", options.level, e))?;

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(options.ansi)
        .event_format(BracketedLevelFormat)
        .boxed();

    let (file_layer, guard) = match &options.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .event_format(BracketedLevelFormat)
                .boxed();
            (Some(layer), Some(guard))
        },
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(guard)
}
