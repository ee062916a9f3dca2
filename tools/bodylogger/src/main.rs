//! bodylogger - log body weight and runs, and watch the trend
//!
//! Records live in one SQLite file per user under the data directory.
//! `stats` prints deltas, dispersion, moving averages and an ARIMA forecast;
//! `plot` draws the same series as a terminal chart.

mod context;
mod plot;
mod prompt;
mod records;
mod stats;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use body_model::Metric;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::*;
use common::logging::{init_cli_logging, resolve_filter, CliLogOptions};
use common::{AppConfig, ConfigOverrides};
use tracing::debug;

use crate::context::AppContext;
use crate::prompt::date_arg;

#[derive(Parser)]
#[command(name = "bodylogger")]
#[command(about = "Log body weight and runs, with trend statistics and forecasts")]
#[command(long_about = "Log body weight and runs, with trend statistics and forecasts

Records:
  add         Add or update a weight for a date
  run         Add or update a run for a date
  delete      Delete the record for a date
  deleteuser  Delete a user and all of their records
  list        Show the latest records

Analysis:
  stats       Deltas, dispersion, EMA 7/30/90 and ARIMA forecasts
  plot        Chart of the series with EMAs and forecasts

Examples:
  bodylogger add ryder -w 186.4           # Log today's weight
  bodylogger run ryder --distance 3.1 --duration 28
  bodylogger stats ryder                  # Weight statistics
  bodylogger plot ryder -o chart.txt      # Write the chart to a file")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log level or filter, e.g. debug or body_store=trace (default from config, warn)
    #[arg(long = "log-level", global = true)]
    log_level: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Data directory (default: ~/.bodylogger)
    #[arg(long = "data-dir", global = true)]
    data_dir: Option<PathBuf>,

    /// Configuration file, TOML or YAML (default: <data-dir>/config.toml)
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add or update a weight
    Add {
        user: String,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(short, long, value_parser = date_arg)]
        date: Option<NaiveDate>,

        /// Weight; prompted for when omitted
        #[arg(short, long)]
        weight: Option<f64>,
    },

    /// Add or update a run
    Run {
        user: String,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(short, long, value_parser = date_arg)]
        date: Option<NaiveDate>,

        /// Distance; prompted for when omitted
        #[arg(long)]
        distance: Option<f64>,

        /// Duration in minutes; prompted for when omitted
        #[arg(long)]
        duration: Option<f64>,
    },

    /// Delete the record for a date
    Delete {
        user: String,

        /// Date (YYYY-MM-DD); prompted for when omitted
        #[arg(short, long, value_parser = date_arg)]
        date: Option<NaiveDate>,

        /// Delete a run instead of a weight
        #[arg(long)]
        runs: bool,
    },

    /// Delete a user and all of their records
    Deleteuser { user: String },

    /// Show the latest records, newest first
    List {
        user: String,

        /// Number of records (default from config, 7)
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// List runs instead of weights
        #[arg(long)]
        runs: bool,
    },

    /// Trend statistics for a metric
    Stats {
        user: String,

        /// weight, distance or duration
        #[arg(short, long, default_value = "weight")]
        metric: Metric,

        /// Anchor date for the 7/30/90-day windows (default: latest record)
        #[arg(long = "as-of", value_parser = date_arg)]
        as_of: Option<NaiveDate>,
    },

    /// Chart a metric with its EMAs and forecasts
    Plot {
        user: String,

        /// weight, distance or duration
        #[arg(short, long, default_value = "weight")]
        metric: Metric,

        /// Write the chart to a text file instead of showing it
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

async fn run(cli: Cli) -> Result<()> {
    let overrides = ConfigOverrides {
        data_dir: cli.data_dir,
        config_file: cli.config,
        log_level: cli.log_level,
    };
    let config = AppConfig::load(&overrides).context("Failed to load configuration")?;

    let log_dir = config.log_to_file.then(|| config.log_dir());
    let rust_log = std::env::var("RUST_LOG").ok();
    let _guard = init_cli_logging(&CliLogOptions {
        level: resolve_filter(&config.log_level, cli.verbose, rust_log.as_deref()),
        ansi: !cli.no_color,
        log_dir,
    })?;
    debug!("data directory: {}", config.data_dir.display());

    let today = chrono::Local::now().date_naive();
    let ctx = AppContext::new(config, today);

    match cli.command {
        Commands::Add { user, date, weight } => {
            records::add_command(&ctx, &user, date, weight).await
        },
        Commands::Run {
            user,
            date,
            distance,
            duration,
        } => records::run_command(&ctx, &user, date, distance, duration).await,
        Commands::Delete { user, date, runs } => {
            records::delete_command(&ctx, &user, date, runs).await
        },
        Commands::Deleteuser { user } => records::delete_user_command(&ctx, &user),
        Commands::List { user, count, runs } => {
            let count = count.unwrap_or(ctx.config.list_count);
            records::list_command(&ctx, &user, count, runs).await
        },
        Commands::Stats {
            user,
            metric,
            as_of,
        } => stats::stats_command(&ctx, &user, metric, as_of).await,
        Commands::Plot {
            user,
            metric,
            output,
        } => plot::plot_command(&ctx, &user, metric, output.as_deref()).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Configure colored output
    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Err(e) = run(cli).await {
        eprintln!("[{}] - {:#}", "ERROR".red().bold(), e);
        std::process::exit(1);
    }
}
