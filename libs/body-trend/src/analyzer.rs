//! Trend analyzer
//!
//! Assembles deltas, dispersion, EMAs and forecasts into one `TrendResult`.
//! Every section is gated independently: a short series still gets its
//! deltas, and a failed model fit only removes the forecast.

use body_model::{Sample, Series};
use chrono::NaiveDate;
use tracing::debug;

use crate::dispersion::{dispersion, Dispersion};
use crate::ema::{EmaSummary, TrendWarning, EMA_SPANS};
use crate::error::Result;
use crate::forecast::{forecast_series, Forecast, DEFAULT_CONFIDENCE, FORECAST_HORIZONS};
use crate::window::{delta, window_delta, DeltaReport, WINDOWS};

/// Analyzer settings
///
/// Everything time-dependent is passed in here; the analyzer never reads the
/// clock.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    /// Anchor for the 7/30/90-day windows; `None` uses the latest sample date
    pub as_of: Option<NaiveDate>,
    /// Confidence level of forecast bounds
    pub confidence_level: f64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            as_of: None,
            confidence_level: DEFAULT_CONFIDENCE,
        }
    }
}

/// Delta for one trailing window
#[derive(Debug, Clone, PartialEq)]
pub struct WindowDelta {
    pub days: u32,
    pub report: DeltaReport,
}

/// Everything computed for one series
#[derive(Debug, Clone)]
pub struct TrendResult {
    /// Latest sample
    pub current: Sample,
    pub sample_count: usize,
    pub total_delta: DeltaReport,
    /// One entry per window in `WINDOWS`, same order
    pub window_deltas: Vec<WindowDelta>,
    pub dispersion: Result<Dispersion>,
    pub ema: Result<EmaSummary>,
    pub warnings: Vec<TrendWarning>,
    /// One entry per horizon in `FORECAST_HORIZONS`, same order
    pub forecast: Result<Vec<Forecast>>,
}

impl TrendResult {
    pub fn window(&self, days: u32) -> Option<&DeltaReport> {
        self.window_deltas
            .iter()
            .find(|w| w.days == days)
            .map(|w| &w.report)
    }

    pub fn forecast_for(&self, horizon: usize) -> Option<&Forecast> {
        self.forecast
            .as_ref()
            .ok()
            .and_then(|all| all.iter().find(|f| f.horizon == horizon))
    }

    pub fn ema_value(&self, span: u32) -> Option<f64> {
        self.ema.as_ref().ok().and_then(|e| e.value(span))
    }
}

/// Outcome of analyzing a series
#[derive(Debug, Clone)]
pub enum Analysis {
    /// The series was empty; nothing was computed
    NoData,
    Ready(Box<TrendResult>),
}

impl Analysis {
    pub fn result(&self) -> Option<&TrendResult> {
        match self {
            Self::NoData => None,
            Self::Ready(result) => Some(result),
        }
    }
}

/// Computes trend reports for series
#[derive(Debug, Clone, Default)]
pub struct TrendAnalyzer {
    config: AnalyzerConfig,
}

impl TrendAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Analyze `series`
    ///
    /// Never fails: unavailable sections carry their reason.
    pub fn analyze(&self, series: &Series) -> Analysis {
        let current = match series.last() {
            Some(sample) => *sample,
            None => {
                debug!("empty series, skipping analysis");
                return Analysis::NoData;
            },
        };

        let values = series.values();

        let total_delta = delta(series);

        let window_deltas = WINDOWS
            .iter()
            .map(|&days| WindowDelta {
                days,
                report: window_delta(series, days, self.config.as_of),
            })
            .collect();

        let dispersion = dispersion(&values);
        if let Err(e) = &dispersion {
            debug!("dispersion unavailable: {}", e);
        }

        let ema = EmaSummary::compute(&values, &EMA_SPANS);
        let warnings = match &ema {
            Ok(summary) => summary.warnings(),
            Err(e) => {
                debug!("ema unavailable: {}", e);
                Vec::new()
            },
        };

        let forecast = forecast_series(series, &FORECAST_HORIZONS, self.config.confidence_level);
        if let Err(e) = &forecast {
            debug!("forecast unavailable: {}", e);
        }

        Analysis::Ready(Box::new(TrendResult {
            current,
            sample_count: series.len(),
            total_delta,
            window_deltas,
            dispersion,
            ema,
            warnings,
            forecast,
        }))
    }
}
