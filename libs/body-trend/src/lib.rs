//! body-trend - trend analysis for logged body measurements
//!
//! Turns a date-ordered [`Series`](body_model::Series) into a [`TrendResult`]:
//! net change over the whole history and over recent windows, dispersion,
//! exponential moving averages and an ARIMA(4,1,0) forecast with 95% bounds.
//!
//! Each section is gated on its own minimum sample count and a failure in one
//! section never hides another.
//!
//! # Example
//!
//! ```rust
//! use body_model::{parse_date, Sample, Series};
//! use body_trend::{Analysis, TrendAnalyzer};
//!
//! let series = Series::from_samples(vec![
//!     Sample::new(parse_date("2024-01-01").unwrap(), 200.0),
//!     Sample::new(parse_date("2024-01-08").unwrap(), 195.0),
//!     Sample::new(parse_date("2024-01-15").unwrap(), 190.0),
//! ]);
//!
//! match TrendAnalyzer::default().analyze(&series) {
//!     Analysis::Ready(result) => {
//!         assert_eq!(result.total_delta.value, -10.0);
//!         assert!(result.dispersion.is_ok());
//!         assert!(result.forecast.is_err()); // needs 5 samples
//!     },
//!     Analysis::NoData => unreachable!(),
//! }
//! ```
//!
//! # Sections
//!
//! | Section | Minimum samples | Unavailable as |
//! |---------|-----------------|----------------|
//! | total / window deltas | 1 | `single-sample` / `empty` status |
//! | dispersion | 2 | `TrendError::InsufficientSamples` |
//! | EMA 7/30/90 | 2 | `TrendError::InsufficientSamples` |
//! | forecast 7/30 | 5 | `InsufficientSamples` or `ModelFit` |

pub mod analyzer;
pub mod dispersion;
pub mod ema;
pub mod error;
pub mod forecast;
pub mod window;

// Re-exports for convenience
pub use analyzer::{AnalyzerConfig, Analysis, TrendAnalyzer, TrendResult, WindowDelta};
pub use dispersion::{dispersion, Dispersion};
pub use ema::{ema_curve, EmaReport, EmaSummary, TrendWarning, EMA_SPANS};
pub use error::{Result, TrendError};
pub use forecast::{
    forecast_series, ArimaModel, Forecast, ForecastPoint, DEFAULT_CONFIDENCE, FORECAST_HORIZONS,
    MIN_FORECAST_SAMPLES,
};
pub use window::{delta, filter_window, total_delta, window_delta, DeltaReport, DeltaStatus, WINDOWS};

/// Round to one decimal place, the precision every reported figure uses
pub fn round1(value: f64) -> f64 {
    let rounded = (value * 10.0).round() / 10.0;
    // Avoid reporting "-0.0"
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}
