//! Exponential moving averages
//!
//! Formula: `EMA_0 = v_0`, `EMA_i = α * v_i + (1 - α) * EMA_{i-1}` with
//! `α = 2 / (span + 1)`. Spans are decay constants over the whole history,
//! not day windows.

use crate::error::{require_samples, Result};
use crate::round1;

/// Spans reported by the analyzer
pub const EMA_SPANS: [u32; 3] = [7, 30, 90];

/// Minimum samples for an EMA
pub const MIN_EMA_SAMPLES: usize = 2;

/// Smoothing factor for a span
pub fn alpha(span: u32) -> f64 {
    2.0 / (f64::from(span) + 1.0)
}

/// EMA at every position of `values`
pub fn ema_curve(values: &[f64], span: u32) -> Vec<f64> {
    let alpha = alpha(span);
    let mut curve = Vec::with_capacity(values.len());
    let mut iter = values.iter();

    if let Some(&first) = iter.next() {
        let mut current = first;
        curve.push(current);
        for &value in iter {
            current = alpha * value + (1.0 - alpha) * current;
            curve.push(current);
        }
    }

    curve
}

/// EMA for one span
#[derive(Debug, Clone, PartialEq)]
pub struct EmaReport {
    pub span: u32,
    /// Last element of `curve`, rounded to one decimal
    pub value: f64,
    /// Unrounded EMA aligned with the input samples
    pub curve: Vec<f64>,
}

/// EMAs for all reported spans
#[derive(Debug, Clone, PartialEq)]
pub struct EmaSummary {
    pub reports: Vec<EmaReport>,
}

impl EmaSummary {
    /// Compute an EMA for each span over the full history
    pub fn compute(values: &[f64], spans: &[u32]) -> Result<Self> {
        require_samples(values.len(), MIN_EMA_SAMPLES)?;

        let reports = spans
            .iter()
            .map(|&span| {
                let curve = ema_curve(values, span);
                let value = curve.last().copied().map(round1).unwrap_or_default();
                EmaReport { span, value, curve }
            })
            .collect();

        Ok(Self { reports })
    }

    pub fn get(&self, span: u32) -> Option<&EmaReport> {
        self.reports.iter().find(|r| r.span == span)
    }

    /// Reported (rounded) value for a span
    pub fn value(&self, span: u32) -> Option<f64> {
        self.get(span).map(|r| r.value)
    }

    /// Short-over-long crossings, compared on the reported values
    pub fn warnings(&self) -> Vec<TrendWarning> {
        let mut warnings = Vec::new();
        if let (Some(short), Some(mid)) = (self.value(7), self.value(30)) {
            if short > mid {
                warnings.push(TrendWarning::UpwardTrend);
            }
        }
        if let (Some(mid), Some(long)) = (self.value(30), self.value(90)) {
            if mid > long {
                warnings.push(TrendWarning::ProlongedUpwardTrend);
            }
        }
        warnings
    }
}

/// Direction flags raised by EMA crossings
///
/// "Upward" means the value is rising; whether that is bad news depends on
/// the metric and is decided by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendWarning {
    /// EMA(7) above EMA(30)
    UpwardTrend,
    /// EMA(30) above EMA(90)
    ProlongedUpwardTrend,
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    #[test]
    fn test_alpha() {
        assert_eq!(alpha(3), 0.5);
        assert_eq!(alpha(1), 1.0);
    }

    #[test]
    fn test_ema_curve_recursion() {
        let curve = ema_curve(&[1.0, 2.0, 4.0], 3);
        assert_eq!(curve, vec![1.0, 1.5, 2.75]);
    }

    #[test]
    fn test_constant_series() {
        let summary = EmaSummary::compute(&[180.0; 12], &EMA_SPANS).unwrap();
        for span in EMA_SPANS {
            assert_eq!(summary.value(span), Some(180.0));
        }
        assert!(summary.warnings().is_empty());
    }

    #[test]
    fn test_order_dependent() {
        let values = [200.0, 195.0, 190.0, 188.0, 186.0];
        let reversed: Vec<f64> = values.iter().rev().copied().collect();

        let forward = ema_curve(&values, 7);
        let backward = ema_curve(&reversed, 7);
        assert_ne!(forward.last(), backward.last());
    }

    #[test]
    fn test_rising_series_warns() {
        let values: Vec<f64> = (0..40).map(|i| 150.0 + i as f64).collect();
        let summary = EmaSummary::compute(&values, &EMA_SPANS).unwrap();

        assert_eq!(
            summary.warnings(),
            vec![TrendWarning::UpwardTrend, TrendWarning::ProlongedUpwardTrend]
        );
    }

    #[test]
    fn test_falling_series_does_not_warn() {
        let values: Vec<f64> = (0..40).map(|i| 200.0 - i as f64 * 0.5).collect();
        let summary = EmaSummary::compute(&values, &EMA_SPANS).unwrap();
        assert!(summary.warnings().is_empty());
    }

    #[test]
    fn test_requires_two_samples() {
        assert!(EmaSummary::compute(&[150.0], &EMA_SPANS).is_err());
    }
}
