//! Windowed deltas
//!
//! A window of N days is every sample dated within N days of an anchor date,
//! inclusive on both ends. The anchor is normally the latest sample's date.

use body_model::Series;
use chrono::{Days, NaiveDate};

use crate::error::{Result, TrendError};
use crate::round1;

/// Window sizes reported by the analyzer, in days
pub const WINDOWS: [u32; 3] = [7, 30, 90];

/// How much data a delta was computed from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaStatus {
    /// Two or more samples; `value` is last minus first
    Ok,
    /// Exactly one sample; `value` is 0.0
    SingleSample,
    /// No samples; `value` is 0.0 and there are no endpoints
    Empty,
}

impl DeltaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::SingleSample => "single-sample",
            Self::Empty => "empty",
        }
    }
}

/// Signed change between the first and last sample of a span
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaReport {
    pub status: DeltaStatus,
    /// `last - first`, rounded to one decimal
    pub value: f64,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub sample_count: usize,
}

impl DeltaReport {
    fn empty() -> Self {
        Self {
            status: DeltaStatus::Empty,
            value: 0.0,
            start: None,
            end: None,
            sample_count: 0,
        }
    }

    /// Whether `value` reflects a real difference
    pub fn is_computed(&self) -> bool {
        self.status == DeltaStatus::Ok
    }
}

/// Delta across the whole of `series`
///
/// 0 samples → `Empty`, 1 sample → `SingleSample` with that date as both
/// endpoints, otherwise `Ok` with `round1(last - first)`.
pub fn delta(series: &Series) -> DeltaReport {
    let (first, last) = match (series.first(), series.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return DeltaReport::empty(),
    };

    if series.len() == 1 {
        return DeltaReport {
            status: DeltaStatus::SingleSample,
            value: 0.0,
            start: Some(first.date),
            end: Some(last.date),
            sample_count: 1,
        };
    }

    DeltaReport {
        status: DeltaStatus::Ok,
        value: round1(last.value - first.value),
        start: Some(first.date),
        end: Some(last.date),
        sample_count: series.len(),
    }
}

/// Delta from the first sample to the most recent one
///
/// Undefined on an empty series.
pub fn total_delta(series: &Series) -> Result<DeltaReport> {
    if series.is_empty() {
        return Err(TrendError::EmptySeries);
    }
    Ok(delta(series))
}

/// Samples dated in `[anchor - days, anchor]`
pub fn filter_window(series: &Series, days: u32, anchor: NaiveDate) -> Series {
    let start = anchor
        .checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MIN);
    series.between(start, anchor)
}

/// Delta over the last `days` days
///
/// `anchor` defaults to the latest sample's date.
pub fn window_delta(series: &Series, days: u32, anchor: Option<NaiveDate>) -> DeltaReport {
    let anchor = match anchor.or_else(|| series.last().map(|s| s.date)) {
        Some(anchor) => anchor,
        None => return DeltaReport::empty(),
    };
    delta(&filter_window(series, days, anchor))
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use body_model::Sample;

    fn date(s: &str) -> NaiveDate {
        body_model::parse_date(s).unwrap()
    }

    fn series(points: &[(&str, f64)]) -> Series {
        points
            .iter()
            .map(|(d, v)| Sample::new(date(d), *v))
            .collect()
    }

    #[test]
    fn test_delta_many_samples() {
        let s = series(&[("2024-01-01", 200.0), ("2024-01-08", 195.0), ("2024-01-15", 190.3)]);
        let report = delta(&s);

        assert_eq!(report.status, DeltaStatus::Ok);
        assert_eq!(report.value, -9.7);
        assert_eq!(report.start, Some(date("2024-01-01")));
        assert_eq!(report.end, Some(date("2024-01-15")));
    }

    #[test]
    fn test_delta_single_sample_uses_date_for_both_ends() {
        let s = series(&[("2024-01-01", 150.0)]);
        let report = delta(&s);

        assert_eq!(report.status, DeltaStatus::SingleSample);
        assert_eq!(report.value, 0.0);
        assert_eq!(report.start, report.end);
        assert!(!report.is_computed());
    }

    #[test]
    fn test_total_delta_empty_is_error() {
        assert_eq!(total_delta(&Series::new()), Err(TrendError::EmptySeries));
    }

    #[test]
    fn test_window_is_inclusive_of_boundary() {
        let s = series(&[("2024-01-01", 200.0), ("2024-01-08", 198.0), ("2024-01-09", 197.0)]);

        // 2024-01-09 minus 8 days is 2024-01-01: included
        let report = window_delta(&s, 8, None);
        assert_eq!(report.sample_count, 3);
        assert_eq!(report.value, -3.0);

        // 7 days back stops at 2024-01-02
        let report = window_delta(&s, 7, None);
        assert_eq!(report.sample_count, 2);
        assert_eq!(report.value, -1.0);
    }

    #[test]
    fn test_window_single_and_empty() {
        let s = series(&[("2024-01-01", 200.0), ("2024-03-01", 190.0)]);

        let report = window_delta(&s, 7, None);
        assert_eq!(report.status, DeltaStatus::SingleSample);
        assert_eq!(report.start, Some(date("2024-03-01")));

        let report = window_delta(&s, 7, Some(date("2024-06-01")));
        assert_eq!(report.status, DeltaStatus::Empty);
        assert_eq!(report.start, None);
    }

    #[test]
    fn test_window_on_empty_series() {
        assert_eq!(window_delta(&Series::new(), 30, None).status, DeltaStatus::Empty);
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(DeltaStatus::SingleSample.as_str(), "single-sample");
        assert_eq!(DeltaStatus::Empty.as_str(), "empty");
    }
}
