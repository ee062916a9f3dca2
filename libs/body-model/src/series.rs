//! Samples and date-ordered series
//!
//! A `Series` holds at most one `Sample` per calendar date, ordered by date.
//! Every constructor and mutator keeps that invariant.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One measurement on one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub date: NaiveDate,
    pub value: f64,
}

impl Sample {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Samples for one user and one metric with strictly increasing dates
///
/// Serialized as a plain list of samples; deserializing goes through
/// [`Series::from_samples`], so unordered or duplicated input is repaired.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Sample>", into = "Vec<Sample>")]
pub struct Series {
    samples: Vec<Sample>,
}

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a series from unordered samples
    ///
    /// Samples are sorted by date. When a date appears more than once the
    /// later entry in `samples` wins, matching insert-or-update semantics.
    pub fn from_samples(samples: Vec<Sample>) -> Self {
        let mut series = Self::new();
        for sample in samples {
            series.upsert(sample);
        }
        series
    }

    /// Insert a sample, replacing any sample already stored for that date
    ///
    /// Returns the replaced value, if any.
    pub fn upsert(&mut self, sample: Sample) -> Option<f64> {
        match self.samples.binary_search_by_key(&sample.date, |s| s.date) {
            Ok(idx) => {
                let previous = self.samples[idx].value;
                self.samples[idx].value = sample.value;
                Some(previous)
            },
            Err(idx) => {
                self.samples.insert(idx, sample);
                None
            },
        }
    }

    /// Remove the sample stored for `date`
    pub fn remove(&mut self, date: NaiveDate) -> Option<Sample> {
        self.samples
            .binary_search_by_key(&date, |s| s.date)
            .ok()
            .map(|idx| self.samples.remove(idx))
    }

    /// Samples with `start <= date <= end`, as a new series
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> Series {
        Series {
            samples: self
                .samples
                .iter()
                .filter(|s| s.date >= start && s.date <= end)
                .copied()
                .collect(),
        }
    }

    /// Sample stored for `date`
    pub fn get(&self, date: NaiveDate) -> Option<&Sample> {
        self.samples
            .binary_search_by_key(&date, |s| s.date)
            .ok()
            .map(|idx| &self.samples[idx])
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Values in date order
    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.value).collect()
    }

    pub fn first(&self) -> Option<&Sample> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }
}

impl FromIterator<Sample> for Series {
    fn from_iter<I: IntoIterator<Item = Sample>>(iter: I) -> Self {
        Self::from_samples(iter.into_iter().collect())
    }
}

impl From<Vec<Sample>> for Series {
    fn from(samples: Vec<Sample>) -> Self {
        Self::from_samples(samples)
    }
}

impl From<Series> for Vec<Sample> {
    fn from(series: Series) -> Self {
        series.samples
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_from_samples_sorts_by_date() {
        let series = Series::from_samples(vec![
            Sample::new(day(15), 190.0),
            Sample::new(day(1), 200.0),
            Sample::new(day(8), 195.0),
        ]);

        let dates: Vec<_> = series.iter().map(|s| s.date).collect();
        assert_eq!(dates, vec![day(1), day(8), day(15)]);
    }

    #[test]
    fn test_duplicate_date_last_write_wins() {
        let series = Series::from_samples(vec![
            Sample::new(day(1), 200.0),
            Sample::new(day(1), 199.5),
        ]);

        assert_eq!(series.len(), 1);
        assert_eq!(series.first().unwrap().value, 199.5);
    }

    #[test]
    fn test_upsert_reports_replaced_value() {
        let mut series = Series::new();
        assert_eq!(series.upsert(Sample::new(day(3), 180.0)), None);
        assert_eq!(series.upsert(Sample::new(day(3), 181.0)), Some(180.0));
        assert_eq!(series.get(day(3)).unwrap().value, 181.0);
    }

    #[test]
    fn test_remove() {
        let mut series = Series::from_samples(vec![
            Sample::new(day(1), 1.0),
            Sample::new(day(2), 2.0),
        ]);

        assert!(series.remove(day(5)).is_none());
        assert_eq!(series.remove(day(1)).unwrap().value, 1.0);
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn test_between_is_inclusive() {
        let series: Series = (1..=10).map(|d| Sample::new(day(d), d as f64)).collect();
        let slice = series.between(day(3), day(5));

        assert_eq!(slice.values(), vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_deserialize_restores_date_order() {
        let json = r#"[
            {"date": "2024-01-08", "value": 195.0},
            {"date": "2024-01-01", "value": 200.0},
            {"date": "2024-01-08", "value": 194.5}
        ]"#;
        let series: Series = serde_json::from_str(json).unwrap();

        let dates: Vec<_> = series.iter().map(|s| s.date).collect();
        assert_eq!(dates, vec![day(1), day(8)]);
        assert_eq!(series.get(day(8)).unwrap().value, 194.5);

        let text = serde_json::to_string(&series).unwrap();
        assert!(text.starts_with(r#"[{"date":"2024-01-01","value":200.0}"#));
    }
}
