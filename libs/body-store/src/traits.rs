//! Trait definitions for record storage

use async_trait::async_trait;
use body_model::{Metric, RunRecord, Sample, Series};
use chrono::NaiveDate;
use errors::Result;

/// Which table a record lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// One weight per date
    Weight,
    /// One run (distance and duration) per date
    Run,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weight => "weight",
            Self::Run => "run",
        }
    }
}

impl From<Metric> for EntryKind {
    fn from(metric: Metric) -> Self {
        if metric.is_run() {
            Self::Run
        } else {
            Self::Weight
        }
    }
}

/// A stored row of either kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Entry {
    Weight(Sample),
    Run(RunRecord),
}

impl Entry {
    pub fn date(&self) -> NaiveDate {
        match self {
            Self::Weight(sample) => sample.date,
            Self::Run(run) => run.date,
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            Self::Weight(_) => EntryKind::Weight,
            Self::Run(_) => EntryKind::Run,
        }
    }

    /// Value of `metric` carried by this entry, if any
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match (self, metric) {
            (Self::Weight(sample), Metric::Weight) => Some(sample.value),
            (Self::Run(run), _) => run.value(metric),
            _ => None,
        }
    }
}

/// What an upsert did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No row existed for the date
    Added,
    /// An existing row was overwritten
    Updated,
}

impl UpsertOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "Added",
            Self::Updated => "Updated",
        }
    }
}

/// Storage for one user's records
///
/// Implementations:
/// - `SqliteRecordStore`: one SQLite file per user
/// - `MemoryRecordStore`: in-memory backend for testing
///
/// Every series returned is ordered by date with at most one sample per date.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Full history of `metric`, empty when nothing is stored
    async fn load_series(&self, metric: Metric) -> Result<Series>;

    /// Samples of `metric` dated in `[start, end]`
    ///
    /// Same result as filtering `load_series` in memory.
    async fn load_window(&self, metric: Metric, start: NaiveDate, end: NaiveDate)
        -> Result<Series>;

    /// Insert the entry, or replace the stored row for its date
    async fn upsert(&self, entry: Entry) -> Result<UpsertOutcome>;

    /// Delete the row for `date`; `false` when there was none
    async fn delete(&self, kind: EntryKind, date: NaiveDate) -> Result<bool>;

    /// Up to `limit` most recent entries, newest first
    async fn latest(&self, kind: EntryKind, limit: usize) -> Result<Vec<Entry>>;

    /// Number of stored rows
    async fn count(&self, kind: EntryKind) -> Result<usize>;
}
