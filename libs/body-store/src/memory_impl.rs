//! In-memory record store
//!
//! Mirrors the SQLite backend for tests and dry runs.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use body_model::{Metric, RunRecord, Sample, Series};
use chrono::NaiveDate;
use errors::Result;
use tokio::sync::RwLock;

use crate::traits::{Entry, EntryKind, RecordStore, UpsertOutcome};

/// In-memory store for a single user
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    weights: Arc<RwLock<Series>>,
    runs: Arc<RwLock<BTreeMap<NaiveDate, RunRecord>>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all data (useful for testing)
    pub async fn clear(&self) {
        *self.weights.write().await = Series::new();
        self.runs.write().await.clear();
    }

    async fn run_series(&self, metric: Metric) -> Series {
        self.runs
            .read()
            .await
            .values()
            .filter_map(|run| run.value(metric).map(|v| Sample::new(run.date, v)))
            .collect()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn load_series(&self, metric: Metric) -> Result<Series> {
        match EntryKind::from(metric) {
            EntryKind::Weight => Ok(self.weights.read().await.clone()),
            EntryKind::Run => Ok(self.run_series(metric).await),
        }
    }

    async fn load_window(
        &self,
        metric: Metric,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Series> {
        Ok(self.load_series(metric).await?.between(start, end))
    }

    async fn upsert(&self, entry: Entry) -> Result<UpsertOutcome> {
        let replaced = match entry {
            Entry::Weight(sample) => self.weights.write().await.upsert(sample).is_some(),
            Entry::Run(run) => self.runs.write().await.insert(run.date, run).is_some(),
        };

        Ok(if replaced {
            UpsertOutcome::Updated
        } else {
            UpsertOutcome::Added
        })
    }

    async fn delete(&self, kind: EntryKind, date: NaiveDate) -> Result<bool> {
        let removed = match kind {
            EntryKind::Weight => self.weights.write().await.remove(date).is_some(),
            EntryKind::Run => self.runs.write().await.remove(&date).is_some(),
        };
        Ok(removed)
    }

    async fn latest(&self, kind: EntryKind, limit: usize) -> Result<Vec<Entry>> {
        let entries = match kind {
            EntryKind::Weight => self
                .weights
                .read()
                .await
                .samples()
                .iter()
                .rev()
                .take(limit)
                .map(|s| Entry::Weight(*s))
                .collect(),
            EntryKind::Run => self
                .runs
                .read()
                .await
                .values()
                .rev()
                .take(limit)
                .map(|r| Entry::Run(*r))
                .collect(),
        };
        Ok(entries)
    }

    async fn count(&self, kind: EntryKind) -> Result<usize> {
        Ok(match kind {
            EntryKind::Weight => self.weights.read().await.len(),
            EntryKind::Run => self.runs.read().await.len(),
        })
    }
}
