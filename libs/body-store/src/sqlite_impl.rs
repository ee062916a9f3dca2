//! SQLite record store
//!
//! One database file per user with two tables:
//!
//! ```sql
//! records (date TEXT, weight REAL)
//! runs    (date TEXT, distance REAL, duration REAL)
//! ```
//!
//! Dates are written as zero-padded `YYYY-MM-DD` so text order is date order
//! and range queries can compare strings. Older files may hold unpadded dates
//! (`2017-1-5`) or repeated dates: opening for writing rewrites them, and a
//! read-only store with such rows filters in memory instead.

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use body_model::{format_date, parse_date, Metric, RunRecord, Sample, Series};
use chrono::NaiveDate;
use common::sqlite::SqliteClient;
use errors::Result;
use sqlx::{sqlite::SqliteRow, Row};
use tracing::{debug, info};

use crate::traits::{Entry, EntryKind, RecordStore, UpsertOutcome};

const CREATE_RECORDS: &str = "CREATE TABLE IF NOT EXISTS records (date TEXT, weight REAL)";
const CREATE_RUNS: &str =
    "CREATE TABLE IF NOT EXISTS runs (date TEXT, distance REAL, duration REAL)";

/// Matches the zero-padded form only
const PADDED_GLOB: &str = "[0-9][0-9][0-9][0-9]-[0-9][0-9]-[0-9][0-9]";

/// Store backed by one user's SQLite file
#[derive(Clone)]
pub struct SqliteRecordStore {
    client: SqliteClient,
    has_records: bool,
    has_runs: bool,
    /// Every stored date is padded and unique, so SQL can match on the text
    normalized: bool,
}

impl SqliteRecordStore {
    /// Open for writing, creating the file and tables when missing
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let client = SqliteClient::new(path).await?;
        Self::with_client(client).await
    }

    /// Open an existing file read-only
    ///
    /// Tables that were never created read as empty.
    pub async fn open_readonly(path: impl AsRef<Path>) -> Result<Self> {
        let client = SqliteClient::new_readonly(path).await?;
        let has_records = table_exists(&client, "records").await?;
        let has_runs = table_exists(&client, "runs").await?;

        let mut normalized = true;
        for (table, present) in [("records", has_records), ("runs", has_runs)] {
            if present && has_legacy_dates(&client, table).await? {
                debug!("{} has legacy dates, filtering in memory", table);
                normalized = false;
            }
        }

        Ok(Self {
            client,
            has_records,
            has_runs,
            normalized,
        })
    }

    /// Wrap a writable client and make sure the schema exists
    pub async fn with_client(client: SqliteClient) -> Result<Self> {
        sqlx::query(CREATE_RECORDS).execute(client.pool()).await?;
        sqlx::query(CREATE_RUNS).execute(client.pool()).await?;
        for table in ["records", "runs"] {
            let changed = normalize_dates(&client, table).await?;
            if changed > 0 {
                info!("rewrote {} legacy rows in {}", changed, table);
            }
        }
        debug!("schema ready: {}", client.path().display());

        Ok(Self {
            client,
            has_records: true,
            has_runs: true,
            normalized: true,
        })
    }

    pub fn client(&self) -> &SqliteClient {
        &self.client
    }

    /// Release the connection pool
    pub async fn close(&self) {
        self.client.close().await;
    }

    fn has_table(&self, kind: EntryKind) -> bool {
        match kind {
            EntryKind::Weight => self.has_records,
            EntryKind::Run => self.has_runs,
        }
    }

    async fn load_entries(
        &self,
        kind: EntryKind,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<Entry>> {
        if !self.has_table(kind) {
            return Ok(Vec::new());
        }

        let (columns, table) = match kind {
            EntryKind::Weight => ("date, weight", "records"),
            EntryKind::Run => ("date, distance, duration", "runs"),
        };

        let rows = match range {
            Some((start, end)) => {
                let sql = format!(
                    "SELECT {} FROM {} WHERE date BETWEEN ? AND ? ORDER BY date, rowid",
                    columns, table
                );
                sqlx::query(&sql)
                    .bind(format_date(start))
                    .bind(format_date(end))
                    .fetch_all(self.client.pool())
                    .await?
            },
            None => {
                let sql = format!("SELECT {} FROM {} ORDER BY date, rowid", columns, table);
                sqlx::query(&sql).fetch_all(self.client.pool()).await?
            },
        };

        rows.iter().map(|row| hydrate(kind, row)).collect()
    }
}

/// Build an entry from a row selected with the table's columns
fn hydrate(kind: EntryKind, row: &SqliteRow) -> Result<Entry> {
    let date: String = row.try_get("date")?;
    let date = parse_date(date.trim())?;

    match kind {
        EntryKind::Weight => Ok(Entry::Weight(Sample::new(date, row.try_get("weight")?))),
        EntryKind::Run => Ok(Entry::Run(RunRecord::new(
            date,
            row.try_get("distance")?,
            row.try_get("duration")?,
        ))),
    }
}

/// Turn entries into a series of one metric
///
/// Duplicate dates from older databases collapse to the last row.
fn to_series(entries: Vec<Entry>, metric: Metric) -> Series {
    Series::from_samples(
        entries
            .into_iter()
            .filter_map(|e| e.value(metric).map(|v| Sample::new(e.date(), v)))
            .collect(),
    )
}

/// Whether `table` holds a date that is not zero-padded or appears twice
async fn has_legacy_dates(client: &SqliteClient, table: &str) -> Result<bool> {
    let sql = format!(
        "SELECT (SELECT COUNT(*) FROM {table} WHERE date NOT GLOB ?) \
         + (SELECT COUNT(*) - COUNT(DISTINCT date) FROM {table})",
        table = table
    );
    let legacy: i64 = sqlx::query_scalar(&sql)
        .bind(PADDED_GLOB)
        .fetch_one(client.pool())
        .await?;
    Ok(legacy > 0)
}

/// Rewrite dates to the padded form and keep one row per date
///
/// The row inserted last wins. Runs in one transaction; returns the number of
/// rows rewritten or removed.
async fn normalize_dates(client: &SqliteClient, table: &str) -> Result<usize> {
    let mut tx = client.pool().begin().await?;

    let rows = sqlx::query(&format!("SELECT rowid AS id, date FROM {} ORDER BY rowid", table))
        .fetch_all(&mut *tx)
        .await?;

    let mut keep: BTreeMap<NaiveDate, (i64, String)> = BTreeMap::new();
    let mut stale = Vec::new();
    for row in &rows {
        let id: i64 = row.try_get("id")?;
        let text: String = row.try_get("date")?;
        let date = parse_date(text.trim())?;
        if let Some((old, _)) = keep.insert(date, (id, text)) {
            stale.push(old);
        }
    }

    let mut changed = 0;
    for id in stale {
        sqlx::query(&format!("DELETE FROM {} WHERE rowid = ?", table))
            .bind(id)
            .execute(&mut *tx)
            .await?;
        changed += 1;
    }
    for (date, (id, text)) in &keep {
        let padded = format_date(*date);
        if *text != padded {
            sqlx::query(&format!("UPDATE {} SET date = ? WHERE rowid = ?", table))
                .bind(&padded)
                .bind(id)
                .execute(&mut *tx)
                .await?;
            changed += 1;
        }
    }

    tx.commit().await?;
    Ok(changed)
}

async fn table_exists(client: &SqliteClient, table: &str) -> Result<bool> {
    let row = sqlx::query("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?")
        .bind(table)
        .fetch_optional(client.pool())
        .await?;
    Ok(row.is_some())
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn load_series(&self, metric: Metric) -> Result<Series> {
        let entries = self.load_entries(metric.into(), None).await?;
        Ok(to_series(entries, metric))
    }

    async fn load_window(
        &self,
        metric: Metric,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Series> {
        if start > end {
            return Ok(Series::new());
        }
        if !self.normalized {
            return Ok(self.load_series(metric).await?.between(start, end));
        }
        let entries = self.load_entries(metric.into(), Some((start, end))).await?;
        Ok(to_series(entries, metric))
    }

    async fn upsert(&self, entry: Entry) -> Result<UpsertOutcome> {
        let date = format_date(entry.date());
        let mut tx = self.client.pool().begin().await?;

        let (select, update, insert) = match entry.kind() {
            EntryKind::Weight => (
                "SELECT 1 FROM records WHERE date = ?",
                "UPDATE records SET weight = ? WHERE date = ?",
                "INSERT INTO records (weight, date) VALUES (?, ?)",
            ),
            EntryKind::Run => (
                "SELECT 1 FROM runs WHERE date = ?",
                "UPDATE runs SET distance = ?, duration = ? WHERE date = ?",
                "INSERT INTO runs (distance, duration, date) VALUES (?, ?, ?)",
            ),
        };

        let exists = sqlx::query(select)
            .bind(&date)
            .fetch_optional(&mut *tx)
            .await?
            .is_some();

        let statement = if exists { update } else { insert };
        let query = match entry {
            Entry::Weight(sample) => sqlx::query(statement).bind(sample.value),
            Entry::Run(run) => sqlx::query(statement).bind(run.distance).bind(run.duration),
        };
        query.bind(&date).execute(&mut *tx).await?;

        tx.commit().await?;

        let outcome = if exists {
            UpsertOutcome::Updated
        } else {
            UpsertOutcome::Added
        };
        debug!("{} {} on {}", outcome.as_str(), entry.kind().as_str(), date);
        Ok(outcome)
    }

    async fn delete(&self, kind: EntryKind, date: NaiveDate) -> Result<bool> {
        if !self.has_table(kind) {
            return Ok(false);
        }

        let sql = match kind {
            EntryKind::Weight => "DELETE FROM records WHERE date = ?",
            EntryKind::Run => "DELETE FROM runs WHERE date = ?",
        };
        let result = sqlx::query(sql)
            .bind(format_date(date))
            .execute(self.client.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn latest(&self, kind: EntryKind, limit: usize) -> Result<Vec<Entry>> {
        // Through the series so duplicate legacy rows are not listed twice
        let entries = self.load_entries(kind, None).await?;
        let mut by_date = std::collections::BTreeMap::new();
        for entry in entries {
            by_date.insert(entry.date(), entry);
        }
        Ok(by_date.into_values().rev().take(limit).collect())
    }

    async fn count(&self, kind: EntryKind) -> Result<usize> {
        if !self.has_table(kind) {
            return Ok(0);
        }
        if !self.normalized {
            return Ok(self.latest(kind, usize::MAX).await?.len());
        }

        let sql = match kind {
            EntryKind::Weight => "SELECT COUNT(DISTINCT date) FROM records",
            EntryKind::Run => "SELECT COUNT(DISTINCT date) FROM runs",
        };
        let count: i64 = sqlx::query_scalar(sql)
            .fetch_one(self.client.pool())
            .await?;
        Ok(count as usize)
    }
}
