//! Consistency tests for record store implementations
//!
//! Every check runs against `MemoryRecordStore` and a `SqliteRecordStore` on
//! a temporary file; both must give the same answers.

// Allow unwrap() in tests for cleaner test code
#![allow(clippy::disallowed_methods)]

use body_model::{parse_date, Metric, RunRecord, Sample, Series};
use body_store::{
    Entry, EntryKind, MemoryRecordStore, RecordStore, SqliteRecordStore, UpsertOutcome,
};
use chrono::NaiveDate;
use tempfile::TempDir;

fn date(s: &str) -> NaiveDate {
    parse_date(s).unwrap()
}

fn weight(d: &str, value: f64) -> Entry {
    Entry::Weight(Sample::new(date(d), value))
}

async fn sqlite_store(dir: &TempDir) -> SqliteRecordStore {
    SqliteRecordStore::open(dir.path().join("users").join("test.db"))
        .await
        .unwrap()
}

async fn seed(store: &dyn RecordStore) {
    // Inserted out of order on purpose
    for (d, v) in [
        ("2024-01-15", 190.0),
        ("2024-01-01", 200.0),
        ("2024-01-29", 186.0),
        ("2024-01-08", 195.0),
        ("2024-01-22", 188.0),
    ] {
        store.upsert(weight(d, v)).await.unwrap();
    }
}

// ============================================================================
// Ordering and windows
// ============================================================================

async fn check_series_is_ordered(store: &dyn RecordStore) {
    seed(store).await;
    let series = store.load_series(Metric::Weight).await.unwrap();

    let dates: Vec<NaiveDate> = series.iter().map(|s| s.date).collect();
    let mut sorted = dates.clone();
    sorted.sort();
    assert_eq!(dates, sorted);
    assert_eq!(series.values(), vec![200.0, 195.0, 190.0, 188.0, 186.0]);
}

#[tokio::test]
async fn test_memory_series_is_ordered() {
    check_series_is_ordered(&MemoryRecordStore::new()).await;
}

#[tokio::test]
async fn test_sqlite_series_is_ordered() {
    let dir = TempDir::new().unwrap();
    check_series_is_ordered(&sqlite_store(&dir).await).await;
}

async fn check_window_matches_memory_filter(store: &dyn RecordStore) {
    seed(store).await;
    let full: Series = store.load_series(Metric::Weight).await.unwrap();

    let ranges = [
        ("2024-01-08", "2024-01-22"),
        ("2024-01-09", "2024-01-21"),
        ("2023-12-01", "2024-01-01"),
        ("2024-02-01", "2024-03-01"),
        ("2024-01-29", "2024-01-01"),
    ];
    for (start, end) in ranges {
        let window = store
            .load_window(Metric::Weight, date(start), date(end))
            .await
            .unwrap();
        assert_eq!(window, full.between(date(start), date(end)), "{}..{}", start, end);
    }
}

#[tokio::test]
async fn test_memory_window_matches_memory_filter() {
    check_window_matches_memory_filter(&MemoryRecordStore::new()).await;
}

#[tokio::test]
async fn test_sqlite_window_matches_memory_filter() {
    let dir = TempDir::new().unwrap();
    check_window_matches_memory_filter(&sqlite_store(&dir).await).await;
}

// ============================================================================
// Upsert and delete
// ============================================================================

async fn check_upsert_replaces(store: &dyn RecordStore) {
    assert_eq!(
        store.upsert(weight("2024-01-01", 200.0)).await.unwrap(),
        UpsertOutcome::Added
    );
    assert_eq!(
        store.upsert(weight("2024-01-01", 198.4)).await.unwrap(),
        UpsertOutcome::Updated
    );

    let series = store.load_series(Metric::Weight).await.unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series.values(), vec![198.4]);
    assert_eq!(store.count(EntryKind::Weight).await.unwrap(), 1);
}

#[tokio::test]
async fn test_memory_upsert_replaces() {
    check_upsert_replaces(&MemoryRecordStore::new()).await;
}

#[tokio::test]
async fn test_sqlite_upsert_replaces() {
    let dir = TempDir::new().unwrap();
    check_upsert_replaces(&sqlite_store(&dir).await).await;
}

async fn check_delete(store: &dyn RecordStore) {
    seed(store).await;

    assert!(store.delete(EntryKind::Weight, date("2024-01-08")).await.unwrap());
    assert!(!store.delete(EntryKind::Weight, date("2024-01-08")).await.unwrap());
    // Run table is separate
    assert!(!store.delete(EntryKind::Run, date("2024-01-15")).await.unwrap());

    let series = store.load_series(Metric::Weight).await.unwrap();
    assert_eq!(series.len(), 4);
    assert!(series.get(date("2024-01-08")).is_none());
}

#[tokio::test]
async fn test_memory_delete() {
    check_delete(&MemoryRecordStore::new()).await;
}

#[tokio::test]
async fn test_sqlite_delete() {
    let dir = TempDir::new().unwrap();
    check_delete(&sqlite_store(&dir).await).await;
}

// ============================================================================
// Runs and listing
// ============================================================================

async fn check_runs(store: &dyn RecordStore) {
    let first = RunRecord::new(date("2024-02-01"), 3.1, 29.5);
    let second = RunRecord::new(date("2024-02-03"), 5.0, 47.0);

    assert_eq!(store.upsert(Entry::Run(second)).await.unwrap(), UpsertOutcome::Added);
    assert_eq!(store.upsert(Entry::Run(first)).await.unwrap(), UpsertOutcome::Added);
    let faster = RunRecord::new(date("2024-02-03"), 5.0, 44.0);
    assert_eq!(store.upsert(Entry::Run(faster)).await.unwrap(), UpsertOutcome::Updated);

    let distance = store.load_series(Metric::RunDistance).await.unwrap();
    let duration = store.load_series(Metric::RunDuration).await.unwrap();
    assert_eq!(distance.values(), vec![3.1, 5.0]);
    assert_eq!(duration.values(), vec![29.5, 44.0]);

    let latest = store.latest(EntryKind::Run, 1).await.unwrap();
    assert_eq!(latest, vec![Entry::Run(faster)]);
    assert!(store.load_series(Metric::Weight).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_memory_runs() {
    check_runs(&MemoryRecordStore::new()).await;
}

#[tokio::test]
async fn test_sqlite_runs() {
    let dir = TempDir::new().unwrap();
    check_runs(&sqlite_store(&dir).await).await;
}

async fn check_latest_newest_first(store: &dyn RecordStore) {
    seed(store).await;

    let latest = store.latest(EntryKind::Weight, 3).await.unwrap();
    let dates: Vec<NaiveDate> = latest.iter().map(Entry::date).collect();
    assert_eq!(
        dates,
        vec![date("2024-01-29"), date("2024-01-22"), date("2024-01-15")]
    );

    let all = store.latest(EntryKind::Weight, 100).await.unwrap();
    assert_eq!(all.len(), 5);
}

#[tokio::test]
async fn test_memory_latest_newest_first() {
    check_latest_newest_first(&MemoryRecordStore::new()).await;
}

#[tokio::test]
async fn test_sqlite_latest_newest_first() {
    let dir = TempDir::new().unwrap();
    check_latest_newest_first(&sqlite_store(&dir).await).await;
}

#[tokio::test]
async fn test_sqlite_reopen_keeps_data() {
    let dir = TempDir::new().unwrap();
    let store = sqlite_store(&dir).await;
    seed(&store).await;
    store.close().await;

    let reopened = SqliteRecordStore::open_readonly(dir.path().join("users").join("test.db"))
        .await
        .unwrap();
    assert_eq!(reopened.load_series(Metric::Weight).await.unwrap().len(), 5);
}
