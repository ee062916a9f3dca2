use errors::{BodyLoggerError, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
    SqlitePool as SqlxSqlitePool,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub type SqlitePool = SqlxSqlitePool;

/// Pooled connection to one SQLite file
#[derive(Clone)]
pub struct SqliteClient {
    pool: Arc<SqlitePool>,
    db_path: PathBuf,
}

impl SqliteClient {
    /// Open `db_path` for writing, creating the file and its directory
    pub async fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .create_if_missing(true);

        // One writer per invocation; a single connection keeps WAL files tidy
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        debug!("SQLite database opened: {}", db_path.display());

        Ok(Self {
            pool: Arc::new(pool),
            db_path,
        })
    }

    /// Open an existing file read-only
    pub async fn new_readonly(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();

        if !db_path.exists() {
            return Err(BodyLoggerError::database(format!(
                "database file not found: {}",
                db_path.display()
            )));
        }

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .busy_timeout(Duration::from_secs(5))
            .read_only(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        debug!("SQLite database opened (read-only): {}", db_path.display());

        Ok(Self {
            pool: Arc::new(pool),
            db_path,
        })
    }

    /// Get the underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get database file path
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Close all connections, flushing the WAL
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users").join("alice.db");

        let client = SqliteClient::new(&path).await.unwrap();
        sqlx::query("SELECT 1").execute(client.pool()).await.unwrap();

        assert!(path.exists());
        assert_eq!(client.path(), path.as_path());
    }

    #[tokio::test]
    async fn test_readonly_requires_existing_file() {
        let dir = TempDir::new().unwrap();
        let err = SqliteClient::new_readonly(dir.path().join("missing.db"))
            .await
            .err()
            .unwrap();
        assert_eq!(err.error_code(), "DATABASE_ERROR");
    }

    #[tokio::test]
    async fn test_readonly_rejects_writes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ro.db");

        let writer = SqliteClient::new(&path).await.unwrap();
        sqlx::query("CREATE TABLE t (x INTEGER)")
            .execute(writer.pool())
            .await
            .unwrap();
        writer.close().await;

        let reader = SqliteClient::new_readonly(&path).await.unwrap();
        sqlx::query("SELECT x FROM t").fetch_all(reader.pool()).await.unwrap();
        assert!(sqlx::query("INSERT INTO t VALUES (1)")
            .execute(reader.pool())
            .await
            .is_err());
    }
}
