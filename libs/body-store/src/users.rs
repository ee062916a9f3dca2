//! Per-user database files
//!
//! Layout: `<data_dir>/users/<user>.db`. User names are validated before they
//! touch the filesystem.

use std::path::{Path, PathBuf};

use body_model::validate_user_name;
use errors::{BodyLoggerError, Result};
use tracing::{debug, info};

use crate::sqlite_impl::SqliteRecordStore;

/// Database file extension
pub const DB_EXTENSION: &str = "db";

/// SQLite side files removed together with a user's database
const SIDE_FILE_SUFFIXES: [&str; 2] = ["-wal", "-shm"];

/// Locates and manages user databases under a data directory
#[derive(Debug, Clone)]
pub struct UserDirectory {
    users_dir: PathBuf,
}

impl UserDirectory {
    /// Directory rooted at `<data_dir>/users`
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            users_dir: data_dir.as_ref().join("users"),
        }
    }

    /// Path of `user`'s database file
    pub fn db_path(&self, user: &str) -> Result<PathBuf> {
        validate_user_name(user)?;
        Ok(self.users_dir.join(format!("{}.{}", user, DB_EXTENSION)))
    }

    pub fn exists(&self, user: &str) -> Result<bool> {
        Ok(self.db_path(user)?.is_file())
    }

    /// Open `user`'s store for writing, creating it on first use
    pub async fn open_or_create(&self, user: &str) -> Result<SqliteRecordStore> {
        let path = self.db_path(user)?;
        if !path.exists() {
            info!("creating store for user {}", user);
        }
        SqliteRecordStore::open(path).await
    }

    /// Open an existing store for writing
    pub async fn open_existing(&self, user: &str) -> Result<SqliteRecordStore> {
        let path = self.existing_path(user)?;
        SqliteRecordStore::open(path).await
    }

    /// Open an existing store read-only
    pub async fn open_readonly(&self, user: &str) -> Result<SqliteRecordStore> {
        let path = self.existing_path(user)?;
        SqliteRecordStore::open_readonly(path).await
    }

    /// Delete `user`'s database and its side files
    pub fn remove_user(&self, user: &str) -> Result<()> {
        let path = self.existing_path(user)?;
        std::fs::remove_file(&path)?;

        for suffix in SIDE_FILE_SUFFIXES {
            let mut side = path.clone().into_os_string();
            side.push(suffix);
            let side = PathBuf::from(side);
            if side.exists() {
                std::fs::remove_file(&side)?;
            }
        }

        debug!("removed {}", path.display());
        Ok(())
    }

    fn existing_path(&self, user: &str) -> Result<PathBuf> {
        let path = self.db_path(user)?;
        if !path.is_file() {
            return Err(BodyLoggerError::user_not_found(user));
        }
        Ok(path)
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_db_path_layout() {
        let dirs = UserDirectory::new("/data");
        assert_eq!(
            dirs.db_path("ryder").unwrap(),
            PathBuf::from("/data/users/ryder.db")
        );
        assert!(dirs.db_path("../ryder").is_err());
    }

    #[tokio::test]
    async fn test_lifecycle() {
        let dir = TempDir::new().unwrap();
        let users = UserDirectory::new(dir.path());

        assert!(!users.exists("ryder").unwrap());

        let store = users.open_or_create("ryder").await.unwrap();
        store.close().await;
        assert!(users.exists("ryder").unwrap());
        assert!(dir.path().join("users").join("ryder.db").is_file());

        users.remove_user("ryder").unwrap();
        assert!(!users.exists("ryder").unwrap());
    }

    #[tokio::test]
    async fn test_missing_user_is_not_found() {
        let dir = TempDir::new().unwrap();
        let users = UserDirectory::new(dir.path());

        let err = users.open_readonly("ghost").await.err().unwrap();
        assert!(matches!(err, BodyLoggerError::UserNotFound(_)));
        assert!(users.remove_user("ghost").unwrap_err().is_not_found());
    }
}
