//! This module is responsible for reading, writing and managing the SQLite database.
//!
//! `Db` is the ledger store: the only writer of the `categories` and `transactions` tables. It
//! owns a single SQLite connection for the lifetime of the process. Operations that check
//! something before writing run inside one SQLite transaction so a reader never sees a half
//! applied change, and any failed validation leaves the tables untouched.

mod categories;
mod transactions;

use crate::error::{ErrorType, IntoResult};
use crate::model::Kind;
use crate::{utils, Result};
use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

const SCHEMA: &str = include_str!("schema.sql");

#[derive(Debug, Clone)]
pub struct Db {
    pool: SqlitePool,
    path: PathBuf,
}

impl Db {
    /// - Creates the directory that holds `path` if it does not exist
    /// - Opens the SQLite file at `path`, creating it if needed, with foreign keys enforced
    /// - Creates the `categories` and `transactions` tables if they do not exist
    /// - Returns a constructed `Db` object for further operations
    ///
    /// Calling this on an existing database leaves its data untouched.
    pub async fn initialize(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            utils::make_dir(parent)
                .await
                .pub_result(ErrorType::StorageUnavailable)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);

        // One connection, shared by every operation in order.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| format!("Unable to open the SQLite database at {}", path.display()))
            .pub_result(ErrorType::StorageUnavailable)?;

        sqlx::raw_sql(SCHEMA)
            .execute(&pool)
            .await
            .context("Failed to create the ledger tables")
            .pub_result(ErrorType::StorageUnavailable)?;

        debug!("Opened ledger database at {}", path.display());
        Ok(Self {
            pool,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Closes the connection. Any clone of this `Db` becomes unusable afterwards.
    pub async fn close(&self) {
        self.pool.close().await;
        debug!("Closed ledger database at {}", self.path.display());
    }
}

/// Reads a `kind` column value.
pub(crate) fn parse_kind(s: &str) -> Result<Kind> {
    Kind::from_str(s)
        .with_context(|| format!("Unexpected kind '{s}' found in the database"))
        .pub_result(ErrorType::StorageUnavailable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn table_exists(db: &Db, table_name: &str) -> bool {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?")
                .bind(table_name)
                .fetch_one(db.pool())
                .await
                .unwrap();
        row.0 > 0
    }

    #[tokio::test]
    async fn test_initialize_creates_dir_and_tables() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data").join("ledger.sqlite");

        let db = Db::initialize(&path).await.unwrap();

        assert!(path.is_file());
        assert!(table_exists(&db, "categories").await);
        assert!(table_exists(&db, "transactions").await);
        assert_eq!(db.path(), path.as_path());
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.sqlite");

        let db = Db::initialize(&path).await.unwrap();
        let id = db.add_category("Books", Kind::Expense).await.unwrap();
        db.close().await;

        let db = Db::initialize(&path).await.unwrap();
        let category = db.get_category(id).await.unwrap().unwrap();
        assert_eq!(category.name(), "Books");
    }

    #[tokio::test]
    async fn test_foreign_keys_are_enforced() {
        let dir = TempDir::new().unwrap();
        let db = Db::initialize(dir.path().join("ledger.sqlite"))
            .await
            .unwrap();

        let result = sqlx::query(
            "INSERT INTO transactions (date, amount, category_id, kind) \
             VALUES ('2024-01-01', '1', 999, 'Expense')",
        )
        .execute(db.pool())
        .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_closed_db_is_storage_unavailable() {
        let dir = TempDir::new().unwrap();
        let db = Db::initialize(dir.path().join("ledger.sqlite"))
            .await
            .unwrap();
        db.close().await;

        let err = db.add_category("Books", Kind::Expense).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::StorageUnavailable);
        let err = db.list_recent_transactions(10).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::StorageUnavailable);
        let err = db.count_transactions().await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::StorageUnavailable);
    }

    #[tokio::test]
    async fn test_initialize_on_a_directory() {
        let dir = TempDir::new().unwrap();
        let err = Db::initialize(dir.path()).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::StorageUnavailable);
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!(parse_kind("Income").unwrap(), Kind::Income);
        let err = parse_kind("income").unwrap_err();
        assert_eq!(err.error_type(), ErrorType::StorageUnavailable);
    }
}
