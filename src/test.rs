//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::db::Db;
use crate::model::Kind;
use crate::Config;
use tempfile::TempDir;

/// Test environment that sets up a fintrack home directory with Config and database.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Creates a test environment with Config and an initialized, empty database. Default
    /// categories are not seeded.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("fintrack");
        let config = Config::create(&root).await.unwrap();

        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    pub fn db(&self) -> &Db {
        self.config.db()
    }

    /// Returns the id of the category, creating it if it does not exist yet.
    pub async fn category(&self, name: &str, kind: Kind) -> i64 {
        match self.db().find_category(name, kind).await.unwrap() {
            Some(category) => category.id(),
            None => self.db().add_category(name, kind).await.unwrap(),
        }
    }
}
