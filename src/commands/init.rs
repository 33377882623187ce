use crate::commands::Out;
use crate::{Config, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// What `init` produced.
#[derive(Debug, Clone, Serialize)]
pub struct Initialized {
    pub home: PathBuf,
    pub sqlite_path: PathBuf,
    /// The number of default categories that did not exist before.
    pub seeded_categories: u64,
}

/// Creates the data directory and:
/// - Creates an initial `config.json` file with default settings, unless one exists
/// - Creates the SQLite database and its tables
/// - Adds the default income and expense categories that are not already there
///
/// # Arguments
/// - `fintrack_home` - The directory that will be the root of the data directory, e.g.
///   `$HOME/fintrack`
///
/// # Errors
/// - Returns an error if any file or database operations fail.
pub async fn init(fintrack_home: &Path) -> Result<Out<Initialized>> {
    let config = Config::create(fintrack_home).await?;
    let seeded_categories = config.db().seed_defaults().await?;
    debug!("Seeded {seeded_categories} default categories");

    let message = format!(
        "The fintrack ledger is ready at {} ({seeded_categories} default categories added)",
        config.root().display()
    );
    Ok(Out::new(
        message,
        Initialized {
            home: config.root().to_path_buf(),
            sqlite_path: config.sqlite_path().to_path_buf(),
            seeded_categories,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DEFAULT_EXPENSE_CATEGORIES, DEFAULT_INCOME_CATEGORIES};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_seeds_once() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("fintrack");
        let expected = (DEFAULT_EXPENSE_CATEGORIES.len() + DEFAULT_INCOME_CATEGORIES.len()) as u64;

        let first = init(&home).await.unwrap();
        let first = first.structure().unwrap();
        assert_eq!(first.seeded_categories, expected);
        assert!(first.sqlite_path.is_file());

        let second = init(&home).await.unwrap();
        assert_eq!(second.structure().unwrap().seeded_categories, 0);

        let config = Config::load(&home).await.unwrap();
        let categories = config.db().list_categories(None).await.unwrap();
        assert_eq!(categories.len() as u64, expected);
    }
}
