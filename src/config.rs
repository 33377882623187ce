//! Configuration file handling for fintrack.
//!
//! The configuration file is stored at `$FINTRACK_HOME/config.json` and holds the defaults used
//! by the list and report commands. The ledger itself lives next to it in `fintrack.sqlite`.

use crate::db::Db;
use crate::error::{ErrorType, IntoResult};
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_NAME: &str = "fintrack";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const LEDGER_SQLITE: &str = "fintrack.sqlite";
const RECENT_LIMIT: u32 = 10;
const MONTHS_BACK: u32 = 6;
const DAYS_BACK: u32 = 30;

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$FINTRACK_HOME` and from there it loads `$FINTRACK_HOME/config.json` and opens
/// the ledger database. The database handle is opened once here and shared by every clone.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    db: Db,
}

impl Config {
    /// Creates the home directory if needed and:
    /// - Writes an initial `config.json` with default settings, unless one already exists
    /// - Creates the SQLite database and its tables, unless they already exist
    ///
    /// Running this against an existing home changes nothing.
    ///
    /// # Errors
    /// - Returns an error if any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the fintrack home directory")
            .pub_result(ErrorType::Config)?;
        let root = utils::canonicalize(&maybe_relative)
            .await
            .pub_result(ErrorType::Config)?;

        let config_path = root.join(CONFIG_JSON);
        let config_file = if config_path.is_file() {
            debug!("Keeping the existing config file {}", config_path.display());
            ConfigFile::load(&config_path)
                .await
                .pub_result(ErrorType::Config)?
        } else {
            let config_file = ConfigFile::default();
            config_file
                .save(&config_path)
                .await
                .pub_result(ErrorType::Config)?;
            config_file
        };

        let db = Db::initialize(root.join(LEDGER_SQLITE)).await?;

        Ok(Self {
            root,
            config_path,
            config_file,
            db,
        })
    }

    /// This will
    /// - validate that `fintrack_home` exists and that the config file exists
    /// - load the config file
    /// - open the database, creating its tables if they are missing
    /// - return the loaded configuration object
    pub async fn load(fintrack_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = fintrack_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The fintrack home directory is missing. Run `fintrack init` first.")
            .pub_result(ErrorType::Config)?;

        let config_path = root.join(CONFIG_JSON);
        let config_file = load_config_file(&config_path)
            .await
            .pub_result(ErrorType::Config)?;

        let db = Db::initialize(root.join(LEDGER_SQLITE)).await?;

        Ok(Self {
            root,
            config_path,
            config_file,
            db,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn db(&self) -> &Db {
        &self.db
    }

    pub fn sqlite_path(&self) -> &Path {
        self.db.path()
    }

    /// How many transactions `transaction list` shows by default.
    pub fn recent_limit(&self) -> u32 {
        self.config_file.recent_limit
    }

    /// How many months, including the current one, `report monthly` covers by default.
    pub fn months_back(&self) -> u32 {
        self.config_file.months_back
    }

    /// How many trailing days `report breakdown` covers by default.
    pub fn days_back(&self) -> u32 {
        self.config_file.days_back
    }
}

async fn load_config_file(config_path: &Path) -> anyhow::Result<ConfigFile> {
    if !config_path.is_file() {
        bail!(
            "The config file is missing '{}'. Run `fintrack init` first.",
            config_path.display()
        )
    }
    ConfigFile::load(config_path).await
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "fintrack",
///   "config_version": 1,
///   "recent_limit": 10,
///   "months_back": 6,
///   "days_back": 30
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "fintrack"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Number of transactions listed by default
    #[serde(default = "default_recent_limit")]
    recent_limit: u32,

    /// Number of months covered by the monthly report by default
    #[serde(default = "default_months_back")]
    months_back: u32,

    /// Number of trailing days covered by the category breakdown by default
    #[serde(default = "default_days_back")]
    days_back: u32,
}

fn default_recent_limit() -> u32 {
    RECENT_LIMIT
}

fn default_months_back() -> u32 {
    MONTHS_BACK
}

fn default_days_back() -> u32 {
    DAYS_BACK
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            recent_limit: RECENT_LIMIT,
            months_back: MONTHS_BACK,
            days_back: DAYS_BACK,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it belongs to another app.
    async fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        // Validate app_name
        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}
