//! These structs provide the CLI interface for the fintrack CLI.

use crate::model::Kind;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// fintrack: A command-line ledger for personal income and expenses.
///
/// Record transactions against income and expense categories in a local SQLite database, then
/// summarize them month by month, by category, or as an overall balance.
///
/// Run `fintrack init` once to create the data directory, the database and a set of default
/// categories.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory, the configuration file and the database.
    ///
    /// Also adds the default income and expense categories. Running it again is harmless: existing
    /// configuration, categories and transactions are kept.
    Init,
    /// Add, delete or list categories.
    #[command(subcommand)]
    Category(CategoryCommand),
    /// Add, update, delete or list transactions.
    #[command(subcommand)]
    Transaction(TransactionCommand),
    /// Summarize transactions.
    #[command(subcommand)]
    Report(ReportCommand),
}

#[derive(Subcommand, Debug, Clone)]
pub enum CategoryCommand {
    /// Create a new category.
    Add(AddCategoryArgs),
    /// Delete a category that no transaction uses.
    Delete(DeleteCategoryArgs),
    /// List categories ordered by kind and name.
    List(ListCategoriesArgs),
}

#[derive(Subcommand, Debug, Clone)]
pub enum TransactionCommand {
    /// Record a new transaction.
    Add(AddTransactionArgs),
    /// Change an existing transaction. Fields that are not given keep their current value.
    Update(UpdateTransactionArgs),
    /// Delete a transaction.
    Delete(DeleteTransactionArgs),
    /// List the most recent transactions.
    List(ListTransactionsArgs),
}

#[derive(Subcommand, Debug, Clone)]
pub enum ReportCommand {
    /// Income and expense totals per month.
    Monthly(MonthlyArgs),
    /// Totals per category over the last days.
    Breakdown(BreakdownArgs),
    /// All-time income, expenses and the difference between them.
    Balance,
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the fintrack database and configuration are held. Defaults to
    /// ~/fintrack
    #[arg(long, env = "FINTRACK_HOME", default_value_t = default_fintrack_home())]
    home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, home: PathBuf) -> Self {
        Self {
            log_level,
            home: home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn home(&self) -> &DisplayPath {
        &self.home
    }
}

/// Args for `fintrack category add`.
#[derive(Debug, Parser, Clone)]
pub struct AddCategoryArgs {
    /// The name of the category. Must be unique among categories of the same kind.
    #[arg(long)]
    pub name: String,

    /// Whether the category is for income or expenses.
    #[arg(long, value_enum)]
    pub kind: Kind,
}

/// Args for `fintrack category delete`.
#[derive(Debug, Parser, Clone)]
pub struct DeleteCategoryArgs {
    /// The ID of the category, as shown by `fintrack category list`.
    pub id: i64,
}

/// Args for `fintrack category list`.
#[derive(Debug, Parser, Clone)]
pub struct ListCategoriesArgs {
    /// Only list categories of this kind.
    #[arg(long, value_enum)]
    pub kind: Option<Kind>,
}

/// Args for `fintrack transaction add`.
#[derive(Debug, Parser, Clone)]
pub struct AddTransactionArgs {
    /// The date of the transaction as YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    pub date: Option<String>,

    /// The amount, a positive number such as 42.50 or 1,200.
    #[arg(long)]
    pub amount: String,

    /// Whether money came in or went out.
    #[arg(long, value_enum, default_value_t = Kind::Expense)]
    pub kind: Kind,

    /// The name of a category of the same kind.
    #[arg(long)]
    pub category: String,

    /// A free text note.
    #[arg(long)]
    pub description: Option<String>,
}

/// Args for `fintrack transaction update`.
#[derive(Debug, Parser, Clone)]
pub struct UpdateTransactionArgs {
    /// The ID of the transaction, as shown by `fintrack transaction list`.
    pub id: i64,

    /// The new date as YYYY-MM-DD.
    #[arg(long)]
    pub date: Option<String>,

    /// The new amount.
    #[arg(long)]
    pub amount: Option<String>,

    /// The new kind. Changing it requires a --category of the new kind.
    #[arg(long, value_enum)]
    pub kind: Option<Kind>,

    /// The name of the new category.
    #[arg(long)]
    pub category: Option<String>,

    /// The new note. Pass an empty string to remove it.
    #[arg(long)]
    pub description: Option<String>,
}

/// Args for `fintrack transaction delete`.
#[derive(Debug, Parser, Clone)]
pub struct DeleteTransactionArgs {
    /// The ID of the transaction.
    pub id: i64,
}

/// Args for `fintrack transaction list`.
#[derive(Debug, Parser, Clone)]
pub struct ListTransactionsArgs {
    /// The maximum number of transactions to show. Defaults to `recent_limit` from config.json.
    #[arg(long)]
    pub limit: Option<u32>,
}

/// Args for `fintrack report monthly`.
#[derive(Debug, Parser, Clone)]
pub struct MonthlyArgs {
    /// How many months to cover, counting the current one. Defaults to `months_back` from
    /// config.json.
    #[arg(long)]
    pub months_back: Option<u32>,
}

/// Args for `fintrack report breakdown`.
#[derive(Debug, Parser, Clone)]
pub struct BreakdownArgs {
    /// Which kind of transactions to break down.
    #[arg(long, value_enum, default_value_t = Kind::Expense)]
    pub kind: Kind,

    /// How many trailing days to cover. Defaults to `days_back` from config.json.
    #[arg(long)]
    pub days_back: Option<u32>,
}

fn default_fintrack_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("fintrack"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --home or FINTRACK_HOME instead of relying on the default \
                fintrack home directory.",
            );
            PathBuf::from("fintrack")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
