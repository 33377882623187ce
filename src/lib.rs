//! A personal finance ledger: income and expense transactions filed under categories, stored in
//! a local SQLite database and summarized by a handful of reports.

pub mod args;
pub mod commands;
mod config;
pub mod db;
mod error;
pub mod model;
pub mod report;
mod utils;

#[cfg(test)]
mod test;

pub use config::Config;
pub use db::Db;
pub use error::{Error, ErrorType, Result};
pub use report::Reports;
