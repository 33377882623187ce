//! The public error type.
//!
//! Internally the crate works with `anyhow` and attaches context as errors bubble up. At the
//! public boundary every error is classified with an `ErrorType` so that callers can react to the
//! kind of failure without parsing messages.

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

/// The kind of failure an operation ran into.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// A malformed amount or date, an empty name, or a category of the wrong kind.
    InvalidInput,
    /// A referenced id does not exist.
    NotFound,
    /// A category with the same name and kind already exists.
    DuplicateCategory,
    /// The category cannot be deleted because transactions reference it.
    CategoryInUse,
    /// The database could not be reached or returned something unexpected.
    StorageUnavailable,
    /// The home directory or the config file is missing or invalid.
    Config,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// An error with its `ErrorType` and the full chain of context that led to it.
pub struct Error {
    error_type: ErrorType,
    inner: anyhow::Error,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn new(error_type: ErrorType, inner: impl Into<anyhow::Error>) -> Self {
        Self {
            error_type,
            inner: inner.into(),
        }
    }

    /// Creates an error from a plain message.
    pub fn msg<M>(error_type: ErrorType, message: M) -> Self
    where
        M: Display + Debug + Send + Sync + 'static,
    {
        Self::new(error_type, anyhow::Error::msg(message))
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {:?}", self.error_type, self.inner)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#}", self.inner)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner.source()
    }
}

impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        Error::new(ErrorType::StorageUnavailable, e)
    }
}

/// Classifies an internal `anyhow`-style result as a public `Result`.
pub(crate) trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| Error::new(error_type, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_error_type_display() {
        assert_eq!(ErrorType::CategoryInUse.to_string(), "category_in_use");
        assert_eq!(
            "duplicate_category".parse::<ErrorType>().unwrap(),
            ErrorType::DuplicateCategory
        );
    }

    #[test]
    fn test_pub_result_keeps_context() {
        let res: std::result::Result<(), anyhow::Error> =
            Err(anyhow::anyhow!("disk is gone")).context("Unable to open ledger");
        let err = res.pub_result(ErrorType::StorageUnavailable).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::StorageUnavailable);
        let message = err.to_string();
        assert!(message.contains("Unable to open ledger"));
        assert!(message.contains("disk is gone"));
    }
}
