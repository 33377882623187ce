use crate::error::{Error, ErrorType};
use crate::model::{Amount, Kind};
use crate::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The date format used for storage and on the command line.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The caller-supplied fields of a transaction, used for both inserts and updates.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TransactionInput {
    /// Calendar date as `YYYY-MM-DD`.
    pub date: String,
    /// Must be strictly positive.
    pub amount: Amount,
    pub description: Option<String>,
    pub category_id: i64,
    /// Must match the kind of the category referenced by `category_id`.
    pub kind: Kind,
}

impl TransactionInput {
    /// Checks everything that can be checked without the database and returns the record in the
    /// form it will be stored: a canonical date and a description that is `None` when blank.
    pub(crate) fn validate(&self) -> Result<ValidTransaction> {
        if !self.amount.is_positive() {
            return Err(Error::msg(
                ErrorType::InvalidInput,
                format!("The amount must be greater than zero, got {}", self.amount),
            ));
        }
        let date = parse_date(&self.date)?;
        let description = self
            .description
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);
        Ok(ValidTransaction {
            date,
            amount: self.amount,
            description,
            category_id: self.category_id,
            kind: self.kind,
        })
    }
}

/// A `TransactionInput` that has passed validation.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) struct ValidTransaction {
    pub(crate) date: NaiveDate,
    pub(crate) amount: Amount,
    pub(crate) description: Option<String>,
    pub(crate) category_id: i64,
    pub(crate) kind: Kind,
}

impl ValidTransaction {
    pub(crate) fn date_text(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}

/// A stored transaction joined with the name of its category.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TransactionRow {
    pub(crate) id: i64,
    pub(crate) date: NaiveDate,
    pub(crate) amount: Amount,
    pub(crate) description: Option<String>,
    pub(crate) category_id: i64,
    pub(crate) category_name: String,
    pub(crate) kind: Kind,
}

impl TransactionRow {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn category_id(&self) -> i64 {
        self.category_id
    }

    pub fn category_name(&self) -> &str {
        &self.category_name
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Converts the row back into an input, e.g. as the starting point of an edit.
    pub fn to_input(&self) -> TransactionInput {
        TransactionInput {
            date: self.date.format(DATE_FORMAT).to_string(),
            amount: self.amount,
            description: self.description.clone(),
            category_id: self.category_id,
            kind: self.kind,
        }
    }
}

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|e| {
        Error::msg(
            ErrorType::InvalidInput,
            format!("The date '{s}' is not a valid YYYY-MM-DD calendar date: {e}"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn input(date: &str, amount: &str) -> TransactionInput {
        TransactionInput {
            date: date.to_string(),
            amount: Amount::from_str(amount).unwrap(),
            description: Some("  lunch ".to_string()),
            category_id: 1,
            kind: Kind::Expense,
        }
    }

    #[test]
    fn test_validate_ok() {
        let valid = input("2024-01-15", "250.00").validate().unwrap();
        assert_eq!(valid.date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(valid.date_text(), "2024-01-15");
        assert_eq!(valid.description.as_deref(), Some("lunch"));
    }

    #[test]
    fn test_validate_rejects_non_positive_amount() {
        for amount in ["0", "0.00", "-1"] {
            let err = input("2024-01-15", amount).validate().unwrap_err();
            assert_eq!(err.error_type(), ErrorType::InvalidInput);
        }
    }

    #[test]
    fn test_validate_rejects_bad_dates() {
        for date in ["2024-02-30", "2023-13-01", "15/01/2024", "", "yesterday"] {
            let err = input(date, "1").validate().unwrap_err();
            assert_eq!(err.error_type(), ErrorType::InvalidInput, "{date}");
        }
    }

    #[test]
    fn test_validate_accepts_leap_day() {
        assert!(input("2024-02-29", "1").validate().is_ok());
    }

    #[test]
    fn test_blank_description_becomes_none() {
        let mut i = input("2024-01-15", "1");
        i.description = Some("   ".to_string());
        assert_eq!(i.validate().unwrap().description, None);
    }
}
