use crate::error::{Error, ErrorType};
use crate::model::Kind;
use crate::Result;
use serde::{Deserialize, Serialize};

/// Categories created by `seed_defaults` for expenses.
pub const DEFAULT_EXPENSE_CATEGORIES: [&str; 7] = [
    "Market",
    "Rent",
    "Bills",
    "Transport",
    "Entertainment",
    "Health",
    "Other-Expense",
];

/// Categories created by `seed_defaults` for income.
pub const DEFAULT_INCOME_CATEGORIES: [&str; 5] =
    ["Salary", "Side-Income", "Gift", "Investment", "Other-Income"];

/// A label that transactions of the same kind are filed under.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Category {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) kind: Kind,
}

impl Category {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }
}

/// Trims `name` and rejects it if nothing is left.
pub(crate) fn clean_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::msg(
            ErrorType::InvalidInput,
            "A category name cannot be empty",
        ));
    }
    Ok(trimmed.to_string())
}

/// Every (name, kind) pair that `seed_defaults` guarantees to exist.
pub(crate) fn default_categories() -> impl Iterator<Item = (&'static str, Kind)> {
    DEFAULT_EXPENSE_CATEGORIES
        .into_iter()
        .map(|name| (name, Kind::Expense))
        .chain(
            DEFAULT_INCOME_CATEGORIES
                .into_iter()
                .map(|name| (name, Kind::Income)),
        )
}
