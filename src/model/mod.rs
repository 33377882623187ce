//! Types that represent the core data model, such as `Transaction` and `Category`.
mod amount;
mod category;
mod kind;
mod transaction;

pub use amount::{Amount, AmountError};
pub(crate) use category::{clean_name, default_categories};
pub use category::{Category, DEFAULT_EXPENSE_CATEGORIES, DEFAULT_INCOME_CATEGORIES};
pub use kind::Kind;
pub use transaction::{parse_date, TransactionInput, TransactionRow, DATE_FORMAT};
