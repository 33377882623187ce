//! Read-only aggregations over the ledger.
//!
//! Every report re-queries the database, so it always reflects the ledger at call time. A report
//! that has nothing to show returns `None`, which callers treat as "not enough data" rather than
//! as a zero.
//!
//! Amounts are summed as `Decimal` values in Rust rather than with SQL `SUM`, which would go
//! through floating point.

use crate::db::{parse_kind, Db};
use crate::error::{Error, ErrorType, IntoResult};
use crate::model::{Amount, Kind, DATE_FORMAT};
use crate::Result;
use anyhow::Context;
use chrono::{Datelike, Days, Local, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::debug;

/// Income and expense totals for one calendar month.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MonthlyTotals {
    /// The month as `YYYY-MM`.
    pub month: String,
    pub income: Amount,
    pub expense: Amount,
}

impl MonthlyTotals {
    fn new(month: String) -> Self {
        Self {
            month,
            income: Amount::default(),
            expense: Amount::default(),
        }
    }

    pub fn total(&self, kind: Kind) -> Amount {
        match kind {
            Kind::Income => self.income,
            Kind::Expense => self.expense,
        }
    }

    /// `income - expense` for the month.
    pub fn net(&self) -> Result<Amount> {
        self.income
            .checked_sub(self.expense)
            .ok_or_else(|| total_too_large(&format!("net for {}", self.month)))
    }

    fn add(&mut self, kind: Kind, amount: Amount) -> Result<()> {
        let total = match kind {
            Kind::Income => &mut self.income,
            Kind::Expense => &mut self.expense,
        };
        *total = add_amounts(*total, amount, &format!("{kind} total for {}", self.month))?;
        Ok(())
    }
}

/// The total of one category.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CategoryTotal {
    pub category: String,
    pub total: Amount,
}

/// All-time income against all-time expenses.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Balance {
    pub income: Amount,
    pub expense: Amount,
    /// `income - expense`, negative when more went out than came in.
    pub balance: Amount,
}

/// Produces report series from the ledger relative to a fixed "today".
#[derive(Debug, Clone)]
pub struct Reports {
    db: Db,
    today: NaiveDate,
}

impl Reports {
    /// Reports relative to the local calendar date.
    pub fn new(db: Db) -> Self {
        Self::as_of(db, Local::now().date_naive())
    }

    /// Reports relative to `today`.
    pub fn as_of(db: Db, today: NaiveDate) -> Self {
        Self { db, today }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Totals per month and kind for the last `months_back` calendar months, counting the
    /// current month as one of them. Months are in ascending order and months without any
    /// transactions are left out.
    ///
    /// # Errors
    /// - `InvalidInput` if `months_back` is zero or reaches outside the supported calendar.
    pub async fn monthly_summary(&self, months_back: u32) -> Result<Option<Vec<MonthlyTotals>>> {
        let (start, end) = month_range(self.today, months_back)?;
        debug!("Monthly summary from {start} up to {end} (exclusive)");

        let rows: Vec<(String, String, String)> = sqlx::query_as(
            "SELECT substr(date, 1, 7) AS month, kind, amount FROM transactions \
             WHERE date >= ? AND date < ? ORDER BY date, id",
        )
        .bind(start.format(DATE_FORMAT).to_string())
        .bind(end.format(DATE_FORMAT).to_string())
        .fetch_all(self.db.pool())
        .await
        .context("Failed to query monthly totals")
        .pub_result(ErrorType::StorageUnavailable)?;

        let mut months: BTreeMap<String, MonthlyTotals> = BTreeMap::new();
        for (month, kind, amount) in rows {
            let kind = parse_kind(&kind)?;
            let amount = parse_amount(&amount)?;
            months
                .entry(month.clone())
                .or_insert_with(|| MonthlyTotals::new(month))
                .add(kind, amount)?;
        }

        if months.is_empty() {
            return Ok(None);
        }
        Ok(Some(months.into_values().collect()))
    }

    /// Totals per category name for transactions of `kind` dated within the last `days_back`
    /// days up to and including today. Sorted by total, largest first, then by name.
    pub async fn category_breakdown(
        &self,
        kind: Kind,
        days_back: u32,
    ) -> Result<Option<Vec<CategoryTotal>>> {
        let start = self
            .today
            .checked_sub_days(Days::new(u64::from(days_back)))
            .ok_or_else(|| {
                Error::msg(
                    ErrorType::InvalidInput,
                    format!("{days_back} days back reaches outside the supported calendar"),
                )
            })?;
        debug!("{kind} breakdown from {start} to {}", self.today);

        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT c.name, t.amount \
             FROM transactions t JOIN categories c ON t.category_id = c.id \
             WHERE t.kind = ? AND t.date >= ? AND t.date <= ?",
        )
        .bind(kind.to_string())
        .bind(start.format(DATE_FORMAT).to_string())
        .bind(self.today.format(DATE_FORMAT).to_string())
        .fetch_all(self.db.pool())
        .await
        .context("Failed to query category totals")
        .pub_result(ErrorType::StorageUnavailable)?;

        let mut totals: BTreeMap<String, Amount> = BTreeMap::new();
        let mut grand_total = Amount::default();
        let what = format!("{kind} breakdown");
        for (name, amount) in rows {
            let amount = parse_amount(&amount)?;
            grand_total = add_amounts(grand_total, amount, &what)?;
            let total = totals.entry(name).or_default();
            *total = add_amounts(*total, amount, &what)?;
        }
        if totals.is_empty() {
            return Ok(None);
        }

        let mut breakdown: Vec<CategoryTotal> = totals
            .into_iter()
            .map(|(category, total)| CategoryTotal { category, total })
            .collect();
        breakdown.sort_by(|a, b| {
            b.total
                .cmp(&a.total)
                .then_with(|| a.category.cmp(&b.category))
        });
        Ok(Some(breakdown))
    }

    /// All-time totals of both kinds. Returns `None` unless at least one income and one expense
    /// transaction have been recorded.
    pub async fn income_expense_balance(&self) -> Result<Option<Balance>> {
        let rows: Vec<(String, String)> = sqlx::query_as("SELECT kind, amount FROM transactions")
            .fetch_all(self.db.pool())
            .await
            .context("Failed to query balance totals")
            .pub_result(ErrorType::StorageUnavailable)?;

        let mut income: Option<Amount> = None;
        let mut expense: Option<Amount> = None;
        for (kind, amount) in rows {
            let amount = parse_amount(&amount)?;
            let kind = parse_kind(&kind)?;
            let total = match kind {
                Kind::Income => &mut income,
                Kind::Expense => &mut expense,
            };
            let current = total.unwrap_or_default();
            *total = Some(add_amounts(current, amount, &format!("{kind} total"))?);
        }

        let (Some(income), Some(expense)) = (income, expense) else {
            return Ok(None);
        };
        let balance = income
            .checked_sub(expense)
            .ok_or_else(|| total_too_large("balance"))?;
        Ok(Some(Balance {
            income,
            expense,
            balance,
        }))
    }
}

/// Returns the first day of the oldest month in range and the first day after the current month.
fn month_range(today: NaiveDate, months_back: u32) -> Result<(NaiveDate, NaiveDate)> {
    if months_back == 0 {
        return Err(Error::msg(
            ErrorType::InvalidInput,
            "The monthly summary needs at least one month",
        ));
    }
    let out_of_range = || {
        Error::msg(
            ErrorType::InvalidInput,
            format!("{months_back} months back reaches outside the supported calendar"),
        )
    };
    let this_month =
        NaiveDate::from_ymd_opt(today.year(), today.month(), 1).ok_or_else(out_of_range)?;
    let start = this_month
        .checked_sub_months(Months::new(months_back - 1))
        .ok_or_else(out_of_range)?;
    let end = this_month
        .checked_add_months(Months::new(1))
        .ok_or_else(out_of_range)?;
    Ok((start, end))
}

/// Adds `amount` to a running `total`. Fails with `InvalidInput` when the sum no longer fits in an
/// `Amount`; `what` names the total in the message.
pub(crate) fn add_amounts(total: Amount, amount: Amount, what: &str) -> Result<Amount> {
    total
        .checked_add(amount)
        .ok_or_else(|| total_too_large(what))
}

fn total_too_large(what: &str) -> Error {
    Error::msg(
        ErrorType::InvalidInput,
        format!("The {what} is larger than the largest supported amount"),
    )
}

fn parse_amount(s: &str) -> Result<Amount> {
    Amount::from_str(s)
        .with_context(|| format!("Unexpected amount '{s}' found in the database"))
        .pub_result(ErrorType::StorageUnavailable)
}
