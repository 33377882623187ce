use super::{parse_kind, Db};
use crate::error::{Error, ErrorType, IntoResult};
use crate::model::{Amount, Kind, TransactionInput, TransactionRow, DATE_FORMAT};
use crate::Result;
use anyhow::Context;
use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use std::str::FromStr;
use tracing::debug;

const SELECT_ROWS: &str = "SELECT t.id, t.date, t.amount, t.description, t.category_id, \
     c.name AS category_name, t.kind \
     FROM transactions t JOIN categories c ON t.category_id = c.id";

impl Db {
    /// Records a transaction and returns its id.
    ///
    /// # Errors
    /// - `InvalidInput` if the amount is not positive, the date is not a calendar date, or the
    ///   category is of a different kind than the transaction.
    /// - `NotFound` if the category does not exist.
    pub async fn add_transaction(&self, input: &TransactionInput) -> Result<i64> {
        let valid = input.validate()?;
        let mut tx = self.pool().begin().await?;
        check_category(&mut tx, valid.category_id, valid.kind).await?;

        let id = sqlx::query(
            "INSERT INTO transactions (date, amount, description, category_id, kind) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(valid.date_text())
        .bind(valid.amount.to_string())
        .bind(valid.description.as_deref())
        .bind(valid.category_id)
        .bind(valid.kind.to_string())
        .execute(&mut *tx)
        .await
        .context("Failed to insert the transaction")
        .pub_result(ErrorType::StorageUnavailable)?
        .last_insert_rowid();
        tx.commit().await?;

        debug!("Inserted transaction {id}");
        Ok(id)
    }

    /// Overwrites every field of an existing transaction.
    ///
    /// # Errors
    /// - The same validation errors as `add_transaction`.
    /// - `NotFound` if there is no transaction with this id.
    pub async fn update_transaction(&self, id: i64, input: &TransactionInput) -> Result<()> {
        let valid = input.validate()?;
        let mut tx = self.pool().begin().await?;

        let (found,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM transactions WHERE id = ?")
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .context("Failed to look up the transaction")
            .pub_result(ErrorType::StorageUnavailable)?;
        if found == 0 {
            return Err(transaction_not_found(id));
        }
        check_category(&mut tx, valid.category_id, valid.kind).await?;

        sqlx::query(
            "UPDATE transactions \
             SET date = ?, amount = ?, description = ?, category_id = ?, kind = ? \
             WHERE id = ?",
        )
        .bind(valid.date_text())
        .bind(valid.amount.to_string())
        .bind(valid.description.as_deref())
        .bind(valid.category_id)
        .bind(valid.kind.to_string())
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to update the transaction")
        .pub_result(ErrorType::StorageUnavailable)?;
        tx.commit().await?;

        debug!("Updated transaction {id}");
        Ok(())
    }

    /// # Errors
    /// - `NotFound` if there is no transaction with this id.
    pub async fn delete_transaction(&self, id: i64) -> Result<()> {
        let res = sqlx::query("DELETE FROM transactions WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await
            .context("Failed to delete the transaction")
            .pub_result(ErrorType::StorageUnavailable)?;
        if res.rows_affected() == 0 {
            return Err(transaction_not_found(id));
        }
        debug!("Deleted transaction {id}");
        Ok(())
    }

    /// Returns up to `limit` transactions with their category names, newest date first. Rows with
    /// the same date are returned newest insert first.
    pub async fn list_recent_transactions(&self, limit: u32) -> Result<Vec<TransactionRow>> {
        let sql = format!("{SELECT_ROWS} ORDER BY t.date DESC, t.id DESC LIMIT ?");
        let rows = sqlx::query(&sql)
            .bind(i64::from(limit))
            .fetch_all(self.pool())
            .await
            .context("Failed to list transactions")
            .pub_result(ErrorType::StorageUnavailable)?;
        rows.iter().map(transaction_from_row).collect()
    }

    pub async fn get_transaction(&self, id: i64) -> Result<Option<TransactionRow>> {
        let sql = format!("{SELECT_ROWS} WHERE t.id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .context("Failed to look up the transaction")
            .pub_result(ErrorType::StorageUnavailable)?;
        row.as_ref().map(transaction_from_row).transpose()
    }

    /// Returns the number of rows in the transactions table.
    pub async fn count_transactions(&self) -> Result<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM transactions")
            .fetch_one(self.pool())
            .await
            .context("Failed to count transactions")
            .pub_result(ErrorType::StorageUnavailable)?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

/// Ensures the category exists and is of `kind`.
async fn check_category(conn: &mut SqliteConnection, category_id: i64, kind: Kind) -> Result<()> {
    let found: Option<(String, String)> =
        sqlx::query_as("SELECT name, kind FROM categories WHERE id = ?")
            .bind(category_id)
            .fetch_optional(&mut *conn)
            .await
            .context("Failed to look up the category")
            .pub_result(ErrorType::StorageUnavailable)?;
    let Some((name, category_kind)) = found else {
        return Err(Error::msg(
            ErrorType::NotFound,
            format!("Category not found: {category_id}"),
        ));
    };
    let category_kind = parse_kind(&category_kind)?;
    if category_kind != kind {
        return Err(Error::msg(
            ErrorType::InvalidInput,
            format!(
                "Category '{name}' is an {category_kind} category and cannot hold an {kind} \
                 transaction"
            ),
        ));
    }
    Ok(())
}

fn transaction_not_found(id: i64) -> Error {
    Error::msg(ErrorType::NotFound, format!("Transaction not found: {id}"))
}

fn transaction_from_row(row: &SqliteRow) -> Result<TransactionRow> {
    let date: String = row.try_get("date")?;
    let amount: String = row.try_get("amount")?;
    let kind: String = row.try_get("kind")?;
    Ok(TransactionRow {
        id: row.try_get("id")?,
        date: NaiveDate::parse_from_str(&date, DATE_FORMAT)
            .with_context(|| format!("Unexpected date '{date}' found in the database"))
            .pub_result(ErrorType::StorageUnavailable)?,
        amount: Amount::from_str(&amount)
            .with_context(|| format!("Unexpected amount '{amount}' found in the database"))
            .pub_result(ErrorType::StorageUnavailable)?,
        description: row.try_get("description")?,
        category_id: row.try_get("category_id")?,
        category_name: row.try_get("category_name")?,
        kind: parse_kind(&kind)?,
    })
}
