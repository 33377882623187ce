use super::{parse_kind, Db};
use crate::error::{Error, ErrorType, IntoResult};
use crate::model::{clean_name, default_categories, Category, Kind};
use crate::Result;
use anyhow::Context;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::debug;

impl Db {
    /// Inserts the default categories of both kinds, skipping any that already exist.
    ///
    /// Returns the number of categories that were actually inserted, so a second call returns 0.
    pub async fn seed_defaults(&self) -> Result<u64> {
        let mut tx = self.pool().begin().await?;
        let mut inserted = 0;
        for (name, kind) in default_categories() {
            let res = sqlx::query(
                "INSERT INTO categories (name, kind) VALUES (?, ?) \
                 ON CONFLICT (name, kind) DO NOTHING",
            )
            .bind(name)
            .bind(kind.to_string())
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to seed the default category '{name}'"))
            .pub_result(ErrorType::StorageUnavailable)?;
            inserted += res.rows_affected();
        }
        tx.commit().await?;
        debug!("Seeded {inserted} default categories");
        Ok(inserted)
    }

    /// Creates a category and returns its id.
    ///
    /// # Errors
    /// - `InvalidInput` if `name` is empty after trimming.
    /// - `DuplicateCategory` if a category with the same name and kind exists.
    pub async fn add_category(&self, name: &str, kind: Kind) -> Result<i64> {
        let name = clean_name(name)?;
        let mut tx = self.pool().begin().await?;

        let existing: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM categories WHERE name = ? AND kind = ?")
                .bind(&name)
                .bind(kind.to_string())
                .fetch_optional(&mut *tx)
                .await
                .context("Failed to look up the category")
                .pub_result(ErrorType::StorageUnavailable)?;
        if let Some((id,)) = existing {
            return Err(Error::msg(
                ErrorType::DuplicateCategory,
                format!("An {kind} category named '{name}' already exists with id {id}"),
            ));
        }

        let id = sqlx::query("INSERT INTO categories (name, kind) VALUES (?, ?)")
            .bind(&name)
            .bind(kind.to_string())
            .execute(&mut *tx)
            .await
            .context("Failed to insert the category")
            .pub_result(ErrorType::StorageUnavailable)?
            .last_insert_rowid();
        tx.commit().await?;

        debug!("Inserted {kind} category '{name}' with id {id}");
        Ok(id)
    }

    /// Deletes a category that no transaction refers to.
    ///
    /// # Errors
    /// - `NotFound` if there is no category with this id.
    /// - `CategoryInUse` if one or more transactions reference it.
    pub async fn delete_category(&self, id: i64) -> Result<()> {
        let mut tx = self.pool().begin().await?;

        let (found,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM categories WHERE id = ?")
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .context("Failed to look up the category")
            .pub_result(ErrorType::StorageUnavailable)?;
        if found == 0 {
            return Err(Error::msg(
                ErrorType::NotFound,
                format!("Category not found: {id}"),
            ));
        }

        let (uses,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM transactions WHERE category_id = ?")
                .bind(id)
                .fetch_one(&mut *tx)
                .await
                .context("Failed to count the transactions of the category")
                .pub_result(ErrorType::StorageUnavailable)?;
        if uses > 0 {
            return Err(Error::msg(
                ErrorType::CategoryInUse,
                format!(
                    "Category {id} is used by {uses} transaction{}. \
                     Delete or move those transactions first.",
                    if uses == 1 { "" } else { "s" }
                ),
            ));
        }

        sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete the category")
            .pub_result(ErrorType::StorageUnavailable)?;
        tx.commit().await?;

        debug!("Deleted category {id}");
        Ok(())
    }

    /// Lists categories ordered by kind and then name, optionally only those of one kind.
    pub async fn list_categories(&self, kind: Option<Kind>) -> Result<Vec<Category>> {
        let rows = match kind {
            Some(kind) => {
                sqlx::query(
                    "SELECT id, name, kind FROM categories WHERE kind = ? ORDER BY kind, name, id",
                )
                .bind(kind.to_string())
                .fetch_all(self.pool())
                .await
            }
            None => {
                sqlx::query("SELECT id, name, kind FROM categories ORDER BY kind, name, id")
                    .fetch_all(self.pool())
                    .await
            }
        }
        .context("Failed to list categories")
        .pub_result(ErrorType::StorageUnavailable)?;

        rows.iter().map(category_from_row).collect()
    }

    pub async fn get_category(&self, id: i64) -> Result<Option<Category>> {
        let row = sqlx::query("SELECT id, name, kind FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .context("Failed to look up the category")
            .pub_result(ErrorType::StorageUnavailable)?;
        row.as_ref().map(category_from_row).transpose()
    }

    /// Looks a category up by its name within one kind. Surrounding whitespace in `name` is
    /// ignored.
    pub async fn find_category(&self, name: &str, kind: Kind) -> Result<Option<Category>> {
        let row = sqlx::query("SELECT id, name, kind FROM categories WHERE name = ? AND kind = ?")
            .bind(name.trim())
            .bind(kind.to_string())
            .fetch_optional(self.pool())
            .await
            .context("Failed to look up the category")
            .pub_result(ErrorType::StorageUnavailable)?;
        row.as_ref().map(category_from_row).transpose()
    }
}

fn category_from_row(row: &SqliteRow) -> Result<Category> {
    let kind: String = row.try_get("kind")?;
    Ok(Category {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        kind: parse_kind(&kind)?,
    })
}
