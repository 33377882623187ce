use crate::args::{AddCategoryArgs, DeleteCategoryArgs, ListCategoriesArgs};
use crate::commands::{table, Out};
use crate::model::Category;
use crate::{Config, Result};
use tracing::debug;

/// Creates a category and returns its ID.
pub async fn add_category(config: Config, args: AddCategoryArgs) -> Result<Out<i64>> {
    let id = config.db().add_category(&args.name, args.kind).await?;
    Ok(Out::new(
        format!(
            "Added {} category '{}' with ID {id}",
            args.kind,
            args.name.trim()
        ),
        id,
    ))
}

/// Deletes a category. Fails while any transaction still refers to it.
pub async fn delete_category(config: Config, args: DeleteCategoryArgs) -> Result<Out<i64>> {
    config.db().delete_category(args.id).await?;
    Ok(Out::new(format!("Deleted category {}", args.id), args.id))
}

/// Lists categories, optionally only those of one kind.
pub async fn list_categories(
    config: Config,
    args: ListCategoriesArgs,
) -> Result<Out<Vec<Category>>> {
    let categories = config.db().list_categories(args.kind).await?;
    debug!("Found {} categories", categories.len());
    if categories.is_empty() {
        return Ok(Out::new("No categories found", categories));
    }

    let rows = categories
        .iter()
        .map(|c| vec![c.id().to_string(), c.kind().to_string(), c.name().to_string()])
        .collect();
    let message = table("Categories", &["ID", "Kind", "Name"], rows);
    Ok(Out::new(message, categories))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Kind;
    use crate::test::TestEnv;
    use crate::ErrorType;

    #[tokio::test]
    async fn test_add_and_list_categories() {
        let env = TestEnv::new().await;
        let out = add_category(
            env.config(),
            AddCategoryArgs {
                name: "  Pets ".to_string(),
                kind: Kind::Expense,
            },
        )
        .await
        .unwrap();
        let id = *out.structure().unwrap();
        assert_eq!(
            out.message(),
            format!("Added Expense category 'Pets' with ID {id}")
        );

        add_category(
            env.config(),
            AddCategoryArgs {
                name: "Bonus".to_string(),
                kind: Kind::Income,
            },
        )
        .await
        .unwrap();

        let all = list_categories(env.config(), ListCategoriesArgs { kind: None })
            .await
            .unwrap();
        let names: Vec<&str> = all.structure().unwrap().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["Pets", "Bonus"]);
        assert!(all.message().contains("| ID | Kind | Name |"));

        let income = list_categories(
            env.config(),
            ListCategoriesArgs {
                kind: Some(Kind::Income),
            },
        )
        .await
        .unwrap();
        assert_eq!(income.structure().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_add_duplicate_category() {
        let env = TestEnv::new().await;
        let args = AddCategoryArgs {
            name: "Pets".to_string(),
            kind: Kind::Expense,
        };
        add_category(env.config(), args.clone()).await.unwrap();
        let err = add_category(env.config(), args).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::DuplicateCategory);
    }

    #[tokio::test]
    async fn test_delete_category() {
        let env = TestEnv::new().await;
        let id = env.category("Pets", Kind::Expense).await;

        let out = delete_category(env.config(), DeleteCategoryArgs { id })
            .await
            .unwrap();
        assert_eq!(out.structure(), Some(&id));

        let err = delete_category(env.config(), DeleteCategoryArgs { id })
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::NotFound);
    }

    #[tokio::test]
    async fn test_list_empty() {
        let env = TestEnv::new().await;
        let out = list_categories(env.config(), ListCategoriesArgs { kind: None })
            .await
            .unwrap();
        assert_eq!(out.message(), "No categories found");
        assert!(out.structure().unwrap().is_empty());
    }
}
