use crate::args::{
    AddTransactionArgs, DeleteTransactionArgs, ListTransactionsArgs, UpdateTransactionArgs,
};
use crate::commands::{table, Out};
use crate::error::Error;
use crate::model::{Amount, Kind, TransactionInput, TransactionRow, DATE_FORMAT};
use crate::{Config, ErrorType, Result};
use chrono::Local;
use std::str::FromStr;
use tracing::debug;

/// Records a transaction and returns its ID. The category is looked up by name among the
/// categories of the transaction's kind. A missing date means today.
pub async fn add_transaction(config: Config, args: AddTransactionArgs) -> Result<Out<i64>> {
    let category_id = resolve_category(&config, &args.category, args.kind).await?;
    let date = match args.date {
        Some(date) => date,
        None => Local::now().date_naive().format(DATE_FORMAT).to_string(),
    };
    let input = TransactionInput {
        date,
        amount: parse_amount(&args.amount)?,
        description: args.description,
        category_id,
        kind: args.kind,
    };

    let id = config.db().add_transaction(&input).await?;
    Ok(Out::new(
        format!(
            "Added {} of {} on {} with ID {id}",
            input.kind,
            input.amount.formatted(),
            input.date.trim()
        ),
        id,
    ))
}

/// Overwrites the given fields of a transaction and keeps the rest. Returns the stored result.
pub async fn update_transaction(
    config: Config,
    args: UpdateTransactionArgs,
) -> Result<Out<TransactionRow>> {
    let existing = get_existing(&config, args.id).await?;
    let mut input = existing.to_input();

    if let Some(kind) = args.kind {
        input.kind = kind;
    }
    match &args.category {
        Some(name) => input.category_id = resolve_category(&config, name, input.kind).await?,
        None if input.kind != existing.kind() => {
            return Err(Error::msg(
                ErrorType::InvalidInput,
                format!(
                    "Changing transaction {} to {} requires a --category of that kind",
                    args.id, input.kind
                ),
            ));
        }
        None => {}
    }
    if let Some(date) = args.date {
        input.date = date;
    }
    if let Some(amount) = &args.amount {
        input.amount = parse_amount(amount)?;
    }
    if let Some(description) = args.description {
        input.description = Some(description);
    }
    debug!("Updating transaction {} with {input:?}", args.id);

    config.db().update_transaction(args.id, &input).await?;
    let updated = get_existing(&config, args.id).await?;
    Ok(Out::new(format!("Updated transaction {}", args.id), updated))
}

/// Deletes a transaction.
pub async fn delete_transaction(config: Config, args: DeleteTransactionArgs) -> Result<Out<i64>> {
    config.db().delete_transaction(args.id).await?;
    Ok(Out::new(format!("Deleted transaction {}", args.id), args.id))
}

/// Lists the most recent transactions, newest first.
pub async fn list_transactions(
    config: Config,
    args: ListTransactionsArgs,
) -> Result<Out<Vec<TransactionRow>>> {
    let limit = args.limit.unwrap_or_else(|| config.recent_limit());
    let transactions = config.db().list_recent_transactions(limit).await?;
    if transactions.is_empty() {
        return Ok(Out::new("No transactions found", transactions));
    }

    let rows = transactions
        .iter()
        .map(|t| {
            vec![
                t.id().to_string(),
                t.date().format(DATE_FORMAT).to_string(),
                t.kind().to_string(),
                t.category_name().to_string(),
                t.amount().formatted(),
                t.description().unwrap_or_default().to_string(),
            ]
        })
        .collect();
    let title = format!("The {} most recent transactions", transactions.len());
    let message = table(
        &title,
        &["ID", "Date", "Kind", "Category", "Amount", "Description"],
        rows,
    );
    Ok(Out::new(message, transactions))
}

async fn resolve_category(config: &Config, name: &str, kind: Kind) -> Result<i64> {
    match config.db().find_category(name, kind).await? {
        Some(category) => Ok(category.id()),
        None => Err(Error::msg(
            ErrorType::NotFound,
            format!("There is no {kind} category named '{}'", name.trim()),
        )),
    }
}

async fn get_existing(config: &Config, id: i64) -> Result<TransactionRow> {
    config.db().get_transaction(id).await?.ok_or_else(|| {
        Error::msg(
            ErrorType::NotFound,
            format!("Transaction {id} does not exist"),
        )
    })
}

fn parse_amount(s: &str) -> Result<Amount> {
    Amount::from_str(s).map_err(|e| {
        Error::msg(
            ErrorType::InvalidInput,
            format!("'{s}' is not a valid amount: {e}"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    fn add_args(date: &str, amount: &str, kind: Kind, category: &str) -> AddTransactionArgs {
        AddTransactionArgs {
            date: Some(date.to_string()),
            amount: amount.to_string(),
            kind,
            category: category.to_string(),
            description: None,
        }
    }

    fn update_args(id: i64) -> UpdateTransactionArgs {
        UpdateTransactionArgs {
            id,
            date: None,
            amount: None,
            kind: None,
            category: None,
            description: None,
        }
    }

    #[tokio::test]
    async fn test_add_transaction() {
        let env = TestEnv::new().await;
        env.category("Market", Kind::Expense).await;

        let out = add_transaction(
            env.config(),
            add_args("2024-03-05", "1,250.5", Kind::Expense, "Market"),
        )
        .await
        .unwrap();
        let id = *out.structure().unwrap();
        assert_eq!(
            out.message(),
            format!("Added Expense of 1,250.50 on 2024-03-05 with ID {id}")
        );

        let row = env.db().get_transaction(id).await.unwrap().unwrap();
        assert_eq!(row.amount().to_string(), "1250.5");
        assert_eq!(row.category_name(), "Market");
    }

    #[tokio::test]
    async fn test_add_transaction_defaults_to_today() {
        let env = TestEnv::new().await;
        env.category("Salary", Kind::Income).await;

        let mut args = add_args("unused", "100", Kind::Income, "Salary");
        args.date = None;
        let out = add_transaction(env.config(), args).await.unwrap();

        let row = env
            .db()
            .get_transaction(*out.structure().unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.date(), Local::now().date_naive());
    }

    #[tokio::test]
    async fn test_add_transaction_category_of_other_kind() {
        let env = TestEnv::new().await;
        env.category("Salary", Kind::Income).await;

        let err = add_transaction(
            env.config(),
            add_args("2024-03-05", "10", Kind::Expense, "Salary"),
        )
        .await
        .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::NotFound);
        assert_eq!(env.db().count_transactions().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_add_transaction_bad_amount() {
        let env = TestEnv::new().await;
        env.category("Market", Kind::Expense).await;

        for amount in ["abc", "0", "-5"] {
            let err = add_transaction(
                env.config(),
                add_args("2024-03-05", amount, Kind::Expense, "Market"),
            )
            .await
            .unwrap_err();
            assert_eq!(err.error_type(), ErrorType::InvalidInput, "{amount}");
        }
        assert_eq!(env.db().count_transactions().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_transaction_merges_fields() {
        let env = TestEnv::new().await;
        env.category("Market", Kind::Expense).await;
        let mut args = add_args("2024-03-05", "20", Kind::Expense, "Market");
        args.description = Some("groceries".to_string());
        let id = *add_transaction(env.config(), args)
            .await
            .unwrap()
            .structure()
            .unwrap();

        let mut update = update_args(id);
        update.amount = Some("25.75".to_string());
        let out = update_transaction(env.config(), update).await.unwrap();
        let row = out.structure().unwrap();
        assert_eq!(row.amount().to_string(), "25.75");
        assert_eq!(row.description(), Some("groceries"));
        assert_eq!(row.date().format(DATE_FORMAT).to_string(), "2024-03-05");

        let mut update = update_args(id);
        update.description = Some(String::new());
        let out = update_transaction(env.config(), update).await.unwrap();
        assert_eq!(out.structure().unwrap().description(), None);
    }

    #[tokio::test]
    async fn test_update_transaction_kind_change() {
        let env = TestEnv::new().await;
        env.category("Market", Kind::Expense).await;
        let salary = env.category("Salary", Kind::Income).await;
        let id = *add_transaction(
            env.config(),
            add_args("2024-03-05", "20", Kind::Expense, "Market"),
        )
        .await
        .unwrap()
        .structure()
        .unwrap();

        let mut update = update_args(id);
        update.kind = Some(Kind::Income);
        let err = update_transaction(env.config(), update.clone())
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::InvalidInput);

        update.category = Some("Salary".to_string());
        let out = update_transaction(env.config(), update).await.unwrap();
        let row = out.structure().unwrap();
        assert_eq!(row.kind(), Kind::Income);
        assert_eq!(row.category_id(), salary);
    }

    #[tokio::test]
    async fn test_update_missing_transaction() {
        let env = TestEnv::new().await;
        let err = update_transaction(env.config(), update_args(99))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::NotFound);
    }

    #[tokio::test]
    async fn test_delete_and_list_transactions() {
        let env = TestEnv::new().await;
        env.category("Market", Kind::Expense).await;
        for date in ["2024-01-01", "2024-01-03", "2024-01-02"] {
            add_transaction(
                env.config(),
                add_args(date, "5", Kind::Expense, "Market"),
            )
            .await
            .unwrap();
        }

        let out = list_transactions(env.config(), ListTransactionsArgs { limit: Some(2) })
            .await
            .unwrap();
        let listed = out.structure().unwrap();
        let dates: Vec<String> = listed
            .iter()
            .map(|t| t.date().format(DATE_FORMAT).to_string())
            .collect();
        assert_eq!(dates, vec!["2024-01-03", "2024-01-02"]);
        assert!(out.message().contains("| Market | 5.00 |"));

        let newest = listed[0].id();
        delete_transaction(env.config(), DeleteTransactionArgs { id: newest })
            .await
            .unwrap();
        let err = delete_transaction(env.config(), DeleteTransactionArgs { id: newest })
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::NotFound);

        let out = list_transactions(env.config(), ListTransactionsArgs { limit: None })
            .await
            .unwrap();
        assert_eq!(out.structure().unwrap().len(), 2);
    }
}
