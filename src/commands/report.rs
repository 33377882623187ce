use crate::args::{BreakdownArgs, MonthlyArgs};
use crate::commands::{table, Out, NOT_ENOUGH_DATA};
use crate::model::Amount;
use crate::report::{add_amounts, Balance, CategoryTotal, MonthlyTotals};
use crate::{Config, Reports, Result};
use rust_decimal::Decimal;

/// Income and expense totals per month, oldest month first. Months without transactions are left
/// out.
pub async fn monthly(config: Config, args: MonthlyArgs) -> Result<Out<Vec<MonthlyTotals>>> {
    let months_back = args.months_back.unwrap_or_else(|| config.months_back());
    let reports = Reports::new(config.db().clone());
    let Some(months) = reports.monthly_summary(months_back).await? else {
        return Ok(Out::new_message(format!(
            "{NOT_ENOUGH_DATA} for a monthly summary of the last {months_back} months"
        )));
    };

    let rows = months
        .iter()
        .map(|m| {
            Ok(vec![
                m.month.clone(),
                m.income.formatted(),
                m.expense.formatted(),
                m.net()?.formatted(),
            ])
        })
        .collect::<Result<Vec<_>>>()?;
    let title = format!(
        "Monthly summary for the last {months_back} months up to {}",
        reports.today()
    );
    let message = table(&title, &["Month", "Income", "Expense", "Net"], rows);
    Ok(Out::new(message, months))
}

/// Totals per category over the trailing days, largest first.
pub async fn breakdown(config: Config, args: BreakdownArgs) -> Result<Out<Vec<CategoryTotal>>> {
    let days_back = args.days_back.unwrap_or_else(|| config.days_back());
    let reports = Reports::new(config.db().clone());
    let Some(totals) = reports.category_breakdown(args.kind, days_back).await? else {
        return Ok(Out::new_message(format!(
            "{NOT_ENOUGH_DATA} for a breakdown of {} over the last {days_back} days",
            args.kind
        )));
    };

    let sum = totals.iter().try_fold(Amount::default(), |sum, t| {
        add_amounts(sum, t.total, &format!("{} breakdown", args.kind))
    })?;
    let rows = totals
        .iter()
        .map(|t| {
            vec![
                t.category.clone(),
                t.total.formatted(),
                format!("{:.1}%", share(t.total.value(), sum.value())),
            ]
        })
        .collect();
    let title = format!(
        "{} by category over the last {days_back} days up to {}",
        args.kind,
        reports.today()
    );
    let message = table(&title, &["Category", "Total", "Share"], rows);
    Ok(Out::new(message, totals))
}

/// All-time income against all-time expenses.
pub async fn balance(config: Config) -> Result<Out<Balance>> {
    let reports = Reports::new(config.db().clone());
    let Some(balance) = reports.income_expense_balance().await? else {
        return Ok(Out::new_message(format!(
            "{NOT_ENOUGH_DATA}: a balance needs both income and expense transactions"
        )));
    };

    let message = format!(
        "Income: {}\nExpense: {}\nBalance: {}",
        balance.income.formatted(),
        balance.expense.formatted(),
        balance.balance.formatted()
    );
    Ok(Out::new(message, balance))
}

/// `part` as a percentage of `whole` with one decimal. `part` must not exceed `whole`.
fn share(part: Decimal, whole: Decimal) -> Decimal {
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or_default()
        .round_dp(1)
}
