//! Notifications raised when spending approaches or exceeds a budget.

use rusqlite::{Connection, params};

use crate::{
    Error,
    budget::{Budget, get_budgets},
    notification::{Notification, create_notification},
    transaction::{Transaction, TransactionType, normalize_category},
};

const BUDGET_ALERT_TITLE: &str = "Budget Alert";

/// The fraction of a budget at which the user is warned.
const WARNING_THRESHOLD: f64 = 0.8;

/// Check each budget the expense `transaction` counts towards and notify the
/// user of any that are at 80% or more.
///
/// A budget counts the expense when the normalized categories match and the
/// transaction date falls within the budget period. Income never raises alerts.
///
/// Returns the notifications for the budgets that crossed a threshold.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn check_budget_alerts(
    transaction: &Transaction,
    connection: &Connection,
) -> Result<Vec<Notification>, Error> {
    if transaction.type_ != TransactionType::Expense {
        return Ok(Vec::new());
    }

    let category = normalize_category(&transaction.category);
    let mut notifications = Vec::new();

    for budget in get_budgets(transaction.user_id, connection)?
        .iter()
        .filter(|budget| normalize_category(&budget.category) == category)
        .filter(|budget| budget.contains(transaction.date))
    {
        let spent = spent_in_budget_period(budget, &category, connection)?;

        if let Some(message) = budget_alert_message(budget, spent) {
            notifications.push(create_notification(
                transaction.user_id,
                BUDGET_ALERT_TITLE,
                &message,
                connection,
            )?);
        }
    }

    Ok(notifications)
}

/// The alert text for `budget` given the amount `spent`, if any threshold has been reached.
fn budget_alert_message(budget: &Budget, spent: f64) -> Option<String> {
    if spent >= budget.amount {
        Some(format!("You've exceeded your {} budget", budget.category))
    } else if spent >= budget.amount * WARNING_THRESHOLD {
        Some(format!("You've reached 80% of your {} budget", budget.category))
    } else {
        None
    }
}

fn spent_in_budget_period(
    budget: &Budget,
    normalized_category: &str,
    connection: &Connection,
) -> Result<f64, Error> {
    let mut statement = connection.prepare(
        "SELECT category, amount FROM \"transaction\"
         WHERE user_id = ?1 AND type = 'expense' AND date BETWEEN ?2 AND ?3",
    )?;

    let rows = statement.query_map(
        params![budget.user_id.as_i64(), budget.start_date, budget.end_date],
        |row| Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?)),
    )?;

    let mut spent = 0.0;
    for row in rows {
        let (category, amount) = row?;

        if normalize_category(&category) == normalized_category {
            spent += amount;
        }
    }

    Ok(spent)
}
