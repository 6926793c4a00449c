//! Describes what an upcoming reminder is about, e.g. the budget it belongs to.

use rusqlite::Connection;
use time::Date;

use crate::{
    Error,
    auth::UserID,
    budget::get_budget,
    card::{Card, get_card, get_cards},
    goal::get_goal,
    html::format_currency,
    reminder::{Reminder, ReminderLink, get_upcoming_reminders},
    settings::Currency,
    transaction::{PaymentFilter, TransactionFilter, get_transaction, get_transactions},
};

/// A short description of the row a reminder is about.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderLabel {
    /// The kind of row, e.g. "Budget" or "Credit Card".
    pub link_type: &'static str,
    pub label: String,
}

/// A reminder paired with a description of the row it is about, if there is one.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedReminder {
    pub reminder: Reminder,
    pub label: Option<ReminderLabel>,
}

/// Retrieve up to `limit` of `user_id`'s upcoming reminders with their labels.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn get_linked_reminders(
    user_id: UserID,
    today: Date,
    limit: u32,
    currency: Currency,
    connection: &Connection,
) -> Result<Vec<LinkedReminder>, Error> {
    get_upcoming_reminders(user_id, today, limit, connection)?
        .into_iter()
        .map(|reminder| {
            let label = reminder_label(&reminder, currency, connection)?;

            Ok(LinkedReminder { reminder, label })
        })
        .collect()
}

/// Describe the row `reminder` is about.
///
/// Returns `None` when the reminder is not about anything or the row it was
/// about has since been deleted.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn reminder_label(
    reminder: &Reminder,
    currency: Currency,
    connection: &Connection,
) -> Result<Option<ReminderLabel>, Error> {
    let user_id = reminder.user_id;

    let label = match reminder.link {
        ReminderLink::Budget(id) => ignore_missing(get_budget(user_id, id, connection))?.map(
            |budget| ReminderLabel {
                link_type: "Budget",
                label: budget.category,
            },
        ),
        ReminderLink::Goal(id) => {
            ignore_missing(get_goal(user_id, id, connection))?.map(|goal| ReminderLabel {
                link_type: "Goal",
                label: goal.name,
            })
        }
        ReminderLink::Transaction(id) => ignore_missing(get_transaction(user_id, id, connection))?
            .map(|transaction| ReminderLabel {
                link_type: "Transaction",
                label: format!(
                    "{} • Amount Due: {}",
                    transaction.category,
                    format_currency(transaction.amount, currency)
                ),
            }),
        ReminderLink::Card(id) => ignore_missing(get_card(user_id, id, connection))?
            .map(|card| card_label(&card, currency, connection))
            .transpose()?,
        ReminderLink::None => match card_named_in_reminder(reminder, connection)? {
            Some(card) => Some(card_label(&card, currency, connection)?),
            None => None,
        },
    };

    Ok(label)
}

fn ignore_missing<T>(result: Result<T, Error>) -> Result<Option<T>, Error> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(Error::NotFound) => Ok(None),
        Err(error) => Err(error),
    }
}

/// The total of the expenses paid with `card`.
fn card_label(
    card: &Card,
    currency: Currency,
    connection: &Connection,
) -> Result<ReminderLabel, Error> {
    let total_due: f64 = get_transactions(
        card.user_id,
        TransactionFilter::expenses().payment(PaymentFilter::Card),
        connection,
    )?
    .iter()
    .filter(|transaction| transaction.card_id == Some(card.id))
    .map(|transaction| transaction.amount)
    .sum();

    Ok(ReminderLabel {
        link_type: "Credit Card",
        label: format!("Total Due: {}", format_currency(total_due, currency)),
    })
}

/// Find the card a credit card reminder names in its description, e.g. `Card "Travel" payment is due`.
fn card_named_in_reminder(
    reminder: &Reminder,
    connection: &Connection,
) -> Result<Option<Card>, Error> {
    let is_card_reminder = reminder.title.to_lowercase().contains("credit card")
        && reminder.description.to_lowercase().contains("card");
    let Some(card_name) = is_card_reminder
        .then(|| quoted_card_name(&reminder.description))
        .flatten()
    else {
        return Ok(None);
    };

    Ok(get_cards(reminder.user_id, connection)?
        .into_iter()
        .find(|card| card.name == card_name))
}

/// Extract `name` from the first `Card "name"` in `text`.
///
/// At least one whitespace character must separate `Card` and the opening quote.
fn quoted_card_name(text: &str) -> Option<&str> {
    text.match_indices("Card").find_map(|(index, keyword)| {
        let after_keyword = &text[index + keyword.len()..];
        let quoted = after_keyword.trim_start();

        if quoted.len() == after_keyword.len() {
            return None;
        }

        let name_and_rest = quoted.strip_prefix('"')?;
        let end = name_and_rest.find('"')?;

        Some(&name_and_rest[..end])
    })
}
