//! Reminders scheduled automatically when budgets, goals, recurring
//! transactions and cards are saved.

use rusqlite::Connection;
use time::{Date, Duration};

use crate::{
    Error,
    auth::UserID,
    budget::Budget,
    card::Card,
    goal::Goal,
    reminder::{
        NewReminder, Reminder, ReminderLink, create_reminder,
        db::{delete_pending_reminders, delete_stale_reminders},
    },
    transaction::Transaction,
};

/// The start of card payment reminder titles. Enrichment relies on it containing "credit card".
const CARD_REMINDER_TITLE: &str = "Credit card payment due";

const BUDGET_REMINDER_DAYS: i64 = 3;
const GOAL_REMINDER_DAYS: i64 = 2;
const CARD_REMINDER_DAYS: i64 = 3;

fn days_before(date: Date, days: i64) -> Option<Date> {
    date.checked_sub(Duration::days(days))
}

/// Save `reminder` for `link`, replacing any other pending reminder for `link`.
///
/// Without a reminder every pending reminder for `link` is removed, e.g. when
/// a goal's target date is cleared.
fn schedule(
    user_id: UserID,
    link: ReminderLink,
    reminder: Option<NewReminder>,
    connection: &Connection,
) -> Result<Option<Reminder>, Error> {
    let Some(reminder) = reminder else {
        delete_pending_reminders(user_id, link, connection)?;
        return Ok(None);
    };

    delete_stale_reminders(user_id, link, &reminder.title, reminder.remind_at, connection)?;

    create_reminder(user_id, reminder, connection)
}

/// Remind the user three days before `budget` ends.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn schedule_budget_reminder(
    budget: &Budget,
    connection: &Connection,
) -> Result<Option<Reminder>, Error> {
    let link = ReminderLink::Budget(budget.id);
    let reminder = days_before(budget.end_date, BUDGET_REMINDER_DAYS).map(|remind_at| {
        NewReminder {
            title: format!("{} budget period ending soon", budget.category),
            description: format!(
                "Your {} budget period ends on {}",
                budget.category, budget.end_date
            ),
            remind_at,
            link,
        }
    });

    schedule(budget.user_id, link, reminder, connection)
}

/// Remind the user two days before the target date of `goal`, if it has one.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn schedule_goal_reminder(
    goal: &Goal,
    connection: &Connection,
) -> Result<Option<Reminder>, Error> {
    let link = ReminderLink::Goal(goal.id);
    let reminder = goal.target_date.and_then(|target_date| {
        let remind_at = days_before(target_date, GOAL_REMINDER_DAYS)?;

        Some(NewReminder {
            title: format!("{} goal due soon", goal.name),
            description: format!(
                "Your savings goal \"{}\" is due on {target_date}",
                goal.name
            ),
            remind_at,
            link,
        })
    });

    schedule(goal.user_id, link, reminder, connection)
}

/// Remind the user of the next occurrence of a recurring `transaction`.
///
/// One-off transactions have no reminder.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn schedule_transaction_reminder(
    transaction: &Transaction,
    connection: &Connection,
) -> Result<Option<Reminder>, Error> {
    let link = ReminderLink::Transaction(transaction.id);
    let reminder = transaction
        .recurrence_frequency
        .filter(|_| transaction.is_recurring)
        .and_then(|frequency| {
            let remind_at = frequency.next_occurrence(transaction.date)?;

            Some(NewReminder {
                title: format!("{} {} due", frequency, transaction.category),
                description: format!(
                    "Your {} {} of {:.2} recurs on {remind_at}",
                    frequency.as_str().to_lowercase(),
                    transaction.type_.as_str(),
                    transaction.amount
                ),
                remind_at,
                link,
            })
        });

    schedule(transaction.user_id, link, reminder, connection)
}

/// Remind the user three days before the payment due date of `card`, if it has one.
///
/// The title names the card so that cards due on the same day each get a reminder.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn schedule_card_reminder(
    card: &Card,
    connection: &Connection,
) -> Result<Option<Reminder>, Error> {
    let link = ReminderLink::Card(card.id);
    let reminder = card
        .due_date
        .and_then(|due_date| days_before(due_date, CARD_REMINDER_DAYS))
        .map(|remind_at| NewReminder {
            title: format!("{CARD_REMINDER_TITLE}: {}", card.name),
            description: format!("Card \"{}\" payment is due", card.name),
            remind_at,
            link,
        });

    schedule(card.user_id, link, reminder, connection)
}
