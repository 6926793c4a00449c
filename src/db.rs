//! Sets up the application's SQLite database.

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{
    auth::{create_password_reset_table, create_user_table},
    budget::create_budget_table,
    card::create_card_table,
    goal::{create_goal_table, create_saving_table},
    notification::create_notification_table,
    reminder::create_reminder_table,
    settings::create_preferences_table,
    transaction::create_transaction_table,
};

/// Create all the tables for the application if they do not already exist.
///
/// Foreign key enforcement is switched on for `connection` so that rows
/// belonging to a user cannot reference another user's cards or goals.
///
/// # Errors
/// Returns an error if any of the tables could not be created.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_password_reset_table(&transaction)?;
    create_preferences_table(&transaction)?;
    create_card_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_budget_table(&transaction)?;
    create_goal_table(&transaction)?;
    create_saving_table(&transaction)?;
    create_notification_table(&transaction)?;
    create_reminder_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
