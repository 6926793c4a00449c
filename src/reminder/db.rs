//! Storage for reminders.

use rusqlite::{Connection, OptionalExtension, Row, params};
use time::Date;

use crate::{
    Error,
    auth::UserID,
    database_id::{BudgetId, CardId, GoalId, ReminderId, TransactionId},
};

/// The row a reminder was scheduled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderLink {
    Budget(BudgetId),
    Goal(GoalId),
    Transaction(TransactionId),
    Card(CardId),
    None,
}

impl ReminderLink {
    /// The value for each of the `budget_id`, `goal_id`, `transaction_id` and
    /// `card_id` columns.
    fn columns(self) -> [Option<i64>; 4] {
        match self {
            ReminderLink::Budget(id) => [Some(id), None, None, None],
            ReminderLink::Goal(id) => [None, Some(id), None, None],
            ReminderLink::Transaction(id) => [None, None, Some(id), None],
            ReminderLink::Card(id) => [None, None, None, Some(id)],
            ReminderLink::None => [None; 4],
        }
    }

    fn from_columns(columns: [Option<i64>; 4]) -> Self {
        match columns {
            [Some(id), ..] => ReminderLink::Budget(id),
            [_, Some(id), ..] => ReminderLink::Goal(id),
            [_, _, Some(id), _] => ReminderLink::Transaction(id),
            [_, _, _, Some(id)] => ReminderLink::Card(id),
            _ => ReminderLink::None,
        }
    }

    /// The column holding the linked row's ID, if any.
    fn column_name(self) -> Option<&'static str> {
        match self {
            ReminderLink::Budget(_) => Some("budget_id"),
            ReminderLink::Goal(_) => Some("goal_id"),
            ReminderLink::Transaction(_) => Some("transaction_id"),
            ReminderLink::Card(_) => Some("card_id"),
            ReminderLink::None => None,
        }
    }

    fn id(self) -> Option<i64> {
        match self {
            ReminderLink::Budget(id)
            | ReminderLink::Goal(id)
            | ReminderLink::Transaction(id)
            | ReminderLink::Card(id) => Some(id),
            ReminderLink::None => None,
        }
    }
}

/// A scheduled notice for the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    pub id: ReminderId,
    pub user_id: UserID,
    pub title: String,
    pub description: String,
    pub remind_at: Date,
    pub is_done: bool,
    pub link: ReminderLink,
}

/// A reminder that has not been saved yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReminder {
    pub title: String,
    pub description: String,
    pub remind_at: Date,
    pub link: ReminderLink,
}

/// Create the reminder table.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_reminder_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS reminder (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                remind_at TEXT NOT NULL,
                is_done INTEGER NOT NULL DEFAULT 0,
                budget_id INTEGER,
                goal_id INTEGER,
                transaction_id INTEGER,
                card_id INTEGER,
                UNIQUE(user_id, title, remind_at),
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(budget_id) REFERENCES budget(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(goal_id) REFERENCES goal(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(transaction_id) REFERENCES \"transaction\"(id)
                    ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(card_id) REFERENCES card(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_reminder_user_date ON reminder(user_id, remind_at);",
        (),
    )?;

    Ok(())
}

const SELECT_COLUMNS: &str = "SELECT id, user_id, title, description, remind_at, is_done, \
    budget_id, goal_id, transaction_id, card_id FROM reminder";

/// Create a reminder for `user_id`.
///
/// Returns `None` if the user already has a reminder with the same title on
/// the same date, in which case nothing is inserted.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn create_reminder(
    user_id: UserID,
    reminder: NewReminder,
    connection: &Connection,
) -> Result<Option<Reminder>, Error> {
    let [budget_id, goal_id, transaction_id, card_id] = reminder.link.columns();

    let created = connection
        .prepare(
            "INSERT INTO reminder (user_id, title, description, remind_at, is_done,
                budget_id, goal_id, transaction_id, card_id)
             VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6, ?7, ?8)
             ON CONFLICT(user_id, title, remind_at) DO NOTHING
             RETURNING id, user_id, title, description, remind_at, is_done,
                budget_id, goal_id, transaction_id, card_id",
        )?
        .query_row(
            params![
                user_id.as_i64(),
                reminder.title,
                reminder.description,
                reminder.remind_at,
                budget_id,
                goal_id,
                transaction_id,
                card_id,
            ],
            map_reminder_row,
        )
        .optional()?;

    if created.is_none() {
        tracing::debug!(
            "Reminder {:?} on {} already exists for user {user_id}",
            reminder.title,
            reminder.remind_at
        );
    }

    Ok(created)
}

/// Delete the pending reminders for `link` other than the one titled
/// `keep_title` on `keep_date`.
///
/// Used when the linked row changes so that only the reminder matching its
/// current title and date remains.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub(super) fn delete_stale_reminders(
    user_id: UserID,
    link: ReminderLink,
    keep_title: &str,
    keep_date: Date,
    connection: &Connection,
) -> Result<usize, Error> {
    let (Some(column), Some(id)) = (link.column_name(), link.id()) else {
        return Ok(0);
    };

    connection
        .execute(
            &format!(
                "DELETE FROM reminder
                 WHERE user_id = ?1 AND {column} = ?2 AND is_done = 0
                    AND NOT (title = ?3 AND remind_at = ?4)"
            ),
            params![user_id.as_i64(), id, keep_title, keep_date],
        )
        .map_err(Error::from)
}

/// Delete every pending reminder for `link`, e.g. once a card no longer has a due date.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub(super) fn delete_pending_reminders(
    user_id: UserID,
    link: ReminderLink,
    connection: &Connection,
) -> Result<usize, Error> {
    let (Some(column), Some(id)) = (link.column_name(), link.id()) else {
        return Ok(0);
    };

    connection
        .execute(
            &format!(
                "DELETE FROM reminder WHERE user_id = ?1 AND {column} = ?2 AND is_done = 0"
            ),
            params![user_id.as_i64(), id],
        )
        .map_err(Error::from)
}

/// Retrieve `user_id`'s reminders that are not done and fall on or after
/// `today`, soonest first.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn get_upcoming_reminders(
    user_id: UserID,
    today: Date,
    limit: u32,
    connection: &Connection,
) -> Result<Vec<Reminder>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_COLUMNS} WHERE user_id = ?1 AND is_done = 0 AND remind_at >= ?2
             ORDER BY remind_at ASC, id ASC LIMIT ?3"
        ))?
        .query_map(params![user_id.as_i64(), today, limit], map_reminder_row)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::from)
}

/// Mark one of `user_id`'s reminders as done so it is no longer shown.
///
/// # Errors
/// Returns [Error::UpdateMissingReminder] if the reminder does not belong to the user.
pub fn mark_reminder_done(
    user_id: UserID,
    id: ReminderId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE reminder SET is_done = 1 WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        Err(Error::UpdateMissingReminder)
    } else {
        Ok(())
    }
}

/// Delete one of `user_id`'s reminders.
///
/// # Errors
/// Returns [Error::DeleteMissingReminder] if the reminder does not belong to the user.
pub fn delete_reminder(
    user_id: UserID,
    id: ReminderId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM reminder WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        Err(Error::DeleteMissingReminder)
    } else {
        Ok(())
    }
}

fn map_reminder_row(row: &Row) -> Result<Reminder, rusqlite::Error> {
    Ok(Reminder {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        title: row.get(2)?,
        description: row.get(3)?,
        remind_at: row.get(4)?,
        is_done: row.get(5)?,
        link: ReminderLink::from_columns([row.get(6)?, row.get(7)?, row.get(8)?, row.get(9)?]),
    })
}
