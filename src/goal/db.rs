//! Database operations for goals and the savings put towards them.

use std::collections::HashMap;

use rusqlite::{Connection, Row, params};
use time::Date;

use crate::{
    Error,
    auth::UserID,
    database_id::GoalId,
    goal::{Goal, GoalBuilder, Saving},
};

/// Create the goal table.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_goal_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS goal (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                target_amount REAL NOT NULL CHECK (target_amount > 0),
                start_amount REAL NOT NULL DEFAULT 0 CHECK (start_amount >= 0),
                target_date TEXT,
                frequency TEXT,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Create the saving table, whose rows are deleted along with their goal.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_saving_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS saving (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                goal_id INTEGER NOT NULL,
                amount REAL NOT NULL CHECK (amount > 0),
                date TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(goal_id) REFERENCES goal(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Create a new goal for `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyGoalName], [Error::NonPositiveAmount] or
///   [Error::NegativeStartAmount] if the builder is invalid,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_goal(
    user_id: UserID,
    builder: GoalBuilder,
    connection: &Connection,
) -> Result<Goal, Error> {
    let builder = builder.validate()?;

    let goal = connection
        .prepare(
            "INSERT INTO goal (user_id, name, target_amount, start_amount, target_date, frequency)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, user_id, name, target_amount, start_amount, target_date, frequency",
        )?
        .query_row(
            params![
                user_id.as_i64(),
                builder.name,
                builder.target_amount,
                builder.start_amount,
                builder.target_date,
                builder.frequency,
            ],
            map_goal_row,
        )?;

    Ok(goal)
}

/// Retrieve one of `user_id`'s goals.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to one of the user's goals,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_goal(user_id: UserID, id: GoalId, connection: &Connection) -> Result<Goal, Error> {
    let goal = connection
        .prepare(
            "SELECT id, user_id, name, target_amount, start_amount, target_date, frequency
             FROM goal WHERE id = ?1 AND user_id = ?2",
        )?
        .query_row((id, user_id.as_i64()), map_goal_row)?;

    Ok(goal)
}

/// Retrieve all of `user_id`'s goals, the soonest target date first and
/// goals without one last.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn get_goals(user_id: UserID, connection: &Connection) -> Result<Vec<Goal>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, target_amount, start_amount, target_date, frequency
             FROM goal WHERE user_id = ?1
             ORDER BY target_date IS NULL, target_date ASC, id ASC",
        )?
        .query_map([user_id.as_i64()], map_goal_row)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::from)
}

/// Replace the fields of one of `user_id`'s goals.
///
/// # Errors
/// This function will return a:
/// - validation error if the builder is invalid, see [create_goal],
/// - [Error::UpdateMissingGoal] if the goal does not belong to the user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_goal(
    user_id: UserID,
    id: GoalId,
    builder: GoalBuilder,
    connection: &Connection,
) -> Result<Goal, Error> {
    let builder = builder.validate()?;

    let rows_affected = connection.execute(
        "UPDATE goal SET name = ?1, target_amount = ?2, start_amount = ?3, target_date = ?4,
            frequency = ?5
         WHERE id = ?6 AND user_id = ?7",
        params![
            builder.name,
            builder.target_amount,
            builder.start_amount,
            builder.target_date,
            builder.frequency,
            id,
            user_id.as_i64(),
        ],
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingGoal);
    }

    get_goal(user_id, id, connection)
}

/// Delete one of `user_id`'s goals and its savings.
///
/// # Errors
/// Returns [Error::DeleteMissingGoal] if the goal does not belong to the user.
pub fn delete_goal(user_id: UserID, id: GoalId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM goal WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        Err(Error::DeleteMissingGoal)
    } else {
        Ok(())
    }
}

/// Put `amount` towards one of `user_id`'s goals on `date`.
///
/// # Errors
/// This function will return a:
/// - [Error::NonPositiveAmount] if `amount` is not greater than zero,
/// - [Error::NotFound] if the goal does not belong to the user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn add_saving(
    user_id: UserID,
    goal_id: GoalId,
    amount: f64,
    date: Date,
    connection: &Connection,
) -> Result<Saving, Error> {
    if !(amount.is_finite() && amount > 0.0) {
        return Err(Error::NonPositiveAmount);
    }

    get_goal(user_id, goal_id, connection)?;

    let saving = connection
        .prepare(
            "INSERT INTO saving (user_id, goal_id, amount, date) VALUES (?1, ?2, ?3, ?4)
             RETURNING id, user_id, goal_id, amount, date",
        )?
        .query_row(
            params![user_id.as_i64(), goal_id, amount, date],
            map_saving_row,
        )?;

    Ok(saving)
}

/// Retrieve the savings put towards one of `user_id`'s goals, newest first.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn get_savings(
    user_id: UserID,
    goal_id: GoalId,
    connection: &Connection,
) -> Result<Vec<Saving>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, goal_id, amount, date FROM saving
             WHERE user_id = ?1 AND goal_id = ?2 ORDER BY date DESC, id DESC",
        )?
        .query_map((user_id.as_i64(), goal_id), map_saving_row)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::from)
}

/// The sum of the savings for each of `user_id`'s goals that has any.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn get_savings_totals(
    user_id: UserID,
    connection: &Connection,
) -> Result<HashMap<GoalId, f64>, Error> {
    connection
        .prepare("SELECT goal_id, SUM(amount) FROM saving WHERE user_id = ?1 GROUP BY goal_id")?
        .query_map([user_id.as_i64()], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<HashMap<_, _>, _>>()
        .map_err(Error::from)
}

fn map_goal_row(row: &Row) -> Result<Goal, rusqlite::Error> {
    Ok(Goal {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        name: row.get(2)?,
        target_amount: row.get(3)?,
        start_amount: row.get(4)?,
        target_date: row.get(5)?,
        frequency: row.get(6)?,
    })
}

fn map_saving_row(row: &Row) -> Result<Saving, rusqlite::Error> {
    Ok(Saving {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        goal_id: row.get(2)?,
        amount: row.get(3)?,
        date: row.get(4)?,
    })
}
