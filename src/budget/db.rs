//! Database operations for budgets.

use rusqlite::{Connection, Row, params};

use crate::{
    Error,
    auth::UserID,
    budget::{Budget, BudgetBuilder},
    database_id::BudgetId,
};

/// Create the budget table.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                category TEXT NOT NULL,
                amount REAL NOT NULL CHECK (amount > 0),
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Create a new budget for `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NonPositiveAmount], [Error::EmptyCategory] or
///   [Error::InvalidBudgetPeriod] if the builder is invalid,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_budget(
    user_id: UserID,
    builder: BudgetBuilder,
    connection: &Connection,
) -> Result<Budget, Error> {
    let builder = builder.validate()?;

    let budget = connection
        .prepare(
            "INSERT INTO budget (user_id, category, amount, start_date, end_date)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, user_id, category, amount, start_date, end_date",
        )?
        .query_row(
            params![
                user_id.as_i64(),
                builder.category,
                builder.amount,
                builder.start_date,
                builder.end_date,
            ],
            map_budget_row,
        )?;

    Ok(budget)
}

/// Retrieve one of `user_id`'s budgets.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to one of the user's budgets,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_budget(user_id: UserID, id: BudgetId, connection: &Connection) -> Result<Budget, Error> {
    let budget = connection
        .prepare(
            "SELECT id, user_id, category, amount, start_date, end_date
             FROM budget WHERE id = ?1 AND user_id = ?2",
        )?
        .query_row((id, user_id.as_i64()), map_budget_row)?;

    Ok(budget)
}

/// Retrieve all of `user_id`'s budgets, the soonest to end first.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn get_budgets(user_id: UserID, connection: &Connection) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, category, amount, start_date, end_date
             FROM budget WHERE user_id = ?1 ORDER BY end_date ASC, id ASC",
        )?
        .query_map([user_id.as_i64()], map_budget_row)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::from)
}

/// Replace the fields of one of `user_id`'s budgets.
///
/// # Errors
/// This function will return a:
/// - validation error if the builder is invalid, see [create_budget],
/// - [Error::UpdateMissingBudget] if the budget does not belong to the user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_budget(
    user_id: UserID,
    id: BudgetId,
    builder: BudgetBuilder,
    connection: &Connection,
) -> Result<Budget, Error> {
    let builder = builder.validate()?;

    let rows_affected = connection.execute(
        "UPDATE budget SET category = ?1, amount = ?2, start_date = ?3, end_date = ?4
         WHERE id = ?5 AND user_id = ?6",
        params![
            builder.category,
            builder.amount,
            builder.start_date,
            builder.end_date,
            id,
            user_id.as_i64(),
        ],
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingBudget);
    }

    get_budget(user_id, id, connection)
}

/// Delete one of `user_id`'s budgets.
///
/// # Errors
/// Returns [Error::DeleteMissingBudget] if the budget does not belong to the user.
pub fn delete_budget(user_id: UserID, id: BudgetId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM budget WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        Err(Error::DeleteMissingBudget)
    } else {
        Ok(())
    }
}

fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    Ok(Budget {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        category: row.get(2)?,
        amount: row.get(3)?,
        start_date: row.get(4)?,
        end_date: row.get(5)?,
    })
}

#[cfg(test)]
mod budget_db_tests {
    use time::macros::date;

    use crate::{
        Error,
        budget::Budget,
        test_utils::{create_test_user, get_test_connection},
    };

    use super::{create_budget, delete_budget, get_budget, get_budgets, update_budget};

    #[test]
    fn create_and_get_budget() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);

        let budget = create_budget(
            user.id,
            Budget::build("Food", 250.0, date!(2025 - 03 - 01), date!(2025 - 03 - 31)),
            &connection,
        )
        .unwrap();

        assert_eq!(get_budget(user.id, budget.id, &connection), Ok(budget.clone()));
        assert_eq!(budget.category, "Food");
        assert_eq!(budget.amount, 250.0);
    }

    #[test]
    fn budgets_ordered_by_end_date() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);
        let later = create_budget(
            user.id,
            Budget::build("Rent", 1000.0, date!(2025 - 01 - 01), date!(2025 - 12 - 31)),
            &connection,
        )
        .unwrap();
        let sooner = create_budget(
            user.id,
            Budget::build("Food", 200.0, date!(2025 - 01 - 01), date!(2025 - 01 - 31)),
            &connection,
        )
        .unwrap();

        let budgets = get_budgets(user.id, &connection).unwrap();

        assert_eq!(budgets, vec![sooner, later]);
    }

    #[test]
    fn other_users_budgets_are_hidden() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);
        let other_user = create_test_user("other@example.com", &connection);
        let budget = create_budget(
            user.id,
            Budget::build("Food", 200.0, date!(2025 - 01 - 01), date!(2025 - 01 - 31)),
            &connection,
        )
        .unwrap();

        assert_eq!(get_budgets(other_user.id, &connection), Ok(vec![]));
        assert_eq!(
            get_budget(other_user.id, budget.id, &connection),
            Err(Error::NotFound)
        );
        assert_eq!(
            delete_budget(other_user.id, budget.id, &connection),
            Err(Error::DeleteMissingBudget)
        );
    }

    #[test]
    fn update_budget_replaces_fields() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);
        let budget = create_budget(
            user.id,
            Budget::build("Food", 200.0, date!(2025 - 01 - 01), date!(2025 - 01 - 31)),
            &connection,
        )
        .unwrap();

        let updated = update_budget(
            user.id,
            budget.id,
            Budget::build("Groceries", 300.0, date!(2025 - 02 - 01), date!(2025 - 02 - 28)),
            &connection,
        )
        .unwrap();

        assert_eq!(updated.id, budget.id);
        assert_eq!(updated.category, "Groceries");
        assert_eq!(updated.amount, 300.0);
        assert_eq!(updated.end_date, date!(2025 - 02 - 28));
    }

    #[test]
    fn update_missing_budget() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);

        let result = update_budget(
            user.id,
            42,
            Budget::build("Food", 200.0, date!(2025 - 01 - 01), date!(2025 - 01 - 31)),
            &connection,
        );

        assert_eq!(result, Err(Error::UpdateMissingBudget));
    }

    #[test]
    fn delete_budget_removes_row() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);
        let budget = create_budget(
            user.id,
            Budget::build("Food", 200.0, date!(2025 - 01 - 01), date!(2025 - 01 - 31)),
            &connection,
        )
        .unwrap();

        delete_budget(user.id, budget.id, &connection).unwrap();

        assert_eq!(get_budgets(user.id, &connection), Ok(vec![]));
    }
}
