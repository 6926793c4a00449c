//! Database queries for transactions.

use rusqlite::{Connection, Row, params};

use crate::{
    Error,
    auth::UserID,
    database_id::{CardId, TransactionId},
    transaction::{
        Transaction, TransactionBuilder, TransactionType, domain::CASH_PAYMENT_METHOD,
    },
};

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
                amount REAL NOT NULL CHECK (amount > 0),
                date TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                category TEXT NOT NULL,
                payment_method TEXT NOT NULL DEFAULT '',
                card_id INTEGER,
                is_recurring INTEGER NOT NULL DEFAULT 0,
                recurrence_frequency TEXT,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(card_id) REFERENCES card(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Every page reads a single user's transactions newest first.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
        (),
    )?;

    Ok(())
}

/// Which of a user's transactions to fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    /// Only fetch income or only expenses.
    pub type_: Option<TransactionType>,
    pub payment: PaymentFilter,
}

/// How a transaction was paid for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaymentFilter {
    #[default]
    Any,
    /// Paid with one of the user's cards.
    Card,
    /// Not paid with a card and the payment method is cash.
    Cash,
}

impl TransactionFilter {
    /// Every transaction the user has.
    pub fn all() -> Self {
        Self::default()
    }

    /// Only expenses.
    pub fn expenses() -> Self {
        Self {
            type_: Some(TransactionType::Expense),
            payment: PaymentFilter::Any,
        }
    }

    pub fn payment(mut self, payment: PaymentFilter) -> Self {
        self.payment = payment;
        self
    }
}

/// Check that `card_id`, if set, refers to one of `user_id`'s cards.
fn check_card_owner(
    user_id: UserID,
    card_id: Option<CardId>,
    connection: &Connection,
) -> Result<(), Error> {
    let Some(id) = card_id else {
        return Ok(());
    };

    let is_owner: bool = connection.query_row(
        "SELECT EXISTS(SELECT 1 FROM card WHERE id = ?1 AND user_id = ?2)",
        (id, user_id.as_i64()),
        |row| row.get(0),
    )?;

    if is_owner {
        Ok(())
    } else {
        Err(Error::InvalidCard(card_id))
    }
}

fn map_card_foreign_key_error(error: rusqlite::Error, card_id: Option<CardId>) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
            },
            _,
        ) => Error::InvalidCard(card_id),
        error => error.into(),
    }
}

/// Create a new transaction for `user_id` in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::NonPositiveAmount], [Error::EmptyCategory] or
///   [Error::MissingRecurrenceFrequency] if the builder is invalid,
/// - [Error::InvalidCard] if the card ID does not refer to one of the user's cards,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    user_id: UserID,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let builder = builder.validate()?;
    check_card_owner(user_id, builder.card_id, connection)?;

    connection
        .prepare(
            "INSERT INTO \"transaction\" (user_id, type, amount, date, description, category,
                payment_method, card_id, is_recurring, recurrence_frequency)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             RETURNING id, user_id, type, amount, date, description, category,
                payment_method, card_id, is_recurring, recurrence_frequency",
        )?
        .query_row(
            params![
                user_id.as_i64(),
                builder.type_,
                builder.amount,
                builder.date,
                builder.description,
                builder.category,
                builder.payment_method,
                builder.card_id,
                builder.is_recurring,
                builder.recurrence_frequency,
            ],
            map_transaction_row,
        )
        .map_err(|error| map_card_foreign_key_error(error, builder.card_id))
}

/// Retrieve one of `user_id`'s transactions by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to one of the user's transactions,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    user_id: UserID,
    id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, user_id, type, amount, date, description, category,
                payment_method, card_id, is_recurring, recurrence_frequency
             FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        )?
        .query_row((id, user_id.as_i64()), map_transaction_row)?;

    Ok(transaction)
}

/// Get `user_id`'s transactions that match `filter`, newest first.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn get_transactions(
    user_id: UserID,
    filter: TransactionFilter,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let payment_clause = match filter.payment {
        PaymentFilter::Any => "",
        PaymentFilter::Card => "AND card_id IS NOT NULL",
        PaymentFilter::Cash => "AND card_id IS NULL AND payment_method = ?3",
    };
    let query = format!(
        "SELECT id, user_id, type, amount, date, description, category,
            payment_method, card_id, is_recurring, recurrence_frequency
         FROM \"transaction\"
         WHERE user_id = ?1 AND (?2 IS NULL OR type = ?2) {payment_clause}
         ORDER BY date DESC, id DESC"
    );

    let mut statement = connection.prepare(&query)?;
    let rows = if filter.payment == PaymentFilter::Cash {
        statement.query_map(
            params![user_id.as_i64(), filter.type_, CASH_PAYMENT_METHOD],
            map_transaction_row,
        )?
    } else {
        statement.query_map(params![user_id.as_i64(), filter.type_], map_transaction_row)?
    };

    rows.collect::<Result<Vec<_>, _>>().map_err(Error::from)
}

/// Get the `limit` most recent of `user_id`'s transactions.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn get_recent_transactions(
    user_id: UserID,
    limit: u32,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, type, amount, date, description, category,
                payment_method, card_id, is_recurring, recurrence_frequency
             FROM \"transaction\" WHERE user_id = ?1
             ORDER BY date DESC, id DESC LIMIT ?2",
        )?
        .query_map((user_id.as_i64(), limit), map_transaction_row)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::from)
}

/// Replace the fields of one of `user_id`'s transactions.
///
/// # Errors
/// This function will return a:
/// - validation error if the builder is invalid, see [create_transaction],
/// - [Error::UpdateMissingTransaction] if the transaction does not belong to the user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    user_id: UserID,
    id: TransactionId,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let builder = builder.validate()?;
    check_card_owner(user_id, builder.card_id, connection)?;

    let rows_affected = connection
        .execute(
            "UPDATE \"transaction\" SET type = ?1, amount = ?2, date = ?3, description = ?4,
                category = ?5, payment_method = ?6, card_id = ?7, is_recurring = ?8,
                recurrence_frequency = ?9
             WHERE id = ?10 AND user_id = ?11",
            params![
                builder.type_,
                builder.amount,
                builder.date,
                builder.description,
                builder.category,
                builder.payment_method,
                builder.card_id,
                builder.is_recurring,
                builder.recurrence_frequency,
                id,
                user_id.as_i64(),
            ],
        )
        .map_err(|error| map_card_foreign_key_error(error, builder.card_id))?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    get_transaction(user_id, id, connection)
}

/// Delete one of `user_id`'s transactions.
///
/// # Errors
/// Returns [Error::DeleteMissingTransaction] if the transaction does not belong to the user.
pub fn delete_transaction(
    user_id: UserID,
    id: TransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        Err(Error::DeleteMissingTransaction)
    } else {
        Ok(())
    }
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        type_: row.get(2)?,
        amount: row.get(3)?,
        date: row.get(4)?,
        description: row.get(5)?,
        category: row.get(6)?,
        payment_method: row.get(7)?,
        card_id: row.get(8)?,
        is_recurring: row.get(9)?,
        recurrence_frequency: row.get(10)?,
    })
}

#[cfg(test)]
mod database_tests {
    use time::macros::date;

    use crate::{
        Error,
        card::{Card, CardType, create_card},
        test_utils::{create_test_user, get_test_connection},
        transaction::{RecurrenceFrequency, Transaction, TransactionType},
    };

    use super::{
        PaymentFilter, TransactionFilter, create_transaction, delete_transaction,
        get_recent_transactions, get_transaction, get_transactions, update_transaction,
    };

    #[test]
    fn create_succeeds() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);

        let got = create_transaction(
            user.id,
            Transaction::build(TransactionType::Expense, 12.3, date!(2025 - 10 - 05), "Food")
                .description("Lunch")
                .payment_method("Cash"),
            &connection,
        )
        .unwrap();

        assert_eq!(got.amount, 12.3);
        assert_eq!(got.user_id, user.id);
        assert_eq!(got.category, "Food");
        assert_eq!(got, get_transaction(user.id, got.id, &connection).unwrap());
    }

    #[test]
    fn create_recurring_keeps_frequency() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);

        let got = create_transaction(
            user.id,
            Transaction::build(TransactionType::Expense, 900.0, date!(2025 - 10 - 01), "Rent")
                .recurring(Some(RecurrenceFrequency::Monthly)),
            &connection,
        )
        .unwrap();

        assert!(got.is_recurring);
        assert_eq!(got.recurrence_frequency, Some(RecurrenceFrequency::Monthly));
    }

    #[test]
    fn create_fails_with_another_users_card() {
        let connection = get_test_connection();
        let owner = create_test_user("owner@example.com", &connection);
        let other = create_test_user("other@example.com", &connection);
        let card = create_card(
            owner.id,
            Card::build("Travel", "4111111111111111", CardType::Visa),
            &connection,
        )
        .unwrap();

        let got = create_transaction(
            other.id,
            Transaction::build(TransactionType::Expense, 5.0, date!(2025 - 10 - 05), "Food")
                .card_id(Some(card.id)),
            &connection,
        );

        assert_eq!(got, Err(Error::InvalidCard(Some(card.id))));
    }

    #[test]
    fn create_fails_with_missing_card() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);

        let got = create_transaction(
            user.id,
            Transaction::build(TransactionType::Expense, 5.0, date!(2025 - 10 - 05), "Food")
                .card_id(Some(42)),
            &connection,
        );

        assert_eq!(got, Err(Error::InvalidCard(Some(42))));
    }

    #[test]
    fn get_transaction_hides_other_users_rows() {
        let connection = get_test_connection();
        let owner = create_test_user("owner@example.com", &connection);
        let other = create_test_user("other@example.com", &connection);
        let transaction = create_transaction(
            owner.id,
            Transaction::build(TransactionType::Income, 100.0, date!(2025 - 10 - 05), "Salary"),
            &connection,
        )
        .unwrap();

        assert_eq!(
            get_transaction(other.id, transaction.id, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn get_transactions_newest_first() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);
        let mut want = Vec::new();
        for (day, category) in [(1, "A"), (3, "B"), (2, "C"), (3, "D")] {
            let date = date!(2025 - 10 - 01).replace_day(day).unwrap();
            want.push(
                create_transaction(
                    user.id,
                    Transaction::build(TransactionType::Expense, 1.0, date, category),
                    &connection,
                )
                .unwrap(),
            );
        }

        let got = get_transactions(user.id, TransactionFilter::all(), &connection).unwrap();

        let got_categories: Vec<_> = got.iter().map(|t| t.category.as_str()).collect();
        assert_eq!(got_categories, vec!["D", "B", "C", "A"]);
    }

    #[test]
    fn get_transactions_filters_by_type_and_payment() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);
        let card = create_card(
            user.id,
            Card::build("Everyday", "5555444433331111", CardType::Mastercard),
            &connection,
        )
        .unwrap();
        let today = date!(2025 - 10 - 05);
        let build = |type_, category: &str| Transaction::build(type_, 10.0, today, category);
        create_transaction(
            user.id,
            build(TransactionType::Expense, "card").card_id(Some(card.id)),
            &connection,
        )
        .unwrap();
        create_transaction(
            user.id,
            build(TransactionType::Expense, "cash").payment_method("Cash"),
            &connection,
        )
        .unwrap();
        create_transaction(
            user.id,
            build(TransactionType::Expense, "transfer").payment_method("Bank Transfer"),
            &connection,
        )
        .unwrap();
        create_transaction(
            user.id,
            build(TransactionType::Income, "income").payment_method("Cash"),
            &connection,
        )
        .unwrap();

        let categories = |filter| {
            get_transactions(user.id, filter, &connection)
                .unwrap()
                .into_iter()
                .map(|t| t.category)
                .collect::<Vec<_>>()
        };

        assert_eq!(categories(TransactionFilter::all()).len(), 4);
        assert_eq!(categories(TransactionFilter::expenses()).len(), 3);
        assert_eq!(
            categories(TransactionFilter::expenses().payment(PaymentFilter::Card)),
            vec!["card"]
        );
        assert_eq!(
            categories(TransactionFilter::expenses().payment(PaymentFilter::Cash)),
            vec!["cash"]
        );
    }

    #[test]
    fn recent_transactions_are_limited() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);
        for day in 1..=6 {
            let date = date!(2025 - 10 - 01).replace_day(day).unwrap();
            create_transaction(
                user.id,
                Transaction::build(TransactionType::Expense, day as f64, date, "Food"),
                &connection,
            )
            .unwrap();
        }

        let got = get_recent_transactions(user.id, 4, &connection).unwrap();

        let amounts: Vec<_> = got.iter().map(|t| t.amount).collect();
        assert_eq!(amounts, vec![6.0, 5.0, 4.0, 3.0]);
    }

    #[test]
    fn update_replaces_fields() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);
        let transaction = create_transaction(
            user.id,
            Transaction::build(TransactionType::Expense, 10.0, date!(2025 - 10 - 05), "Food"),
            &connection,
        )
        .unwrap();

        let got = update_transaction(
            user.id,
            transaction.id,
            Transaction::build(TransactionType::Income, 20.0, date!(2025 - 10 - 06), "Bonus")
                .payment_method("Employer"),
            &connection,
        )
        .unwrap();

        assert_eq!(got.type_, TransactionType::Income);
        assert_eq!(got.amount, 20.0);
        assert_eq!(got.date, date!(2025 - 10 - 06));
        assert_eq!(got.category, "Bonus");
        assert_eq!(got.payment_method, "Employer");
    }

    #[test]
    fn update_fails_for_other_user() {
        let connection = get_test_connection();
        let owner = create_test_user("owner@example.com", &connection);
        let other = create_test_user("other@example.com", &connection);
        let transaction = create_transaction(
            owner.id,
            Transaction::build(TransactionType::Expense, 10.0, date!(2025 - 10 - 05), "Food"),
            &connection,
        )
        .unwrap();

        let got = update_transaction(
            other.id,
            transaction.id,
            Transaction::build(TransactionType::Expense, 1.0, date!(2025 - 10 - 05), "Food"),
            &connection,
        );

        assert_eq!(got, Err(Error::UpdateMissingTransaction));
    }

    #[test]
    fn delete_removes_transaction() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);
        let transaction = create_transaction(
            user.id,
            Transaction::build(TransactionType::Expense, 10.0, date!(2025 - 10 - 05), "Food"),
            &connection,
        )
        .unwrap();

        assert_eq!(delete_transaction(user.id, transaction.id, &connection), Ok(()));
        assert_eq!(
            get_transaction(user.id, transaction.id, &connection),
            Err(Error::NotFound)
        );
        assert_eq!(
            delete_transaction(user.id, transaction.id, &connection),
            Err(Error::DeleteMissingTransaction)
        );
    }
}
