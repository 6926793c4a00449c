//! Database operations for cards.

use rusqlite::{Connection, Row, params};

use crate::{
    Error,
    auth::UserID,
    card::{Card, CardBuilder},
    database_id::CardId,
};

/// Create the card table.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_card_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS card (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                number TEXT NOT NULL,
                balance REAL NOT NULL DEFAULT 0,
                spending_limit REAL NOT NULL DEFAULT 0,
                due_date TEXT,
                card_type TEXT NOT NULL CHECK (card_type IN ('Visa', 'Mastercard')),
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Create a new card for `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyCardName] or [Error::EmptyCardNumber] if the builder is invalid,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_card(
    user_id: UserID,
    builder: CardBuilder,
    connection: &Connection,
) -> Result<Card, Error> {
    let builder = builder.validate()?;

    let card = connection
        .prepare(
            "INSERT INTO card (user_id, name, number, balance, spending_limit, due_date, card_type)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id, user_id, name, number, balance, spending_limit, due_date, card_type",
        )?
        .query_row(
            params![
                user_id.as_i64(),
                builder.name,
                builder.number,
                builder.balance,
                builder.spending_limit,
                builder.due_date,
                builder.card_type,
            ],
            map_card_row,
        )?;

    Ok(card)
}

/// Retrieve one of `user_id`'s cards.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to one of the user's cards,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_card(user_id: UserID, id: CardId, connection: &Connection) -> Result<Card, Error> {
    let card = connection
        .prepare(
            "SELECT id, user_id, name, number, balance, spending_limit, due_date, card_type
             FROM card WHERE id = ?1 AND user_id = ?2",
        )?
        .query_row((id, user_id.as_i64()), map_card_row)?;

    Ok(card)
}

/// Retrieve all of `user_id`'s cards ordered by name.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn get_cards(user_id: UserID, connection: &Connection) -> Result<Vec<Card>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, number, balance, spending_limit, due_date, card_type
             FROM card WHERE user_id = ?1 ORDER BY name ASC, id ASC",
        )?
        .query_map([user_id.as_i64()], map_card_row)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::from)
}

/// Replace the fields of one of `user_id`'s cards.
///
/// # Errors
/// This function will return a:
/// - validation error if the builder is invalid, see [create_card],
/// - [Error::UpdateMissingCard] if the card does not belong to the user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_card(
    user_id: UserID,
    id: CardId,
    builder: CardBuilder,
    connection: &Connection,
) -> Result<Card, Error> {
    let builder = builder.validate()?;

    let rows_affected = connection.execute(
        "UPDATE card SET name = ?1, number = ?2, balance = ?3, spending_limit = ?4,
            due_date = ?5, card_type = ?6
         WHERE id = ?7 AND user_id = ?8",
        params![
            builder.name,
            builder.number,
            builder.balance,
            builder.spending_limit,
            builder.due_date,
            builder.card_type,
            id,
            user_id.as_i64(),
        ],
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingCard);
    }

    get_card(user_id, id, connection)
}

/// Delete one of `user_id`'s cards along with every transaction paid with it.
///
/// Both deletes happen in one SQL transaction, so either the card and its
/// transactions are all removed or nothing is.
///
/// # Errors
/// Returns [Error::DeleteMissingCard] if the card does not belong to the user.
pub fn delete_card(user_id: UserID, id: CardId, connection: &Connection) -> Result<(), Error> {
    let sql_transaction = connection.unchecked_transaction()?;

    sql_transaction.execute(
        "DELETE FROM \"transaction\" WHERE card_id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;
    let rows_affected = sql_transaction.execute(
        "DELETE FROM card WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        // Dropping the transaction rolls back the first delete.
        return Err(Error::DeleteMissingCard);
    }

    sql_transaction.commit()?;

    Ok(())
}

fn map_card_row(row: &Row) -> Result<Card, rusqlite::Error> {
    Ok(Card {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        name: row.get(2)?,
        number: row.get(3)?,
        balance: row.get(4)?,
        spending_limit: row.get(5)?,
        due_date: row.get(6)?,
        card_type: row.get(7)?,
    })
}

#[cfg(test)]
mod card_db_tests {
    use time::macros::date;

    use crate::{
        Error,
        card::{Card, CardType},
        test_utils::{create_test_user, get_test_connection},
        transaction::{
            Transaction, TransactionFilter, TransactionType, create_transaction, get_transactions,
        },
    };

    use super::{create_card, delete_card, get_card, get_cards, update_card};

    #[test]
    fn create_card_with_defaults() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);

        let card = create_card(
            user.id,
            Card::build("Travel", "4111111111111234", CardType::Visa),
            &connection,
        )
        .unwrap();

        assert_eq!(card.balance, 0.0);
        assert_eq!(card.spending_limit, 0.0);
        assert_eq!(card.due_date, None);
        assert_eq!(Ok(card.clone()), get_card(user.id, card.id, &connection));
    }

    #[test]
    fn get_cards_orders_by_name() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);
        for name in ["Zeta", "Alpha", "Mid"] {
            create_card(user.id, Card::build(name, "1234", CardType::Visa), &connection).unwrap();
        }

        let names: Vec<_> = get_cards(user.id, &connection)
            .unwrap()
            .into_iter()
            .map(|card| card.name)
            .collect();

        assert_eq!(names, vec!["Alpha", "Mid", "Zeta"]);
    }

    #[test]
    fn get_cards_only_returns_own_cards() {
        let connection = get_test_connection();
        let owner = create_test_user("owner@example.com", &connection);
        let other = create_test_user("other@example.com", &connection);
        create_card(owner.id, Card::build("Mine", "1234", CardType::Visa), &connection).unwrap();

        assert_eq!(get_cards(other.id, &connection), Ok(vec![]));
    }

    #[test]
    fn update_card_changes_fields() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);
        let card =
            create_card(user.id, Card::build("Old", "1234", CardType::Visa), &connection).unwrap();

        let got = update_card(
            user.id,
            card.id,
            Card::build("New", "5678", CardType::Mastercard)
                .balance(120.0)
                .spending_limit(2000.0)
                .due_date(Some(date!(2025 - 07 - 15))),
            &connection,
        )
        .unwrap();

        assert_eq!(got.name, "New");
        assert_eq!(got.card_type, CardType::Mastercard);
        assert_eq!(got.balance, 120.0);
        assert_eq!(got.spending_limit, 2000.0);
        assert_eq!(got.due_date, Some(date!(2025 - 07 - 15)));
    }

    #[test]
    fn update_missing_card_fails() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);

        let got = update_card(
            user.id,
            42,
            Card::build("New", "5678", CardType::Visa),
            &connection,
        );

        assert_eq!(got, Err(Error::UpdateMissingCard));
    }

    #[test]
    fn delete_card_removes_its_transactions() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);
        let card =
            create_card(user.id, Card::build("Card", "1234", CardType::Visa), &connection).unwrap();
        create_transaction(
            user.id,
            Transaction::build(TransactionType::Expense, 10.0, date!(2025 - 05 - 01), "Food")
                .card_id(Some(card.id)),
            &connection,
        )
        .unwrap();
        create_transaction(
            user.id,
            Transaction::build(TransactionType::Expense, 20.0, date!(2025 - 05 - 01), "Food")
                .payment_method("Cash"),
            &connection,
        )
        .unwrap();

        delete_card(user.id, card.id, &connection).unwrap();

        assert_eq!(get_card(user.id, card.id, &connection), Err(Error::NotFound));
        let remaining = get_transactions(user.id, TransactionFilter::all(), &connection).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].amount, 20.0);
    }

    #[test]
    fn delete_other_users_card_fails() {
        let connection = get_test_connection();
        let owner = create_test_user("owner@example.com", &connection);
        let other = create_test_user("other@example.com", &connection);
        let card = create_card(owner.id, Card::build("Card", "1234", CardType::Visa), &connection)
            .unwrap();

        assert_eq!(
            delete_card(other.id, card.id, &connection),
            Err(Error::DeleteMissingCard)
        );
        assert!(get_card(owner.id, card.id, &connection).is_ok());
    }
}
