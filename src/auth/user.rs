//! Code for creating the user table and fetching users from the database.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::{Email, PasswordHash},
};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A registered user of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The address the user logs in with and receives password reset links at.
    pub email: Email,
    /// The name the user entered when registering.
    pub full_name: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    /// When the user registered.
    pub created_at: OffsetDateTime,
}

impl User {
    /// The first word of the user's full name, or "User" if the name is blank.
    pub fn first_name(&self) -> &str {
        self.full_name.split_whitespace().next().unwrap_or("User")
    }
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                full_name TEXT NOT NULL,
                password TEXT NOT NULL,
                created_at TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns a:
/// - [Error::EmptyFullName] if `full_name` is blank,
/// - [Error::DuplicateEmail] if another user already has `email`,
/// - or [Error::SqlError] if some other SQL related error occurred.
pub fn create_user(
    email: &Email,
    full_name: &str,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    let full_name = full_name.trim();

    if full_name.is_empty() {
        return Err(Error::EmptyFullName);
    }

    let user = connection
        .prepare(
            "INSERT INTO user (email, full_name, password, created_at)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, email, full_name, password, created_at",
        )?
        .query_row(
            (
                email.as_str(),
                full_name,
                password_hash.as_ref(),
                OffsetDateTime::now_utc(),
            ),
            map_user_row,
        )?;

    Ok(user)
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user ([Error::NotFound]).
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, email, full_name, password, created_at FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

/// Get the user registered with `email`.
///
/// # Errors
///
/// Returns [Error::NotFound] if no user has registered with `email`.
pub fn get_user_by_email(email: &Email, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(
            "SELECT id, email, full_name, password, created_at FROM user WHERE email = :email",
        )?
        .query_row(&[(":email", email.as_str())], map_user_row)
        .map_err(|error| error.into())
}

/// Change the name and email address of the user with `user_id`.
///
/// # Errors
///
/// Returns a:
/// - [Error::EmptyFullName] if `full_name` is blank,
/// - [Error::DuplicateEmail] if another user already has `email`,
/// - [Error::UpdateMissingUser] if there is no user with `user_id`,
/// - or [Error::SqlError] if some other SQL related error occurred.
pub fn update_user_profile(
    user_id: UserID,
    full_name: &str,
    email: &Email,
    connection: &Connection,
) -> Result<User, Error> {
    let full_name = full_name.trim();

    if full_name.is_empty() {
        return Err(Error::EmptyFullName);
    }

    connection
        .prepare(
            "UPDATE user SET full_name = ?1, email = ?2 WHERE id = ?3
             RETURNING id, email, full_name, password, created_at",
        )?
        .query_row(
            (full_name, email.as_str(), user_id.as_i64()),
            map_user_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingUser,
            error => error.into(),
        })
}

/// Replace the password hash of the user with `user_id`.
///
/// # Errors
///
/// Returns [Error::UpdateMissingUser] if there is no user with `user_id`.
pub fn update_password(
    user_id: UserID,
    password_hash: &PasswordHash,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET password = ?1 WHERE id = ?2",
        (password_hash.as_ref(), user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingUser);
    }

    Ok(())
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_email: String = row.get(1)?;
    let raw_password_hash: String = row.get(3)?;

    Ok(User {
        id: UserID::new(row.get(0)?),
        email: Email::new_unchecked(&raw_email),
        full_name: row.get(2)?,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        created_at: row.get(4)?,
    })
}

#[cfg(test)]
mod user_tests {
    use rusqlite::Connection;

    use crate::{Error, db::initialize};

    use super::{
        Email, PasswordHash, UserID, create_user, get_user_by_email, get_user_by_id,
        update_password, update_user_profile,
    };

    fn get_db_connection() -> Connection {
        let connection =
            Connection::open_in_memory().expect("Could not create in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");

        connection
    }

    #[test]
    fn insert_user_succeeds() {
        let connection = get_db_connection();
        let email = Email::new("test@example.com").unwrap();
        let password_hash = PasswordHash::new_unchecked("hunter2");

        let inserted_user =
            create_user(&email, "  Jane Doe ", password_hash.clone(), &connection).unwrap();

        assert!(inserted_user.id.as_i64() > 0);
        assert_eq!(inserted_user.email, email);
        assert_eq!(inserted_user.full_name, "Jane Doe");
        assert_eq!(inserted_user.password_hash, password_hash);
    }

    #[test]
    fn insert_user_fails_on_blank_name() {
        let connection = get_db_connection();
        let email = Email::new("test@example.com").unwrap();

        let result = create_user(
            &email,
            "   ",
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        );

        assert_eq!(result, Err(Error::EmptyFullName));
    }

    #[test]
    fn insert_user_fails_on_duplicate_email() {
        let connection = get_db_connection();
        let email = Email::new("test@example.com").unwrap();
        create_user(
            &email,
            "Jane",
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        let result = create_user(
            &email,
            "John",
            PasswordHash::new_unchecked("hunter3"),
            &connection,
        );

        assert_eq!(result, Err(Error::DuplicateEmail));
    }

    #[test]
    fn get_user_by_id_and_email_return_same_user() {
        let connection = get_db_connection();
        let email = Email::new("test@example.com").unwrap();
        let inserted_user = create_user(
            &email,
            "Jane",
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        let by_id = get_user_by_id(inserted_user.id, &connection).unwrap();
        let by_email = get_user_by_email(&email, &connection).unwrap();

        assert_eq!(by_id, inserted_user);
        assert_eq!(by_email, inserted_user);
    }

    #[test]
    fn get_user_fails_with_unknown_id() {
        let connection = get_db_connection();

        let result = get_user_by_id(UserID::new(42), &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn update_profile_changes_name_and_email() {
        let connection = get_db_connection();
        let user = create_user(
            &Email::new("old@example.com").unwrap(),
            "Jane",
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();
        let new_email = Email::new("new@example.com").unwrap();

        let updated = update_user_profile(user.id, "Jane Smith", &new_email, &connection).unwrap();

        assert_eq!(updated.full_name, "Jane Smith");
        assert_eq!(updated.email, new_email);
        assert_eq!(updated.created_at, user.created_at);
    }

    #[test]
    fn update_profile_rejects_email_of_other_user() {
        let connection = get_db_connection();
        let taken_email = Email::new("taken@example.com").unwrap();
        create_user(
            &taken_email,
            "Jane",
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();
        let user = create_user(
            &Email::new("john@example.com").unwrap(),
            "John",
            PasswordHash::new_unchecked("hunter3"),
            &connection,
        )
        .unwrap();

        let result = update_user_profile(user.id, "John", &taken_email, &connection);

        assert_eq!(result, Err(Error::DuplicateEmail));
    }

    #[test]
    fn update_profile_fails_for_missing_user() {
        let connection = get_db_connection();

        let result = update_user_profile(
            UserID::new(99),
            "Ghost",
            &Email::new("ghost@example.com").unwrap(),
            &connection,
        );

        assert_eq!(result, Err(Error::UpdateMissingUser));
    }

    #[test]
    fn update_password_replaces_hash() {
        let connection = get_db_connection();
        let user = create_user(
            &Email::new("test@example.com").unwrap(),
            "Jane",
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();
        let new_hash = PasswordHash::new_unchecked("hunter3");

        update_password(user.id, &new_hash, &connection).unwrap();

        let got = get_user_by_id(user.id, &connection).unwrap();
        assert_eq!(got.password_hash, new_hash);
    }

    #[test]
    fn first_name_falls_back_to_user() {
        let connection = get_db_connection();
        let mut user = create_user(
            &Email::new("test@example.com").unwrap(),
            "Jane Mary Doe",
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        assert_eq!(user.first_name(), "Jane");

        user.full_name = "  ".to_owned();
        assert_eq!(user.first_name(), "User");
    }
}
