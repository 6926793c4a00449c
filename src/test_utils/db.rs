use rusqlite::Connection;

use crate::{Email, PasswordHash, User, create_user, db::initialize};

/// Open an in-memory database with every table created.
pub(crate) fn get_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    initialize(&connection).expect("Could not initialize database");

    connection
}

/// Register a user with a throwaway password hash.
pub(crate) fn create_test_user(email: &str, connection: &Connection) -> User {
    create_user(
        &Email::new(email).expect("Invalid test email"),
        "Test User",
        PasswordHash::new_unchecked("hunter2"),
        connection,
    )
    .expect("Could not create test user")
}
