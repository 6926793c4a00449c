//! Single-use tokens for resetting a forgotten password.
//!
//! The raw token only ever leaves the server inside the reset link. The
//! database stores its SHA-256 digest so a leaked database cannot be used to
//! reset passwords.

use rand::RngCore;
use rusqlite::{Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};

use crate::{Error, auth::UserID};

/// How long a password reset link stays valid.
pub const RESET_TOKEN_LIFETIME: Duration = Duration::hours(1);

const RESET_TOKEN_BYTES: usize = 32;

/// Create the password reset table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_password_reset_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS password_reset (
                token_hash TEXT PRIMARY KEY,
                user_id INTEGER NOT NULL,
                expires_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

fn hash_token(token: &str) -> String {
    hex_encode(&Sha256::digest(token.as_bytes()))
}

/// Create a reset token for `user_id` that expires [RESET_TOKEN_LIFETIME] after `now`.
///
/// Returns the raw token to put in the reset link.
///
/// # Errors
///
/// Returns an [Error::SqlError] if the token could not be stored.
pub fn create_reset_token(
    user_id: UserID,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<String, Error> {
    let mut bytes = [0u8; RESET_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    let token = hex_encode(&bytes);

    connection.execute(
        "INSERT INTO password_reset (token_hash, user_id, expires_at) VALUES (?1, ?2, ?3)",
        (
            hash_token(&token),
            user_id.as_i64(),
            now + RESET_TOKEN_LIFETIME,
        ),
    )?;

    Ok(token)
}

/// Look up the user a reset token was issued to.
///
/// # Errors
///
/// Returns [Error::InvalidResetToken] if the token is unknown or expired at `now`.
pub fn get_user_id_for_reset_token(
    token: &str,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<UserID, Error> {
    let row: Option<(i64, OffsetDateTime)> = connection
        .query_row(
            "SELECT user_id, expires_at FROM password_reset WHERE token_hash = ?1",
            [hash_token(token)],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    match row {
        Some((user_id, expires_at)) if now < expires_at => Ok(UserID::new(user_id)),
        _ => Err(Error::InvalidResetToken),
    }
}

/// Delete every reset token issued to `user_id`, used or not.
pub fn delete_reset_tokens(user_id: UserID, connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "DELETE FROM password_reset WHERE user_id = ?1",
        [user_id.as_i64()],
    )?;

    Ok(())
}

#[cfg(test)]
mod password_reset_tests {
    use time::{Duration, OffsetDateTime};

    use crate::{
        Error,
        test_utils::{create_test_user, get_test_connection},
    };

    use super::{
        RESET_TOKEN_LIFETIME, create_reset_token, delete_reset_tokens,
        get_user_id_for_reset_token,
    };

    #[test]
    fn token_is_64_hex_characters() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);

        let token = create_reset_token(user.id, OffsetDateTime::now_utc(), &connection).unwrap();

        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn only_hash_of_token_is_stored() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);

        let token = create_reset_token(user.id, OffsetDateTime::now_utc(), &connection).unwrap();

        let stored: String = connection
            .query_row("SELECT token_hash FROM password_reset", [], |row| row.get(0))
            .unwrap();
        assert_ne!(stored, token);
        assert_eq!(stored.len(), 64);
    }

    #[test]
    fn valid_token_returns_user() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);
        let now = OffsetDateTime::now_utc();
        let token = create_reset_token(user.id, now, &connection).unwrap();

        let got = get_user_id_for_reset_token(&token, now + Duration::minutes(59), &connection);

        assert_eq!(got, Ok(user.id));
    }

    #[test]
    fn expired_token_is_rejected() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);
        let now = OffsetDateTime::now_utc();
        let token = create_reset_token(user.id, now, &connection).unwrap();

        let got = get_user_id_for_reset_token(&token, now + RESET_TOKEN_LIFETIME, &connection);

        assert_eq!(got, Err(Error::InvalidResetToken));
    }

    #[test]
    fn unknown_token_is_rejected() {
        let connection = get_test_connection();

        let got = get_user_id_for_reset_token("deadbeef", OffsetDateTime::now_utc(), &connection);

        assert_eq!(got, Err(Error::InvalidResetToken));
    }

    #[test]
    fn deleted_tokens_cannot_be_used() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);
        let now = OffsetDateTime::now_utc();
        let first = create_reset_token(user.id, now, &connection).unwrap();
        let second = create_reset_token(user.id, now, &connection).unwrap();

        delete_reset_tokens(user.id, &connection).unwrap();

        assert_eq!(
            get_user_id_for_reset_token(&first, now, &connection),
            Err(Error::InvalidResetToken)
        );
        assert_eq!(
            get_user_id_for_reset_token(&second, now, &connection),
            Err(Error::InvalidResetToken)
        );
    }
}
