//! Defines the token stored in the auth cookie and how to serialize/deserialize it.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::auth::UserID;

mod datetime_format {
    //! Specifies how to serialize a [time::OffsetDateTime] in a custom format that
    //! avoids serialisations with datetimes containing midnight.
    //!
    //! The default serializer for [time::OffsetDateTime] will serialize
    //! "00:00:00.000000" as "0:00:00.0" and the deserializer would error out
    //! because it expects the hours to be two digits, not one.
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{
        OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
    };

    /// Date time format for the cookie expiry, e.g. "2021-01-01 00:00:00.000000 +00:00:00".
    const DATE_TIME_FORMAT: &[BorrowedFormatItem] = format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] [offset_hour \
             sign:mandatory]:[offset_minute]:[offset_second]"
    );

    pub fn serialize<S>(dt: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = dt
            .format(DATE_TIME_FORMAT)
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        OffsetDateTime::parse(&s, DATE_TIME_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// The session of a logged in user.
///
/// The token is only valid until `expires_at`. The expiry is checked on the
/// server since the client may hold on to cookies past their expiry date.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Token {
    pub user_id: UserID,

    #[serde(
        serialize_with = "datetime_format::serialize",
        deserialize_with = "datetime_format::deserialize"
    )]
    pub expires_at: OffsetDateTime,
}

impl Token {
    /// Whether the session has ended at `now`.
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod token_tests {
    use time::{UtcOffset, macros::datetime};

    use crate::auth::{UserID, token::Token};

    #[test]
    fn serialise_token() {
        let token = Token {
            user_id: UserID::new(1),
            expires_at: datetime!(2025-12-21 03:54:00).assume_offset(UtcOffset::UTC),
        };
        let expected = r#"{"user_id":1,"expires_at":"2025-12-21 03:54:00.0 +00:00:00"}"#;

        let actual = serde_json::to_string(&token).unwrap();

        assert_eq!(expected, actual);
    }

    #[test]
    fn deserialise_token_with_midnight_expiry() {
        let expected = Token {
            user_id: UserID::new(7),
            expires_at: datetime!(2025-12-21 00:00:00).assume_offset(UtcOffset::UTC),
        };
        let token_string = r#"{"user_id":7,"expires_at":"2025-12-21 00:00:00.0 +00:00:00"}"#;

        let actual: Token = serde_json::from_str(token_string).unwrap();

        assert_eq!(expected, actual);
    }

    #[test]
    fn token_expires_at_its_expiry_time() {
        let expires_at = datetime!(2025-12-21 00:00:00).assume_offset(UtcOffset::UTC);
        let token = Token {
            user_id: UserID::new(1),
            expires_at,
        };

        assert!(!token.is_expired(datetime!(2025-12-20 23:59:59).assume_offset(UtcOffset::UTC)));
        assert!(token.is_expired(expires_at));
    }
}
