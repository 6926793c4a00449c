//! A validated, normalised email address.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::Error;

/// An email address that has been trimmed, lowercased and checked for an `@`
/// with text on both sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// Create and validate an email address.
    ///
    /// Surrounding whitespace is removed and the address is lowercased so that
    /// "Alice@Example.com " and "alice@example.com" refer to the same account.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidEmail] if `raw_email` is not a valid email address.
    pub fn new(raw_email: &str) -> Result<Self, Error> {
        let email = raw_email.trim().to_lowercase();

        let is_valid = match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.is_empty()
                    && !domain.contains('@')
                    && !email.contains(char::is_whitespace)
            }
            None => false,
        };

        if is_valid {
            Ok(Self(email))
        } else {
            Err(Error::InvalidEmail(raw_email.trim().to_owned()))
        }
    }

    /// Create a new `Email` without any validation.
    ///
    /// The caller should ensure that `raw_email` is a correctly formatted, lowercase email address,
    /// e.g. one read back from the database.
    pub fn new_unchecked(raw_email: &str) -> Self {
        Self(raw_email.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod email_tests {
    use crate::Error;

    use super::Email;

    #[test]
    fn create_email_success() {
        let email = Email::new("foo@bar.baz");

        assert_eq!(email, Ok(Email::new_unchecked("foo@bar.baz")));
    }

    #[test]
    fn create_email_normalises_case_and_whitespace() {
        let email = Email::new("  Foo@Bar.BAZ ").unwrap();

        assert_eq!(email.as_str(), "foo@bar.baz");
    }

    #[test]
    fn create_email_fails_with_no_at_symbol() {
        let email = Email::new("foobar.baz");

        assert_eq!(email, Err(Error::InvalidEmail("foobar.baz".to_owned())));
    }

    #[test]
    fn create_email_fails_with_empty_local_part() {
        assert!(Email::new("@bar.baz").is_err());
    }

    #[test]
    fn create_email_fails_with_empty_domain() {
        assert!(Email::new("foo@").is_err());
    }

    #[test]
    fn create_email_fails_with_inner_whitespace() {
        assert!(Email::new("foo bar@baz.qux").is_err());
    }

    #[test]
    fn create_email_fails_with_empty_string() {
        assert!(Email::new("   ").is_err());
    }
}
