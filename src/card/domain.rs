//! Core card domain types.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, auth::UserID, database_id::CardId};

/// The payment network of a credit card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardType {
    #[default]
    Visa,
    Mastercard,
}

impl CardType {
    pub const ALL: [CardType; 2] = [CardType::Visa, CardType::Mastercard];

    pub fn as_str(&self) -> &'static str {
        match self {
            CardType::Visa => "Visa",
            CardType::Mastercard => "Mastercard",
        }
    }
}

impl Display for CardType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CardType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Visa" => Ok(CardType::Visa),
            "Mastercard" => Ok(CardType::Mastercard),
            other => Err(Error::InvalidOption(other.to_owned())),
        }
    }
}

impl ToSql for CardType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for CardType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// A credit card the user pays for expenses with.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub id: CardId,
    pub user_id: UserID,
    /// A nickname such as "Travel card".
    pub name: String,
    /// The full card number. Only [Card::last_four] is ever shown.
    pub number: String,
    pub balance: f64,
    pub spending_limit: f64,
    /// When the next payment is due.
    pub due_date: Option<Date>,
    pub card_type: CardType,
}

impl Card {
    /// Create a new card.
    ///
    /// Shortcut for [CardBuilder] for discoverability.
    pub fn build(name: &str, number: &str, card_type: CardType) -> CardBuilder {
        CardBuilder {
            name: name.to_owned(),
            number: number.to_owned(),
            card_type,
            balance: 0.0,
            spending_limit: 0.0,
            due_date: None,
        }
    }

    /// The last four characters of the card number.
    pub fn last_four(&self) -> &str {
        let start = self
            .number
            .char_indices()
            .rev()
            .nth(3)
            .map(|(index, _)| index)
            .unwrap_or(0);

        &self.number[start..]
    }
}

/// A builder for creating [Card] instances. Balance and limit default to zero.
#[derive(Debug, Clone, PartialEq)]
pub struct CardBuilder {
    pub name: String,
    pub number: String,
    pub card_type: CardType,
    pub balance: f64,
    pub spending_limit: f64,
    pub due_date: Option<Date>,
}

impl CardBuilder {
    pub fn balance(mut self, balance: f64) -> Self {
        self.balance = balance;
        self
    }

    pub fn spending_limit(mut self, spending_limit: f64) -> Self {
        self.spending_limit = spending_limit;
        self
    }

    pub fn due_date(mut self, due_date: Option<Date>) -> Self {
        self.due_date = due_date;
        self
    }

    /// Check the builder and return it with whitespace removed from its text.
    ///
    /// # Errors
    /// Returns [Error::EmptyCardName] or [Error::EmptyCardNumber].
    pub(super) fn validate(mut self) -> Result<Self, Error> {
        self.name = self.name.trim().to_owned();
        if self.name.is_empty() {
            return Err(Error::EmptyCardName);
        }

        self.number = self.number.split_whitespace().collect();
        if self.number.is_empty() {
            return Err(Error::EmptyCardNumber);
        }

        Ok(self)
    }
}

/// Form data for card creation and editing.
#[derive(Debug, Clone, Deserialize)]
pub struct CardForm {
    pub name: String,
    pub number: String,
    pub card_type: CardType,
    #[serde(default)]
    pub balance: Option<f64>,
    #[serde(default)]
    pub spending_limit: Option<f64>,
    #[serde(default)]
    pub due_date: Option<Date>,
}

impl From<CardForm> for CardBuilder {
    fn from(form: CardForm) -> Self {
        Card::build(&form.name, &form.number, form.card_type)
            .balance(form.balance.unwrap_or(0.0))
            .spending_limit(form.spending_limit.unwrap_or(0.0))
            .due_date(form.due_date)
    }
}

impl From<&Card> for CardBuilder {
    fn from(card: &Card) -> Self {
        Card::build(&card.name, &card.number, card.card_type)
            .balance(card.balance)
            .spending_limit(card.spending_limit)
            .due_date(card.due_date)
    }
}

#[cfg(test)]
mod card_domain_tests {
    use crate::{Error, UserID};

    use super::{Card, CardType};

    fn card_with_number(number: &str) -> Card {
        Card {
            id: 1,
            user_id: UserID::new(1),
            name: "Test".to_owned(),
            number: number.to_owned(),
            balance: 0.0,
            spending_limit: 0.0,
            due_date: None,
            card_type: CardType::Visa,
        }
    }

    #[test]
    fn last_four_of_long_number() {
        assert_eq!(card_with_number("4111111111111234").last_four(), "1234");
    }

    #[test]
    fn last_four_of_short_number() {
        assert_eq!(card_with_number("12").last_four(), "12");
    }

    #[test]
    fn validate_strips_spaces_from_number() {
        let got = Card::build(" Travel ", "4111 1111 1111 1234", CardType::Visa)
            .validate()
            .unwrap();

        assert_eq!(got.name, "Travel");
        assert_eq!(got.number, "4111111111111234");
    }

    #[test]
    fn validate_requires_name_and_number() {
        assert_eq!(
            Card::build("  ", "4111", CardType::Visa).validate(),
            Err(Error::EmptyCardName)
        );
        assert_eq!(
            Card::build("Travel", "   ", CardType::Mastercard).validate(),
            Err(Error::EmptyCardNumber)
        );
    }

    #[test]
    fn parse_card_type() {
        assert_eq!("Mastercard".parse::<CardType>(), Ok(CardType::Mastercard));
        assert_eq!(
            "Amex".parse::<CardType>(),
            Err(Error::InvalidOption("Amex".to_owned()))
        );
    }
}
