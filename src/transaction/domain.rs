//! The transaction model and the enums stored alongside it.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, Duration};

use crate::{
    Error,
    auth::UserID,
    calendar::add_months,
    database_id::{CardId, TransactionId},
};

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    #[default]
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Income => f.write_str("Income"),
            TransactionType::Expense => f.write_str("Expense"),
        }
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(Error::InvalidOption(other.to_owned())),
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// How often a recurring transaction repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecurrenceFrequency {
    Weekly,
    #[serde(rename = "Bi-Weekly")]
    BiWeekly,
    #[serde(rename = "Semi-Monthly")]
    SemiMonthly,
    Monthly,
    Yearly,
}

impl RecurrenceFrequency {
    pub const ALL: [RecurrenceFrequency; 5] = [
        RecurrenceFrequency::Weekly,
        RecurrenceFrequency::BiWeekly,
        RecurrenceFrequency::SemiMonthly,
        RecurrenceFrequency::Monthly,
        RecurrenceFrequency::Yearly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecurrenceFrequency::Weekly => "Weekly",
            RecurrenceFrequency::BiWeekly => "Bi-Weekly",
            RecurrenceFrequency::SemiMonthly => "Semi-Monthly",
            RecurrenceFrequency::Monthly => "Monthly",
            RecurrenceFrequency::Yearly => "Yearly",
        }
    }

    /// The date the transaction next falls due after `date`.
    ///
    /// Month and year steps keep the day of the month where possible and
    /// otherwise land on the last day of the month.
    pub fn next_occurrence(&self, date: Date) -> Option<Date> {
        match self {
            RecurrenceFrequency::Weekly => date.checked_add(Duration::days(7)),
            RecurrenceFrequency::BiWeekly => date.checked_add(Duration::days(14)),
            RecurrenceFrequency::SemiMonthly => date.checked_add(Duration::days(15)),
            RecurrenceFrequency::Monthly => add_months(date, 1),
            RecurrenceFrequency::Yearly => add_months(date, 12),
        }
    }
}

impl Display for RecurrenceFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecurrenceFrequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecurrenceFrequency::ALL
            .into_iter()
            .find(|frequency| frequency.as_str() == s)
            .ok_or_else(|| Error::InvalidOption(s.to_owned()))
    }
}

impl ToSql for RecurrenceFrequency {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for RecurrenceFrequency {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// `amount` is always positive, [TransactionType] says which way the money went.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: TransactionId,
    pub user_id: UserID,
    pub type_: TransactionType,
    pub amount: f64,
    pub date: Date,
    pub description: String,
    /// Free text such as "Groceries", compared case-insensitively in reports.
    pub category: String,
    /// For income this is the source of the money, e.g. "Employer".
    pub payment_method: String,
    /// The card an expense was paid with, if any.
    pub card_id: Option<CardId>,
    pub is_recurring: bool,
    pub recurrence_frequency: Option<RecurrenceFrequency>,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        type_: TransactionType,
        amount: f64,
        date: Date,
        category: &str,
    ) -> TransactionBuilder {
        TransactionBuilder {
            type_,
            amount,
            date,
            description: String::new(),
            category: category.to_owned(),
            payment_method: String::new(),
            card_id: None,
            is_recurring: false,
            recurrence_frequency: None,
        }
    }

    /// The amount with the sign of its direction, e.g. "-12.30" for an expense.
    pub fn signed_amount(&self) -> f64 {
        match self.type_ {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// ```ignore
/// use time::macros::date;
///
/// let builder = Transaction::build(TransactionType::Expense, 45.99, date!(2025-01-15), "Food")
///     .description("Lunch")
///     .payment_method("Cash");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionBuilder {
    pub type_: TransactionType,
    pub amount: f64,
    pub date: Date,
    pub description: String,
    pub category: String,
    pub payment_method: String,
    pub card_id: Option<CardId>,
    pub is_recurring: bool,
    pub recurrence_frequency: Option<RecurrenceFrequency>,
}

impl TransactionBuilder {
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    pub fn payment_method(mut self, payment_method: &str) -> Self {
        self.payment_method = payment_method.to_owned();
        self
    }

    pub fn card_id(mut self, card_id: Option<CardId>) -> Self {
        self.card_id = card_id;
        self
    }

    /// Mark the transaction as repeating every `frequency`.
    pub fn recurring(mut self, frequency: Option<RecurrenceFrequency>) -> Self {
        self.is_recurring = true;
        self.recurrence_frequency = frequency;
        self
    }

    /// Check the builder and return it with whitespace trimmed from its text.
    ///
    /// # Errors
    /// Returns [Error::NonPositiveAmount], [Error::EmptyCategory] or
    /// [Error::MissingRecurrenceFrequency].
    pub(super) fn validate(mut self) -> Result<Self, Error> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(Error::NonPositiveAmount);
        }

        self.category = self.category.trim().to_owned();
        if self.category.is_empty() {
            return Err(Error::EmptyCategory);
        }

        if self.is_recurring && self.recurrence_frequency.is_none() {
            return Err(Error::MissingRecurrenceFrequency);
        }

        if !self.is_recurring {
            self.recurrence_frequency = None;
        }

        self.description = self.description.trim().to_owned();
        self.payment_method = self.payment_method.trim().to_owned();

        Ok(self)
    }
}

/// Income categories offered as suggestions on the new income form.
pub const INCOME_CATEGORIES: [&str; 5] =
    ["Salary", "Freelance", "Bonus", "Rental Income", "Side Hustle"];

/// Income sources offered as suggestions on the new income form.
pub const INCOME_SOURCES: [&str; 5] = ["Cash", "Bank Transfer", "PayPal", "Cheque", "Employer"];

/// The payment method that marks an expense as paid in cash.
pub const CASH_PAYMENT_METHOD: &str = "Cash";

#[cfg(test)]
mod domain_tests {
    use time::macros::date;

    use crate::Error;

    use super::{RecurrenceFrequency, Transaction, TransactionType};

    #[test]
    fn next_occurrence_for_each_frequency() {
        let start = date!(2025 - 01 - 31);

        assert_eq!(
            RecurrenceFrequency::Weekly.next_occurrence(start),
            Some(date!(2025 - 02 - 07))
        );
        assert_eq!(
            RecurrenceFrequency::BiWeekly.next_occurrence(start),
            Some(date!(2025 - 02 - 14))
        );
        assert_eq!(
            RecurrenceFrequency::SemiMonthly.next_occurrence(start),
            Some(date!(2025 - 02 - 15))
        );
        assert_eq!(
            RecurrenceFrequency::Monthly.next_occurrence(start),
            Some(date!(2025 - 02 - 28))
        );
        assert_eq!(
            RecurrenceFrequency::Yearly.next_occurrence(start),
            Some(date!(2026 - 01 - 31))
        );
    }

    #[test]
    fn frequencies_use_hyphenated_names() {
        assert_eq!(
            "Bi-Weekly".parse::<RecurrenceFrequency>(),
            Ok(RecurrenceFrequency::BiWeekly)
        );
        assert_eq!(
            "Semi-Monthly".parse::<RecurrenceFrequency>(),
            Ok(RecurrenceFrequency::SemiMonthly)
        );
        assert_eq!(
            "Daily".parse::<RecurrenceFrequency>(),
            Err(Error::InvalidOption("Daily".to_owned()))
        );
    }

    #[test]
    fn validate_rejects_non_positive_amounts() {
        for amount in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let got =
                Transaction::build(TransactionType::Expense, amount, date!(2025 - 01 - 01), "Food")
                    .validate();

            assert_eq!(got, Err(Error::NonPositiveAmount), "amount {amount}");
        }
    }

    #[test]
    fn validate_rejects_blank_category() {
        let got = Transaction::build(TransactionType::Income, 10.0, date!(2025 - 01 - 01), "   ")
            .validate();

        assert_eq!(got, Err(Error::EmptyCategory));
    }

    #[test]
    fn validate_requires_frequency_for_recurring() {
        let got = Transaction::build(TransactionType::Expense, 10.0, date!(2025 - 01 - 01), "Rent")
            .recurring(None)
            .validate();

        assert_eq!(got, Err(Error::MissingRecurrenceFrequency));
    }

    #[test]
    fn validate_trims_text() {
        let got =
            Transaction::build(TransactionType::Expense, 10.0, date!(2025 - 01 - 01), " Food ")
                .description("  lunch ")
                .validate()
                .unwrap();

        assert_eq!(got.category, "Food");
        assert_eq!(got.description, "lunch");
    }

    #[test]
    fn signed_amount_follows_type() {
        let mut transaction = Transaction {
            id: 1,
            user_id: crate::UserID::new(1),
            type_: TransactionType::Expense,
            amount: 12.5,
            date: date!(2025 - 01 - 01),
            description: String::new(),
            category: "Food".to_owned(),
            payment_method: String::new(),
            card_id: None,
            is_recurring: false,
            recurrence_frequency: None,
        };
        assert_eq!(transaction.signed_amount(), -12.5);

        transaction.type_ = TransactionType::Income;
        assert_eq!(transaction.signed_amount(), 12.5);
    }
}
