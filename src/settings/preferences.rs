//! Per-user notification and currency preferences.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, OptionalExtension, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::{Error, auth::UserID};

/// The currency amounts are displayed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "EUR")]
    Eur,
    #[serde(rename = "GBP")]
    Gbp,
}

impl Currency {
    /// Every supported currency, in the order they are offered to users.
    pub const ALL: [Currency; 3] = [Currency::Usd, Currency::Eur, Currency::Gbp];

    /// The ISO 4217 code, e.g. "USD".
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
        }
    }

    /// The symbol placed before amounts, e.g. "$".
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Gbp => "£",
        }
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "GBP" => Ok(Currency::Gbp),
            other => Err(Error::InvalidOption(other.to_owned())),
        }
    }
}

impl ToSql for Currency {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.code()))
    }
}

impl FromSql for Currency {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// Which summary notifications a user wants and how amounts are shown to them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPreferences {
    pub daily_summary: bool,
    pub weekly_summary: bool,
    pub monthly_summary: bool,
    pub currency: Currency,
}

pub fn create_preferences_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user_preferences (
                user_id INTEGER PRIMARY KEY,
                daily_summary INTEGER NOT NULL DEFAULT 0,
                weekly_summary INTEGER NOT NULL DEFAULT 0,
                monthly_summary INTEGER NOT NULL DEFAULT 0,
                currency TEXT NOT NULL DEFAULT 'USD',
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Get the preferences for `user_id`, or the defaults if they have never saved any.
pub fn get_preferences(user_id: UserID, connection: &Connection) -> Result<UserPreferences, Error> {
    let preferences = connection
        .prepare(
            "SELECT daily_summary, weekly_summary, monthly_summary, currency
             FROM user_preferences WHERE user_id = ?1",
        )?
        .query_row([user_id.as_i64()], map_preferences_row)
        .optional()?;

    Ok(preferences.unwrap_or_default())
}

/// Get the currency `user_id` wants amounts shown in.
pub fn get_currency(user_id: UserID, connection: &Connection) -> Result<Currency, Error> {
    get_preferences(user_id, connection).map(|preferences| preferences.currency)
}

/// Insert or replace the preferences for `user_id`.
pub fn save_preferences(
    user_id: UserID,
    preferences: &UserPreferences,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO user_preferences
            (user_id, daily_summary, weekly_summary, monthly_summary, currency)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(user_id) DO UPDATE SET
            daily_summary = excluded.daily_summary,
            weekly_summary = excluded.weekly_summary,
            monthly_summary = excluded.monthly_summary,
            currency = excluded.currency",
        (
            user_id.as_i64(),
            preferences.daily_summary,
            preferences.weekly_summary,
            preferences.monthly_summary,
            preferences.currency,
        ),
    )?;

    Ok(())
}

fn map_preferences_row(row: &Row) -> Result<UserPreferences, rusqlite::Error> {
    Ok(UserPreferences {
        daily_summary: row.get(0)?,
        weekly_summary: row.get(1)?,
        monthly_summary: row.get(2)?,
        currency: row.get(3)?,
    })
}
