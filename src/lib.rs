//! Expense Tracker is a web app for recording income and expenses, managing
//! credit cards, budgets and savings goals, and reviewing spending reports.
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use time::Date;
use tokio::signal;

mod alert;
mod app_state;
mod auth;
mod budget;
mod calendar;
mod card;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod goal;
mod html;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod notification;
mod reminder;
mod report;
mod routing;
mod settings;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{
    Email, PasswordHash, User, UserID, ValidatedPassword, create_user, get_user_by_email,
    update_password,
};
pub use budget::{Budget, create_budget};
pub use card::{Card, CardType, create_card};
pub use db::initialize as initialize_db;
pub use goal::{Goal, SavingsFrequency, create_goal};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use transaction::{RecurrenceFrequency, Transaction, TransactionType, create_transaction};

use crate::{
    alert::Alert, database_id::CardId, internal_server_error::InternalServerError,
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The auth token cookie is missing from the cookie jar in the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// The auth token cookie could not be decoded.
    #[error("the auth token is not valid")]
    InvalidToken,

    /// The auth token has expired and the user must log in again.
    #[error("the auth token has expired")]
    TokenExpired,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The string is not a valid email address.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// Another user has already registered the email address.
    #[error("the email address is already in use")]
    DuplicateEmail,

    /// An empty string was used as the user's full name.
    #[error("Full name cannot be empty")]
    EmptyFullName,

    /// A zero, negative or non-finite amount of money was entered.
    #[error("Amount must be greater than zero")]
    NonPositiveAmount,

    /// The starting amount of a goal was negative.
    #[error("Starting amount cannot be negative")]
    NegativeStartAmount,

    /// An empty string was used as a category.
    #[error("Category cannot be empty")]
    EmptyCategory,

    /// A recurring transaction did not specify how often it repeats.
    #[error("Recurring transactions must have a frequency")]
    MissingRecurrenceFrequency,

    /// The card ID used to create a transaction does not refer to one of the
    /// user's cards.
    #[error("the card ID does not refer to a valid card")]
    InvalidCard(Option<CardId>),

    /// An empty string was used as a card name.
    #[error("Card name cannot be empty")]
    EmptyCardName,

    /// An empty string was used as a card number.
    #[error("Card number cannot be empty")]
    EmptyCardNumber,

    /// A budget ends before it starts.
    #[error("the budget end date {1} is before the start date {0}")]
    InvalidBudgetPeriod(Date, Date),

    /// An empty string was used as a goal name.
    #[error("Goal name cannot be empty")]
    EmptyGoalName,

    /// A string could not be parsed as one of a fixed set of options.
    #[error("\"{0}\" is not a valid option")]
    InvalidOption(String),

    /// The password reset token is unknown, already used, or expired.
    #[error("the password reset link is invalid or has expired")]
    InvalidResetToken,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a card that does not exist
    #[error("tried to delete a card that is not in the database")]
    DeleteMissingCard,

    /// Tried to update a card that does not exist
    #[error("tried to update a card that is not in the database")]
    UpdateMissingCard,

    /// Tried to delete a budget that does not exist
    #[error("tried to delete a budget that is not in the database")]
    DeleteMissingBudget,

    /// Tried to update a budget that does not exist
    #[error("tried to update a budget that is not in the database")]
    UpdateMissingBudget,

    /// Tried to delete a goal that does not exist
    #[error("tried to delete a goal that is not in the database")]
    DeleteMissingGoal,

    /// Tried to update a goal that does not exist
    #[error("tried to update a goal that is not in the database")]
    UpdateMissingGoal,

    /// Tried to update a notification that does not exist
    #[error("tried to update a notification that is not in the database")]
    UpdateMissingNotification,

    /// Tried to delete a notification that does not exist
    #[error("tried to delete a notification that is not in the database")]
    DeleteMissingNotification,

    /// Tried to update a reminder that does not exist
    #[error("tried to update a reminder that is not in the database")]
    UpdateMissingReminder,

    /// Tried to delete a reminder that does not exist
    #[error("tried to delete a reminder that is not in the database")]
    DeleteMissingReminder,

    /// Tried to update a user that does not exist
    #[error("tried to update a user that is not in the database")]
    UpdateMissingUser,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        let not_found = |message: &str, details: &str| {
            Alert::Error {
                message: message.to_owned(),
                details: details.to_owned(),
            }
            .into_response_with_status(StatusCode::NOT_FOUND)
        };
        let bad_request = |message: &str, details: String| {
            Alert::Error {
                message: message.to_owned(),
                details,
            }
            .into_response_with_status(StatusCode::BAD_REQUEST)
        };

        match self {
            Error::InvalidTimezoneError(timezone) => Alert::Error {
                message: "Invalid Timezone Settings".to_owned(),
                details: format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response_with_status(StatusCode::INTERNAL_SERVER_ERROR),
            Error::InvalidCard(card_id) => bad_request(
                "Invalid card",
                format!("Could not find a card with the ID {card_id:?}"),
            ),
            Error::DuplicateEmail => bad_request(
                "Email already in use",
                "Another account already uses this email address. Choose a different email address."
                    .to_owned(),
            ),
            error @ (Error::NonPositiveAmount
            | Error::NegativeStartAmount
            | Error::EmptyCategory
            | Error::MissingRecurrenceFrequency
            | Error::EmptyCardName
            | Error::EmptyCardNumber
            | Error::InvalidBudgetPeriod(_, _)
            | Error::EmptyGoalName
            | Error::EmptyFullName
            | Error::InvalidEmail(_)
            | Error::InvalidOption(_)) => bad_request("Invalid input", error.to_string()),
            Error::InvalidResetToken => bad_request(
                "Invalid reset link",
                "This password reset link is invalid or has expired. Request a new link and try again."
                    .to_owned(),
            ),
            Error::UpdateMissingTransaction => not_found(
                "Could not update transaction",
                "The transaction could not be found.",
            ),
            Error::DeleteMissingTransaction => not_found(
                "Could not delete transaction",
                "The transaction could not be found. \
                Try refreshing the page to see if the transaction has already been deleted.",
            ),
            Error::UpdateMissingCard => {
                not_found("Could not update card", "The card could not be found.")
            }
            Error::DeleteMissingCard => not_found(
                "Could not delete card",
                "The card could not be found. \
                Try refreshing the page to see if the card has already been deleted.",
            ),
            Error::UpdateMissingBudget => {
                not_found("Could not update budget", "The budget could not be found.")
            }
            Error::DeleteMissingBudget => not_found(
                "Could not delete budget",
                "The budget could not be found. \
                Try refreshing the page to see if the budget has already been deleted.",
            ),
            Error::UpdateMissingGoal => not_found(
                "Could not update goal",
                "The goal could not be found. \
                Try refreshing the page to see if the goal has been deleted.",
            ),
            Error::DeleteMissingGoal => not_found(
                "Could not delete goal",
                "The goal could not be found. \
                Try refreshing the page to see if the goal has already been deleted.",
            ),
            Error::UpdateMissingNotification | Error::DeleteMissingNotification => not_found(
                "Could not update notification",
                "The notification could not be found.",
            ),
            Error::UpdateMissingReminder | Error::DeleteMissingReminder => not_found(
                "Could not update reminder",
                "The reminder could not be found. \
                Try refreshing the page to see if the reminder has been removed.",
            ),
            Error::UpdateMissingUser => not_found(
                "Could not update profile",
                "Your account could not be found. Try logging in again.",
            ),
            Error::NotFound => not_found(
                "Not found",
                "The item could not be found. Try refreshing the page.",
            ),
            _ => Alert::Error {
                message: "Something went wrong".to_owned(),
                details: "An unexpected error occurred, check the server logs for more details."
                    .to_owned(),
            }
            .into_response_with_status(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}
