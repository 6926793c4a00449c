//! The page and endpoint for recording a new income or expense.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::UserID,
    card::{Card, get_cards},
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, loading_spinner},
    navigation::NavBar,
    notification::{check_budget_alerts, count_unread_notifications},
    reminder::schedule_transaction_reminder,
    timezone::get_local_date,
    transaction::{
        Transaction, TransactionBuilder, TransactionType, create_transaction,
        form::{TransactionForm, transaction_form_fields},
    },
};

/// The state needed to show the new transaction page and create transactions.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct NewTransactionQuery {
    #[serde(rename = "type")]
    pub type_: Option<TransactionType>,
}

/// Render the page for recording an expense, or income with `?type=income`.
pub async fn get_new_transaction_page(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<NewTransactionQuery>,
) -> Result<Response, Error> {
    let today = get_local_date(&state.local_timezone)?;
    let type_ = query.type_.unwrap_or_default();

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let cards = get_cards(user_id, &connection)
        .inspect_err(|error| tracing::error!("Could not get cards for user {user_id}: {error}"))?;
    let unread_notifications = count_unread_notifications(user_id, &connection)?;

    let values = Transaction::build(type_, 0.0, today, "");
    let title = match type_ {
        TransactionType::Income => "Add Income",
        TransactionType::Expense => "Add Expense",
    };

    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW)
        .unread_notifications(unread_notifications)
        .into_html();
    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-4 text-xl font-bold" { (title) }
            (new_transaction_form(&values, &cards, None))
        }
    };

    Ok(base(title, &[], &content).into_response())
}

fn new_transaction_form(
    values: &TransactionBuilder,
    cards: &[Card],
    error_message: Option<&str>,
) -> Markup {
    html! {
        form
            hx-post=(endpoints::TRANSACTIONS_API)
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            class="w-full max-w-md space-y-4 md:space-y-6"
        {
            (transaction_form_fields(values, cards, error_message))

            button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator" { (loading_spinner()) }
                "Save Transaction"
            }
        }
    }
}

/// Raise budget alerts for a saved expense and schedule the reminder for
/// the next occurrence of a recurring transaction.
///
/// Failures are logged rather than returned since the transaction itself has
/// already been saved.
pub(super) fn after_transaction_saved(transaction: &Transaction, connection: &Connection) {
    if let Err(error) = check_budget_alerts(transaction, connection) {
        tracing::error!(
            "Could not check budget alerts for transaction {}: {error}",
            transaction.id
        );
    }

    if let Err(error) = schedule_transaction_reminder(transaction, connection) {
        tracing::error!(
            "Could not schedule reminder for transaction {}: {error}",
            transaction.id
        );
    }
}

/// Whether `error` should be shown next to the form inputs rather than as an alert.
pub(super) fn is_form_error(error: &Error) -> bool {
    matches!(
        error,
        Error::NonPositiveAmount | Error::EmptyCategory | Error::MissingRecurrenceFrequency
    )
}

/// A route handler for creating a new transaction, redirects to transactions view on success.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let builder = TransactionBuilder::from(form);

    match create_transaction(user_id, builder.clone(), &connection) {
        Ok(transaction) => {
            after_transaction_saved(&transaction, &connection);

            (
                HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) if is_form_error(&error) => match get_cards(user_id, &connection) {
            Ok(cards) => {
                new_transaction_form(&builder, &cards, Some(&error.to_string())).into_response()
            }
            Err(error) => error.into_alert_response(),
        },
        Err(error) => {
            tracing::error!("could not create transaction: {error}");
            error.into_alert_response()
        }
    }
}
