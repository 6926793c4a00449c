//! The page and endpoint for changing an existing transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    card::{Card, get_cards},
    database_id::TransactionId,
    endpoints::{self, format_endpoint},
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, loading_spinner},
    navigation::NavBar,
    notification::count_unread_notifications,
    transaction::{
        TransactionBuilder, get_transaction, update_transaction,
        create::{after_transaction_saved, is_form_error},
        form::{TransactionForm, transaction_form_fields},
    },
};

/// The state needed for the edit transaction page and endpoint.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn edit_transaction_form(
    transaction_id: TransactionId,
    values: &TransactionBuilder,
    cards: &[Card],
    error_message: Option<&str>,
) -> Markup {
    html! {
        form
            hx-put=(format_endpoint(endpoints::TRANSACTION, transaction_id))
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            class="w-full max-w-md space-y-4 md:space-y-6"
        {
            (transaction_form_fields(values, cards, error_message))

            button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator" { (loading_spinner()) }
                "Update Transaction"
            }
        }
    }
}

/// Renders the page for editing a transaction.
pub async fn get_edit_transaction_page(
    Path(transaction_id): Path<TransactionId>,
    State(state): State<EditTransactionState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = get_transaction(user_id, transaction_id, &connection)?;
    let cards = get_cards(user_id, &connection)?;
    let unread_notifications = count_unread_notifications(user_id, &connection)?;

    let nav_bar = NavBar::new(endpoints::EDIT_TRANSACTION_VIEW)
        .unread_notifications(unread_notifications)
        .into_html();
    let values = TransactionBuilder::from(&transaction);
    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-4 text-xl font-bold" { "Edit Transaction" }
            (edit_transaction_form(transaction_id, &values, &cards, None))
        }
    };

    Ok(base("Edit Transaction", &[], &content).into_response())
}

/// A route handler for updating a transaction, redirects to transactions view on success.
pub async fn update_transaction_endpoint(
    Path(transaction_id): Path<TransactionId>,
    State(state): State<EditTransactionState>,
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

    match update_transaction(user_id, transaction_id, builder.clone(), &connection) {
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
                edit_transaction_form(transaction_id, &builder, &cards, Some(&error.to_string()))
                    .into_response()
            }
            Err(error) => error.into_alert_response(),
        },
        Err(error) => {
            tracing::error!("Could not update transaction {transaction_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod edit_transaction_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use axum_extra::extract::Form;
    use time::macros::date;

    use crate::{
        endpoints::{self, format_endpoint},
        test_utils::{
            assert_form_input_with_value, assert_hx_endpoint, assert_hx_redirect,
            assert_valid_html, create_test_user, get_test_connection, must_get_form,
            parse_html_document,
        },
        transaction::{
            Transaction, TransactionType, create_transaction, form::TransactionForm,
            get_transaction,
        },
    };

    use super::{EditTransactionState, get_edit_transaction_page, update_transaction_endpoint};

    fn get_state_with_transaction() -> (EditTransactionState, crate::User, Transaction) {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);
        let transaction = create_transaction(
            user.id,
            Transaction::build(TransactionType::Expense, 42.5, date!(2025 - 03 - 14), "Food")
                .description("Dinner"),
            &connection,
        )
        .unwrap();

        let state = EditTransactionState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        (state, user, transaction)
    }

    #[tokio::test]
    async fn page_prefills_form() {
        let (state, user, transaction) = get_state_with_transaction();

        let response =
            get_edit_transaction_page(Path(transaction.id), State(state), Extension(user.id))
                .await
                .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_hx_endpoint(
            &form,
            &format_endpoint(endpoints::TRANSACTION, transaction.id),
            "hx-put",
        );
        assert_form_input_with_value(&form, "amount", "number", "42.50");
        assert_form_input_with_value(&form, "date", "date", "2025-03-14");
        assert_form_input_with_value(&form, "category", "text", "Food");
    }

    #[tokio::test]
    async fn page_for_other_users_transaction_is_not_found() {
        let (state, _, transaction) = get_state_with_transaction();
        let other = create_test_user("other@example.com", &state.db_connection.lock().unwrap());

        let response =
            get_edit_transaction_page(Path(transaction.id), State(state), Extension(other.id))
                .await
                .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_changes_transaction() {
        let (state, user, transaction) = get_state_with_transaction();
        let form = TransactionForm {
            type_: TransactionType::Expense,
            amount: 50.0,
            date: date!(2025 - 03 - 15),
            description: "Dinner and dessert".to_owned(),
            category: "Eating Out".to_owned(),
            payment_method: "Cash".to_owned(),
            card_id: None,
            is_recurring: None,
            recurrence_frequency: None,
        };

        let response = update_transaction_endpoint(
            Path(transaction.id),
            State(state.clone()),
            Extension(user.id),
            Form(form),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::TRANSACTIONS_VIEW);
        let got = get_transaction(user.id, transaction.id, &state.db_connection.lock().unwrap())
            .unwrap();
        assert_eq!(got.amount, 50.0);
        assert_eq!(got.category, "Eating Out");
        assert_eq!(got.description, "Dinner and dessert");
    }

    #[tokio::test]
    async fn update_missing_transaction_is_not_found() {
        let (state, user, _) = get_state_with_transaction();
        let form = TransactionForm {
            type_: TransactionType::Income,
            amount: 5.0,
            date: date!(2025 - 03 - 15),
            description: String::new(),
            category: "Bonus".to_owned(),
            payment_method: String::new(),
            card_id: None,
            is_recurring: None,
            recurrence_frequency: None,
        };

        let response =
            update_transaction_endpoint(Path(999), State(state), Extension(user.id), Form(form))
                .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
