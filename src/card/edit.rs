//! Card editing page and endpoint.

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
    card::{
        CardBuilder, CardForm, create::after_card_saved, form::card_form_fields, get_card,
        update_card,
    },
    database_id::CardId,
    endpoints::{self, format_endpoint},
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
    notification::count_unread_notifications,
};

/// The state needed for editing a card.
#[derive(Debug, Clone)]
pub struct EditCardState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditCardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn edit_card_form(card_id: CardId, values: &CardBuilder, error_message: Option<&str>) -> Markup {
    html! {
        form
            hx-put=(format_endpoint(endpoints::CARD, card_id))
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="w-full max-w-md space-y-4 md:space-y-6"
        {
            (card_form_fields(values, error_message))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Update Card" }
        }
    }
}

/// Render the card editing page.
pub async fn get_edit_card_page(
    Path(card_id): Path<CardId>,
    State(state): State<EditCardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let card = get_card(user_id, card_id, &connection)?;
    let unread_notifications = count_unread_notifications(user_id, &connection)?;

    let nav_bar = NavBar::new(endpoints::EDIT_CARD_VIEW)
        .unread_notifications(unread_notifications)
        .into_html();
    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-4 text-xl font-bold" { "Edit Card" }
            (edit_card_form(card_id, &CardBuilder::from(&card), None))
        }
    };

    Ok(base("Edit Card", &[], &content).into_response())
}

/// Handle card update form submission.
pub async fn update_card_endpoint(
    Path(card_id): Path<CardId>,
    State(state): State<EditCardState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<CardForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let builder = CardBuilder::from(form);

    match update_card(user_id, card_id, builder.clone(), &connection) {
        Ok(card) => {
            after_card_saved(&card, &connection);

            (
                HxRedirect(endpoints::CARDS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error @ (Error::EmptyCardName | Error::EmptyCardNumber)) => {
            edit_card_form(card_id, &builder, Some(&error.to_string())).into_response()
        }
        Err(error) => {
            tracing::error!("Could not update card {card_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod edit_card_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use axum_extra::extract::Form;

    use crate::{
        card::{Card, CardForm, CardType, create_card, get_card},
        endpoints::{self, format_endpoint},
        test_utils::{
            assert_form_input_with_value, assert_form_select_value, assert_hx_endpoint,
            assert_hx_redirect, assert_valid_html, create_test_user, get_test_connection,
            must_get_form, parse_html_document,
        },
    };

    use super::{EditCardState, get_edit_card_page, update_card_endpoint};

    #[tokio::test]
    async fn page_prefills_form() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);
        let card = create_card(
            user.id,
            Card::build("Everyday", "5555444433331111", CardType::Mastercard),
            &connection,
        )
        .unwrap();
        let state = EditCardState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_edit_card_page(Path(card.id), State(state), Extension(user.id))
            .await
            .unwrap();

        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_hx_endpoint(&form, &format_endpoint(endpoints::CARD, card.id), "hx-put");
        assert_form_input_with_value(&form, "name", "text", "Everyday");
        assert_form_select_value(&form, "card_type", "Mastercard");
    }

    #[tokio::test]
    async fn update_changes_card() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);
        let card = create_card(
            user.id,
            Card::build("Everyday", "5555444433331111", CardType::Mastercard),
            &connection,
        )
        .unwrap();
        let state = EditCardState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = update_card_endpoint(
            Path(card.id),
            State(state.clone()),
            Extension(user.id),
            Form(CardForm {
                name: "Groceries".to_owned(),
                number: "5555444433339999".to_owned(),
                card_type: CardType::Mastercard,
                balance: Some(50.0),
                spending_limit: None,
                due_date: None,
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::CARDS_VIEW);
        let got = get_card(user.id, card.id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(got.name, "Groceries");
        assert_eq!(got.last_four(), "9999");
        assert_eq!(got.balance, 50.0);
    }
}
