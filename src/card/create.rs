//! Card creation page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
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
    card::{Card, CardBuilder, CardForm, CardType, create_card, form::card_form_fields},
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
    notification::count_unread_notifications,
    reminder::schedule_card_reminder,
};

/// The state needed for creating a card.
#[derive(Debug, Clone)]
pub struct CreateCardState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateCardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the card creation page.
pub async fn get_new_card_page(
    State(state): State<CreateCardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;
    let unread_notifications = count_unread_notifications(user_id, &connection)?;

    let nav_bar = NavBar::new(endpoints::NEW_CARD_VIEW)
        .unread_notifications(unread_notifications)
        .into_html();
    let values = Card::build("", "", CardType::default());
    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-4 text-xl font-bold" { "Add Card" }
            (new_card_form(&values, None))
        }
    };

    Ok(base("Add Card", &[], &content).into_response())
}

fn new_card_form(values: &CardBuilder, error_message: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::CARDS_API)
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="w-full max-w-md space-y-4 md:space-y-6"
        {
            (card_form_fields(values, error_message))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Card" }
        }
    }
}

/// Schedule the payment reminder for a card with a due date, logging failures.
pub(super) fn after_card_saved(card: &Card, connection: &Connection) {
    if let Err(error) = schedule_card_reminder(card, connection) {
        tracing::error!("Could not schedule reminder for card {}: {error}", card.id);
    }
}

/// Handle card creation form submission.
pub async fn create_card_endpoint(
    State(state): State<CreateCardState>,
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

    match create_card(user_id, builder.clone(), &connection) {
        Ok(card) => {
            after_card_saved(&card, &connection);

            (
                HxRedirect(endpoints::CARDS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error @ (Error::EmptyCardName | Error::EmptyCardNumber)) => {
            new_card_form(&builder, Some(&error.to_string())).into_response()
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a card: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod create_card_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use axum_extra::extract::Form;
    use time::macros::date;

    use crate::{
        card::{CardForm, CardType, get_cards},
        endpoints,
        reminder::get_upcoming_reminders,
        test_utils::{
            assert_form_error_message, assert_form_input, assert_form_submit_button,
            assert_hx_endpoint, assert_hx_redirect, assert_valid_html, create_test_user,
            get_test_connection, must_get_form, parse_html_document, parse_html_fragment,
        },
    };

    use super::{CreateCardState, create_card_endpoint, get_new_card_page};

    fn card_form(name: &str, due_date: Option<time::Date>) -> CardForm {
        CardForm {
            name: name.to_owned(),
            number: "4111 1111 1111 1234".to_owned(),
            card_type: CardType::Visa,
            balance: None,
            spending_limit: Some(1500.0),
            due_date,
        }
    }

    fn get_state() -> (CreateCardState, crate::User) {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);

        (
            CreateCardState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user,
        )
    }

    #[tokio::test]
    async fn render_page() {
        let (state, user) = get_state();

        let response = get_new_card_page(State(state), Extension(user.id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_hx_endpoint(&form, endpoints::CARDS_API, "hx-post");
        assert_form_input(&form, "name", "text");
        assert_form_input(&form, "number", "text");
        assert_form_submit_button(&form);
    }

    #[tokio::test]
    async fn can_create_card() {
        let (state, user) = get_state();

        let response = create_card_endpoint(
            State(state.clone()),
            Extension(user.id),
            Form(card_form("Travel", None)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::CARDS_VIEW);
        let cards = get_cards(user.id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].number, "4111111111111234");
        assert_eq!(cards[0].balance, 0.0);
        assert_eq!(cards[0].spending_limit, 1500.0);
    }

    #[tokio::test]
    async fn empty_name_shows_form_error() {
        let (state, user) = get_state();

        let response =
            create_card_endpoint(State(state), Extension(user.id), Form(card_form(" ", None)))
                .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Card name cannot be empty");
    }

    #[tokio::test]
    async fn due_date_schedules_payment_reminder() {
        let (state, user) = get_state();

        create_card_endpoint(
            State(state.clone()),
            Extension(user.id),
            Form(card_form("Travel", Some(date!(2025 - 08 - 20)))),
        )
        .await;

        let connection = state.db_connection.lock().unwrap();
        let reminders =
            get_upcoming_reminders(user.id, date!(2025 - 08 - 01), 5, &connection).unwrap();
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].title, "Credit card payment due: Travel");
        assert_eq!(reminders[0].description, "Card \"Travel\" payment is due");
        assert_eq!(reminders[0].remind_at, date!(2025 - 08 - 17));
    }
}
