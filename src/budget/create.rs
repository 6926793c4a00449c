//! Budget creation page and endpoint.

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
    budget::{Budget, BudgetBuilder, BudgetForm, create_budget, form::budget_form_fields},
    calendar::{add_months, start_of_month},
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
    notification::count_unread_notifications,
    reminder::schedule_budget_reminder,
    timezone::get_local_date,
};

/// The state needed for creating a budget.
#[derive(Debug, Clone)]
pub struct CreateBudgetState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateBudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Render the budget creation page with the current month as the default period.
pub async fn get_new_budget_page(
    State(state): State<CreateBudgetState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let today = get_local_date(&state.local_timezone)?;
    let start_date = start_of_month(today);
    let end_date = add_months(start_date, 1)
        .and_then(|next_month| next_month.previous_day())
        .unwrap_or(today);

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;
    let unread_notifications = count_unread_notifications(user_id, &connection)?;

    let nav_bar = NavBar::new(endpoints::NEW_BUDGET_VIEW)
        .unread_notifications(unread_notifications)
        .into_html();
    let values = Budget::build("", 0.0, start_date, end_date);
    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-4 text-xl font-bold" { "Create Budget" }
            (new_budget_form(&values, None))
        }
    };

    Ok(base("Create Budget", &[], &content).into_response())
}

fn new_budget_form(values: &BudgetBuilder, error_message: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::BUDGETS_API)
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="w-full max-w-md space-y-4 md:space-y-6"
        {
            (budget_form_fields(values, error_message))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Budget" }
        }
    }
}

/// Schedule the reminder for the end of a budget period, logging failures.
pub(super) fn after_budget_saved(budget: &Budget, connection: &Connection) {
    if let Err(error) = schedule_budget_reminder(budget, connection) {
        tracing::error!("Could not schedule reminder for budget {}: {error}", budget.id);
    }
}

pub(super) fn is_form_error(error: &Error) -> bool {
    matches!(
        error,
        Error::NonPositiveAmount | Error::EmptyCategory | Error::InvalidBudgetPeriod(_, _)
    )
}

/// Handle budget creation form submission.
pub async fn create_budget_endpoint(
    State(state): State<CreateBudgetState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<BudgetForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let builder = BudgetBuilder::from(form);

    match create_budget(user_id, builder.clone(), &connection) {
        Ok(budget) => {
            after_budget_saved(&budget, &connection);

            (
                HxRedirect(endpoints::BUDGETS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) if is_form_error(&error) => {
            new_budget_form(&builder, Some(&error.to_string())).into_response()
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a budget: {error}");
            error.into_alert_response()
        }
    }
}
