//! Budget editing page and endpoint.

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
    budget::{
        BudgetBuilder, BudgetForm,
        create::{after_budget_saved, is_form_error},
        form::budget_form_fields,
        get_budget, update_budget,
    },
    database_id::BudgetId,
    endpoints::{self, format_endpoint},
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
    notification::count_unread_notifications,
};

/// The state needed for editing a budget.
#[derive(Debug, Clone)]
pub struct EditBudgetState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditBudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn edit_budget_form(
    budget_id: BudgetId,
    values: &BudgetBuilder,
    error_message: Option<&str>,
) -> Markup {
    html! {
        form
            hx-put=(format_endpoint(endpoints::BUDGET, budget_id))
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="w-full max-w-md space-y-4 md:space-y-6"
        {
            (budget_form_fields(values, error_message))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Update Budget" }
        }
    }
}

/// Render the budget editing page.
pub async fn get_edit_budget_page(
    Path(budget_id): Path<BudgetId>,
    State(state): State<EditBudgetState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let budget = get_budget(user_id, budget_id, &connection)?;
    let unread_notifications = count_unread_notifications(user_id, &connection)?;

    let nav_bar = NavBar::new(endpoints::EDIT_BUDGET_VIEW)
        .unread_notifications(unread_notifications)
        .into_html();
    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-4 text-xl font-bold" { "Edit Budget" }
            (edit_budget_form(budget_id, &BudgetBuilder::from(&budget), None))
        }
    };

    Ok(base("Edit Budget", &[], &content).into_response())
}

/// Handle budget update form submission.
pub async fn update_budget_endpoint(
    Path(budget_id): Path<BudgetId>,
    State(state): State<EditBudgetState>,
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

    match update_budget(user_id, budget_id, builder.clone(), &connection) {
        Ok(budget) => {
            after_budget_saved(&budget, &connection);

            (
                HxRedirect(endpoints::BUDGETS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) if is_form_error(&error) => {
            edit_budget_form(budget_id, &builder, Some(&error.to_string())).into_response()
        }
        Err(error) => {
            tracing::error!("Could not update budget {budget_id}: {error}");
            error.into_alert_response()
        }
    }
}
