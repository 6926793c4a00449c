//! Goal creation page and endpoint.

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
    endpoints,
    goal::{Goal, GoalBuilder, GoalForm, create_goal, form::goal_form_fields},
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
    notification::count_unread_notifications,
    reminder::schedule_goal_reminder,
};

/// The state needed for creating a goal.
#[derive(Debug, Clone)]
pub struct CreateGoalState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateGoalState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the goal creation page.
pub async fn get_new_goal_page(
    State(state): State<CreateGoalState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;
    let unread_notifications = count_unread_notifications(user_id, &connection)?;

    let nav_bar = NavBar::new(endpoints::NEW_GOAL_VIEW)
        .unread_notifications(unread_notifications)
        .into_html();
    let values = Goal::build("", 0.0);
    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-4 text-xl font-bold" { "Create Goal" }
            (new_goal_form(&values, None))
        }
    };

    Ok(base("Create Goal", &[], &content).into_response())
}

fn new_goal_form(values: &GoalBuilder, error_message: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::GOALS_API)
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="w-full max-w-md space-y-4 md:space-y-6"
        {
            (goal_form_fields(values, error_message))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Goal" }
        }
    }
}

/// Schedule the reminder before a goal's target date, logging failures.
pub(super) fn after_goal_saved(goal: &Goal, connection: &Connection) {
    if let Err(error) = schedule_goal_reminder(goal, connection) {
        tracing::error!("Could not schedule reminder for goal {}: {error}", goal.id);
    }
}

pub(super) fn is_form_error(error: &Error) -> bool {
    matches!(
        error,
        Error::EmptyGoalName | Error::NonPositiveAmount | Error::NegativeStartAmount
    )
}

/// Handle goal creation form submission.
pub async fn create_goal_endpoint(
    State(state): State<CreateGoalState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<GoalForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let builder = GoalBuilder::from(form);

    match create_goal(user_id, builder.clone(), &connection) {
        Ok(goal) => {
            after_goal_saved(&goal, &connection);

            (
                HxRedirect(endpoints::GOALS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) if is_form_error(&error) => {
            new_goal_form(&builder, Some(&error.to_string())).into_response()
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a goal: {error}");
            error.into_alert_response()
        }
    }
}
