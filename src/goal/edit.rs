//! Goal editing page and endpoint.

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
    database_id::GoalId,
    endpoints::{self, format_endpoint},
    goal::{
        GoalBuilder, GoalForm,
        create::{after_goal_saved, is_form_error},
        form::goal_form_fields,
        get_goal, update_goal,
    },
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
    notification::count_unread_notifications,
};

/// The state needed for editing a goal.
#[derive(Debug, Clone)]
pub struct EditGoalState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditGoalState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn edit_goal_form(goal_id: GoalId, values: &GoalBuilder, error_message: Option<&str>) -> Markup {
    html! {
        form
            hx-put=(format_endpoint(endpoints::GOAL, goal_id))
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="w-full max-w-md space-y-4 md:space-y-6"
        {
            (goal_form_fields(values, error_message))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Update Goal" }
        }
    }
}

/// Render the goal editing page.
pub async fn get_edit_goal_page(
    Path(goal_id): Path<GoalId>,
    State(state): State<EditGoalState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let goal = get_goal(user_id, goal_id, &connection)?;
    let unread_notifications = count_unread_notifications(user_id, &connection)?;

    let nav_bar = NavBar::new(endpoints::EDIT_GOAL_VIEW)
        .unread_notifications(unread_notifications)
        .into_html();
    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-4 text-xl font-bold" { "Edit Goal" }
            (edit_goal_form(goal_id, &GoalBuilder::from(&goal), None))
        }
    };

    Ok(base("Edit Goal", &[], &content).into_response())
}

/// Handle goal update form submission.
pub async fn update_goal_endpoint(
    Path(goal_id): Path<GoalId>,
    State(state): State<EditGoalState>,
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

    match update_goal(user_id, goal_id, builder.clone(), &connection) {
        Ok(goal) => {
            after_goal_saved(&goal, &connection);

            (
                HxRedirect(endpoints::GOALS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) if is_form_error(&error) => {
            edit_goal_form(goal_id, &builder, Some(&error.to_string())).into_response()
        }
        Err(error) => {
            tracing::error!("Could not update goal {goal_id}: {error}");
            error.into_alert_response()
        }
    }
}
