//! The endpoint for putting money towards a goal.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::UserID,
    database_id::GoalId,
    goal::{GoalProgress, add_saving, get_goal, get_savings_totals, list::goal_panel},
    notification::create_notification,
    settings::get_currency,
    timezone::get_local_date,
};

/// The state needed for saving towards a goal.
#[derive(Debug, Clone)]
pub struct SavingState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for SavingState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SavingForm {
    pub amount: f64,
}

fn goal_progress_for(
    user_id: UserID,
    goal_id: GoalId,
    connection: &Connection,
) -> Result<GoalProgress, Error> {
    let goal = get_goal(user_id, goal_id, connection)?;
    let contributions = get_savings_totals(user_id, connection)?
        .get(&goal_id)
        .copied()
        .unwrap_or(0.0);

    Ok(GoalProgress::new(goal, contributions))
}

/// Record a saving for today and return the goal's refreshed panel.
///
/// The first saving that takes a goal to its target creates a "Goal reached"
/// notification.
pub async fn add_saving_endpoint(
    Path(goal_id): Path<GoalId>,
    State(state): State<SavingState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<SavingForm>,
) -> Response {
    let today = match get_local_date(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let result = goal_progress_for(user_id, goal_id, &connection).and_then(|before| {
        add_saving(user_id, goal_id, form.amount, today, &connection)?;
        let after = goal_progress_for(user_id, goal_id, &connection)?;
        Ok((before, after))
    });

    let (before, after) = match result {
        Ok(progress) => progress,
        Err(error @ (Error::NonPositiveAmount | Error::NotFound)) => {
            return error.into_alert_response();
        }
        Err(error) => {
            tracing::error!("Could not save towards goal {goal_id}: {error}");
            return error.into_alert_response();
        }
    };

    if !before.is_reached() && after.is_reached() {
        let message = format!("You've reached your {} goal!", after.goal.name);
        if let Err(error) = create_notification(user_id, "Goal reached", &message, &connection) {
            tracing::error!(
                "Could not create goal reached notification for goal {goal_id}: {error}"
            );
        }
    }

    let currency = match get_currency(user_id, &connection) {
        Ok(currency) => currency,
        Err(error) => {
            tracing::error!("Could not get currency for user {user_id}: {error}");
            return error.into_alert_response();
        }
    };

    goal_panel(&after, today, currency).into_response()
}
