//! The upcoming reminders list and the endpoints that act on a single reminder.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    auth::UserID,
    database_id::ReminderId,
    endpoints::{self, format_endpoint},
    html::{BUTTON_DELETE_STYLE, CATEGORY_BADGE_STYLE, LINK_STYLE},
    reminder::{LinkedReminder, delete_reminder, get_linked_reminders, mark_reminder_done},
    settings::get_currency,
    timezone::get_local_date,
};

/// How many reminders the dashboard shows.
pub const UPCOMING_REMINDER_LIMIT: u32 = 5;

/// The state needed for the reminder endpoints.
#[derive(Debug, Clone)]
pub struct ReminderState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ReminderState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Render the upcoming reminders, soonest first.
pub fn reminders_list(reminders: &[LinkedReminder]) -> Markup {
    html!(
        ul id="reminders" class="w-full space-y-3"
        {
            @for linked in reminders {
                @let reminder = &linked.reminder;

                li class="flex items-start justify-between gap-4" data-reminder-id=(reminder.id)
                {
                    div class="min-w-0"
                    {
                        p class="font-medium text-gray-900 dark:text-white" { (reminder.title) }

                        @if !reminder.description.is_empty() {
                            p class="text-sm text-gray-600 dark:text-gray-300" { (reminder.description) }
                        }

                        p class="text-xs text-gray-500 dark:text-gray-400"
                        {
                            (reminder.remind_at)

                            @if let Some(label) = &linked.label {
                                " "
                                span class=(CATEGORY_BADGE_STYLE) { (label.link_type) }
                                " "
                                span data-reminder-label="true" { (label.label) }
                            }
                        }
                    }

                    div class="flex shrink-0 gap-3 text-sm"
                    {
                        button
                            type="button"
                            hx-post=(format_endpoint(endpoints::REMINDER_DONE, reminder.id))
                            hx-target="#reminders"
                            hx-target-error="#alert-container"
                            hx-swap="outerHTML"
                            class=(LINK_STYLE)
                        {
                            "Done"
                        }

                        button
                            type="button"
                            hx-delete=(format_endpoint(endpoints::REMINDER, reminder.id))
                            hx-confirm="Are you sure you want to delete this reminder?"
                            hx-target="closest li"
                            hx-target-error="#alert-container"
                            hx-swap="delete"
                            class=(BUTTON_DELETE_STYLE)
                        {
                            "Delete"
                        }
                    }
                }
            }

            @if reminders.is_empty() {
                li class="text-sm text-gray-500 dark:text-gray-400" { "No upcoming reminders." }
            }
        }
    )
}

/// Mark a reminder as done and return the refreshed list of upcoming reminders.
pub async fn mark_reminder_done_endpoint(
    Path(reminder_id): Path<ReminderId>,
    State(state): State<ReminderState>,
    Extension(user_id): Extension<UserID>,
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

    let result = mark_reminder_done(user_id, reminder_id, &connection).and_then(|()| {
        let currency = get_currency(user_id, &connection)?;
        get_linked_reminders(user_id, today, UPCOMING_REMINDER_LIMIT, currency, &connection)
    });

    match result {
        Ok(reminders) => reminders_list(&reminders).into_response(),
        Err(error) => {
            tracing::error!("Could not mark reminder {reminder_id} as done: {error}");
            error.into_alert_response()
        }
    }
}

pub async fn delete_reminder_endpoint(
    Path(reminder_id): Path<ReminderId>,
    State(state): State<ReminderState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_reminder(user_id, reminder_id, &connection) {
        Ok(()) => Alert::SuccessSimple {
            message: "Reminder deleted".to_owned(),
        }
        .into_response(),
        Err(error) => {
            tracing::error!("Could not delete reminder {reminder_id}: {error}");
            error.into_alert_response()
        }
    }
}
