//! The notifications page and the endpoints for reading and dismissing notifications.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    auth::UserID,
    database_id::NotificationId,
    endpoints::{self, format_endpoint},
    html::{BUTTON_DELETE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, PANEL_STYLE, base},
    navigation::NavBar,
    notification::{
        Notification, count_unread_notifications, delete_notification, get_notifications,
        mark_all_notifications_read, mark_notification_read,
    },
};

/// The state needed for the notifications page and endpoints.
#[derive(Debug, Clone)]
pub struct NotificationsState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for NotificationsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn notification_item(notification: &Notification) -> Markup {
    let style = if notification.is_read {
        "opacity-70"
    } else {
        "border-l-4 border-blue-500"
    };

    html!(
        li
            id={"notification-" (notification.id)}
            class={(PANEL_STYLE) " " (style)}
            data-read=(notification.is_read)
        {
            div class="flex items-start justify-between gap-4"
            {
                div
                {
                    p class="font-semibold text-gray-900 dark:text-white" { (notification.title) }
                    p class="text-gray-700 dark:text-gray-300" { (notification.message) }
                    p class="text-xs text-gray-500 dark:text-gray-400"
                    {
                        (notification.created_at.date())
                    }
                }

                div class="flex shrink-0 gap-4 text-sm"
                {
                    @if !notification.is_read {
                        button
                            type="button"
                            hx-post=(format_endpoint(endpoints::NOTIFICATION_READ, notification.id))
                            hx-target="closest li"
                            hx-target-error="#alert-container"
                            hx-swap="outerHTML"
                            class=(LINK_STYLE)
                        {
                            "Mark as read"
                        }
                    }

                    button
                        type="button"
                        hx-delete=(format_endpoint(endpoints::NOTIFICATION, notification.id))
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
    )
}

/// Render the user's notifications, newest first.
pub async fn get_notifications_page(
    State(state): State<NotificationsState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let notifications = get_notifications(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve notifications: {error}"))?;
    let unread_notifications = count_unread_notifications(user_id, &connection)?;

    let nav_bar = NavBar::new(endpoints::NOTIFICATIONS_VIEW)
        .unread_notifications(unread_notifications)
        .into_html();
    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            header class="flex justify-between flex-wrap items-end"
            {
                h1 class="text-xl font-bold" { "Notifications" }

                @if unread_notifications > 0 {
                    button
                        type="button"
                        hx-post=(endpoints::NOTIFICATIONS_READ_ALL)
                        hx-target-error="#alert-container"
                        class=(LINK_STYLE)
                    {
                        "Mark all as read"
                    }
                }
            }

            @if notifications.is_empty() {
                p class="text-gray-500 dark:text-gray-400" { "You're all caught up." }
            } @else {
                ul class="w-full space-y-3"
                {
                    @for notification in &notifications {
                        (notification_item(notification))
                    }
                }
            }
        }
    );

    Ok(base("Notifications", &[], &content).into_response())
}

/// Mark a notification as read and return its updated list item.
pub async fn mark_notification_read_endpoint(
    Path(notification_id): Path<NotificationId>,
    State(state): State<NotificationsState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let result = mark_notification_read(user_id, notification_id, &connection).and_then(|()| {
        get_notifications(user_id, &connection)?
            .into_iter()
            .find(|notification| notification.id == notification_id)
            .ok_or(Error::UpdateMissingNotification)
    });

    match result {
        Ok(notification) => notification_item(&notification).into_response(),
        Err(error) => {
            tracing::error!("Could not mark notification {notification_id} as read: {error}");
            error.into_alert_response()
        }
    }
}

/// Mark every notification as read and reload the notifications page.
pub async fn mark_all_notifications_read_endpoint(
    State(state): State<NotificationsState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match mark_all_notifications_read(user_id, &connection) {
        Ok(count) => {
            tracing::debug!("Marked {count} notifications as read for user {user_id}");

            (
                HxRedirect(endpoints::NOTIFICATIONS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("Could not mark notifications as read: {error}");
            error.into_alert_response()
        }
    }
}

pub async fn delete_notification_endpoint(
    Path(notification_id): Path<NotificationId>,
    State(state): State<NotificationsState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_notification(user_id, notification_id, &connection) {
        Ok(()) => Alert::SuccessSimple {
            message: "Notification deleted".to_owned(),
        }
        .into_response(),
        Err(error) => {
            tracing::error!("Could not delete notification {notification_id}: {error}");
            error.into_alert_response()
        }
    }
}
