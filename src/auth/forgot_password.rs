//! The page for requesting a password reset link.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    auth::{Email, create_reset_token, get_user_by_email},
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, base, email_input, loading_spinner, log_in_register},
};

/// Shown whether or not an account exists for the email so the form cannot be
/// used to find out who has an account.
pub const RESET_LINK_SENT_MSG: &str =
    "If an account exists for that email, a link to reset your password has been sent to it.";

fn forgot_password_form(email: &str, error_message: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::FORGOT_PASSWORD_API)
            hx-swap="outerHTML"
            hx-indicator="#indicator"
            hx-disabled-elt="#email, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            p class="text-sm text-gray-500 dark:text-gray-400"
            {
                "Enter the email address you registered with and we will send you a link to reset your password."
            }

            (email_input(email, error_message))

            button
                type="submit" id="submit-button" tabindex="0"
                class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Send Reset Link"
            }

            (back_to_log_in_link())
        }
    }
}

fn back_to_log_in_link() -> Markup {
    html! {
        p class="text-sm font-light text-gray-500 dark:text-gray-400"
        {
            "Remembered it? "

            a
                href=(endpoints::LOG_IN_VIEW) tabindex="0"
                class="font-semibold leading-6 text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400"
            {
              "Log in here"
            }
        }
    }
}

fn reset_link_sent() -> Markup {
    html! {
        div class="space-y-4 md:space-y-6"
        {
            p id="reset-link-sent" class="text-gray-900 dark:text-white" { (RESET_LINK_SENT_MSG) }

            (back_to_log_in_link())
        }
    }
}

/// Renders the form for requesting a password reset link.
pub async fn get_forgot_password_page() -> Response {
    let form = forgot_password_form("", None);
    let content = log_in_register("Forgot your password?", &form);
    base("Forgot Password", &[], &content).into_response()
}

/// The state needed to create password reset tokens.
#[derive(Debug, Clone)]
pub struct ForgotPasswordState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ForgotPasswordState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct ForgotPasswordForm {
    pub email: String,
}

/// Hands the reset link for `email` to the delivery service.
///
/// Mail delivery happens outside of this application, the link is written to
/// the log for the operator's mail relay to pick up.
fn deliver_reset_link(email: &Email, token: &str) {
    tracing::info!(
        "Password reset link for {email}: {}?token={token}",
        endpoints::RESET_PASSWORD_VIEW
    );
}

/// Create a reset token for the account registered with the submitted email.
pub async fn post_forgot_password(
    State(state): State<ForgotPasswordState>,
    Form(form): Form<ForgotPasswordForm>,
) -> Response {
    let email = match Email::new(&form.email) {
        Ok(email) => email,
        Err(error) => {
            return forgot_password_form(&form.email, Some(&error.to_string())).into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let user = match get_user_by_email(&email, &connection) {
        Ok(user) => user,
        Err(Error::NotFound) => {
            tracing::debug!("Password reset requested for unregistered email");
            return reset_link_sent().into_response();
        }
        Err(error) => {
            tracing::error!("Could not look up user for password reset: {error}");
            return error.into_alert_response();
        }
    };

    match create_reset_token(user.id, OffsetDateTime::now_utc(), &connection) {
        Ok(token) => deliver_reset_link(&user.email, &token),
        Err(error) => {
            tracing::error!("Could not create password reset token: {error}");
            return error.into_alert_response();
        }
    }

    reset_link_sent().into_response()
}
