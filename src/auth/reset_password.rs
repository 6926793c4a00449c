//! The page a password reset link points to.
//!
//! Opening the link checks the token and shows a form for choosing a new
//! password. Submitting the form uses up every outstanding reset token for the
//! user and logs them in.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{
    AppState, Error, PasswordHash, ValidatedPassword,
    auth::{
        confirm_password_input, delete_reset_tokens, get_user_by_id, get_user_id_for_reset_token,
        register_user::PASSWORD_INPUT_MIN_LENGTH, set_auth_cookie, update_password,
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, base, error_view, loading_spinner, log_in_register, password_input,
    },
    internal_server_error::get_internal_server_error_redirect,
};

fn reset_password_form(
    token: &str,
    password_error_message: Option<&str>,
    confirm_password_error_message: Option<&str>,
) -> Markup {
    html! {
        form
            hx-post=(endpoints::RESET_PASSWORD_API)
            hx-indicator="#indicator"
            hx-disabled-elt="#password, #confirm-password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            input type="hidden" name="token" value=(token);

            (password_input("", PASSWORD_INPUT_MIN_LENGTH, password_error_message))
            (confirm_password_input(PASSWORD_INPUT_MIN_LENGTH, confirm_password_error_message))

            button
                type="submit" id="submit-button" tabindex="0"
                class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Reset Password"
            }
        }
    }
}

fn invalid_link_page() -> Response {
    (
        StatusCode::BAD_REQUEST,
        error_view(
            "Invalid Link",
            "400",
            "This password reset link is invalid or has expired.",
            "Request a new link from the forgot password page.",
        ),
    )
        .into_response()
}

/// The state needed to exchange a reset token for a new password.
#[derive(Debug, Clone)]
pub struct ResetPasswordState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ResetPasswordState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<ResetPasswordState> for Key {
    fn from_ref(state: &ResetPasswordState) -> Self {
        state.cookie_key.clone()
    }
}

#[derive(Deserialize)]
pub struct ResetTokenQuery {
    pub token: Option<String>,
}

/// Display the new password form if the token in the link is still valid.
pub async fn get_reset_password_page(
    State(state): State<ResetPasswordState>,
    Query(query): Query<ResetTokenQuery>,
) -> Response {
    let Some(token) = query.token else {
        return invalid_link_page();
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match get_user_id_for_reset_token(&token, OffsetDateTime::now_utc(), &connection) {
        Ok(_) => {
            let form = reset_password_form(&token, None, None);
            let content = log_in_register("Choose a new password", &form);
            base("Reset Password", &[], &content).into_response()
        }
        Err(Error::InvalidResetToken) => invalid_link_page(),
        Err(error) => error.into_response(),
    }
}

#[derive(Serialize, Deserialize)]
pub struct ResetPasswordForm {
    pub token: String,
    pub password: String,
    pub confirm_password: String,
}

/// Set the new password, use up the user's reset tokens and log them in.
pub async fn post_reset_password(
    State(state): State<ResetPasswordState>,
    jar: PrivateCookieJar,
    Form(form): Form<ResetPasswordForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let user = match get_user_id_for_reset_token(
        &form.token,
        OffsetDateTime::now_utc(),
        &connection,
    )
    .and_then(|user_id| get_user_by_id(user_id, &connection))
    {
        Ok(user) => user,
        Err(Error::InvalidResetToken | Error::NotFound) => {
            return Error::InvalidResetToken.into_alert_response();
        }
        Err(error) => return error.into_alert_response(),
    };

    let validated_password = match ValidatedPassword::new(
        &form.password,
        &[user.email.as_str(), user.full_name.as_str()],
    ) {
        Ok(password) => password,
        Err(error) => {
            return reset_password_form(&form.token, Some(&error.to_string()), None)
                .into_response();
        }
    };

    if form.password != form.confirm_password {
        return reset_password_form(&form.token, None, Some("Passwords do not match"))
            .into_response();
    }

    let password_hash = match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(error) => {
            tracing::error!("an error occurred while hashing a password: {error}");
            return get_internal_server_error_redirect();
        }
    };

    if let Err(error) = update_password(user.id, &password_hash, &connection)
        .and_then(|_| delete_reset_tokens(user.id, &connection))
    {
        tracing::error!("Could not reset password for user {}: {error}", user.id);
        return error.into_alert_response();
    }

    tracing::info!("Password reset for user {}", user.id);

    match set_auth_cookie(jar, user.id, state.cookie_duration) {
        Ok(jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            jar,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An error occurred while setting the auth cookie: {error}");
            get_internal_server_error_redirect()
        }
    }
}
