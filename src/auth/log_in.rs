//! This file defines the routes for displaying the log-in page and handling log-in requests.
//! The auth module handles the lower level authentication and cookie auth logic.

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
use time::Duration;

use crate::{
    AppState, Error,
    auth::{
        Email, REMEMBER_ME_COOKIE_DURATION, get_user_by_email, invalidate_auth_cookie,
        normalize_redirect_url, set_auth_cookie,
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, base, email_input, loading_spinner, log_in_register, password_input,
    },
};

fn log_in_form(
    email: &str,
    error_message: Option<&str>,
    redirect_url: Option<&str>,
) -> Markup {
    html! {
        form
            hx-post=(endpoints::LOG_IN_API)
            hx-indicator="#indicator"
            hx-disabled-elt="#email, #password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            @if let Some(redirect_url) = redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            (email_input(email, None))
            (password_input("", 0, error_message))

            div class="flex items-center gap-x-3"
            {
                input
                    type="checkbox"
                    name="remember_me"
                    id="remember_me"
                    tabindex="0"
                    class="rounded-xs";

                label
                    for="remember_me"
                    class="block text-sm font-medium text-gray-900 dark:text-white"
                {
                    "Keep me logged in for one week"
                }
            }

            button
                type="submit" id="submit-button" tabindex="0"
                class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Log in"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Forgot your password? "

                a
                    href=(endpoints::FORGOT_PASSWORD_VIEW) tabindex="0"
                    class="font-semibold leading-6 text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400"
                {
                  "Reset it here"
                }
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400" {
                "Don't have an account? "
                a
                    href=(endpoints::REGISTER_VIEW) tabindex="0"
                    class="font-semibold leading-6 text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400"
                {
                  "Register here"
                }
            }
        }
    }
}

fn parse_redirect_url(raw_url: Option<&str>, source: &str) -> Option<String> {
    match raw_url.and_then(normalize_redirect_url) {
        Some(redirect_url) => Some(redirect_url),
        None => {
            if let Some(redirect_url) = raw_url {
                tracing::warn!("Invalid redirect URL from {source}: {redirect_url}");
            }
            None
        }
    }
}

/// Display the log-in page.
pub async fn get_log_in_page(Query(query): Query<RedirectQuery>) -> Response {
    let redirect_url = parse_redirect_url(query.redirect_url.as_deref(), "log-in query");
    let log_in_form = log_in_form("", None, redirect_url.as_deref());
    let content = log_in_register("Log in to your account", &log_in_form);
    base("Log In", &[], &content).into_response()
}

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Incorrect email or password.";
const INTERNAL_ERROR_MSG: &str = "An internal error occurred. Please try again later.";

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in request, the auth cookie set and the client is redirected to the dashboard page.
/// Otherwise, the form is returned with an error message explaining the problem.
/// An unknown email and a wrong password produce the same message so the form
/// cannot be used to find out who has an account.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<LogInData>,
) -> Response {
    let redirect_url = parse_redirect_url(user_data.redirect_url.as_deref(), "log-in form");
    let redirect_url = redirect_url.as_deref();
    let invalid_credentials = || {
        log_in_form(
            &user_data.email,
            Some(INVALID_CREDENTIALS_ERROR_MSG),
            redirect_url,
        )
        .into_response()
    };

    let Ok(email) = Email::new(&user_data.email) else {
        return invalid_credentials();
    };

    let user = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return log_in_form(&user_data.email, Some(INTERNAL_ERROR_MSG), redirect_url)
                    .into_response();
            }
        };

        match get_user_by_email(&email, &connection) {
            Ok(user) => user,
            Err(Error::NotFound) => return invalid_credentials(),
            Err(error) => {
                tracing::error!("Unhandled error while verifying credentials: {error}");
                return log_in_form(&user_data.email, Some(INTERNAL_ERROR_MSG), redirect_url)
                    .into_response();
            }
        }
    };

    let is_password_valid = match user.password_hash.verify(&user_data.password) {
        Ok(is_password_valid) => is_password_valid,
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return log_in_form(&user_data.email, Some(INTERNAL_ERROR_MSG), redirect_url)
                .into_response();
        }
    };

    if !is_password_valid {
        return invalid_credentials();
    }

    let cookie_duration = if user_data.remember_me.is_some() {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };

    let redirect_url = redirect_url.unwrap_or(endpoints::DASHBOARD_VIEW);

    match set_auth_cookie(jar.clone(), user.id, cookie_duration) {
        Ok(updated_jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(redirect_url.to_owned()),
            updated_jar,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Error setting auth cookie: {error}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                invalidate_auth_cookie(jar),
            )
                .into_response()
        }
    }
}

#[derive(Deserialize)]
pub struct RedirectQuery {
    pub redirect_url: Option<String>,
}

/// The raw data entered by the user in the log-in form.
///
/// The password is stored as a plain string. There is no need for validation here since
/// it will be compared against the password in the database, which has been verified.
#[derive(Clone, Serialize, Deserialize)]
pub struct LogInData {
    /// Email entered during log-in.
    pub email: String,

    /// Password entered during log-in.
    pub password: String,

    /// Whether to extend the initial auth cookie duration.
    ///
    /// This value comes from a checkbox, so it either has a string value or is not set
    /// (see the [MDN docs](https://developer.mozilla.org/en-US/docs/Web/HTML/Element/input/checkbox#value_2)).
    /// The `Some` variant should be interpreted as `true` irregardless of the
    /// string value, and the `None` variant should be interpreted as `false`.
    pub remember_me: Option<String>,

    /// Optional URL to redirect to after logging in.
    /// Only accepted from the log-in form submission.
    pub redirect_url: Option<String>,
}
