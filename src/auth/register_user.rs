//! The registration page for creating a new account.
use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
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
    AppState, Error, PasswordHash, ValidatedPassword,
    auth::{Email, create_user, set_auth_cookie},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, email_input,
        loading_spinner, log_in_register, password_input,
    },
    internal_server_error::get_internal_server_error_redirect,
};

/// The minimum number of characters the password should have to be considered valid on the client side (server-side validation is done on top of this validation).
pub const PASSWORD_INPUT_MIN_LENGTH: u8 = 14;

pub fn confirm_password_input(min_length: u8, error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label
                for="confirm-password"
                class=(FORM_LABEL_STYLE)
            {
                "Confirm Password"
            }

            input
                type="password"
                name="confirm_password"
                id="confirm-password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                minlength=(min_length)
                autofocus[error_message.is_some()]
            ;

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }
        }

    }
}

fn full_name_input(full_name: &str, error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label
                for="full-name"
                class=(FORM_LABEL_STYLE)
            {
                "Full Name"
            }

            input
                type="text"
                name="full_name"
                id="full-name"
                placeholder="Jane Doe"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                autofocus
                value=(full_name);

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }
        }
    }
}

/// Error messages to show next to each of the registration form's fields.
#[derive(Default)]
struct RegistrationErrors<'a> {
    full_name: Option<&'a str>,
    email: Option<&'a str>,
    password: Option<&'a str>,
    confirm_password: Option<&'a str>,
}

fn registration_form(form: &RegisterForm, errors: RegistrationErrors) -> Markup {
    html! {
        form
            hx-post=(endpoints::USERS)
            hx-indicator="#indicator"
            hx-disabled-elt="#full-name, #email, #password, #confirm-password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            (full_name_input(&form.full_name, errors.full_name))
            (email_input(&form.email, errors.email))
            (password_input(&form.password, PASSWORD_INPUT_MIN_LENGTH, errors.password))
            (confirm_password_input(PASSWORD_INPUT_MIN_LENGTH, errors.confirm_password))

            button
                type="submit" id="submit-button" tabindex="0"
                class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Create Account"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "

                a
                    href=(endpoints::LOG_IN_VIEW) tabindex="0"
                    class="font-semibold leading-6 text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400"
                {
                  "Log in here"
                }
            }
        }
    }
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let registration_form =
        registration_form(&RegisterForm::default(), RegistrationErrors::default());
    let content = log_in_register("Create Account", &registration_form);
    base("Register", &[], &content).into_response()
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

#[derive(Default, Serialize, Deserialize)]
pub struct RegisterForm {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Handler for creating a new account.
///
/// A new account starts a session straight away, so on success the auth
/// cookie is set and the client is redirected to the dashboard.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<RegisterForm>,
) -> Response {
    if user_data.full_name.trim().is_empty() {
        return registration_form(
            &user_data,
            RegistrationErrors {
                full_name: Some(&Error::EmptyFullName.to_string()),
                ..Default::default()
            },
        )
        .into_response();
    }

    let email = match Email::new(&user_data.email) {
        Ok(email) => email,
        Err(error) => {
            return registration_form(
                &user_data,
                RegistrationErrors {
                    email: Some(&error.to_string()),
                    ..Default::default()
                },
            )
            .into_response();
        }
    };

    let validated_password = match ValidatedPassword::new(
        &user_data.password,
        &[email.as_str(), user_data.full_name.as_str()],
    ) {
        Ok(password) => password,
        Err(error) => {
            return registration_form(
                &user_data,
                RegistrationErrors {
                    password: Some(&error.to_string()),
                    ..Default::default()
                },
            )
            .into_response();
        }
    };

    if user_data.password != user_data.confirm_password {
        return registration_form(
            &user_data,
            RegistrationErrors {
                confirm_password: Some("Passwords do not match"),
                ..Default::default()
            },
        )
        .into_response();
    }

    let password_hash = match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!("an error occurred while hashing a password: {e}");

            return get_internal_server_error_redirect();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return get_internal_server_error_redirect();
        }
    };

    let user = match create_user(&email, &user_data.full_name, password_hash, &connection) {
        Ok(user) => user,
        Err(Error::DuplicateEmail) => {
            return registration_form(
                &user_data,
                RegistrationErrors {
                    email: Some("An account with this email already exists, try logging in instead."),
                    ..Default::default()
                },
            )
            .into_response();
        }
        Err(error) => {
            tracing::error!("An unhandled error occurred while inserting a new user: {error}");
            return get_internal_server_error_redirect();
        }
    };

    tracing::info!("Registered user {}", user.id);

    match set_auth_cookie(jar, user.id, state.cookie_duration) {
        Ok(jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            jar,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("An error occurred while setting the auth cookie: {e}");

            get_internal_server_error_redirect()
        }
    }
}

#[cfg(test)]
mod get_register_page_tests {
    use axum::http::{StatusCode, header::CONTENT_TYPE};

    use crate::{
        endpoints,
        test_utils::{
            assert_form_input, assert_form_submit_button, assert_hx_endpoint, assert_valid_html,
            must_get_form, parse_html_document,
        },
    };

    use super::get_register_page;

    #[tokio::test]
    async fn render_register_page() {
        let response = get_register_page().await;
        assert_eq!(response.status(), StatusCode::OK);

        assert!(
            response
                .headers()
                .get(CONTENT_TYPE)
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("text/html")
        );

        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let h1_selector = scraper::Selector::parse("h1").unwrap();
        let titles = document.select(&h1_selector).collect::<Vec<_>>();
        assert_eq!(titles.len(), 1, "want 1 h1, got {}", titles.len());
        let title_text = titles[0].text().collect::<String>().to_lowercase();
        assert_eq!(title_text.trim(), "create account");

        let form = must_get_form(&document);
        assert_hx_endpoint(&form, endpoints::USERS, "hx-post");
        assert_form_input(&form, "full_name", "text");
        assert_form_input(&form, "email", "email");
        assert_form_input(&form, "password", "password");
        assert_form_input(&form, "confirm_password", "password");
        assert_form_submit_button(&form);

        let log_in_link_selector = scraper::Selector::parse("a[href]").unwrap();
        let links = form.select(&log_in_link_selector).collect::<Vec<_>>();
        assert_eq!(links.len(), 1, "want 1 link, got {}", links.len());
        assert_eq!(links[0].value().attr("href"), Some(endpoints::LOG_IN_VIEW));
    }
}
