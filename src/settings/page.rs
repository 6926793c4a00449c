//! The settings page with the profile and preference forms.

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
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    alert::Alert,
    auth::{Email, User, UserID, get_user_by_id, update_user_profile},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_ERROR_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, PANEL_STYLE, base,
    },
    navigation::NavBar,
    notification::count_unread_notifications,
    settings::{Currency, UserPreferences, get_preferences, save_preferences},
};

/// The state needed for the settings page and its forms.
#[derive(Debug, Clone)]
pub struct SettingsState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SettingsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the settings page.
pub async fn get_settings_page(
    State(state): State<SettingsState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let user = get_user_by_id(user_id, &connection)
        .inspect_err(|error| tracing::error!("Could not get user {user_id}: {error}"))?;
    let preferences = get_preferences(user_id, &connection)
        .inspect_err(|error| tracing::error!("Could not get preferences: {error}"))?;
    let unread_notifications = count_unread_notifications(user_id, &connection)?;

    Ok(settings_view(&user, &preferences, unread_notifications).into_response())
}

fn settings_view(user: &User, preferences: &UserPreferences, unread_notifications: u64) -> Markup {
    let nav_bar = NavBar::new(endpoints::SETTINGS_VIEW)
        .unread_notifications(unread_notifications)
        .into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold" { "Settings" }

            section class=(PANEL_STYLE)
            {
                h2 class="mb-4 text-lg font-semibold" { "Profile" }
                (profile_form(&user.full_name, user.email.as_str(), None))
            }

            section class=(PANEL_STYLE)
            {
                h2 class="mb-4 text-lg font-semibold" { "Preferences" }
                (preferences_form(preferences))
            }
        }
    };

    base("Settings", &[], &content)
}

fn profile_form(full_name: &str, email: &str, error_message: Option<&str>) -> Markup {
    html! {
        form
            id="profile-form"
            hx-put=(endpoints::PROFILE_API)
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="w-full space-y-4"
        {
            div
            {
                label for="full-name" class=(FORM_LABEL_STYLE) { "Full Name" }

                input
                    id="full-name"
                    type="text"
                    name="full_name"
                    value=(full_name)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="email" class=(FORM_LABEL_STYLE) { "Email" }

                input
                    id="email"
                    type="email"
                    name="email"
                    value=(email)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if let Some(error_message) = error_message {
                p class=(FORM_ERROR_STYLE) { (error_message) }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save Profile" }
        }
    }
}

fn preferences_form(preferences: &UserPreferences) -> Markup {
    let toggle = |name: &str, label: &str, checked: bool| {
        html! {
            div class="flex items-center gap-x-3"
            {
                input
                    id=(name)
                    type="checkbox"
                    name=(name)
                    checked[checked]
                    class="rounded-xs";

                label for=(name) class="text-sm font-medium text-gray-900 dark:text-white"
                {
                    (label)
                }
            }
        }
    };

    html! {
        form
            id="preferences-form"
            hx-put=(endpoints::PREFERENCES_API)
            hx-swap="none"
            hx-target-error="#alert-container"
            class="w-full space-y-4"
        {
            fieldset class="space-y-2"
            {
                legend class=(FORM_LABEL_STYLE) { "Summary notifications" }

                (toggle("daily_summary", "Daily summary", preferences.daily_summary))
                (toggle("weekly_summary", "Weekly summary", preferences.weekly_summary))
                (toggle("monthly_summary", "Monthly summary", preferences.monthly_summary))
            }

            div
            {
                label for="currency" class=(FORM_LABEL_STYLE) { "Currency" }

                select id="currency" name="currency" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for currency in Currency::ALL {
                        option
                            value=(currency.code())
                            selected[currency == preferences.currency]
                        {
                            (currency.symbol()) " " (currency.code())
                        }
                    }
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save Preferences" }
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileForm {
    pub full_name: String,
    pub email: String,
}

/// Update the user's name and email address.
pub async fn update_profile_endpoint(
    State(state): State<SettingsState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<ProfileForm>,
) -> Response {
    let email = match Email::new(&form.email) {
        Ok(email) => email,
        Err(error) => {
            return profile_form(&form.full_name, &form.email, Some(&error.to_string()))
                .into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_user_profile(user_id, &form.full_name, &email, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::SETTINGS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ (Error::EmptyFullName | Error::DuplicateEmail)) => {
            let message = match error {
                Error::DuplicateEmail => {
                    "Another account already uses this email address.".to_owned()
                }
                error => error.to_string(),
            };
            profile_form(&form.full_name, &form.email, Some(&message)).into_response()
        }
        Err(error) => {
            tracing::error!("Could not update profile for user {user_id}: {error}");
            error.into_alert_response()
        }
    }
}

/// The raw preference form data.
///
/// Unchecked checkboxes are not sent, so each toggle is on exactly when its
/// field is present.
#[derive(Debug, Serialize, Deserialize)]
pub struct PreferencesForm {
    pub daily_summary: Option<String>,
    pub weekly_summary: Option<String>,
    pub monthly_summary: Option<String>,
    pub currency: Currency,
}

/// Save the user's notification and currency preferences.
pub async fn update_preferences_endpoint(
    State(state): State<SettingsState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<PreferencesForm>,
) -> Response {
    let preferences = UserPreferences {
        daily_summary: form.daily_summary.is_some(),
        weekly_summary: form.weekly_summary.is_some(),
        monthly_summary: form.monthly_summary.is_some(),
        currency: form.currency,
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match save_preferences(user_id, &preferences, &connection) {
        Ok(()) => Alert::SuccessSimple {
            message: "Preferences saved".to_owned(),
        }
        .into_response(),
        Err(error) => {
            tracing::error!("Could not save preferences for user {user_id}: {error}");
            error.into_alert_response()
        }
    }
}



#[cfg(test)]
mod update_preferences_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Router, routing::put};
    use axum_test::TestServer;

    use crate::{
        endpoints,
        settings::{Currency, get_preferences},
        test_utils::{create_test_user, get_test_connection},
    };

    use super::{PreferencesForm, SettingsState, update_preferences_endpoint};

    #[test]
    fn unchecked_toggles_are_absent_from_form() {
        let form: PreferencesForm =
            serde_html_form::from_str("weekly_summary=on&currency=GBP").unwrap();

        assert_eq!(form.daily_summary, None);
        assert_eq!(form.weekly_summary.as_deref(), Some("on"));
        assert_eq!(form.monthly_summary, None);
        assert_eq!(form.currency, Currency::Gbp);
    }

    #[tokio::test]
    async fn saves_checked_toggles_and_currency() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);
        let state = SettingsState {
            db_connection: Arc::new(Mutex::new(connection)),
        };
        let app = Router::new()
            .route(endpoints::PREFERENCES_API, put(update_preferences_endpoint))
            .layer(Extension(user.id))
            .with_state(state.clone());
        let server = TestServer::try_new(app).expect("Could not create test server.");

        let response = server
            .put(endpoints::PREFERENCES_API)
            .form(&[("monthly_summary", "on"), ("currency", "EUR")])
            .await;

        response.assert_status_ok();
        let preferences =
            get_preferences(user.id, &state.db_connection.lock().unwrap()).unwrap();
        assert!(!preferences.daily_summary);
        assert!(!preferences.weekly_summary);
        assert!(preferences.monthly_summary);
        assert_eq!(preferences.currency, Currency::Eur);
    }
}
