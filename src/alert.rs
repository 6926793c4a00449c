//! Alert messages that are swapped into the page's alert container.
//!
//! Form endpoints return these as HTMX fragments. The fragment replaces the
//! `#alert-container` element out-of-band, so it works both as the primary
//! response and alongside other content.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

/// A success or error message for the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A success message with extra details.
    Success { message: String, details: String },
    /// A success message on its own.
    SuccessSimple { message: String },
    /// An error message with a description of how to fix it.
    Error { message: String, details: String },
    /// An error message on its own.
    ErrorSimple { message: String },
}

impl Alert {
    pub fn into_html(self) -> Markup {
        let (is_error, message, details) = match self {
            Alert::Success { message, details } => (false, message, details),
            Alert::SuccessSimple { message } => (false, message, String::new()),
            Alert::Error { message, details } => (true, message, details),
            Alert::ErrorSimple { message } => (true, message, String::new()),
        };

        let container_style = if is_error {
            "flex items-start p-4 mb-4 text-red-800 border border-red-300 \
            rounded-lg bg-red-50 dark:bg-gray-800 dark:text-red-400 dark:border-red-800"
        } else {
            "flex items-start p-4 mb-4 text-green-800 border border-green-300 \
            rounded-lg bg-green-50 dark:bg-gray-800 dark:text-green-400 dark:border-green-800"
        };

        html!(
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div class=(container_style) role="alert"
                {
                    div class="flex-1"
                    {
                        p class="font-semibold" { (message) }

                        @if !details.is_empty() {
                            p class="text-sm mt-1" { (details) }
                        }
                    }

                    button
                        type="button"
                        class="ms-3 text-sm font-medium underline"
                        onclick="this.closest('[role=alert]').remove()"
                        aria-label="Dismiss"
                    {
                        "Dismiss"
                    }
                }
            }
        )
    }

    /// Render the alert with `status_code`.
    pub fn into_response_with_status(self, status_code: StatusCode) -> Response {
        (status_code, self.into_html()).into_response()
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_response_with_status(StatusCode::OK)
    }
}

#[cfg(test)]
mod alert_tests {
    use scraper::{Html, Selector};

    use super::Alert;

    #[test]
    fn error_alert_shows_message_and_details() {
        let html = Alert::Error {
            message: "Could not delete card".to_owned(),
            details: "The card could not be found.".to_owned(),
        }
        .into_html()
        .into_string();

        let fragment = Html::parse_fragment(&html);
        let paragraphs = fragment
            .select(&Selector::parse("p").unwrap())
            .map(|p| p.text().collect::<String>())
            .collect::<Vec<_>>();

        assert_eq!(
            paragraphs,
            vec!["Could not delete card", "The card could not be found."]
        );
    }

    #[test]
    fn simple_alert_omits_details() {
        let html = Alert::SuccessSimple {
            message: "Saved".to_owned(),
        }
        .into_html()
        .into_string();

        let fragment = Html::parse_fragment(&html);
        let paragraph_count = fragment.select(&Selector::parse("p").unwrap()).count();

        assert_eq!(paragraph_count, 1);
    }

    #[test]
    fn alert_replaces_container_out_of_band() {
        let html = Alert::ErrorSimple {
            message: "Oops".to_owned(),
        }
        .into_html()
        .into_string();

        let fragment = Html::parse_fragment(&html);
        let container = fragment
            .select(&Selector::parse("#alert-container").unwrap())
            .next()
            .expect("alert container missing");

        assert_eq!(container.value().attr("hx-swap-oob"), Some("true"));
    }
}
