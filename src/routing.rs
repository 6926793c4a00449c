//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{delete, get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{
        auth_guard, auth_guard_hx, get_forgot_password_page, get_log_in_page, get_log_out,
        get_register_page, get_reset_password_page, post_forgot_password, post_log_in,
        post_reset_password, register_user,
    },
    budget::{
        create_budget_endpoint, delete_budget_endpoint, get_budgets_page, get_edit_budget_page,
        get_new_budget_page, update_budget_endpoint,
    },
    card::{
        create_card_endpoint, delete_card_endpoint, get_cards_page, get_edit_card_page,
        get_new_card_page, update_card_endpoint,
    },
    dashboard::get_dashboard_page,
    endpoints,
    goal::{
        add_saving_endpoint, create_goal_endpoint, delete_goal_endpoint, get_edit_goal_page,
        get_goals_page, get_new_goal_page, update_goal_endpoint,
    },
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    notification::{
        delete_notification_endpoint, get_notifications_page,
        mark_all_notifications_read_endpoint, mark_notification_read_endpoint,
    },
    reminder::{delete_reminder_endpoint, mark_reminder_done_endpoint},
    report::get_reports_page,
    settings::{get_settings_page, update_preferences_endpoint, update_profile_endpoint},
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_edit_transaction_page,
        get_new_transaction_page, get_transactions_page, update_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::COFFEE, get(get_coffee))
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(endpoints::REGISTER_VIEW, get(get_register_page))
        .route(endpoints::USERS, post(register_user))
        .route(
            endpoints::FORGOT_PASSWORD_VIEW,
            get(get_forgot_password_page),
        )
        .route(endpoints::FORGOT_PASSWORD_API, post(post_forgot_password))
        .route(endpoints::RESET_PASSWORD_VIEW, get(get_reset_password_page))
        .route(endpoints::RESET_PASSWORD_API, post(post_reset_password))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(endpoints::NEW_TRANSACTION_VIEW, get(get_new_transaction_page))
        .route(
            endpoints::EDIT_TRANSACTION_VIEW,
            get(get_edit_transaction_page),
        )
        .route(endpoints::CARDS_VIEW, get(get_cards_page))
        .route(endpoints::NEW_CARD_VIEW, get(get_new_card_page))
        .route(endpoints::EDIT_CARD_VIEW, get(get_edit_card_page))
        .route(endpoints::BUDGETS_VIEW, get(get_budgets_page))
        .route(endpoints::NEW_BUDGET_VIEW, get(get_new_budget_page))
        .route(endpoints::EDIT_BUDGET_VIEW, get(get_edit_budget_page))
        .route(endpoints::GOALS_VIEW, get(get_goals_page))
        .route(endpoints::NEW_GOAL_VIEW, get(get_new_goal_page))
        .route(endpoints::EDIT_GOAL_VIEW, get(get_edit_goal_page))
        .route(endpoints::REPORTS_VIEW, get(get_reports_page))
        .route(endpoints::NOTIFICATIONS_VIEW, get(get_notifications_page))
        .route(endpoints::SETTINGS_VIEW, get(get_settings_page))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // These POST/PUT/DELETE routes need to use the HX-REDIRECT header for auth redirects to work properly for HTMX requests.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(
                endpoints::TRANSACTIONS_API,
                post(create_transaction_endpoint),
            )
            .route(
                endpoints::TRANSACTION,
                put(update_transaction_endpoint).delete(delete_transaction_endpoint),
            )
            .route(endpoints::CARDS_API, post(create_card_endpoint))
            .route(
                endpoints::CARD,
                put(update_card_endpoint).delete(delete_card_endpoint),
            )
            .route(endpoints::BUDGETS_API, post(create_budget_endpoint))
            .route(
                endpoints::BUDGET,
                put(update_budget_endpoint).delete(delete_budget_endpoint),
            )
            .route(endpoints::GOALS_API, post(create_goal_endpoint))
            .route(
                endpoints::GOAL,
                put(update_goal_endpoint).delete(delete_goal_endpoint),
            )
            .route(endpoints::GOAL_SAVINGS, post(add_saving_endpoint))
            .route(
                endpoints::NOTIFICATION_READ,
                post(mark_notification_read_endpoint),
            )
            .route(
                endpoints::NOTIFICATIONS_READ_ALL,
                post(mark_all_notifications_read_endpoint),
            )
            .route(
                endpoints::NOTIFICATION,
                delete(delete_notification_endpoint),
            )
            .route(endpoints::REMINDER_DONE, post(mark_reminder_done_endpoint))
            .route(endpoints::REMINDER, delete(delete_reminder_endpoint))
            .route(endpoints::PROFILE_API, put(update_profile_endpoint))
            .route(endpoints::PREFERENCES_API, put(update_preferences_endpoint))
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (StatusCode::IM_A_TEAPOT, Html("I'm a teapot")).into_response()
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}


#[cfg(test)]
mod protected_route_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{AppState, endpoints};

    use super::build_router;

    fn get_server() -> TestServer {
        let connection = Connection::open_in_memory().unwrap();
        let state = AppState::new(connection, "42", "Etc/UTC").unwrap();

        TestServer::try_new(build_router(state)).expect("Could not create test server")
    }

    #[tokio::test]
    async fn pages_redirect_to_log_in_without_auth_cookie() {
        let server = get_server();

        for endpoint in [
            endpoints::DASHBOARD_VIEW,
            endpoints::TRANSACTIONS_VIEW,
            endpoints::CARDS_VIEW,
            endpoints::BUDGETS_VIEW,
            endpoints::GOALS_VIEW,
            endpoints::REPORTS_VIEW,
            endpoints::NOTIFICATIONS_VIEW,
            endpoints::SETTINGS_VIEW,
        ] {
            let response = server.get(endpoint).await;

            assert_eq!(response.status_code(), StatusCode::SEE_OTHER, "{endpoint}");
            assert!(
                response
                    .header("location")
                    .to_str()
                    .unwrap()
                    .starts_with(endpoints::LOG_IN_VIEW),
                "{endpoint}"
            );
        }
    }

    #[tokio::test]
    async fn log_in_page_is_public() {
        let server = get_server();

        server.get(endpoints::LOG_IN_VIEW).await.assert_status_ok();
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = get_server();

        server
            .get("/definitely/not/a/page")
            .await
            .assert_status_not_found();
    }
}
