//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/cards/{card_id}', use [format_endpoint].

/// The root route which redirects to the dashboard or log in page.
pub const ROOT: &str = "/";
/// The landing page for logged in users.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for displaying a user's transactions.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The page for creating a new transaction.
pub const NEW_TRANSACTION_VIEW: &str = "/transactions/new";
/// The page for editing an existing transaction.
pub const EDIT_TRANSACTION_VIEW: &str = "/transactions/{transaction_id}/edit";
/// The page for listing cards and card/cash spending.
pub const CARDS_VIEW: &str = "/cards";
/// The page for adding a new card.
pub const NEW_CARD_VIEW: &str = "/cards/new";
/// The page for editing an existing card.
pub const EDIT_CARD_VIEW: &str = "/cards/{card_id}/edit";
/// The page for listing budgets and their progress.
pub const BUDGETS_VIEW: &str = "/budgets";
/// The page for creating a new budget.
pub const NEW_BUDGET_VIEW: &str = "/budgets/new";
/// The page for editing an existing budget.
pub const EDIT_BUDGET_VIEW: &str = "/budgets/{budget_id}/edit";
/// The page for listing savings goals.
pub const GOALS_VIEW: &str = "/goals";
/// The page for creating a new savings goal.
pub const NEW_GOAL_VIEW: &str = "/goals/new";
/// The page for editing an existing savings goal.
pub const EDIT_GOAL_VIEW: &str = "/goals/{goal_id}/edit";
/// The page with spending charts.
pub const REPORTS_VIEW: &str = "/reports";
/// The page listing the user's notifications.
pub const NOTIFICATIONS_VIEW: &str = "/notifications";
/// The page for editing the user's profile and preferences.
pub const SETTINGS_VIEW: &str = "/settings";
/// The route for getting the registration page.
pub const REGISTER_VIEW: &str = "/register";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The route for requesting a password reset link.
pub const FORGOT_PASSWORD_VIEW: &str = "/forgot_password";
/// The page a password reset link points to.
pub const RESET_PASSWORD_VIEW: &str = "/reset_password";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to request a cup of coffee (experimental).
pub const COFFEE: &str = "/api/coffee";
/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to access users.
pub const USERS: &str = "/api/users";
/// The route for requesting a password reset email.
pub const FORGOT_PASSWORD_API: &str = "/api/forgot_password";
/// The route for exchanging a reset token for a new password.
pub const RESET_PASSWORD_API: &str = "/api/reset_password";
/// The route to create transactions.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route to update or delete a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to create cards.
pub const CARDS_API: &str = "/api/cards";
/// The route to update or delete a single card.
pub const CARD: &str = "/api/cards/{card_id}";
/// The route to create budgets.
pub const BUDGETS_API: &str = "/api/budgets";
/// The route to update or delete a single budget.
pub const BUDGET: &str = "/api/budgets/{budget_id}";
/// The route to create goals.
pub const GOALS_API: &str = "/api/goals";
/// The route to update or delete a single goal.
pub const GOAL: &str = "/api/goals/{goal_id}";
/// The route to add money to a goal.
pub const GOAL_SAVINGS: &str = "/api/goals/{goal_id}/savings";
/// The route to mark a notification as read.
pub const NOTIFICATION_READ: &str = "/api/notifications/{notification_id}/read";
/// The route to delete a notification.
pub const NOTIFICATION: &str = "/api/notifications/{notification_id}";
/// The route to mark all notifications as read.
pub const NOTIFICATIONS_READ_ALL: &str = "/api/notifications/read_all";
/// The route to delete a reminder.
pub const REMINDER: &str = "/api/reminders/{reminder_id}";
/// The route to mark a reminder as done.
pub const REMINDER_DONE: &str = "/api/reminders/{reminder_id}/done";
/// The route to update the user's name and email.
pub const PROFILE_API: &str = "/api/settings/profile";
/// The route to update the user's notification and currency preferences.
pub const PREFERENCES_API: &str = "/api/settings/preferences";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
