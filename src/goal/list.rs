//! The goals page: a summary of all goals and a panel per goal for saving
//! towards it.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints::{self, format_endpoint},
    goal::{GoalProgress, GoalsSummary, get_goals, get_savings_totals, goal_progress},
    html::{
        BUTTON_SECONDARY_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE,
        PANEL_STYLE, base, edit_delete_action_links, format_currency, format_percentage,
        progress_bar,
    },
    navigation::NavBar,
    notification::count_unread_notifications,
    settings::{Currency, get_currency},
    timezone::get_local_date,
};

/// The amounts offered as one-click savings.
const PRESET_SAVINGS: [u32; 4] = [10, 20, 50, 100];

/// The state needed for the goals page.
#[derive(Debug, Clone)]
pub struct GoalsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for GoalsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Render the goals page.
pub async fn get_goals_page(
    State(state): State<GoalsPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let today = get_local_date(&state.local_timezone)?;
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let goals = get_goals(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve goals: {error}"))?;
    let totals = get_savings_totals(user_id, &connection)?;
    let currency = get_currency(user_id, &connection)?;
    let unread_notifications = count_unread_notifications(user_id, &connection)?;

    let progress = goal_progress(goals, &totals);
    let summary = GoalsSummary::new(&progress);

    Ok(goals_view(&progress, summary, today, currency, unread_notifications).into_response())
}

fn save_buttons(item: &GoalProgress, currency: Currency) -> Markup {
    let savings_url = format_endpoint(endpoints::GOAL_SAVINGS, item.goal.id);
    let target = format!("closest [data-goal-id='{}']", item.goal.id);

    html!(
        div class="flex flex-wrap items-center gap-2"
        {
            @for amount in PRESET_SAVINGS {
                button
                    type="button"
                    hx-post=(savings_url)
                    hx-vals=(format!(r#"{{"amount": {amount}}}"#))
                    hx-target=(target)
                    hx-target-error="#alert-container"
                    hx-swap="outerHTML"
                    data-preset=(amount)
                    class=(BUTTON_SECONDARY_STYLE)
                {
                    "+" (format_currency(f64::from(amount), currency))
                }
            }

            form
                hx-post=(savings_url)
                hx-target=(target)
                hx-target-error="#alert-container"
                hx-swap="outerHTML"
                class="flex items-center gap-2"
            {
                input
                    type="number"
                    name="amount"
                    step="0.01"
                    min="0.01"
                    placeholder="Custom"
                    required
                    aria-label="Custom amount"
                    class=(FORM_TEXT_INPUT_STYLE);

                button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Save" }
            }
        }
    )
}

/// The panel for a single goal, also returned after saving towards it.
pub(super) fn goal_panel(item: &GoalProgress, today: Date, currency: Currency) -> Markup {
    let goal = &item.goal;

    html!(
        li class=(PANEL_STYLE) data-goal-id=(goal.id)
        {
            div class="flex items-baseline justify-between"
            {
                h2 class="font-semibold text-gray-900 dark:text-white" { (goal.name) }
                span class="text-sm tabular-nums"
                {
                    span data-saved="true" { (format_currency(item.saved, currency)) }
                    " of "
                    span data-target="true" { (format_currency(goal.target_amount, currency)) }
                }
            }

            div class="my-2" { (progress_bar(item.progress())) }

            p class="text-sm text-gray-500 dark:text-gray-400"
            {
                span data-progress="true" { (format_percentage(item.progress())) }
                " saved"

                @if let Some(time_left) = item.time_left(today) {
                    " • " span data-time-left="true" { (time_left) }
                }
            }

            @if item.is_reached() {
                p class="text-sm font-semibold text-green-700 dark:text-green-300" data-reached="true"
                {
                    "Goal reached!"
                }
            } @else if let Some(per_period) = item.amount_per_period(today) {
                p class="text-sm text-gray-600 dark:text-gray-300" data-per-period="true"
                {
                    (format_currency(per_period, currency)) "/" (item.frequency().period_name())
                    " needed"
                }
            }

            div class="mt-3" { (save_buttons(item, currency)) }

            div class="mt-3 flex items-center gap-4 text-sm"
            {
                (edit_delete_action_links(
                    &format_endpoint(endpoints::EDIT_GOAL_VIEW, goal.id),
                    &format_endpoint(endpoints::GOAL, goal.id),
                    &format!("Are you sure you want to delete the goal '{}'?", goal.name),
                    &format!("closest [data-goal-id='{}']", goal.id),
                    "delete",
                ))
            }
        }
    )
}

fn goals_view(
    progress: &[GoalProgress],
    summary: GoalsSummary,
    today: Date,
    currency: Currency,
    unread_notifications: u64,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::GOALS_VIEW)
        .unread_notifications(unread_notifications)
        .into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            header class="flex justify-between flex-wrap items-end"
            {
                h1 class="text-xl font-bold" { "Goals" }
                a href=(endpoints::NEW_GOAL_VIEW) class=(LINK_STYLE) { "Create Goal" }
            }

            section class="grid w-full gap-4 sm:grid-cols-3"
            {
                div class=(PANEL_STYLE)
                {
                    p class="text-sm text-gray-500 dark:text-gray-400" { "Total Savings" }
                    p id="total-saved" class="text-2xl font-bold tabular-nums"
                    {
                        (format_currency(summary.total_saved, currency))
                    }
                }

                div class=(PANEL_STYLE)
                {
                    p class="text-sm text-gray-500 dark:text-gray-400" { "Total Goal" }
                    p id="total-target" class="text-2xl font-bold tabular-nums"
                    {
                        (format_currency(summary.total_target, currency))
                    }
                }

                div class=(PANEL_STYLE)
                {
                    p class="text-sm text-gray-500 dark:text-gray-400" { "Active Goals" }
                    p id="active-goals" class="text-2xl font-bold tabular-nums"
                    {
                        (summary.active_goals)
                    }
                }
            }

            @if progress.is_empty() {
                p class="text-gray-500 dark:text-gray-400"
                {
                    "No goals yet. "
                    a href=(endpoints::NEW_GOAL_VIEW) class=(LINK_STYLE) { "Create a goal" }
                    " to start saving."
                }
            } @else {
                ul class="grid w-full gap-4 md:grid-cols-2"
                {
                    @for item in progress {
                        (goal_panel(item, today, currency))
                    }
                }
            }
        }
    );

    base("Goals", &[], &content)
}
