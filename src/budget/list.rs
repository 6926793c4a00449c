//! The budgets page.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    budget::{BudgetProgress, budget_progress, get_budgets},
    endpoints::{self, format_endpoint},
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, PANEL_STYLE, base, edit_delete_action_links,
        format_currency, format_percentage, progress_bar,
    },
    navigation::NavBar,
    notification::count_unread_notifications,
    settings::{Currency, get_currency},
    transaction::{TransactionFilter, get_transactions},
};

/// The state needed for the budgets page.
#[derive(Debug, Clone)]
pub struct BudgetsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the budgets with how much has been spent in each category.
pub async fn get_budgets_page(
    State(state): State<BudgetsPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let budgets = get_budgets(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve budgets: {error}"))?;
    let expenses = get_transactions(user_id, TransactionFilter::expenses(), &connection)?;
    let currency = get_currency(user_id, &connection)?;
    let unread_notifications = count_unread_notifications(user_id, &connection)?;

    let progress = budget_progress(&budgets, &expenses);

    Ok(budgets_view(&progress, currency, unread_notifications).into_response())
}

fn budget_category_panel(item: &BudgetProgress, currency: Currency) -> Markup {
    let label = item.label();
    let remaining = item.remaining();

    html!(
        li class=(PANEL_STYLE) data-category=(item.category)
        {
            div class="flex items-baseline justify-between"
            {
                h2 class="font-semibold text-gray-900 dark:text-white" { (label) }
                span class="text-sm tabular-nums"
                {
                    span data-spent="true" { (format_currency(item.spent, currency)) }
                    " of "
                    span data-budget="true" { (format_currency(item.budget, currency)) }
                }
            }

            div class="my-2" { (progress_bar(item.progress())) }

            p class="text-sm text-gray-500 dark:text-gray-400"
            {
                (format_percentage(item.progress())) " used"

                @if remaining >= 0.0 {
                    " • " (format_currency(remaining, currency)) " left"
                } @else {
                    " • " span class="text-red-600 dark:text-red-400"
                    {
                        (format_currency(-remaining, currency)) " over"
                    }
                }
            }

            ul class="mt-3 space-y-1 text-sm"
            {
                @for budget in &item.budgets {
                    li class="flex flex-wrap items-center justify-between gap-2" data-budget-row="true"
                    {
                        span class="text-gray-600 dark:text-gray-300"
                        {
                            (budget.start_date) " to " (budget.end_date) ": "
                            (format_currency(budget.amount, currency))
                        }

                        span class="flex gap-4"
                        {
                            (edit_delete_action_links(
                                &format_endpoint(endpoints::EDIT_BUDGET_VIEW, budget.id),
                                &format_endpoint(endpoints::BUDGET, budget.id),
                                &format!("Are you sure you want to delete the {label} budget?"),
                                "closest [data-budget-row='true']",
                                "delete",
                            ))
                        }
                    }
                }
            }
        }
    )
}

fn budgets_view(
    progress: &[BudgetProgress],
    currency: Currency,
    unread_notifications: u64,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::BUDGETS_VIEW)
        .unread_notifications(unread_notifications)
        .into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            header class="flex justify-between flex-wrap items-end"
            {
                h1 class="text-xl font-bold" { "Budgets" }
                a href=(endpoints::NEW_BUDGET_VIEW) class=(LINK_STYLE) { "Create Budget" }
            }

            @if progress.is_empty() {
                p class="text-gray-500 dark:text-gray-400"
                {
                    "No budgets yet. "
                    a href=(endpoints::NEW_BUDGET_VIEW) class=(LINK_STYLE)
                    {
                        "Create a budget"
                    }
                    " to keep track of your spending."
                }
            } @else {
                ul class="grid w-full gap-4 md:grid-cols-2"
                {
                    @for item in progress {
                        (budget_category_panel(item, currency))
                    }
                }
            }
        }
    );

    base("Budgets", &[], &content)
}
