//! Dashboard HTTP handler and view rendering.

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
    auth::{UserID, get_user_by_id},
    budget::get_budgets,
    dashboard::summary::DashboardSummary,
    endpoints,
    html::{
        CATEGORY_BADGE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, PANEL_STYLE, base,
        format_currency, format_percentage, link, progress_bar,
    },
    navigation::NavBar,
    notification::count_unread_notifications,
    reminder::{LinkedReminder, UPCOMING_REMINDER_LIMIT, get_linked_reminders, reminders_list},
    settings::{Currency, get_currency},
    timezone::get_local_date,
    transaction::{
        Transaction, TransactionFilter, get_recent_transactions, get_transactions,
        transaction_amount,
    },
};

/// How many transactions the dashboard lists.
const RECENT_TRANSACTION_LIMIT: u32 = 4;

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Holds all the data needed to render the dashboard.
struct DashboardData<'a> {
    first_name: &'a str,
    summary: DashboardSummary,
    recent_transactions: Vec<Transaction>,
    reminders: Vec<LinkedReminder>,
    currency: Currency,
}

/// Display a page with an overview of the user's data.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let today = get_local_date(&state.local_timezone)?;
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let user = get_user_by_id(user_id, &connection)
        .inspect_err(|error| tracing::error!("Could not get user {user_id}: {error}"))?;
    let unread_notifications = count_unread_notifications(user_id, &connection)?;
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).unread_notifications(unread_notifications);

    let budgets = get_budgets(user_id, &connection)
        .inspect_err(|error| tracing::error!("Could not get budgets: {error}"))?;
    let transactions = get_transactions(user_id, TransactionFilter::all(), &connection)
        .inspect_err(|error| tracing::error!("Could not get transactions: {error}"))?;

    if budgets.is_empty() && transactions.is_empty() {
        return Ok(dashboard_no_data_view(nav_bar, user.first_name()).into_response());
    }

    let currency = get_currency(user_id, &connection)?;
    let data = DashboardData {
        first_name: user.first_name(),
        summary: DashboardSummary::new(&budgets, &transactions),
        recent_transactions: get_recent_transactions(
            user_id,
            RECENT_TRANSACTION_LIMIT,
            &connection,
        )?,
        reminders: get_linked_reminders(
            user_id,
            today,
            UPCOMING_REMINDER_LIMIT,
            currency,
            &connection,
        )
        .inspect_err(|error| tracing::error!("Could not get reminders: {error}"))?,
        currency,
    };

    Ok(dashboard_view(nav_bar, &data).into_response())
}

fn greeting(first_name: &str) -> Markup {
    html!(
        h1 id="greeting" class="text-2xl font-bold" { "Hello, " (first_name) }
    )
}

/// Renders the dashboard for a user who has not added any transactions or budgets.
fn dashboard_no_data_view(nav_bar: NavBar, first_name: &str) -> Markup {
    let nav_bar = nav_bar.into_html();
    let new_transaction_link = link(endpoints::NEW_TRANSACTION_VIEW, "adding a transaction");
    let new_budget_link = link(endpoints::NEW_BUDGET_VIEW, "creating a budget");

    let content = html!(
        (nav_bar)

        div
            id="getting-started"
            class="flex flex-col items-center gap-4 px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            (greeting(first_name))

            h2 class="text-xl font-bold" { "Let's get started" }

            p
            {
                "Your spending summary will show up here once you have some data.
                Start by " (new_transaction_link) " or " (new_budget_link) "."
            }
        }
    );

    base("Dashboard", &[], &content)
}

fn summary_view(summary: &DashboardSummary, currency: Currency) -> Markup {
    let stat = |id: &str, label: &str, value: String| {
        html!(
            div class=(PANEL_STYLE)
            {
                p class="text-sm text-gray-500 dark:text-gray-400" { (label) }
                p id=(id) class="text-2xl font-bold tabular-nums" { (value) }
            }
        )
    };

    html!(
        section class="grid w-full gap-4 sm:grid-cols-3"
        {
            (stat("total-budget", "Total Budget", format_currency(summary.total_budget, currency)))
            (stat("total-spent", "Total Spent", format_currency(summary.total_spent, currency)))
            (stat("total-income", "Total Income", format_currency(summary.total_income, currency)))
        }

        section class=(PANEL_STYLE)
        {
            div class="flex items-baseline justify-between mb-2"
            {
                h2 class="font-semibold" { "Budget used" }
                span id="percentage-used" class="tabular-nums"
                {
                    (format_percentage(summary.percentage_used()))
                }
            }

            (progress_bar(summary.percentage_used()))

            p class="mt-2 text-sm text-gray-500 dark:text-gray-400"
            {
                span id="remaining-budget" class="tabular-nums"
                {
                    (format_currency(summary.remaining(), currency))
                }
                " remaining"
            }
        }
    )
}

fn recent_transactions_view(transactions: &[Transaction], currency: Currency) -> Markup {
    html!(
        section class=(PANEL_STYLE)
        {
            div class="flex items-baseline justify-between mb-3"
            {
                h2 class="font-semibold" { "Recent Transactions" }
                a href=(endpoints::TRANSACTIONS_VIEW) class=(LINK_STYLE) { "See all" }
            }

            @if transactions.is_empty() {
                p class="text-sm text-gray-500 dark:text-gray-400" { "No transactions yet." }
            } @else {
                ul id="recent-transactions" class="divide-y divide-gray-200 dark:divide-gray-700"
                {
                    @for transaction in transactions {
                        li class="flex items-center justify-between py-2" data-transaction-id=(transaction.id)
                        {
                            div
                            {
                                p class="font-medium"
                                {
                                    @if transaction.description.is_empty() {
                                        (transaction.type_)
                                    } @else {
                                        (transaction.description)
                                    }
                                }
                                p class="text-xs text-gray-500 dark:text-gray-400"
                                {
                                    (transaction.date) " "
                                    span class=(CATEGORY_BADGE_STYLE) { (transaction.category) }
                                }
                            }

                            (transaction_amount(transaction, currency))
                        }
                    }
                }
            }
        }
    )
}

/// Renders the main dashboard page.
fn dashboard_view(nav_bar: NavBar, data: &DashboardData) -> Markup {
    let nav_bar = nav_bar.into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            (greeting(data.first_name))

            (summary_view(&data.summary, data.currency))

            div class="grid w-full gap-4 lg:grid-cols-2"
            {
                (recent_transactions_view(&data.recent_transactions, data.currency))

                section class=(PANEL_STYLE)
                {
                    h2 class="mb-3 font-semibold" { "Upcoming Reminders" }

                    (reminders_list(&data.reminders))
                }
            }
        }
    );

    base("Dashboard", &[], &content)
}
