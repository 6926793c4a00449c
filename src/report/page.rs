//! The reports page handler and view.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints,
    html::{HeadElement, PAGE_CONTAINER_STYLE, base, format_currency, link},
    navigation::NavBar,
    notification::count_unread_notifications,
    report::{
        buckets::{ExpenseReport, ReportPeriod},
        charts::{ReportChart, category_chart, charts_script, charts_view, spending_chart},
    },
    settings::{Currency, get_currency},
    timezone::get_local_date,
    transaction::{TransactionFilter, get_transactions},
};

/// The state needed for the reports page.
#[derive(Debug, Clone)]
pub struct ReportState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    #[serde(default)]
    pub period: ReportPeriod,
}

/// Display expense charts for the requested period.
pub async fn get_reports_page(
    State(state): State<ReportState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, Error> {
    let today = get_local_date(&state.local_timezone)?;
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expenses = get_transactions(user_id, TransactionFilter::expenses(), &connection)
        .inspect_err(|error| tracing::error!("Could not get expenses for report: {error}"))?;
    let currency = get_currency(user_id, &connection)?;
    let unread_notifications = count_unread_notifications(user_id, &connection)?;

    let report = ExpenseReport::new(query.period, today, &expenses);

    Ok(reports_view(&report, query.period, currency, unread_notifications).into_response())
}

fn period_tabs(selected: ReportPeriod) -> Markup {
    let tab_link = |period: ReportPeriod| {
        let url = format!("{}?period={}", endpoints::REPORTS_VIEW, period.query_value());
        let style = if period == selected {
            "px-3 py-1 rounded-full bg-blue-600 text-white"
        } else {
            "px-3 py-1 rounded-full text-gray-600 hover:bg-gray-100 \
            dark:text-gray-300 dark:hover:bg-gray-700"
        };

        html!(
            a href=(url) class=(style) aria-current=[(period == selected).then_some("page")]
            {
                (period.label())
            }
        )
    };

    html!(
        nav id="period-tabs" class="flex gap-2 text-sm"
        {
            @for period in ReportPeriod::ALL {
                (tab_link(period))
            }
        }
    )
}

fn reports_view(
    report: &ExpenseReport,
    period: ReportPeriod,
    currency: Currency,
    unread_notifications: u64,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::REPORTS_VIEW)
        .unread_notifications(unread_notifications)
        .into_html();
    let charts = [
        ReportChart {
            id: "spending-chart",
            options: spending_chart(report, period, currency).to_string(),
        },
        ReportChart {
            id: "category-chart",
            options: category_chart(report, period, currency).to_string(),
        },
    ];

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            header class="flex justify-between flex-wrap items-end gap-4"
            {
                h1 class="text-xl font-bold" { "Reports" }
                (period_tabs(period))
            }

            p class="text-gray-600 dark:text-gray-300"
            {
                "Total spent: "
                span id="period-total" class="font-semibold tabular-nums"
                {
                    (format_currency(report.total(), currency))
                }
            }

            @if report.total() == 0.0 {
                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    "No expenses in this period. Try "
                    (link(endpoints::NEW_TRANSACTION_VIEW, "adding an expense"))
                    "."
                }
            }

            (charts_view(&charts))
        }
    );

    let scripts = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        charts_script(&charts),
    ];

    base("Reports", &scripts, &content)
}

#[cfg(test)]
mod reports_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Router, routing::get};
    use axum_test::TestServer;
    use scraper::{Html, Selector};
    use time::{Duration, OffsetDateTime};

    use crate::{
        endpoints,
        test_utils::{assert_valid_html, create_test_user, get_test_connection},
        transaction::{Transaction, TransactionType, create_transaction},
    };

    use super::{ReportState, get_reports_page};

    fn get_server() -> TestServer {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);
        let today = OffsetDateTime::now_utc().date();
        for (amount, days_ago) in [(10.0, 0), (20.0, 3), (40.0, 20)] {
            create_transaction(
                user.id,
                Transaction::build(
                    TransactionType::Expense,
                    amount,
                    today - Duration::days(days_ago),
                    "Food",
                ),
                &connection,
            )
            .unwrap();
        }

        let state = ReportState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };
        let app = Router::new()
            .route(endpoints::REPORTS_VIEW, get(get_reports_page))
            .layer(Extension(user.id))
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server")
    }

    fn period_total(html: &Html) -> String {
        let selector = Selector::parse("#period-total").unwrap();
        html.select(&selector)
            .next()
            .expect("Could not find period total")
            .text()
            .collect::<String>()
            .trim()
            .to_owned()
    }

    #[tokio::test]
    async fn defaults_to_daily() {
        let server = get_server();

        let response = server.get(endpoints::REPORTS_VIEW).await;

        response.assert_status_ok();
        let html = Html::parse_document(&response.text());
        assert_valid_html(&html);
        assert_eq!(period_total(&html), "$30.00");
        for id in ["#spending-chart", "#category-chart"] {
            let selector = Selector::parse(id).unwrap();
            assert!(html.select(&selector).next().is_some(), "Could not find {id}");
        }
        let current = Selector::parse("#period-tabs a[aria-current='page']").unwrap();
        let current_text: String = html.select(&current).next().unwrap().text().collect();
        assert_eq!(current_text.trim(), "Daily");
    }

    #[tokio::test]
    async fn monthly_covers_older_expenses() {
        let server = get_server();

        let response = server
            .get(endpoints::REPORTS_VIEW)
            .add_query_param("period", "monthly")
            .await;

        response.assert_status_ok();
        let html = Html::parse_document(&response.text());
        assert_eq!(period_total(&html), "$70.00");
    }

    #[tokio::test]
    async fn rejects_unknown_period() {
        let server = get_server();

        let response = server
            .get(endpoints::REPORTS_VIEW)
            .add_query_param("period", "yearly")
            .await;

        response.assert_status_bad_request();
    }
}
