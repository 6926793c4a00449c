//! The cards page: card and cash spending, the user's cards and their expenses.

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
    card::{Card, get_cards},
    endpoints::{self, format_endpoint},
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, PANEL_STYLE, base, edit_delete_action_links,
        format_currency,
    },
    navigation::NavBar,
    notification::count_unread_notifications,
    settings::{Currency, get_currency},
    transaction::{
        PaymentFilter, Transaction, TransactionFilter, get_transactions, total_spent,
        transactions_table,
    },
};

/// The state needed for the cards page.
#[derive(Debug, Clone)]
pub struct CardsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CardsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Which expenses to list under the cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardsTab {
    #[default]
    All,
    Card,
    Cash,
}

impl CardsTab {
    const ALL: [CardsTab; 3] = [CardsTab::All, CardsTab::Card, CardsTab::Cash];

    fn query_value(self) -> &'static str {
        match self {
            CardsTab::All => "all",
            CardsTab::Card => "card",
            CardsTab::Cash => "cash",
        }
    }

    fn label(self) -> &'static str {
        match self {
            CardsTab::All => "All",
            CardsTab::Card => "Card",
            CardsTab::Cash => "Cash",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CardsQuery {
    #[serde(default)]
    pub tab: CardsTab,
}

/// Render the cards page.
pub async fn get_cards_page(
    State(state): State<CardsPageState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<CardsQuery>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let cards = get_cards(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve cards: {error}"))?;
    let card_expenses = get_transactions(
        user_id,
        TransactionFilter::expenses().payment(PaymentFilter::Card),
        &connection,
    )?;
    let cash_expenses = get_transactions(
        user_id,
        TransactionFilter::expenses().payment(PaymentFilter::Cash),
        &connection,
    )?;
    let expenses = match query.tab {
        CardsTab::Card => card_expenses.clone(),
        CardsTab::Cash => cash_expenses.clone(),
        CardsTab::All => get_transactions(user_id, TransactionFilter::expenses(), &connection)?,
    };
    let currency = get_currency(user_id, &connection)?;
    let unread_notifications = count_unread_notifications(user_id, &connection)?;

    let view = CardsView {
        cards: &cards,
        card_total: total_spent(&card_expenses),
        cash_total: total_spent(&cash_expenses),
        expenses: &expenses,
        tab: query.tab,
        currency,
    };

    Ok(view.into_html(unread_notifications).into_response())
}

struct CardsView<'a> {
    cards: &'a [Card],
    card_total: f64,
    cash_total: f64,
    expenses: &'a [Transaction],
    tab: CardsTab,
    currency: Currency,
}

impl CardsView<'_> {
    fn into_html(self, unread_notifications: u64) -> Markup {
        let nav_bar = NavBar::new(endpoints::CARDS_VIEW)
            .unread_notifications(unread_notifications)
            .into_html();
        let currency = self.currency;

        let card_item = |card: &Card| {
            let edit_url = format_endpoint(endpoints::EDIT_CARD_VIEW, card.id);
            let delete_url = format_endpoint(endpoints::CARD, card.id);
            let confirm_message = format!(
                "Are you sure you want to delete '{}'? This will also delete every transaction paid with it.",
                card.name
            );

            html!(
                li class=(PANEL_STYLE) data-card="true"
                {
                    div class="flex items-start justify-between gap-3"
                    {
                        div
                        {
                            p class="font-semibold text-gray-900 dark:text-white" { (card.name) }
                            p class="text-sm text-gray-500 dark:text-gray-400"
                            {
                                (card.card_type) " •••• "
                                span class="card-last-four" { (card.last_four()) }
                            }
                        }

                        span class="tabular-nums text-gray-900 dark:text-white"
                        {
                            (format_currency(card.balance, currency))
                        }
                    }

                    dl class="mt-2 grid grid-cols-2 gap-2 text-sm"
                    {
                        dt class="text-gray-500 dark:text-gray-400" { "Limit" }
                        dd class="tabular-nums" { (format_currency(card.spending_limit, currency)) }

                        @if let Some(due_date) = card.due_date {
                            dt class="text-gray-500 dark:text-gray-400" { "Due" }
                            dd { (due_date) }
                        }
                    }

                    div class="mt-2 flex items-center gap-4 text-sm"
                    {
                        (edit_delete_action_links(
                            &edit_url,
                            &delete_url,
                            &confirm_message,
                            "closest [data-card='true']",
                            "delete",
                        ))
                    }
                }
            )
        };

        let tab_link = |tab: CardsTab| {
            let url = format!("{}?tab={}", endpoints::CARDS_VIEW, tab.query_value());
            let style = if tab == self.tab {
                "px-3 py-1 rounded-full bg-blue-600 text-white"
            } else {
                "px-3 py-1 rounded-full text-gray-600 hover:bg-gray-100 \
                dark:text-gray-300 dark:hover:bg-gray-700"
            };

            html!(
                a href=(url) class=(style) aria-current=[(tab == self.tab).then_some("page")]
                {
                    (tab.label())
                }
            )
        };

        let content = html!(
            (nav_bar)

            main class=(PAGE_CONTAINER_STYLE)
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Cards" }
                    a href=(endpoints::NEW_CARD_VIEW) class=(LINK_STYLE) { "Add Card" }
                }

                section class="grid w-full gap-4 sm:grid-cols-2"
                {
                    div class=(PANEL_STYLE)
                    {
                        p class="text-sm text-gray-500 dark:text-gray-400" { "Card spending" }
                        p id="card-total" class="text-2xl font-bold tabular-nums"
                        {
                            (format_currency(self.card_total, currency))
                        }
                    }

                    div class=(PANEL_STYLE)
                    {
                        p class="text-sm text-gray-500 dark:text-gray-400" { "Cash spending" }
                        p id="cash-total" class="text-2xl font-bold tabular-nums"
                        {
                            (format_currency(self.cash_total, currency))
                        }
                    }
                }

                ul class="grid w-full gap-4 sm:grid-cols-2"
                {
                    @for card in self.cards {
                        (card_item(card))
                    }

                    @if self.cards.is_empty() {
                        li class="text-sm text-gray-500 dark:text-gray-400"
                        {
                            "No cards added yet. "
                            a href=(endpoints::NEW_CARD_VIEW) class=(LINK_STYLE)
                            {
                                "Add your first card"
                            }
                        }
                    }
                }

                section class="w-full space-y-4"
                {
                    nav class="flex gap-2 text-sm"
                    {
                        @for tab in CardsTab::ALL {
                            (tab_link(tab))
                        }
                    }

                    (transactions_table(self.expenses, currency))
                }
            }
        );

        base("Cards", &[], &content)
    }
}

#[cfg(test)]
mod cards_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Router, routing::get};
    use axum_test::TestServer;
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        card::{Card, CardType, create_card},
        endpoints,
        test_utils::{assert_valid_html, create_test_user, get_test_connection},
        transaction::{Transaction, TransactionType, create_transaction},
    };

    use super::{CardsPageState, get_cards_page};

    fn text_of(html: &Html, selector: &str) -> String {
        let selector = Selector::parse(selector).unwrap();
        html.select(&selector)
            .next()
            .unwrap_or_else(|| panic!("Could not find {selector:?}"))
            .text()
            .collect::<String>()
            .trim()
            .to_owned()
    }

    fn get_server() -> TestServer {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);
        let card = create_card(
            user.id,
            Card::build("Travel", "4111111111111234", CardType::Visa),
            &connection,
        )
        .unwrap();
        let expense = |amount, category: &str| {
            Transaction::build(TransactionType::Expense, amount, date!(2025 - 05 - 01), category)
        };
        create_transaction(user.id, expense(40.0, "card").card_id(Some(card.id)), &connection)
            .unwrap();
        create_transaction(user.id, expense(15.0, "cash").payment_method("Cash"), &connection)
            .unwrap();
        create_transaction(
            user.id,
            expense(99.0, "transfer").payment_method("Bank Transfer"),
            &connection,
        )
        .unwrap();

        let state = CardsPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };
        let app = Router::new()
            .route(endpoints::CARDS_VIEW, get(get_cards_page))
            .layer(Extension(user.id))
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server")
    }

    fn row_count(html: &Html) -> usize {
        let selector = Selector::parse("tbody tr td.text-right").unwrap();
        html.select(&selector).count()
    }

    #[tokio::test]
    async fn shows_card_and_cash_totals() {
        let server = get_server();

        let response = server.get(endpoints::CARDS_VIEW).await;

        response.assert_status_ok();
        let html = Html::parse_document(&response.text());
        assert_valid_html(&html);
        assert_eq!(text_of(&html, "#card-total"), "$40.00");
        assert_eq!(text_of(&html, "#cash-total"), "$15.00");
        assert_eq!(text_of(&html, ".card-last-four"), "1234");
        assert_eq!(row_count(&html), 3);
    }

    #[tokio::test]
    async fn tabs_filter_expenses() {
        let server = get_server();

        let card_html = Html::parse_document(&server.get("/cards?tab=card").await.text());
        let cash_html = Html::parse_document(&server.get("/cards?tab=cash").await.text());

        assert_eq!(row_count(&card_html), 1);
        assert_eq!(row_count(&cash_html), 1);
        assert!(!card_html.html().contains("4111111111111234"));
    }
}
