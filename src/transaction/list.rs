//! The page listing all of a user's transactions.

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
    endpoints::{self, format_endpoint},
    html::{
        AMOUNT_EXPENSE_STYLE, AMOUNT_INCOME_STYLE, CATEGORY_BADGE_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        edit_delete_action_links, format_currency, truncate_text,
    },
    navigation::NavBar,
    notification::count_unread_notifications,
    settings::{Currency, get_currency},
    transaction::{Transaction, TransactionFilter, TransactionType, get_transactions},
};

/// The state needed for the transactions listing page.
#[derive(Debug, Clone)]
pub struct TransactionsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the transactions listing page, newest first.
pub async fn get_transactions_page(
    State(state): State<TransactionsPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_transactions(user_id, TransactionFilter::all(), &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve transactions: {error}"))?;
    let currency = get_currency(user_id, &connection)?;
    let unread_notifications = count_unread_notifications(user_id, &connection)?;

    Ok(transactions_view(&transactions, currency, unread_notifications).into_response())
}

/// The amount prefixed with "+" for income and "-" for expenses.
pub fn transaction_amount(transaction: &Transaction, currency: Currency) -> Markup {
    let (sign, style) = match transaction.type_ {
        TransactionType::Income => ("+", AMOUNT_INCOME_STYLE),
        TransactionType::Expense => ("-", AMOUNT_EXPENSE_STYLE),
    };

    html!(
        span class={"tabular-nums font-medium " (style)}
        {
            (sign) (format_currency(transaction.amount, currency))
        }
    )
}

/// A table of transactions with edit and delete actions on each row.
pub fn transactions_table(transactions: &[Transaction], currency: Currency) -> Markup {
    let table_row = |transaction: &Transaction| {
        let edit_url = format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id);
        let delete_url = format_endpoint(endpoints::TRANSACTION, transaction.id);
        let (description, full_description) = truncate_text(&transaction.description);
        let confirm_message = format!(
            "Are you sure you want to delete the {} {} transaction from {}?",
            format_currency(transaction.amount, currency),
            transaction.category,
            transaction.date
        );

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE) { (transaction.date) }

                td class=(TABLE_CELL_STYLE) title=[full_description] { (description) }

                td class=(TABLE_CELL_STYLE)
                {
                    span class=(CATEGORY_BADGE_STYLE) { (transaction.category) }
                }

                td class=(TABLE_CELL_STYLE) { (transaction.payment_method) }

                td class={(TABLE_CELL_STYLE) " text-right"}
                {
                    (transaction_amount(transaction, currency))
                }

                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (edit_delete_action_links(
                            &edit_url,
                            &delete_url,
                            &confirm_message,
                            "closest tr",
                            "delete",
                        ))
                    }
                }
            }
        )
    };

    html!(
        div class="overflow-x-auto"
        {
            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Payment" }
                        th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                    }
                }

                tbody
                {
                    @for transaction in transactions {
                        (table_row(transaction))
                    }

                    @if transactions.is_empty() {
                        tr
                        {
                            td
                                colspan="6"
                                class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                            {
                                "No transactions yet."
                            }
                        }
                    }
                }
            }
        }
    )
}

fn transactions_view(
    transactions: &[Transaction],
    currency: Currency,
    unread_notifications: u64,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW)
        .unread_notifications(unread_notifications)
        .into_html();
    let new_expense_url = format!("{}?type=expense", endpoints::NEW_TRANSACTION_VIEW);
    let new_income_url = format!("{}?type=income", endpoints::NEW_TRANSACTION_VIEW);

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end gap-4"
                {
                    h1 class="text-xl font-bold" { "Transactions" }

                    div class="flex gap-4"
                    {
                        a href=(new_expense_url) class=(LINK_STYLE) { "Add Expense" }
                        a href=(new_income_url) class=(LINK_STYLE) { "Add Income" }
                    }
                }

                (transactions_table(transactions, currency))
            }
        }
    );

    base("Transactions", &[], &content)
}
