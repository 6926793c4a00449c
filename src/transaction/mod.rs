//! Transaction management for the expense tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Database functions for storing and querying a user's transactions
//! - Totals over fetched transactions used by the dashboard, budgets and reports
//! - View handlers for transaction-related web pages

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod form;
mod list;
mod summary;

pub use create::{create_transaction_endpoint, get_new_transaction_page};
pub use db::{
    PaymentFilter, TransactionFilter, create_transaction, create_transaction_table,
    delete_transaction, get_recent_transactions, get_transaction, get_transactions,
    map_transaction_row, update_transaction,
};
pub use delete::delete_transaction_endpoint;
pub use domain::{
    CASH_PAYMENT_METHOD, RecurrenceFrequency, Transaction, TransactionBuilder, TransactionType,
};
pub use edit::{get_edit_transaction_page, update_transaction_endpoint};
pub use list::{get_transactions_page, transaction_amount, transactions_table};
pub use summary::{
    category_totals, display_category, normalize_category, percentage_used, total_income,
    total_spent,
};
