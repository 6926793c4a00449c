//! Dashboard module
//!
//! Provides an overview page greeting the user with their budget and spending
//! totals, recent transactions and upcoming reminders.

mod handlers;
mod summary;

pub use handlers::get_dashboard_page;
