//! Budgets: a spending ceiling for a category over a period, and how much of
//! each category's budget has been spent.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod form;
mod list;
mod progress;

pub use create::{create_budget_endpoint, get_new_budget_page};
pub use db::{
    create_budget, create_budget_table, delete_budget, get_budget, get_budgets, update_budget,
};
pub use delete::delete_budget_endpoint;
pub use domain::{Budget, BudgetBuilder, BudgetForm};
pub use edit::{get_edit_budget_page, update_budget_endpoint};
pub use list::get_budgets_page;
pub use progress::{BudgetProgress, budget_progress};
