//! Savings goals, the money put towards them and how close each one is.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod form;
mod list;
mod progress;
mod saving;

pub use create::{create_goal_endpoint, get_new_goal_page};
pub use db::{
    add_saving, create_goal, create_goal_table, create_saving_table, delete_goal, get_goal,
    get_goals, get_savings, get_savings_totals, update_goal,
};
pub use delete::delete_goal_endpoint;
pub use domain::{Goal, GoalBuilder, GoalForm, Saving, SavingsFrequency};
pub use edit::{get_edit_goal_page, update_goal_endpoint};
pub use list::get_goals_page;
pub use progress::{GoalProgress, GoalsSummary, goal_progress};
pub use saving::add_saving_endpoint;
