//! Credit and debit cards.
//!
//! Cards hold a balance, a spending limit and an optional payment due date.
//! Expenses can be paid with a card, and deleting a card deletes those expenses.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod form;
mod list;

pub use create::{create_card_endpoint, get_new_card_page};
pub use db::{create_card, create_card_table, delete_card, get_card, get_cards, update_card};
pub use delete::delete_card_endpoint;
pub use domain::{Card, CardBuilder, CardForm, CardType};
pub use edit::{get_edit_card_page, update_card_endpoint};
pub use list::get_cards_page;
