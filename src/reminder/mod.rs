//! Reminders: scheduled notices tied to a budget, goal, recurring transaction
//! or card due date.

mod db;
mod link;
mod schedule;
mod view;

pub use db::{
    NewReminder, Reminder, ReminderLink, create_reminder, create_reminder_table, delete_reminder,
    get_upcoming_reminders, mark_reminder_done,
};
pub use link::{LinkedReminder, ReminderLabel, get_linked_reminders, reminder_label};
pub use schedule::{
    schedule_budget_reminder, schedule_card_reminder, schedule_goal_reminder,
    schedule_transaction_reminder,
};
pub use view::{
    ReminderState, UPCOMING_REMINDER_LIMIT, delete_reminder_endpoint,
    mark_reminder_done_endpoint, reminders_list,
};
