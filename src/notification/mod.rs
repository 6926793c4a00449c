//! Notifications: messages for the user such as budget alerts and reached goals.
//!
//! An identical unread notification is never stored twice.

mod budget_alert;
mod db;
mod page;

pub use budget_alert::check_budget_alerts;
pub use db::{
    Notification, count_unread_notifications, create_notification, create_notification_table,
    delete_notification, get_notifications, mark_all_notifications_read, mark_notification_read,
};
pub use page::{
    delete_notification_endpoint, get_notifications_page, mark_all_notifications_read_endpoint,
    mark_notification_read_endpoint,
};
