//! Storage for the messages shown on the notifications page.

use rusqlite::{Connection, OptionalExtension, Row};
use time::OffsetDateTime;

use crate::{Error, auth::UserID, database_id::NotificationId};

/// A message for the user, such as a budget alert.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserID,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: OffsetDateTime,
}

/// Create the notification table.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_notification_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS notification (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                message TEXT NOT NULL,
                is_read INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

const SELECT_COLUMNS: &str = "SELECT id, user_id, title, message, is_read, created_at FROM notification";

/// Create a notification for `user_id`, unless an identical one is still unread.
///
/// Returns the new notification, or the existing unread one with the same
/// title and message.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn create_notification(
    user_id: UserID,
    title: &str,
    message: &str,
    connection: &Connection,
) -> Result<Notification, Error> {
    let existing = connection
        .prepare(&format!(
            "{SELECT_COLUMNS} WHERE user_id = ?1 AND title = ?2 AND message = ?3 AND is_read = 0
             ORDER BY id ASC LIMIT 1"
        ))?
        .query_row((user_id.as_i64(), title, message), map_notification_row)
        .optional()?;

    if let Some(notification) = existing {
        tracing::debug!("Skipping duplicate notification {:?} for user {user_id}", title);
        return Ok(notification);
    }

    let notification = connection
        .prepare(
            "INSERT INTO notification (user_id, title, message, is_read, created_at)
             VALUES (?1, ?2, ?3, 0, ?4)
             RETURNING id, user_id, title, message, is_read, created_at",
        )?
        .query_row(
            (user_id.as_i64(), title, message, OffsetDateTime::now_utc()),
            map_notification_row,
        )?;

    Ok(notification)
}

/// Retrieve all of `user_id`'s notifications, newest first.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn get_notifications(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Notification>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_COLUMNS} WHERE user_id = ?1 ORDER BY created_at DESC, id DESC"
        ))?
        .query_map([user_id.as_i64()], map_notification_row)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::from)
}

/// The number of notifications `user_id` has not read yet.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn count_unread_notifications(user_id: UserID, connection: &Connection) -> Result<u64, Error> {
    let count: i64 = connection.query_row(
        "SELECT COUNT(id) FROM notification WHERE user_id = ?1 AND is_read = 0",
        [user_id.as_i64()],
        |row| row.get(0),
    )?;

    Ok(count as u64)
}

/// Mark one of `user_id`'s notifications as read.
///
/// # Errors
/// Returns [Error::UpdateMissingNotification] if the notification does not belong to the user.
pub fn mark_notification_read(
    user_id: UserID,
    id: NotificationId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE notification SET is_read = 1 WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        Err(Error::UpdateMissingNotification)
    } else {
        Ok(())
    }
}

/// Mark every one of `user_id`'s notifications as read.
///
/// Returns the number of notifications that were unread.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn mark_all_notifications_read(
    user_id: UserID,
    connection: &Connection,
) -> Result<usize, Error> {
    connection
        .execute(
            "UPDATE notification SET is_read = 1 WHERE user_id = ?1 AND is_read = 0",
            [user_id.as_i64()],
        )
        .map_err(Error::from)
}

/// Delete one of `user_id`'s notifications.
///
/// # Errors
/// Returns [Error::DeleteMissingNotification] if the notification does not belong to the user.
pub fn delete_notification(
    user_id: UserID,
    id: NotificationId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM notification WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        Err(Error::DeleteMissingNotification)
    } else {
        Ok(())
    }
}

fn map_notification_row(row: &Row) -> Result<Notification, rusqlite::Error> {
    Ok(Notification {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        title: row.get(2)?,
        message: row.get(3)?,
        is_read: row.get(4)?,
        created_at: row.get(5)?,
    })
}

#[cfg(test)]
mod notification_db_tests {
    use crate::{
        Error,
        test_utils::{create_test_user, get_test_connection},
    };

    use super::{
        count_unread_notifications, create_notification, delete_notification, get_notifications,
        mark_all_notifications_read, mark_notification_read,
    };

    #[test]
    fn create_notification_is_unread() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);

        let notification =
            create_notification(user.id, "Budget Alert", "Over budget", &connection).unwrap();

        assert!(!notification.is_read);
        assert_eq!(count_unread_notifications(user.id, &connection), Ok(1));
    }

    #[test]
    fn identical_unread_notification_is_not_duplicated() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);

        let first =
            create_notification(user.id, "Budget Alert", "Over budget", &connection).unwrap();
        let second =
            create_notification(user.id, "Budget Alert", "Over budget", &connection).unwrap();

        assert_eq!(first, second);
        assert_eq!(get_notifications(user.id, &connection).unwrap().len(), 1);
    }

    #[test]
    fn read_notification_can_be_repeated() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);
        let first =
            create_notification(user.id, "Budget Alert", "Over budget", &connection).unwrap();
        mark_notification_read(user.id, first.id, &connection).unwrap();

        let second =
            create_notification(user.id, "Budget Alert", "Over budget", &connection).unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(count_unread_notifications(user.id, &connection), Ok(1));
    }

    #[test]
    fn notifications_are_newest_first() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);
        let older = create_notification(user.id, "A", "first", &connection).unwrap();
        let newer = create_notification(user.id, "B", "second", &connection).unwrap();

        let notifications = get_notifications(user.id, &connection).unwrap();

        assert_eq!(
            notifications.iter().map(|n| n.id).collect::<Vec<_>>(),
            vec![newer.id, older.id]
        );
    }

    #[test]
    fn mark_all_read() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);
        create_notification(user.id, "A", "first", &connection).unwrap();
        create_notification(user.id, "B", "second", &connection).unwrap();

        assert_eq!(mark_all_notifications_read(user.id, &connection), Ok(2));
        assert_eq!(count_unread_notifications(user.id, &connection), Ok(0));
    }

    #[test]
    fn cannot_touch_other_users_notifications() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);
        let other_user = create_test_user("other@example.com", &connection);
        let notification = create_notification(user.id, "A", "first", &connection).unwrap();

        assert_eq!(
            mark_notification_read(other_user.id, notification.id, &connection),
            Err(Error::UpdateMissingNotification)
        );
        assert_eq!(
            delete_notification(other_user.id, notification.id, &connection),
            Err(Error::DeleteMissingNotification)
        );
        assert_eq!(get_notifications(other_user.id, &connection), Ok(vec![]));
    }

    #[test]
    fn delete_removes_notification() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);
        let notification = create_notification(user.id, "A", "first", &connection).unwrap();

        delete_notification(user.id, notification.id, &connection).unwrap();

        assert_eq!(get_notifications(user.id, &connection), Ok(vec![]));
    }
}
