//! Database ID type definitions.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;
/// The ID of a row in the transaction table.
pub type TransactionId = DatabaseId;
/// The ID of a row in the card table.
pub type CardId = DatabaseId;
/// The ID of a row in the budget table.
pub type BudgetId = DatabaseId;
/// The ID of a row in the goal table.
pub type GoalId = DatabaseId;
/// The ID of a row in the saving table.
pub type SavingId = DatabaseId;
/// The ID of a row in the notification table.
pub type NotificationId = DatabaseId;
/// The ID of a row in the reminder table.
pub type ReminderId = DatabaseId;
