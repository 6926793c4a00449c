//! Totals computed over transactions that have already been fetched.

use std::collections::BTreeMap;

use crate::transaction::{Transaction, TransactionType};

/// The name transactions with a blank category are grouped under.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Lowercase and trim `category` so that "Food " and "food" are grouped together.
pub fn normalize_category(category: &str) -> String {
    let normalized = category.trim().to_lowercase();

    if normalized.is_empty() {
        UNCATEGORIZED.to_owned()
    } else {
        normalized
    }
}

/// Capitalise the first letter of a normalized category for display.
pub fn display_category(category: &str) -> String {
    let mut chars = category.chars();

    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn total_of_type(transactions: &[Transaction], type_: TransactionType) -> f64 {
    transactions
        .iter()
        .filter(|transaction| transaction.type_ == type_)
        .map(|transaction| transaction.amount)
        .sum()
}

/// The sum of the amounts of every expense in `transactions`.
pub fn total_spent(transactions: &[Transaction]) -> f64 {
    total_of_type(transactions, TransactionType::Expense)
}

/// The sum of the amounts of every income in `transactions`.
pub fn total_income(transactions: &[Transaction]) -> f64 {
    total_of_type(transactions, TransactionType::Income)
}

/// The fraction of `total_budget` that has been spent, or zero if there is no budget.
///
/// Not clamped, so overspending gives a value above one.
pub fn percentage_used(total_spent: f64, total_budget: f64) -> f64 {
    if total_budget > 0.0 {
        total_spent / total_budget
    } else {
        0.0
    }
}

/// The expense total for each normalized category, sorted by category.
pub fn category_totals(transactions: &[Transaction]) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();

    for transaction in transactions
        .iter()
        .filter(|transaction| transaction.type_ == TransactionType::Expense)
    {
        *totals
            .entry(normalize_category(&transaction.category))
            .or_insert(0.0) += transaction.amount;
    }

    totals
}

#[cfg(test)]
mod summary_tests {
    use time::macros::date;

    use crate::{
        UserID,
        transaction::{Transaction, TransactionType},
    };

    use super::{
        category_totals, display_category, normalize_category, percentage_used, total_income,
        total_spent,
    };

    fn transaction(type_: TransactionType, amount: f64, category: &str) -> Transaction {
        Transaction {
            id: 0,
            user_id: UserID::new(1),
            type_,
            amount,
            date: date!(2025 - 06 - 01),
            description: String::new(),
            category: category.to_owned(),
            payment_method: String::new(),
            card_id: None,
            is_recurring: false,
            recurrence_frequency: None,
        }
    }

    fn sample() -> Vec<Transaction> {
        vec![
            transaction(TransactionType::Expense, 12.5, "Food"),
            transaction(TransactionType::Expense, 7.5, " food "),
            transaction(TransactionType::Expense, 30.0, "Transport"),
            transaction(TransactionType::Expense, 5.0, ""),
            transaction(TransactionType::Income, 1000.0, "Salary"),
            transaction(TransactionType::Income, 250.0, "Bonus"),
        ]
    }

    #[test]
    fn totals_split_by_type() {
        let transactions = sample();

        assert_eq!(total_spent(&transactions), 55.0);
        assert_eq!(total_income(&transactions), 1250.0);
    }

    #[test]
    fn totals_of_nothing_are_zero() {
        assert_eq!(total_spent(&[]), 0.0);
        assert_eq!(total_income(&[]), 0.0);
    }

    #[test]
    fn percentage_used_without_budget_is_zero() {
        assert_eq!(percentage_used(50.0, 0.0), 0.0);
        assert_eq!(percentage_used(50.0, 200.0), 0.25);
        assert_eq!(percentage_used(300.0, 200.0), 1.5);
    }

    #[test]
    fn category_totals_group_normalized_expenses() {
        let got = category_totals(&sample());

        let want: Vec<(String, f64)> = vec![
            ("food".to_owned(), 20.0),
            ("transport".to_owned(), 30.0),
            ("uncategorized".to_owned(), 5.0),
        ];
        assert_eq!(got.into_iter().collect::<Vec<_>>(), want);
    }

    #[test]
    fn category_totals_sum_to_total_spent() {
        let transactions = sample();

        let sum: f64 = category_totals(&transactions).values().sum();

        assert_eq!(sum, total_spent(&transactions));
    }

    #[test]
    fn normalize_and_display_category() {
        assert_eq!(normalize_category("  Eating Out "), "eating out");
        assert_eq!(normalize_category("   "), "uncategorized");
        assert_eq!(display_category("eating out"), "Eating out");
        assert_eq!(display_category(""), "");
    }
}
