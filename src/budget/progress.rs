//! How much of each budgeted category has been spent.

use crate::{
    budget::Budget,
    transaction::{Transaction, category_totals, display_category, normalize_category},
};

/// The budgets for one normalized category and the expenses counted against them.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetProgress {
    /// The normalized category, e.g. "food".
    pub category: String,
    /// The sum of the amounts of every budget for the category.
    pub budget: f64,
    /// The sum of every expense in the category.
    pub spent: f64,
    pub budgets: Vec<Budget>,
}

impl BudgetProgress {
    /// The category with its first letter capitalised.
    pub fn label(&self) -> String {
        display_category(&self.category)
    }

    /// The fraction of the budget spent, clamped to [0, 1].
    pub fn progress(&self) -> f64 {
        if self.budget > 0.0 {
            (self.spent / self.budget).min(1.0)
        } else {
            0.0
        }
    }

    pub fn remaining(&self) -> f64 {
        self.budget - self.spent
    }
}

/// Group `budgets` by normalized category and total the matching expenses.
///
/// Categories keep the order in which they first appear in `budgets`.
pub fn budget_progress(budgets: &[Budget], transactions: &[Transaction]) -> Vec<BudgetProgress> {
    let spent_by_category = category_totals(transactions);
    let mut progress: Vec<BudgetProgress> = Vec::new();

    for budget in budgets {
        let category = normalize_category(&budget.category);

        match progress.iter_mut().find(|item| item.category == category) {
            Some(item) => {
                item.budget += budget.amount;
                item.budgets.push(budget.clone());
            }
            None => progress.push(BudgetProgress {
                spent: spent_by_category.get(&category).copied().unwrap_or(0.0),
                category,
                budget: budget.amount,
                budgets: vec![budget.clone()],
            }),
        }
    }

    progress
}

#[cfg(test)]
mod budget_progress_tests {
    use time::macros::date;

    use crate::{
        UserID,
        budget::Budget,
        transaction::{Transaction, TransactionType},
    };

    use super::budget_progress;

    fn budget(id: i64, category: &str, amount: f64) -> Budget {
        Budget {
            id,
            user_id: UserID::new(1),
            category: category.to_owned(),
            amount,
            start_date: date!(2025 - 01 - 01),
            end_date: date!(2025 - 01 - 31),
        }
    }

    fn transaction(type_: TransactionType, amount: f64, category: &str) -> Transaction {
        Transaction {
            id: 1,
            user_id: UserID::new(1),
            type_,
            amount,
            date: date!(2025 - 01 - 10),
            description: String::new(),
            category: category.to_owned(),
            payment_method: String::new(),
            card_id: None,
            is_recurring: false,
            recurrence_frequency: None,
        }
    }

    #[test]
    fn sums_expenses_with_matching_normalized_category() {
        let budgets = [budget(1, "Food", 200.0)];
        let transactions = [
            transaction(TransactionType::Expense, 50.0, "food "),
            transaction(TransactionType::Expense, 25.0, "FOOD"),
            transaction(TransactionType::Expense, 99.0, "rent"),
            transaction(TransactionType::Income, 500.0, "food"),
        ];

        let progress = budget_progress(&budgets, &transactions);

        assert_eq!(progress.len(), 1);
        assert_eq!(progress[0].category, "food");
        assert_eq!(progress[0].label(), "Food");
        assert_eq!(progress[0].spent, 75.0);
        assert_eq!(progress[0].progress(), 0.375);
    }

    #[test]
    fn budgets_with_same_category_are_combined() {
        let budgets = [budget(1, "Food", 100.0), budget(2, " food", 50.0)];

        let progress = budget_progress(&budgets, &[]);

        assert_eq!(progress.len(), 1);
        assert_eq!(progress[0].budget, 150.0);
        assert_eq!(progress[0].budgets.len(), 2);
        assert_eq!(progress[0].progress(), 0.0);
    }

    #[test]
    fn progress_is_clamped_when_overspent() {
        let budgets = [budget(1, "Fun", 10.0)];
        let transactions = [transaction(TransactionType::Expense, 30.0, "fun")];

        let progress = budget_progress(&budgets, &transactions);

        assert_eq!(progress[0].progress(), 1.0);
        assert_eq!(progress[0].remaining(), -20.0);
    }

    #[test]
    fn blank_category_budget_is_uncategorized() {
        let budgets = [budget(1, "", 10.0)];
        let transactions = [transaction(TransactionType::Expense, 4.0, "  ")];

        let progress = budget_progress(&budgets, &transactions);

        assert_eq!(progress[0].category, "uncategorized");
        assert_eq!(progress[0].spent, 4.0);
    }
}
