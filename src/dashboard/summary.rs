//! The totals shown at the top of the dashboard.

use crate::{
    budget::Budget,
    transaction::{Transaction, percentage_used, total_income, total_spent},
};

/// Budget and spending totals across all of a user's data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct DashboardSummary {
    /// The sum of the amounts of every budget.
    pub total_budget: f64,
    /// The sum of every expense.
    pub total_spent: f64,
    pub total_income: f64,
}

impl DashboardSummary {
    pub fn new(budgets: &[Budget], transactions: &[Transaction]) -> Self {
        Self {
            total_budget: budgets.iter().map(|budget| budget.amount).sum(),
            total_spent: total_spent(transactions),
            total_income: total_income(transactions),
        }
    }

    /// The fraction of the total budget spent, zero without any budgets.
    pub fn percentage_used(&self) -> f64 {
        percentage_used(self.total_spent, self.total_budget)
    }

    pub fn remaining(&self) -> f64 {
        self.total_budget - self.total_spent
    }
}
