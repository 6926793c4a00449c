//! Defines the budget type and its builder.

use serde::Deserialize;
use time::Date;

use crate::{Error, auth::UserID, database_id::BudgetId};

/// A spending ceiling for one category over a period of time.
#[derive(Debug, Clone, PartialEq)]
pub struct Budget {
    pub id: BudgetId,
    pub user_id: UserID,
    /// The category as the user entered it.
    pub category: String,
    pub amount: f64,
    pub start_date: Date,
    pub end_date: Date,
}

impl Budget {
    /// Create a new budget.
    ///
    /// Shortcut for [BudgetBuilder] for discoverability.
    pub fn build(category: &str, amount: f64, start_date: Date, end_date: Date) -> BudgetBuilder {
        BudgetBuilder {
            category: category.to_owned(),
            amount,
            start_date,
            end_date,
        }
    }

    /// Whether `date` falls within the budget period, inclusive of both ends.
    pub fn contains(&self, date: Date) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// A builder for creating [Budget] instances.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetBuilder {
    pub category: String,
    pub amount: f64,
    pub start_date: Date,
    pub end_date: Date,
}

impl BudgetBuilder {
    /// Check the builder and return it with the category trimmed.
    ///
    /// # Errors
    /// Returns [Error::NonPositiveAmount], [Error::EmptyCategory] or
    /// [Error::InvalidBudgetPeriod] if the period ends before it starts.
    pub(super) fn validate(mut self) -> Result<Self, Error> {
        if !(self.amount.is_finite() && self.amount > 0.0) {
            return Err(Error::NonPositiveAmount);
        }

        self.category = self.category.trim().to_owned();
        if self.category.is_empty() {
            return Err(Error::EmptyCategory);
        }

        if self.end_date < self.start_date {
            return Err(Error::InvalidBudgetPeriod(self.start_date, self.end_date));
        }

        Ok(self)
    }
}

/// Form data for budget creation and editing.
#[derive(Debug, Clone, Deserialize)]
pub struct BudgetForm {
    pub category: String,
    pub amount: f64,
    pub start_date: Date,
    pub end_date: Date,
}

impl From<BudgetForm> for BudgetBuilder {
    fn from(form: BudgetForm) -> Self {
        Budget::build(&form.category, form.amount, form.start_date, form.end_date)
    }
}

impl From<&Budget> for BudgetBuilder {
    fn from(budget: &Budget) -> Self {
        Budget::build(
            &budget.category,
            budget.amount,
            budget.start_date,
            budget.end_date,
        )
    }
}

#[cfg(test)]
mod budget_domain_tests {
    use time::macros::date;

    use crate::Error;

    use super::Budget;

    #[test]
    fn validate_trims_category() {
        let builder = Budget::build("  Food ", 100.0, date!(2025 - 01 - 01), date!(2025 - 01 - 31))
            .validate()
            .unwrap();

        assert_eq!(builder.category, "Food");
    }

    #[test]
    fn validate_rejects_non_positive_amount() {
        for amount in [0.0, -5.0, f64::NAN] {
            let result =
                Budget::build("Food", amount, date!(2025 - 01 - 01), date!(2025 - 01 - 31))
                    .validate();

            assert_eq!(result, Err(Error::NonPositiveAmount), "amount {amount}");
        }
    }

    #[test]
    fn validate_rejects_blank_category() {
        let result =
            Budget::build("   ", 10.0, date!(2025 - 01 - 01), date!(2025 - 01 - 31)).validate();

        assert_eq!(result, Err(Error::EmptyCategory));
    }

    #[test]
    fn validate_rejects_end_before_start() {
        let result =
            Budget::build("Food", 10.0, date!(2025 - 02 - 01), date!(2025 - 01 - 31)).validate();

        assert_eq!(
            result,
            Err(Error::InvalidBudgetPeriod(
                date!(2025 - 02 - 01),
                date!(2025 - 01 - 31)
            ))
        );
    }

    #[test]
    fn single_day_budget_is_valid() {
        let result =
            Budget::build("Food", 10.0, date!(2025 - 01 - 31), date!(2025 - 01 - 31)).validate();

        assert!(result.is_ok());
    }

    #[test]
    fn contains_is_inclusive() {
        let builder = Budget::build("Food", 10.0, date!(2025 - 01 - 01), date!(2025 - 01 - 31));
        let budget = Budget {
            id: 1,
            user_id: crate::UserID::new(1),
            category: builder.category,
            amount: builder.amount,
            start_date: builder.start_date,
            end_date: builder.end_date,
        };

        assert!(budget.contains(date!(2025 - 01 - 01)));
        assert!(budget.contains(date!(2025 - 01 - 31)));
        assert!(!budget.contains(date!(2025 - 02 - 01)));
        assert!(!budget.contains(date!(2024 - 12 - 31)));
    }
}
