//! How far along each goal is and what it will take to finish on time.

use std::{collections::HashMap, fmt::Display};

use time::Date;

use crate::{
    calendar::{add_months, whole_months_between},
    database_id::GoalId,
    goal::{Goal, SavingsFrequency},
};

/// The time until a goal's target date in the largest whole unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeLeft {
    Months(i64),
    Weeks(i64),
    /// Zero when the target date is today or has passed.
    Days(i64),
}

impl TimeLeft {
    pub fn between(today: Date, target_date: Date) -> Self {
        let days = (target_date - today).whole_days();
        let months = whole_months_between(today, target_date);

        if months >= 1 {
            TimeLeft::Months(months)
        } else if days >= 7 {
            TimeLeft::Weeks(days / 7)
        } else {
            TimeLeft::Days(days.max(0))
        }
    }
}

impl Display for TimeLeft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (count, unit) = match *self {
            TimeLeft::Days(0) => return f.write_str("Due now"),
            TimeLeft::Months(count) => (count, "month"),
            TimeLeft::Weeks(count) => (count, "week"),
            TimeLeft::Days(count) => (count, "day"),
        };
        let plural = if count == 1 { "" } else { "s" };

        write!(f, "{count} {unit}{plural} left")
    }
}

/// The number of saving periods from `today` until `target_date`, rounded up
/// and never less than one.
pub fn periods_left(today: Date, target_date: Date, frequency: SavingsFrequency) -> i64 {
    let days = (target_date - today).whole_days();
    if days <= 0 {
        return 1;
    }

    let periods = match frequency {
        SavingsFrequency::Weekly => (days + 6) / 7,
        SavingsFrequency::BiWeekly => (days + 13) / 14,
        SavingsFrequency::Monthly => {
            let months = whole_months_between(today, target_date);
            let partial_month = add_months(today, months as i32)
                .is_some_and(|date| date < target_date);

            months + i64::from(partial_month)
        }
    };

    periods.max(1)
}

/// A goal together with everything saved towards it.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalProgress {
    pub goal: Goal,
    /// The goal's start amount plus its savings.
    pub saved: f64,
}

impl GoalProgress {
    pub fn new(goal: Goal, contributions: f64) -> Self {
        Self {
            saved: goal.start_amount + contributions,
            goal,
        }
    }

    /// The fraction of the target saved, clamped to [0, 1].
    pub fn progress(&self) -> f64 {
        if self.goal.target_amount > 0.0 {
            (self.saved / self.goal.target_amount).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// How much is still needed, never negative.
    pub fn remaining(&self) -> f64 {
        (self.goal.target_amount - self.saved).max(0.0)
    }

    pub fn is_reached(&self) -> bool {
        self.saved >= self.goal.target_amount
    }

    pub fn time_left(&self, today: Date) -> Option<TimeLeft> {
        self.goal
            .target_date
            .map(|target_date| TimeLeft::between(today, target_date))
    }

    /// The amount to put aside each period to reach the target on time.
    ///
    /// Returns `None` for goals without a target date or that are already reached.
    pub fn amount_per_period(&self, today: Date) -> Option<f64> {
        let target_date = self.goal.target_date?;
        if self.is_reached() {
            return None;
        }

        let periods = periods_left(today, target_date, self.frequency());

        Some(self.remaining() / periods as f64)
    }

    /// The goal's saving frequency, weekly when the user has not picked one.
    pub fn frequency(&self) -> SavingsFrequency {
        self.goal.frequency.unwrap_or_default()
    }
}

/// Pair each goal with the sum of its savings from `totals`.
pub fn goal_progress(goals: Vec<Goal>, totals: &HashMap<GoalId, f64>) -> Vec<GoalProgress> {
    goals
        .into_iter()
        .map(|goal| {
            let contributions = totals.get(&goal.id).copied().unwrap_or(0.0);
            GoalProgress::new(goal, contributions)
        })
        .collect()
}

/// Totals across all of a user's goals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalsSummary {
    pub total_saved: f64,
    pub total_target: f64,
    pub active_goals: usize,
}

impl GoalsSummary {
    pub fn new(goals: &[GoalProgress]) -> Self {
        Self {
            total_saved: goals.iter().map(|item| item.saved).sum(),
            total_target: goals.iter().map(|item| item.goal.target_amount).sum(),
            active_goals: goals.len(),
        }
    }
}

#[cfg(test)]
mod goal_progress_tests {
    use std::collections::HashMap;

    use time::macros::date;

    use crate::{
        UserID,
        goal::{Goal, SavingsFrequency},
    };

    use super::{GoalProgress, GoalsSummary, TimeLeft, goal_progress, periods_left};

    fn goal(id: i64, target_amount: f64, start_amount: f64) -> Goal {
        Goal {
            id,
            user_id: UserID::new(1),
            name: format!("Goal {id}"),
            target_amount,
            start_amount,
            target_date: None,
            frequency: None,
        }
    }

    #[test]
    fn time_left_uses_largest_whole_unit() {
        let today = date!(2025 - 01 - 15);

        assert_eq!(TimeLeft::between(today, date!(2025 - 04 - 20)), TimeLeft::Months(3));
        assert_eq!(TimeLeft::between(today, date!(2025 - 02 - 10)), TimeLeft::Weeks(3));
        assert_eq!(TimeLeft::between(today, date!(2025 - 01 - 20)), TimeLeft::Days(5));
        assert_eq!(TimeLeft::between(today, date!(2025 - 01 - 01)), TimeLeft::Days(0));
    }

    #[test]
    fn time_left_display() {
        assert_eq!(TimeLeft::Months(1).to_string(), "1 month left");
        assert_eq!(TimeLeft::Weeks(2).to_string(), "2 weeks left");
        assert_eq!(TimeLeft::Days(0).to_string(), "Due now");
    }

    #[test]
    fn periods_left_rounds_up() {
        let today = date!(2025 - 01 - 01);
        let target = date!(2025 - 02 - 05);

        assert_eq!(periods_left(today, target, SavingsFrequency::Weekly), 5);
        assert_eq!(periods_left(today, target, SavingsFrequency::BiWeekly), 3);
        assert_eq!(periods_left(today, target, SavingsFrequency::Monthly), 2);
        assert_eq!(periods_left(today, today, SavingsFrequency::Monthly), 1);
    }

    #[test]
    fn saved_includes_start_amount_and_contributions() {
        let progress = GoalProgress::new(goal(1, 1000.0, 100.0), 150.0);

        assert_eq!(progress.saved, 250.0);
        assert_eq!(progress.progress(), 0.25);
        assert_eq!(progress.remaining(), 750.0);
    }

    #[test]
    fn progress_is_clamped() {
        let progress = GoalProgress::new(goal(1, 100.0, 80.0), 50.0);

        assert_eq!(progress.progress(), 1.0);
        assert_eq!(progress.remaining(), 0.0);
        assert!(progress.is_reached());
        assert_eq!(progress.amount_per_period(date!(2025 - 01 - 01)), None);
    }

    #[test]
    fn amount_per_period_defaults_to_weekly() {
        let mut holiday = goal(1, 1000.0, 0.0);
        holiday.target_date = Some(date!(2025 - 01 - 29));
        let progress = GoalProgress::new(holiday, 200.0);

        assert_eq!(progress.amount_per_period(date!(2025 - 01 - 01)), Some(200.0));
    }

    #[test]
    fn summary_totals_all_goals() {
        let totals = HashMap::from([(1, 40.0)]);
        let progress = goal_progress(vec![goal(1, 100.0, 10.0), goal(2, 300.0, 20.0)], &totals);

        let summary = GoalsSummary::new(&progress);

        assert_eq!(summary.total_saved, 70.0);
        assert_eq!(summary.total_target, 400.0);
        assert_eq!(summary.active_goals, 2);
    }
}
