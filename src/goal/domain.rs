//! The savings goal model and how often the user plans to save towards it.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    auth::UserID,
    database_id::{GoalId, SavingId},
};

/// How often the user plans to put money towards a goal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SavingsFrequency {
    #[default]
    Weekly,
    #[serde(rename = "Bi-Weekly")]
    BiWeekly,
    Monthly,
}

impl SavingsFrequency {
    pub const ALL: [SavingsFrequency; 3] = [
        SavingsFrequency::Weekly,
        SavingsFrequency::BiWeekly,
        SavingsFrequency::Monthly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SavingsFrequency::Weekly => "Weekly",
            SavingsFrequency::BiWeekly => "Bi-Weekly",
            SavingsFrequency::Monthly => "Monthly",
        }
    }

    /// The word used for one period, e.g. "$50/week needed".
    pub fn period_name(&self) -> &'static str {
        match self {
            SavingsFrequency::Weekly => "week",
            SavingsFrequency::BiWeekly => "fortnight",
            SavingsFrequency::Monthly => "month",
        }
    }
}

impl Display for SavingsFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SavingsFrequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SavingsFrequency::ALL
            .into_iter()
            .find(|frequency| frequency.as_str() == s)
            .ok_or_else(|| Error::InvalidOption(s.to_owned()))
    }
}

impl ToSql for SavingsFrequency {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for SavingsFrequency {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// An amount of money the user is saving up for.
#[derive(Debug, Clone, PartialEq)]
pub struct Goal {
    pub id: GoalId,
    pub user_id: UserID,
    pub name: String,
    pub target_amount: f64,
    /// Money already put aside before the goal was created.
    pub start_amount: f64,
    pub target_date: Option<Date>,
    pub frequency: Option<SavingsFrequency>,
}

impl Goal {
    /// Create a new goal.
    ///
    /// Shortcut for [GoalBuilder] for discoverability.
    pub fn build(name: &str, target_amount: f64) -> GoalBuilder {
        GoalBuilder {
            name: name.to_owned(),
            target_amount,
            start_amount: 0.0,
            target_date: None,
            frequency: None,
        }
    }
}

/// A builder for creating [Goal] instances. The start amount defaults to zero.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalBuilder {
    pub name: String,
    pub target_amount: f64,
    pub start_amount: f64,
    pub target_date: Option<Date>,
    pub frequency: Option<SavingsFrequency>,
}

impl GoalBuilder {
    pub fn start_amount(mut self, start_amount: f64) -> Self {
        self.start_amount = start_amount;
        self
    }

    pub fn target_date(mut self, target_date: Option<Date>) -> Self {
        self.target_date = target_date;
        self
    }

    pub fn frequency(mut self, frequency: Option<SavingsFrequency>) -> Self {
        self.frequency = frequency;
        self
    }

    /// Check the builder and return it with the name trimmed.
    ///
    /// # Errors
    /// Returns [Error::EmptyGoalName], [Error::NonPositiveAmount] for the
    /// target or [Error::NegativeStartAmount].
    pub(super) fn validate(mut self) -> Result<Self, Error> {
        self.name = self.name.trim().to_owned();
        if self.name.is_empty() {
            return Err(Error::EmptyGoalName);
        }

        if !(self.target_amount.is_finite() && self.target_amount > 0.0) {
            return Err(Error::NonPositiveAmount);
        }

        if !(self.start_amount.is_finite() && self.start_amount >= 0.0) {
            return Err(Error::NegativeStartAmount);
        }

        Ok(self)
    }
}

/// Form data for goal creation and editing.
#[derive(Debug, Clone, Deserialize)]
pub struct GoalForm {
    pub name: String,
    pub target_amount: f64,
    #[serde(default)]
    pub start_amount: Option<f64>,
    #[serde(default)]
    pub target_date: Option<Date>,
    #[serde(default)]
    pub frequency: Option<SavingsFrequency>,
}

impl From<GoalForm> for GoalBuilder {
    fn from(form: GoalForm) -> Self {
        Goal::build(&form.name, form.target_amount)
            .start_amount(form.start_amount.unwrap_or(0.0))
            .target_date(form.target_date)
            .frequency(form.frequency)
    }
}

impl From<&Goal> for GoalBuilder {
    fn from(goal: &Goal) -> Self {
        Goal::build(&goal.name, goal.target_amount)
            .start_amount(goal.start_amount)
            .target_date(goal.target_date)
            .frequency(goal.frequency)
    }
}

/// Money put towards a goal on a given day.
#[derive(Debug, Clone, PartialEq)]
pub struct Saving {
    pub id: SavingId,
    pub user_id: UserID,
    pub goal_id: GoalId,
    pub amount: f64,
    pub date: Date,
}

#[cfg(test)]
mod goal_domain_tests {
    use crate::Error;

    use super::{Goal, SavingsFrequency};

    #[test]
    fn validate_trims_name() {
        let builder = Goal::build(" Holiday ", 500.0).validate().unwrap();

        assert_eq!(builder.name, "Holiday");
        assert_eq!(builder.start_amount, 0.0);
    }

    #[test]
    fn validate_rejects_blank_name() {
        assert_eq!(Goal::build("  ", 500.0).validate(), Err(Error::EmptyGoalName));
    }

    #[test]
    fn validate_rejects_non_positive_target() {
        assert_eq!(Goal::build("Car", 0.0).validate(), Err(Error::NonPositiveAmount));
        assert_eq!(Goal::build("Car", -1.0).validate(), Err(Error::NonPositiveAmount));
    }

    #[test]
    fn validate_rejects_negative_start_amount() {
        assert_eq!(
            Goal::build("Car", 100.0).start_amount(-5.0).validate(),
            Err(Error::NegativeStartAmount)
        );
    }

    #[test]
    fn frequency_parses_display_names() {
        for frequency in SavingsFrequency::ALL {
            assert_eq!(frequency.to_string().parse(), Ok(frequency));
        }
        assert_eq!(
            "Fortnightly".parse::<SavingsFrequency>(),
            Err(Error::InvalidOption("Fortnightly".to_owned()))
        );
    }
}
