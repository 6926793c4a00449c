//! Grouping expenses into the time buckets shown on the reports page.

use std::collections::BTreeMap;

use serde::Deserialize;
use time::{Date, Duration, Month};

use crate::{
    calendar::add_months,
    transaction::{Transaction, TransactionType, category_totals},
};

/// How finely the reports page splits up spending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    /// The last 7 days.
    #[default]
    Daily,
    /// The current week and the 3 before it.
    Weekly,
    /// The current month and the 5 before it.
    Monthly,
}

impl ReportPeriod {
    pub const ALL: [ReportPeriod; 3] = [
        ReportPeriod::Daily,
        ReportPeriod::Weekly,
        ReportPeriod::Monthly,
    ];

    pub fn query_value(&self) -> &'static str {
        match self {
            ReportPeriod::Daily => "daily",
            ReportPeriod::Weekly => "weekly",
            ReportPeriod::Monthly => "monthly",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReportPeriod::Daily => "Daily",
            ReportPeriod::Weekly => "Weekly",
            ReportPeriod::Monthly => "Monthly",
        }
    }

    fn bucket_count(&self) -> usize {
        match self {
            ReportPeriod::Daily => 7,
            ReportPeriod::Weekly => 4,
            ReportPeriod::Monthly => 6,
        }
    }
}

/// Identifies which bucket a date falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BucketKey {
    Day(Date),
    /// Keyed by the Sunday the week starts on, so a week spanning the new
    /// year is a single bucket.
    Week(Date),
    Month { year: i32, month: Month },
}

impl BucketKey {
    fn of(period: ReportPeriod, date: Date) -> Self {
        match period {
            ReportPeriod::Daily => BucketKey::Day(date),
            ReportPeriod::Weekly => BucketKey::Week(start_of_week(date)),
            ReportPeriod::Monthly => BucketKey::Month {
                year: date.year(),
                month: date.month(),
            },
        }
    }

    fn label(&self) -> String {
        match self {
            BucketKey::Day(date) => abbreviate(&date.weekday().to_string()),
            BucketKey::Week(start) => format!("W{}", week_number(*start)),
            BucketKey::Month { month, .. } => abbreviate(&month.to_string()),
        }
    }
}

fn abbreviate(name: &str) -> String {
    name.chars().take(3).collect()
}

/// The Sunday on or before `date`.
fn start_of_week(date: Date) -> Date {
    let days_since_sunday = date.weekday().number_days_from_sunday();

    date.checked_sub(Duration::days(days_since_sunday as i64)).unwrap_or(date)
}

/// The week of the year with weeks starting on Sunday, where the week
/// containing 1 January is week 1.
pub fn week_number(date: Date) -> u16 {
    let offset = date
        .replace_ordinal(1)
        .map(|jan_1| jan_1.weekday().number_days_from_sunday())
        .unwrap_or(0);

    (date.ordinal() + u16::from(offset)).div_ceil(7)
}

/// The dates, one per bucket, that the buckets for `period` ending at `today`
/// are built from, oldest first.
fn bucket_dates(period: ReportPeriod, today: Date) -> Vec<Date> {
    let count = period.bucket_count();

    (0..count)
        .rev()
        .filter_map(|steps_back| match period {
            ReportPeriod::Daily => today.checked_sub(Duration::days(steps_back as i64)),
            ReportPeriod::Weekly => today.checked_sub(Duration::weeks(steps_back as i64)),
            ReportPeriod::Monthly => add_months(today, -(steps_back as i32)),
        })
        .collect()
}

/// Expense totals per bucket and per category for one reporting period.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseReport {
    /// The bucket labels, oldest first, e.g. "Mon" or "W12" or "Mar".
    pub labels: Vec<String>,
    /// The expense total for each bucket, in the same order as `labels`.
    pub totals: Vec<f64>,
    /// Expense totals per normalized category across all buckets.
    pub categories: BTreeMap<String, f64>,
}

impl ExpenseReport {
    /// Total the expenses in `transactions` into the buckets for `period`
    /// ending at `today`.
    ///
    /// Each expense lands in at most one bucket. Expenses outside every bucket
    /// are left out of both the bucket and category totals.
    pub fn new(period: ReportPeriod, today: Date, transactions: &[Transaction]) -> Self {
        let keys: Vec<BucketKey> = bucket_dates(period, today)
            .into_iter()
            .map(|date| BucketKey::of(period, date))
            .collect();
        let mut totals = vec![0.0; keys.len()];
        let mut in_window = Vec::new();

        for transaction in transactions
            .iter()
            .filter(|transaction| transaction.type_ == TransactionType::Expense)
        {
            let key = BucketKey::of(period, transaction.date);

            if let Some(index) = keys.iter().position(|bucket| *bucket == key) {
                totals[index] += transaction.amount;
                in_window.push(transaction.clone());
            }
        }

        Self {
            labels: keys.iter().map(BucketKey::label).collect(),
            totals,
            categories: category_totals(&in_window),
        }
    }

    pub fn total(&self) -> f64 {
        self.totals.iter().sum()
    }
}

#[cfg(test)]
mod expense_report_tests {
    use time::{Date, macros::date};

    use crate::{
        UserID,
        transaction::{Transaction, TransactionType},
    };

    use super::{ExpenseReport, ReportPeriod, week_number};

    fn expense(amount: f64, date: Date, category: &str) -> Transaction {
        Transaction {
            id: 1,
            user_id: UserID::new(1),
            type_: TransactionType::Expense,
            amount,
            date,
            description: String::new(),
            category: category.to_owned(),
            payment_method: "Cash".to_owned(),
            card_id: None,
            is_recurring: false,
            recurrence_frequency: None,
        }
    }

    #[test]
    fn week_number_starts_on_sunday() {
        // 1 January 2025 is a Wednesday, so the first Sunday starts week 2.
        assert_eq!(week_number(date!(2025 - 01 - 01)), 1);
        assert_eq!(week_number(date!(2025 - 01 - 04)), 1);
        assert_eq!(week_number(date!(2025 - 01 - 05)), 2);
        assert_eq!(week_number(date!(2025 - 12 - 31)), 53);
    }

    #[test]
    fn daily_buckets_cover_last_seven_days() {
        // 2025-06-15 is a Sunday.
        let today = date!(2025 - 06 - 15);
        let transactions = [
            expense(10.0, today, "Food"),
            expense(5.0, date!(2025 - 06 - 09), "food "),
            expense(99.0, date!(2025 - 06 - 08), "Food"),
        ];

        let report = ExpenseReport::new(ReportPeriod::Daily, today, &transactions);

        assert_eq!(report.labels, ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]);
        assert_eq!(report.totals, [5.0, 0.0, 0.0, 0.0, 0.0, 0.0, 10.0]);
        assert_eq!(report.categories.get("food"), Some(&15.0));
        assert_eq!(report.total(), 15.0);
    }

    #[test]
    fn weekly_buckets_match_week_start() {
        let today = date!(2025 - 03 - 12);
        let transactions = [
            expense(20.0, date!(2025 - 03 - 09), "Rent"),
            expense(30.0, date!(2025 - 02 - 17), "Rent"),
            expense(40.0, date!(2025 - 02 - 15), "Rent"),
        ];

        let report = ExpenseReport::new(ReportPeriod::Weekly, today, &transactions);

        assert_eq!(report.labels, ["W8", "W9", "W10", "W11"]);
        assert_eq!(report.totals, [30.0, 0.0, 0.0, 20.0]);
        assert_eq!(report.categories.get("rent"), Some(&50.0));
    }

    #[test]
    fn weekly_bucket_spans_new_year() {
        // 2024-12-29 is a Sunday, so 2024-12-30 and 2025-01-01 share a week.
        let today = date!(2025 - 01 - 08);
        let transactions = [expense(42.0, date!(2024 - 12 - 30), "Gifts")];

        let report = ExpenseReport::new(ReportPeriod::Weekly, today, &transactions);

        assert_eq!(report.labels, ["W51", "W52", "W53", "W2"]);
        assert_eq!(report.totals, [0.0, 0.0, 42.0, 0.0]);
        assert_eq!(report.total(), 42.0);
        assert_eq!(report.categories.get("gifts"), Some(&42.0));
    }

    #[test]
    fn monthly_buckets_cover_six_months() {
        let today = date!(2025 - 03 - 31);
        let transactions = [
            expense(10.0, date!(2024 - 10 - 01), "Travel"),
            expense(20.0, date!(2025 - 02 - 28), "Travel"),
            expense(30.0, date!(2024 - 09 - 30), "Travel"),
            expense(40.0, date!(2024 - 03 - 15), "Travel"),
        ];

        let report = ExpenseReport::new(ReportPeriod::Monthly, today, &transactions);

        assert_eq!(report.labels, ["Oct", "Nov", "Dec", "Jan", "Feb", "Mar"]);
        assert_eq!(report.totals, [10.0, 0.0, 0.0, 0.0, 20.0, 0.0]);
        assert_eq!(report.total(), 30.0);
    }

    #[test]
    fn income_is_ignored() {
        let today = date!(2025 - 06 - 15);
        let mut income = expense(100.0, today, "Salary");
        income.type_ = TransactionType::Income;

        let report = ExpenseReport::new(ReportPeriod::Daily, today, &[income]);

        assert_eq!(report.total(), 0.0);
        assert!(report.categories.is_empty());
    }
}
