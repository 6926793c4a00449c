//! Calendar arithmetic that `time` leaves to the caller: stepping by whole
//! months and years.

use time::{Date, Month};

/// The number of days in `month` of `year`.
pub fn days_in_month(year: i32, month: Month) -> u8 {
    match month {
        Month::April | Month::June | Month::September | Month::November => 30,
        Month::February if is_leap_year(year) => 29,
        Month::February => 28,
        _ => 31,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

/// Move `date` by `months` calendar months, which may be negative.
///
/// The day is clamped to the last day of the resulting month, so stepping one
/// month from 31 January lands on 28 or 29 February.
///
/// Returns `None` if the result falls outside the range `time` can represent.
pub fn add_months(date: Date, months: i32) -> Option<Date> {
    let month_index = date.year() * 12 + (u8::from(date.month()) as i32 - 1) + months;
    let year = month_index.div_euclid(12);
    let month = Month::try_from((month_index.rem_euclid(12) + 1) as u8).ok()?;
    let day = date.day().min(days_in_month(year, month));

    Date::from_calendar_date(year, month, day).ok()
}

/// The first day of the month `date` falls in.
pub fn start_of_month(date: Date) -> Date {
    date.replace_day(1).unwrap_or(date)
}

/// The number of whole months from `from` until `to`, or zero if `to` is not
/// after `from`.
pub fn whole_months_between(from: Date, to: Date) -> i64 {
    if to <= from {
        return 0;
    }

    let mut months = (to.year() - from.year()) as i64 * 12 + u8::from(to.month()) as i64
        - u8::from(from.month()) as i64;

    if to.day() < from.day() {
        months -= 1;
    }

    months.max(0)
}
