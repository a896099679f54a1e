//! Calendar boundary helpers
//!
//! Pure functions over [`NaiveDate`]. Weeks start on Monday, month indexes are 0-based
//! (January = 0) to match what the dashboard widgets send.

use chrono::{Datelike, Duration, Months, NaiveDate};

/// Monday of the week containing `date`
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Sunday of the week containing `date`
pub fn end_of_week(date: NaiveDate) -> NaiveDate {
    start_of_week(date) + Duration::days(6)
}

/// First day of a month, `None` for month indexes above 11 or unrepresentable years
pub fn first_day_of_month(year: i32, month_index: u32) -> Option<NaiveDate> {
    if month_index > 11 {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month_index + 1, 1)
}

/// Last day of a month, leap years included
pub fn last_day_of_month(year: i32, month_index: u32) -> Option<NaiveDate> {
    first_day_of_month(year, month_index)?
        .checked_add_months(Months::new(1))?
        .pred_opt()
}

pub fn first_day_of_year(year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 1, 1)
}

pub fn last_day_of_year(year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 12, 31)
}

/// Upper bound for a month window.
///
/// The month still in progress ends "today" instead of on its last calendar day, so a
/// range never points into the future. Any other month keeps `candidate_end`.
pub fn clamp_to_today_if_current(
    candidate_end: NaiveDate,
    year: i32,
    month_index: u32,
    today: NaiveDate,
) -> NaiveDate {
    if today.year() == year && today.month0() == month_index {
        today
    } else {
        candidate_end
    }
}

/// `date` moved back `months` calendar months (day clamped to the shorter month)
pub fn months_before(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}

/// 0-based month index of `date`
pub fn month_index(date: NaiveDate) -> u32 {
    date.month0()
}
