//! Filter state transitions
//!
//! Every method takes `&self` and the current local date, and returns either a
//! replacement configuration or the reason the selection was refused. A refused
//! selection never produces a partially updated value.

use chrono::{Datelike, NaiveDate};
use std::collections::BTreeSet;

use super::{
    ChartType, DateRange, FilterConfiguration, MonthSelection, Segment, TimeRange,
    TimeRangeMode, Transition, YearSelection,
};
use crate::dates::{
    clamp_to_today_if_current, end_of_week, first_day_of_month, first_day_of_year,
    last_day_of_month, last_day_of_year, months_before, start_of_week,
};
use crate::error::{FilterError, Notice};

/// How far back a fresh custom range reaches
pub const CUSTOM_LOOKBACK_MONTHS: u32 = 3;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// `[today - 3 months, today]`
pub fn default_custom_range(today: NaiveDate) -> DateRange {
    DateRange::new(months_before(today, CUSTOM_LOOKBACK_MONTHS), today)
}

/// Window for one month: the whole weeks around it in weekly mode, the month itself
/// (ending today when still in progress) otherwise.
fn month_window(weekly: bool, year: i32, month: u32, today: NaiveDate) -> Option<DateRange> {
    let first = first_day_of_month(year, month)?;
    let last = last_day_of_month(year, month)?;
    if weekly {
        Some(DateRange::new(start_of_week(first), end_of_week(last)))
    } else {
        Some(DateRange::new(
            first,
            clamp_to_today_if_current(last, year, month, today),
        ))
    }
}

/// Window spanning every selected year, ending today when the current year is included
pub(crate) fn years_window(years: &BTreeSet<i32>, today: NaiveDate) -> Option<DateRange> {
    let min = *years.first()?;
    let max = *years.last()?;
    let from = first_day_of_year(min)?;
    let to = if years.contains(&today.year()) {
        today
    } else {
        last_day_of_year(max)?
    };
    Some(DateRange::new(from, to))
}

fn check_year(year: i32, today: NaiveDate) -> Result<(), FilterError> {
    if year > today.year() {
        return Err(FilterError::FutureYear { year });
    }
    if first_day_of_year(year).is_none() {
        return Err(FilterError::InvalidYear { year });
    }
    Ok(())
}

fn month_selection(
    weekly: bool,
    year: i32,
    month: u32,
    today: NaiveDate,
) -> Result<TimeRange, FilterError> {
    let range =
        month_window(weekly, year, month, today).ok_or(FilterError::InvalidMonth { month })?;
    let selection = MonthSelection { month, year, range };
    Ok(if weekly {
        TimeRange::Weekly(selection)
    } else {
        TimeRange::Daily(selection)
    })
}

fn year_selection(years: BTreeSet<i32>, today: NaiveDate) -> Result<TimeRange, FilterError> {
    let Some(range) = years_window(&years, today) else {
        let year = years.first().copied().unwrap_or_else(|| today.year());
        return Err(FilterError::InvalidYear { year });
    };
    Ok(TimeRange::Monthly(YearSelection { years, range }))
}

impl FilterConfiguration {
    fn with_time_range(&self, time_range: TimeRange) -> FilterConfiguration {
        FilterConfiguration {
            time_range,
            ..self.clone()
        }
    }

    fn mismatch(&self, operation: &'static str) -> FilterError {
        FilterError::ModeMismatch {
            current: self.mode(),
            operation,
        }
    }

    /// Switch mode, resetting the selection to the current period
    pub fn set_time_range_mode(
        &self,
        mode: TimeRangeMode,
        today: NaiveDate,
    ) -> Result<Transition, FilterError> {
        let time_range = match mode {
            TimeRangeMode::Daily => month_selection(false, today.year(), today.month0(), today)?,
            TimeRangeMode::Weekly => month_selection(true, today.year(), today.month0(), today)?,
            TimeRangeMode::Monthly => year_selection(BTreeSet::from([today.year()]), today)?,
            TimeRangeMode::Custom => match &self.time_range {
                TimeRange::Custom(range) => TimeRange::Custom(*range),
                other => {
                    let previous = other.date_range();
                    let reusable = previous.is_complete() && previous.to <= Some(today);
                    TimeRange::Custom(if reusable {
                        previous
                    } else {
                        default_custom_range(today)
                    })
                }
            },
        };

        Ok(Transition::to(self.with_time_range(time_range)).closing_picker())
    }

    /// Pick a month (0-based) within the selected year
    pub fn select_month(&self, month: u32, today: NaiveDate) -> Result<Transition, FilterError> {
        let (weekly, year) = match &self.time_range {
            TimeRange::Daily(sel) => (false, sel.year),
            TimeRange::Weekly(sel) => (true, sel.year),
            _ => return Err(self.mismatch("select_month")),
        };

        if month > 11 {
            return Err(FilterError::InvalidMonth { month });
        }
        check_year(year, today)?;
        if year == today.year() && month > today.month0() {
            return Err(FilterError::FutureMonth { year, month });
        }

        let time_range = month_selection(weekly, year, month, today)?;
        Ok(Transition::to(self.with_time_range(time_range)))
    }

    /// Pick a year.
    ///
    /// Daily/weekly keep the selected month when it is still in the past under the new
    /// year and fall back to the current month (with an advisory notice) otherwise.
    /// Monthly toggles the year like [`toggle_year`](Self::toggle_year).
    pub fn select_year(&self, year: i32, today: NaiveDate) -> Result<Transition, FilterError> {
        let (weekly, month) = match &self.time_range {
            TimeRange::Daily(sel) => (false, sel.month),
            TimeRange::Weekly(sel) => (true, sel.month),
            TimeRange::Monthly(_) => return self.toggle_year(year, today),
            TimeRange::Custom(_) => return Err(self.mismatch("select_year")),
        };

        check_year(year, today)?;

        let mut notice = None;
        let mut month = month;
        if year == today.year() && month > today.month0() {
            month = today.month0();
            notice = Some(Notice::advisory(format!(
                "Selected month is in the future, switched to {}",
                MONTH_NAMES[month as usize]
            )));
        }

        let time_range = month_selection(weekly, year, month, today)?;
        Ok(Transition::to(self.with_time_range(time_range)).with_notice(notice))
    }

    /// Add or remove a year from the monthly comparison. The last remaining year stays.
    pub fn toggle_year(&self, year: i32, today: NaiveDate) -> Result<Transition, FilterError> {
        let TimeRange::Monthly(sel) = &self.time_range else {
            return Err(self.mismatch("toggle_year"));
        };

        let mut years = sel.years.clone();
        if years.contains(&year) {
            if years.len() == 1 {
                return Ok(Transition::to(self.clone()));
            }
            years.remove(&year);
        } else {
            check_year(year, today)?;
            years.insert(year);
        }

        let time_range = year_selection(years, today)?;
        Ok(Transition::to(self.with_time_range(time_range)))
    }

    /// Click-driven two point range builder (custom mode).
    ///
    /// First click sets the start, second click the end (swapping when it lands
    /// before the start). A third click shifts the window: the previous end becomes
    /// the start and the clicked day the new end.
    pub fn select_date(
        &self,
        clicked: NaiveDate,
        today: NaiveDate,
    ) -> Result<Transition, FilterError> {
        let TimeRange::Custom(range) = &self.time_range else {
            return Err(self.mismatch("select_date"));
        };
        if clicked > today {
            return Err(FilterError::FutureDate { date: clicked });
        }

        let next = match (range.from, range.to) {
            (None, _) => DateRange {
                from: Some(clicked),
                to: None,
            },
            (Some(from), None) if clicked < from => DateRange::new(clicked, from),
            (Some(from), None) => DateRange::new(from, clicked),
            // Shifted window keeps from <= to when the click lands before the old end
            (Some(_), Some(to)) if clicked < to => DateRange::new(clicked, to),
            (Some(_), Some(to)) => DateRange::new(to, clicked),
        };

        Ok(Transition::to(self.with_time_range(TimeRange::Custom(next))))
    }

    /// Drop both ends so the next click starts a new custom range
    pub fn clear_range(&self) -> Result<Transition, FilterError> {
        if self.mode() != TimeRangeMode::Custom {
            return Err(self.mismatch("clear_range"));
        }
        Ok(Transition::to(
            self.with_time_range(TimeRange::Custom(DateRange::empty())),
        ))
    }

    /// Back to a custom `[today - 3 months, today]` window
    pub fn reset_range(&self, today: NaiveDate) -> Result<Transition, FilterError> {
        Ok(Transition::to(
            self.with_time_range(TimeRange::Custom(default_custom_range(today))),
        ))
    }

    /// Confirm the picked range and close the picker
    pub fn apply_pending_range(&self) -> Result<Transition, FilterError> {
        if !self.date_range().is_complete() {
            return Err(FilterError::IncompleteRange);
        }
        Ok(Transition::to(self.clone()).closing_picker())
    }

    pub fn set_chart_type(&self, chart_type: ChartType) -> Transition {
        Transition::to(FilterConfiguration {
            chart_type,
            ..self.clone()
        })
    }

    pub fn set_segment(&self, segment: Segment) -> Transition {
        Transition::to(FilterConfiguration {
            segment,
            ..self.clone()
        })
    }
}
