//! Chart filter configuration
//!
//! A [`FilterConfiguration`] is what a chart widget queries with: chart type, data
//! segment and a time range. It is an immutable value; the transition methods in
//! [`transitions`] return a new configuration (or a [`FilterError`](crate::error::FilterError))
//! and never touch `self`.
//!
//! The time range is a sum type over the mode so a month selection cannot be read while
//! the widget is in monthly mode and vice versa.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::Notice;
use crate::preferences::ChartPreferences;

mod restore;
pub mod transitions;


pub use transitions::CUSTOM_LOOKBACK_MONTHS;

/// Chart rendering type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    #[default]
    Bar,
    Pie,
    Line,
}

impl ChartType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::Pie => "pie",
            ChartType::Line => "line",
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bar" => Ok(ChartType::Bar),
            "pie" => Ok(ChartType::Pie),
            "line" => Ok(ChartType::Line),
            other => Err(format!("unknown chart type '{other}' (expected bar, pie or line)")),
        }
    }
}

/// Granularity the user picked the time range with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRangeMode {
    Daily,
    Weekly,
    #[default]
    Monthly,
    Custom,
}

impl TimeRangeMode {
    pub const ALL: [TimeRangeMode; 4] = [
        TimeRangeMode::Daily,
        TimeRangeMode::Weekly,
        TimeRangeMode::Monthly,
        TimeRangeMode::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRangeMode::Daily => "daily",
            TimeRangeMode::Weekly => "weekly",
            TimeRangeMode::Monthly => "monthly",
            TimeRangeMode::Custom => "custom",
        }
    }
}

impl fmt::Display for TimeRangeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRangeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(TimeRangeMode::Daily),
            "weekly" => Ok(TimeRangeMode::Weekly),
            "monthly" => Ok(TimeRangeMode::Monthly),
            "custom" => Ok(TimeRangeMode::Custom),
            other => Err(format!(
                "unknown time range mode '{other}' (expected daily, weekly, monthly or custom)"
            )),
        }
    }
}

/// Resolved query window, inclusive on both ends.
///
/// Either end may be unset while a custom range is being picked. Once both are set,
/// `from <= to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_complete(&self) -> bool {
        self.from.is_some() && self.to.is_some()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        match (self.from, self.to) {
            (Some(from), Some(to)) => from <= date && date <= to,
            _ => false,
        }
    }

    /// Number of days covered, both ends included
    pub fn num_days(&self) -> Option<i64> {
        Some((self.to? - self.from?).num_days() + 1)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fmt_end = |d: Option<NaiveDate>| {
            d.map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "…".to_string())
        };
        write!(f, "{} → {}", fmt_end(self.from), fmt_end(self.to))
    }
}

/// Data subset discriminators, independent of the time range
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Segment {
    pub gender: Option<String>,
    pub conversion_type: Option<String>,
}

/// Month + year picked in daily or weekly mode
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MonthSelection {
    month: u32,
    year: i32,
    range: DateRange,
}

impl MonthSelection {
    /// 0-based month index
    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn range(&self) -> DateRange {
        self.range
    }
}

/// Years compared side by side in monthly mode. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct YearSelection {
    years: BTreeSet<i32>,
    range: DateRange,
}

impl YearSelection {
    /// Selected years, ascending
    pub fn years(&self) -> &BTreeSet<i32> {
        &self.years
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn is_multi_year(&self) -> bool {
        self.years.len() > 1
    }
}

/// Time range with its mode-specific payload
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "mode", content = "selection", rename_all = "snake_case")]
pub enum TimeRange {
    Daily(MonthSelection),
    Weekly(MonthSelection),
    Monthly(YearSelection),
    Custom(DateRange),
}

impl TimeRange {
    pub fn mode(&self) -> TimeRangeMode {
        match self {
            TimeRange::Daily(_) => TimeRangeMode::Daily,
            TimeRange::Weekly(_) => TimeRangeMode::Weekly,
            TimeRange::Monthly(_) => TimeRangeMode::Monthly,
            TimeRange::Custom(_) => TimeRangeMode::Custom,
        }
    }

    pub fn date_range(&self) -> DateRange {
        match self {
            TimeRange::Daily(sel) | TimeRange::Weekly(sel) => sel.range,
            TimeRange::Monthly(sel) => sel.range,
            TimeRange::Custom(range) => *range,
        }
    }

    pub fn month_selection(&self) -> Option<&MonthSelection> {
        match self {
            TimeRange::Daily(sel) | TimeRange::Weekly(sel) => Some(sel),
            _ => None,
        }
    }

    pub fn year_selection(&self) -> Option<&YearSelection> {
        match self {
            TimeRange::Monthly(sel) => Some(sel),
            _ => None,
        }
    }
}

/// Everything a chart widget needs to query its data.
///
/// Only transitions build one. Saved JSON comes back through
/// [`FilterConfiguration::from_json`], which replays it through the same checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FilterConfiguration {
    chart_type: ChartType,
    segment: Segment,
    time_range: TimeRange,
}

impl FilterConfiguration {
    /// Mount-time default: bar chart, monthly mode on the current year
    pub fn new(today: NaiveDate) -> Self {
        let years = BTreeSet::from([today.year()]);
        let range = transitions::years_window(&years, today)
            .unwrap_or_else(|| DateRange::new(today, today));
        Self {
            chart_type: ChartType::default(),
            segment: Segment::default(),
            time_range: TimeRange::Monthly(YearSelection { years, range }),
        }
    }

    /// Mount-time configuration honouring saved preferences
    pub fn initial(today: NaiveDate, prefs: &ChartPreferences) -> Self {
        let base = Self::new(today).set_chart_type(prefs.default_chart_type).config;
        if prefs.default_mode == TimeRangeMode::Monthly {
            return base;
        }
        match base.set_time_range_mode(prefs.default_mode, today) {
            Ok(transition) => transition.config,
            Err(e) => {
                tracing::warn!("Ignoring default mode {}: {}", prefs.default_mode, e);
                base
            }
        }
    }

    pub fn chart_type(&self) -> ChartType {
        self.chart_type
    }

    pub fn segment(&self) -> &Segment {
        &self.segment
    }

    pub fn time_range(&self) -> &TimeRange {
        &self.time_range
    }

    pub fn mode(&self) -> TimeRangeMode {
        self.time_range.mode()
    }

    pub fn date_range(&self) -> DateRange {
        self.time_range.date_range()
    }

    /// 0-based month, daily/weekly only
    pub fn selected_month(&self) -> Option<u32> {
        self.time_range.month_selection().map(MonthSelection::month)
    }

    /// Daily/weekly only
    pub fn selected_year(&self) -> Option<i32> {
        self.time_range.month_selection().map(MonthSelection::year)
    }

    /// Monthly only, ascending
    pub fn selected_years(&self) -> Option<Vec<i32>> {
        self.time_range
            .year_selection()
            .map(|sel| sel.years.iter().copied().collect())
    }

    pub fn is_multi_year(&self) -> bool {
        self.time_range
            .year_selection()
            .is_some_and(YearSelection::is_multi_year)
    }
}

/// Outcome of an accepted transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Replacement configuration
    pub config: FilterConfiguration,
    /// Advisory message when the selection was corrected
    pub notice: Option<Notice>,
    /// The date picker should close
    pub close_picker: bool,
}

impl Transition {
    fn to(config: FilterConfiguration) -> Self {
        Self {
            config,
            notice: None,
            close_picker: false,
        }
    }

    fn with_notice(mut self, notice: Option<Notice>) -> Self {
        self.notice = notice;
        self
    }

    fn closing_picker(mut self) -> Self {
        self.close_picker = true;
        self
    }
}
