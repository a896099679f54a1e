//! Rebuilding a saved configuration
//!
//! The stored form carries only the user's picks. Ranges are recomputed and every
//! pick is replayed through the regular transitions, so a restored configuration
//! obeys the same rules as one built by clicking.

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use std::collections::BTreeSet;

use super::{ChartType, DateRange, FilterConfiguration, Segment, TimeRangeMode};
use crate::error::{CoreError, FilterError};

#[derive(Debug, Deserialize)]
struct StoredConfiguration {
    #[serde(default)]
    chart_type: ChartType,
    #[serde(default)]
    segment: Segment,
    time_range: StoredTimeRange,
}

/// Same tagging as [`super::TimeRange`]; a serialized `range` is ignored
#[derive(Debug, Deserialize)]
#[serde(tag = "mode", content = "selection", rename_all = "snake_case")]
enum StoredTimeRange {
    Daily(StoredMonth),
    Weekly(StoredMonth),
    Monthly(StoredYears),
    Custom(DateRange),
}

#[derive(Debug, Deserialize)]
struct StoredMonth {
    month: u32,
    year: i32,
}

#[derive(Debug, Deserialize)]
struct StoredYears {
    years: BTreeSet<i32>,
}

impl FilterConfiguration {
    /// Restore a configuration previously serialized to JSON.
    ///
    /// Fails on malformed JSON and on picks no transition would accept today: empty
    /// year sets, future selections, month indexes past 11, reversed custom ranges.
    pub fn from_json(value: &serde_json::Value, today: NaiveDate) -> Result<Self, CoreError> {
        let stored = StoredConfiguration::deserialize(value).map_err(|e| {
            CoreError::InvalidConfiguration {
                message: e.to_string(),
            }
        })?;
        Ok(replay(stored, today)?)
    }
}

fn replay(
    stored: StoredConfiguration,
    today: NaiveDate,
) -> Result<FilterConfiguration, FilterError> {
    let base = FilterConfiguration::new(today)
        .set_chart_type(stored.chart_type)
        .config
        .set_segment(stored.segment)
        .config;

    match stored.time_range {
        StoredTimeRange::Daily(pick) => replay_month(base, TimeRangeMode::Daily, pick, today),
        StoredTimeRange::Weekly(pick) => replay_month(base, TimeRangeMode::Weekly, pick, today),
        StoredTimeRange::Monthly(StoredYears { years }) => {
            if years.is_empty() {
                return Err(FilterError::NoYearsSelected);
            }
            let current = today.year();
            let mut config = base.set_time_range_mode(TimeRangeMode::Monthly, today)?.config;
            for &year in years.iter().filter(|&&y| y != current) {
                config = config.toggle_year(year, today)?.config;
            }
            if !years.contains(&current) {
                config = config.toggle_year(current, today)?.config;
            }
            Ok(config)
        }
        StoredTimeRange::Custom(range) => {
            match (range.from, range.to) {
                (Some(from), Some(to)) if from > to => {
                    return Err(FilterError::InvalidRange { range });
                }
                (None, Some(_)) => return Err(FilterError::InvalidRange { range }),
                _ => {}
            }
            let mut config = base
                .set_time_range_mode(TimeRangeMode::Custom, today)?
                .config
                .clear_range()?
                .config;
            for date in [range.from, range.to].into_iter().flatten() {
                config = config.select_date(date, today)?.config;
            }
            Ok(config)
        }
    }
}

fn replay_month(
    base: FilterConfiguration,
    mode: TimeRangeMode,
    pick: StoredMonth,
    today: NaiveDate,
) -> Result<FilterConfiguration, FilterError> {
    Ok(base
        .set_time_range_mode(mode, today)?
        .config
        .select_year(pick.year, today)?
        .config
        .select_month(pick.month, today)?
        .config)
}
