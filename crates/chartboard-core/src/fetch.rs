//! Data fetching contract for chart widgets
//!
//! A widget turns its configuration into a [`SeriesQuery`], hands it to a
//! [`SeriesSource`], and commits the answer only if the configuration that started the
//! fetch is still the current one. Responses are never ordered by arrival: a slow
//! response for an outdated configuration is dropped even if it lands last.

use chrono::NaiveDate;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::CoreError;
use crate::filters::{FilterConfiguration, TimeRange};
use crate::projection::ChartDataset;

/// Bucket size the API should aggregate with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Day,
    Week,
    Month,
}

/// Request sent to the analytics API
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub granularity: Granularity,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub years: Vec<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversion_type: Option<String>,
}

impl SeriesQuery {
    /// Query for a configuration; `None` while a custom range is half picked
    pub fn from_config(config: &FilterConfiguration) -> Option<Self> {
        let range = config.date_range();
        let (from, to) = (range.from?, range.to?);

        let granularity = match config.time_range() {
            TimeRange::Daily(_) | TimeRange::Custom(_) => Granularity::Day,
            TimeRange::Weekly(_) => Granularity::Week,
            TimeRange::Monthly(_) => Granularity::Month,
        };

        Some(Self {
            from,
            to,
            granularity,
            years: config.selected_years().unwrap_or_default(),
            month: config.selected_month(),
            year: config.selected_year(),
            gender: config.segment().gender.clone(),
            conversion_type: config.segment().conversion_type.clone(),
        })
    }
}

/// Anything that can answer a [`SeriesQuery`] (REST client, fixture file, ...)
pub trait SeriesSource {
    fn fetch(&self, query: &SeriesQuery) -> Result<ChartDataset, CoreError>;
}

/// Source backed by a JSON file holding an API response
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SeriesSource for JsonFileSource {
    /// Multi-year files are narrowed to the queried years
    fn fetch(&self, query: &SeriesQuery) -> Result<ChartDataset, CoreError> {
        let dataset = ChartDataset::load(&self.path)?;
        Ok(match dataset {
            ChartDataset::MultiYear(mut years) if !query.years.is_empty() => {
                years.retain(|year, _| query.years.contains(year));
                ChartDataset::MultiYear(years)
            }
            other => other,
        })
    }
}

/// Handle for an in-flight fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub config: FilterConfiguration,
    pub query: SeriesQuery,
}

/// Hands out fetch tickets and decides whether their results are still relevant
#[derive(Debug, Default)]
pub struct FetchTracker {
    next_generation: u64,
    committed_generation: Option<u64>,
}

impl FetchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fetch for `config`; `None` when there is nothing to query yet
    pub fn begin(&mut self, config: &FilterConfiguration) -> Option<FetchTicket> {
        let query = SeriesQuery::from_config(config)?;
        let generation = self.next_generation;
        self.next_generation += 1;
        Some(FetchTicket {
            generation,
            config: config.clone(),
            query,
        })
    }

    /// Whether results for `ticket` may replace what is displayed for `current`
    pub fn is_current(&self, ticket: &FetchTicket, current: &FilterConfiguration) -> bool {
        ticket.config == *current
    }

    /// Record a commit. Returns false (and records nothing) for stale tickets.
    pub fn commit(&mut self, ticket: &FetchTicket, current: &FilterConfiguration) -> bool {
        if !self.is_current(ticket, current) {
            tracing::warn!(
                "Dropping stale chart data (fetch #{}, configuration changed)",
                ticket.generation
            );
            return false;
        }
        self.committed_generation = Some(ticket.generation);
        true
    }

    pub fn committed_generation(&self) -> Option<u64> {
        self.committed_generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{Segment, TimeRangeMode};
    use serde_json::json;
    use std::io::Write;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_query_for_monthly_multi_year() {
        let today = d(2024, 6, 10);
        let config = FilterConfiguration::new(today)
            .toggle_year(2022, today)
            .unwrap()
            .config;
        let query = SeriesQuery::from_config(&config).unwrap();

        assert_eq!(query.granularity, Granularity::Month);
        assert_eq!(query.years, vec![2022, 2024]);
        assert_eq!(query.from, d(2022, 1, 1));
        assert_eq!(query.to, today);
        assert_eq!(query.month, None);
    }

    #[test]
    fn test_query_json_is_camel_case() {
        let today = d(2024, 3, 15);
        let config = FilterConfiguration::new(today)
            .set_time_range_mode(TimeRangeMode::Weekly, today)
            .unwrap()
            .config
            .set_segment(Segment {
                gender: None,
                conversion_type: Some("paid".to_string()),
            })
            .config;
        let json = serde_json::to_value(SeriesQuery::from_config(&config).unwrap()).unwrap();

        assert_eq!(
            json,
            json!({
                "from": "2024-02-26",
                "to": "2024-03-31",
                "granularity": "week",
                "month": 2,
                "year": 2024,
                "conversionType": "paid"
            })
        );
    }

    #[test]
    fn test_no_query_for_half_picked_range() {
        let today = d(2024, 6, 10);
        let config = FilterConfiguration::new(today)
            .set_time_range_mode(TimeRangeMode::Custom, today)
            .unwrap()
            .config
            .clear_range()
            .unwrap()
            .config
            .select_date(d(2024, 5, 1), today)
            .unwrap()
            .config;

        assert!(SeriesQuery::from_config(&config).is_none());
        assert!(FetchTracker::new().begin(&config).is_none());
    }

    #[test]
    fn test_stale_ticket_not_committed() {
        let today = d(2024, 6, 10);
        let first = FilterConfiguration::new(today);
        let second = first.toggle_year(2023, today).unwrap().config;

        let mut tracker = FetchTracker::new();
        let old = tracker.begin(&first).unwrap();
        let new = tracker.begin(&second).unwrap();
        assert!(new.generation > old.generation);

        // The newer fetch lands first, the outdated one after it
        assert!(tracker.commit(&new, &second));
        assert!(!tracker.commit(&old, &second));
        assert_eq!(tracker.committed_generation(), Some(new.generation));
    }

    #[test]
    fn test_ticket_relevant_again_when_config_returns() {
        let today = d(2024, 6, 10);
        let first = FilterConfiguration::new(today);
        let mut tracker = FetchTracker::new();
        let ticket = tracker.begin(&first).unwrap();

        let back_again = first
            .toggle_year(2023, today)
            .unwrap()
            .config
            .toggle_year(2023, today)
            .unwrap()
            .config;
        assert!(tracker.is_current(&ticket, &back_again));
    }

    #[test]
    fn test_json_file_source_narrows_years() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "{}",
            json!({
                "2022": [{"name": "Jan", "Users": 1}],
                "2023": [{"name": "Jan", "Users": 2}],
                "2024": [{"name": "Jan", "Users": 3}]
            })
        )
        .unwrap();

        let today = d(2024, 6, 10);
        let config = FilterConfiguration::new(today)
            .toggle_year(2022, today)
            .unwrap()
            .config;
        let query = SeriesQuery::from_config(&config).unwrap();
        let dataset = JsonFileSource::new(file.path()).fetch(&query).unwrap();

        match dataset {
            ChartDataset::MultiYear(years) => {
                assert_eq!(years.keys().copied().collect::<Vec<_>>(), vec![2022, 2024]);
            }
            other => panic!("expected multi-year dataset, got {other:?}"),
        }
    }

    #[test]
    fn test_json_file_source_missing_file() {
        let source = JsonFileSource::new("/nonexistent/chartboard/data.json");
        let query = SeriesQuery::from_config(&FilterConfiguration::new(d(2024, 6, 10))).unwrap();
        assert!(matches!(source.fetch(&query), Err(CoreError::FileRead { .. })));
    }
}
