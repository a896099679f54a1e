//! Chart widget state
//!
//! [`ChartWidget`] is the owner the UI talks to. It keeps the current
//! [`FilterConfiguration`], the date picker view state, the last committed dataset and
//! the pie drill-down, and turns transition results into user-facing [`Notice`]s.

use chrono::{Datelike, Local, NaiveDate};

use crate::error::{CoreError, FilterError, Notice};
use crate::fetch::{FetchTicket, FetchTracker, SeriesSource};
use crate::filters::{ChartType, FilterConfiguration, Segment, TimeRangeMode, Transition};
use crate::preferences::ChartPreferences;
use crate::projection::{project, ChartDataset, ChartView, PieDrillDown};

/// Source of "today"
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Local calendar date
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Pinned date (tests, `--today`)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Date picker view state, not part of the query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerState {
    pub is_open: bool,
    /// First day of the month the calendar shows
    pub calendar_month: NaiveDate,
}

/// What happened to a completed fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    Stale,
    Failed,
}

pub struct ChartWidget<C: Clock = SystemClock> {
    clock: C,
    config: FilterConfiguration,
    picker: PickerState,
    dataset: Option<ChartDataset>,
    drill: PieDrillDown,
    fetches: FetchTracker,
    notices: Vec<Notice>,
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

impl ChartWidget<SystemClock> {
    pub fn new(prefs: &ChartPreferences) -> Self {
        Self::with_clock(SystemClock, prefs)
    }
}

impl<C: Clock> ChartWidget<C> {
    pub fn with_clock(clock: C, prefs: &ChartPreferences) -> Self {
        let config = FilterConfiguration::initial(clock.today(), prefs);
        Self::with_config(clock, config)
    }

    /// Mount with a configuration restored elsewhere (see [`FilterConfiguration::from_json`])
    pub fn with_config(clock: C, config: FilterConfiguration) -> Self {
        let today = clock.today();
        Self {
            config,
            picker: PickerState {
                is_open: false,
                calendar_month: month_start(today),
            },
            dataset: None,
            drill: PieDrillDown::new(),
            fetches: FetchTracker::new(),
            notices: Vec::new(),
            clock,
        }
    }

    pub fn config(&self) -> &FilterConfiguration {
        &self.config
    }

    pub fn picker(&self) -> &PickerState {
        &self.picker
    }

    pub fn dataset(&self) -> Option<&ChartDataset> {
        self.dataset.as_ref()
    }

    pub fn drill_down(&self) -> &PieDrillDown {
        &self.drill
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Drain queued notices for the toast layer
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn apply(
        &mut self,
        operation: &str,
        result: Result<Transition, FilterError>,
    ) -> Result<&FilterConfiguration, FilterError> {
        match result {
            Ok(transition) => {
                if transition.close_picker {
                    self.picker.is_open = false;
                }
                if let Some(notice) = transition.notice {
                    tracing::info!("{}: {}", operation, notice.message);
                    self.notices.push(notice);
                }
                if transition.config != self.config {
                    tracing::debug!(
                        "{}: {} {}",
                        operation,
                        transition.config.mode(),
                        transition.config.date_range()
                    );
                    self.config = transition.config;
                }
                Ok(&self.config)
            }
            Err(e) => {
                tracing::warn!("{} rejected: {}", operation, e);
                self.notices.push(Notice::from(&e));
                Err(e)
            }
        }
    }

    // ===================
    // Filter transitions
    // ===================

    pub fn set_time_range_mode(
        &mut self,
        mode: TimeRangeMode,
    ) -> Result<&FilterConfiguration, FilterError> {
        let result = self.config.set_time_range_mode(mode, self.today());
        self.apply("set_time_range_mode", result)
    }

    pub fn select_month(&mut self, month: u32) -> Result<&FilterConfiguration, FilterError> {
        let result = self.config.select_month(month, self.today());
        self.apply("select_month", result)
    }

    pub fn select_year(&mut self, year: i32) -> Result<&FilterConfiguration, FilterError> {
        let result = self.config.select_year(year, self.today());
        self.apply("select_year", result)
    }

    pub fn toggle_year(&mut self, year: i32) -> Result<&FilterConfiguration, FilterError> {
        let result = self.config.toggle_year(year, self.today());
        self.apply("toggle_year", result)
    }

    /// Calendar click. Days after today are disabled and never reach the range builder.
    pub fn click_date(&mut self, date: NaiveDate) -> Result<&FilterConfiguration, FilterError> {
        if self.is_date_disabled(date) {
            return self.apply("click_date", Err(FilterError::FutureDate { date }));
        }
        let result = self.config.select_date(date, self.today());
        self.apply("click_date", result)
    }

    pub fn clear_range(&mut self) -> Result<&FilterConfiguration, FilterError> {
        let result = self.config.clear_range();
        self.apply("clear_range", result)
    }

    pub fn reset_range(&mut self) -> Result<&FilterConfiguration, FilterError> {
        let result = self.config.reset_range(self.today());
        self.apply("reset_range", result)
    }

    pub fn apply_pending_range(&mut self) -> Result<&FilterConfiguration, FilterError> {
        let result = self.config.apply_pending_range();
        self.apply("apply_pending_range", result)
    }

    pub fn set_chart_type(&mut self, chart_type: ChartType) -> &FilterConfiguration {
        let transition = self.config.set_chart_type(chart_type);
        self.config = transition.config;
        &self.config
    }

    pub fn set_segment(&mut self, segment: Segment) -> &FilterConfiguration {
        let transition = self.config.set_segment(segment);
        self.config = transition.config;
        &self.config
    }

    // ===================
    // Date picker
    // ===================

    /// Whether the picker should grey out `date`
    pub fn is_date_disabled(&self, date: NaiveDate) -> bool {
        date > self.today()
    }

    /// Open the picker on the month of the range start (or the current month)
    pub fn open_picker(&mut self) {
        let anchor = self.config.date_range().from.unwrap_or_else(|| self.today());
        self.picker = PickerState {
            is_open: true,
            calendar_month: month_start(anchor),
        };
    }

    pub fn close_picker(&mut self) {
        self.picker.is_open = false;
    }

    pub fn show_calendar_month(&mut self, month: NaiveDate) {
        self.picker.calendar_month = month_start(month);
    }

    // ===================
    // Data
    // ===================

    /// Start fetching for the current configuration
    pub fn begin_fetch(&mut self) -> Option<FetchTicket> {
        self.fetches.begin(&self.config)
    }

    /// Hand back the result of a fetch. Outdated results are dropped, failures keep the
    /// previous dataset and queue a notice.
    pub fn complete_fetch(
        &mut self,
        ticket: &FetchTicket,
        result: Result<ChartDataset, CoreError>,
    ) -> FetchOutcome {
        if !self.fetches.is_current(ticket, &self.config) {
            tracing::warn!(
                "Dropping chart data from fetch #{}: filters changed while it was in flight",
                ticket.generation
            );
            return FetchOutcome::Stale;
        }
        match result {
            Ok(dataset) => {
                self.fetches.commit(ticket, &self.config);
                self.drill.reset();
                self.dataset = Some(dataset);
                FetchOutcome::Applied
            }
            Err(e) => {
                tracing::warn!("Chart data fetch #{} failed: {}", ticket.generation, e);
                self.notices.push(Notice::blocking(format!("Failed to load chart data: {e}")));
                FetchOutcome::Failed
            }
        }
    }

    /// Synchronous fetch through `source`
    pub fn refresh(&mut self, source: &impl SeriesSource) -> Option<FetchOutcome> {
        let ticket = self.begin_fetch()?;
        let result = source.fetch(&ticket.query);
        Some(self.complete_fetch(&ticket, result))
    }

    // ===================
    // Rendering
    // ===================

    /// Expand a pie slice into its years
    pub fn click_slice(&mut self, category: &str) -> bool {
        match &self.dataset {
            Some(dataset) => self.drill.select(dataset, category),
            None => false,
        }
    }

    pub fn drill_back(&mut self) -> bool {
        self.drill.back()
    }

    /// Current dataset projected for the configured chart type
    pub fn view(&self, series: &[String]) -> Option<ChartView> {
        let dataset = self.dataset.as_ref()?;
        Some(project(self.config.chart_type(), dataset, series, &self.drill))
    }
}
