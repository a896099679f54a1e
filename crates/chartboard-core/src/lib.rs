//! chartboard-core - Core library for chartboard
//!
//! Provides the chart filter state machine, calendar range math, data projection and
//! the fetch relevance rules used by the analytics dashboard charts.

pub mod dates;
pub mod error;
pub mod fetch;
pub mod filters;
pub mod preferences;
pub mod projection;
pub mod widget;

pub use error::{CoreError, FilterError, Notice, NoticeSeverity};
pub use fetch::{FetchTicket, FetchTracker, Granularity, JsonFileSource, SeriesQuery, SeriesSource};
pub use filters::{ChartType, DateRange, FilterConfiguration, Segment, TimeRange, TimeRangeMode};
pub use preferences::ChartPreferences;
pub use projection::{project, ChartDataset, ChartRecord, ChartView, PieDrillDown};
pub use widget::{ChartWidget, Clock, FetchOutcome, FixedClock, SystemClock};
