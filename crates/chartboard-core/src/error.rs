//! Error types for chartboard-core
//!
//! Two families live here:
//! - [`FilterError`]: a rejected filter transition. The message is user-facing and the
//!   configuration it was raised against is left untouched.
//! - [`CoreError`]: I/O and data-shape failures at the boundary (datasets, sources).
//!
//! [`Notice`] is what the widget queues for the toast layer.

use std::path::PathBuf;
use thiserror::Error;

use crate::filters::{DateRange, TimeRangeMode};

/// Rejected filter transition
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    // ===================
    // Future selections
    // ===================
    #[error("Cannot select a future month")]
    FutureMonth { year: i32, month: u32 },

    #[error("Cannot select a future year")]
    FutureYear { year: i32 },

    #[error("Cannot select a future date")]
    FutureDate { date: chrono::NaiveDate },

    // ===================
    // Input shape
    // ===================
    #[error("Invalid month index {month} (expected 0-11)")]
    InvalidMonth { month: u32 },

    #[error("Year {year} is out of range")]
    InvalidYear { year: i32 },

    #[error("Please select both start and end dates")]
    IncompleteRange,

    #[error("Start date must not be after end date ({range})")]
    InvalidRange { range: DateRange },

    #[error("Select at least one year")]
    NoYearsSelected,

    #[error("This selection is not available in {current} mode")]
    ModeMismatch {
        current: TimeRangeMode,
        operation: &'static str,
    },
}

/// Core error type for dataset and source operations
#[derive(Error, Debug)]
pub enum CoreError {
    // ===================
    // IO Errors
    // ===================
    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ===================
    // Parse Errors
    // ===================
    #[error("Failed to parse JSON in {path}: {message}")]
    JsonParse {
        path: PathBuf,
        message: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid record at index {index}: {message}")]
    InvalidRecord { index: usize, message: String },

    #[error("Invalid dataset: {message}")]
    InvalidDataset { message: String },

    #[error("Invalid saved configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("Saved configuration rejected: {0}")]
    RejectedConfiguration(#[from] FilterError),

    // ===================
    // Source Errors
    // ===================
    #[error("Data source failed: {message}")]
    Source { message: String },
}

/// How loudly a notice should be surfaced
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeSeverity {
    /// Selection was refused; state is unchanged
    Blocking,
    /// Selection was corrected to the nearest valid value
    Advisory,
}

/// User-facing message produced by a transition
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Notice {
    pub severity: NoticeSeverity,
    pub message: String,
}

impl Notice {
    pub fn blocking(message: impl Into<String>) -> Self {
        Self {
            severity: NoticeSeverity::Blocking,
            message: message.into(),
        }
    }

    pub fn advisory(message: impl Into<String>) -> Self {
        Self {
            severity: NoticeSeverity::Advisory,
            message: message.into(),
        }
    }

    pub fn is_blocking(&self) -> bool {
        self.severity == NoticeSeverity::Blocking
    }
}

impl From<&FilterError> for Notice {
    fn from(error: &FilterError) -> Self {
        Notice::blocking(error.to_string())
    }
}
