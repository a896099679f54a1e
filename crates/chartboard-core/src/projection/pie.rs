//! Pie projection and year drill-down
//!
//! Top level: one slice per category. When several years are compared the slice value
//! is the sum over years, and clicking a slice expands it into one slice per year.

use serde::Serialize;

use super::format::{format_tooltip_value, truncate_label, LABEL_MAX_CHARS};
use super::records::ChartDataset;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    /// Full category (or year) name, used for tooltips and drill-down clicks
    pub name: String,
    /// Truncated display label
    pub label: String,
    pub value: f64,
    pub tooltip: String,
}

impl PieSlice {
    fn new(name: String, series: &str, value: f64) -> Self {
        Self {
            label: truncate_label(&name, LABEL_MAX_CHARS),
            tooltip: format!("{}: {}", name, format_tooltip_value(series, Some(value))),
            name,
            value,
        }
    }
}

/// Slices with a positive value only
fn keep_positive(
    slices: impl IntoIterator<Item = (String, Option<f64>)>,
    series: &str,
) -> Vec<PieSlice> {
    slices
        .into_iter()
        .filter_map(|(name, value)| match value {
            Some(v) if v > 0.0 => Some(PieSlice::new(name, series, v)),
            _ => None,
        })
        .collect()
}

/// One slice per category; multi-year datasets sum the years
pub fn pie_slices(dataset: &ChartDataset, series: &str) -> Vec<PieSlice> {
    match dataset {
        ChartDataset::Single(records) => keep_positive(
            records.iter().map(|r| (r.name.clone(), r.value(series))),
            series,
        ),
        ChartDataset::MultiYear(years) => {
            let totals = dataset.categories().into_iter().map(|category| {
                let values: Vec<f64> = years
                    .values()
                    .flatten()
                    .filter(|r| r.name == category)
                    .filter_map(|r| r.value(series))
                    .collect();
                let total = (!values.is_empty()).then(|| values.iter().sum::<f64>());
                (category, total)
            });
            keep_positive(totals, series)
        }
    }
}

/// One slice per year for `category`
pub fn year_slices(dataset: &ChartDataset, series: &str, category: &str) -> Vec<PieSlice> {
    let ChartDataset::MultiYear(years) = dataset else {
        return Vec::new();
    };
    let per_year = years.iter().map(|(year, records)| {
        let value = records
            .iter()
            .find(|r| r.name == category)
            .and_then(|r| r.value(series));
        (year.to_string(), value)
    });
    keep_positive(per_year, series)
}

/// Drill-down selection owned by the rendering side, never by the filter configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PieDrillDown {
    selected: Option<String>,
}

impl PieDrillDown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Expand a slice. Only multi-year datasets drill down, and only into known categories.
    pub fn select(&mut self, dataset: &ChartDataset, category: &str) -> bool {
        if !dataset.is_multi_year() || !dataset.categories().iter().any(|c| c == category) {
            return false;
        }
        self.selected = Some(category.to_string());
        true
    }

    /// Back to the top level. Returns false when nothing was selected.
    pub fn back(&mut self) -> bool {
        self.selected.take().is_some()
    }

    /// Forget the selection (the dataset changed)
    pub fn reset(&mut self) {
        self.selected = None;
    }

    pub fn slices(&self, dataset: &ChartDataset, series: &str) -> Vec<PieSlice> {
        match &self.selected {
            Some(category) => year_slices(dataset, series, category),
            None => pie_slices(dataset, series),
        }
    }
}
