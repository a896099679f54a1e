//! Chart data projection
//!
//! Turns validated API records into what a chart component renders: a cartesian view
//! (bar/line, with the axis layout decided up front) or pie slices.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::filters::ChartType;

pub mod axis;
pub mod format;
pub mod pie;
pub mod records;

pub use axis::{axis_layout, AxisLayout, DUAL_AXIS_RATIO};
pub use format::{format_thousands, format_tooltip_value, truncate_label, ValueFormat};
pub use pie::{pie_slices, year_slices, PieDrillDown, PieSlice};
pub use records::{ChartDataset, ChartRecord};

/// Render-ready chart data
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartView {
    Cartesian {
        chart_type: ChartType,
        layout: AxisLayout,
        /// Series to draw, in legend order
        series: Vec<String>,
        records: Vec<ChartRecord>,
    },
    Pie {
        series: String,
        /// Category expanded into per-year slices, if any
        drilled: Option<String>,
        slices: Vec<PieSlice>,
    },
}

impl ChartView {
    pub fn is_empty(&self) -> bool {
        match self {
            ChartView::Cartesian { records, .. } => records.is_empty(),
            ChartView::Pie { slices, .. } => slices.is_empty(),
        }
    }
}

/// Name of a per-year series in a merged multi-year chart
pub fn year_series_name(series: &str, year: i32) -> String {
    format!("{series} {year}")
}

/// Flatten a multi-year dataset into one record per category with a series per year.
///
/// Categories keep their first-seen order. Single datasets come back unchanged.
pub fn merge_years(dataset: &ChartDataset, series: &[String]) -> (Vec<ChartRecord>, Vec<String>) {
    let years = match dataset {
        ChartDataset::Single(records) => return (records.clone(), series.to_vec()),
        ChartDataset::MultiYear(years) => years,
    };

    let mut merged: Vec<ChartRecord> = dataset
        .categories()
        .into_iter()
        .map(ChartRecord::new)
        .collect();
    let position: BTreeMap<String, usize> = merged
        .iter()
        .enumerate()
        .map(|(i, r)| (r.name.clone(), i))
        .collect();

    for (year, records) in years {
        for record in records {
            let Some(&i) = position.get(&record.name) else {
                continue;
            };
            for key in series {
                if let Some(v) = record.values.get(key) {
                    merged[i].values.insert(year_series_name(key, *year), *v);
                }
            }
        }
    }

    let merged_series = series
        .iter()
        .flat_map(move |key| years.keys().map(move |year| year_series_name(key, *year)))
        .collect();

    (merged, merged_series)
}

/// Project a dataset for `chart_type`.
///
/// Pie charts use the first series key; `drill` only matters for pies.
pub fn project(
    chart_type: ChartType,
    dataset: &ChartDataset,
    series: &[String],
    drill: &PieDrillDown,
) -> ChartView {
    match chart_type {
        ChartType::Pie => {
            let key = series.first().cloned().unwrap_or_default();
            ChartView::Pie {
                slices: drill.slices(dataset, &key),
                drilled: drill.selected().map(str::to_string),
                series: key,
            }
        }
        ChartType::Bar | ChartType::Line => {
            let (records, series) = merge_years(dataset, series);
            ChartView::Cartesian {
                chart_type,
                layout: axis_layout(&records, &series),
                series,
                records,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn two_years() -> ChartDataset {
        ChartDataset::MultiYear(BTreeMap::from([
            (
                2023,
                vec![
                    ChartRecord::new("Jan").with("Users", 10.0),
                    ChartRecord::new("Feb").with("Users", 20.0),
                ],
            ),
            (
                2024,
                vec![
                    ChartRecord::new("Jan").with("Users", 30.0),
                    ChartRecord::new("Mar").with("Users", 40.0),
                ],
            ),
        ]))
    }

    #[test]
    fn test_merge_years_builds_series_per_year() {
        let (records, series) = merge_years(&two_years(), &keys(&["Users"]));

        assert_eq!(series, keys(&["Users 2023", "Users 2024"]));
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].name, "Jan");
        assert_eq!(records[0].value("Users 2023"), Some(10.0));
        assert_eq!(records[0].value("Users 2024"), Some(30.0));
        assert_eq!(records[1].value("Users 2024"), None);
        assert_eq!(records[2].name, "Mar");
    }

    #[test]
    fn test_merge_single_is_identity() {
        let dataset = ChartDataset::Single(vec![ChartRecord::new("Jan").with("Users", 1.0)]);
        let (records, series) = merge_years(&dataset, &keys(&["Users"]));
        assert_eq!(series, keys(&["Users"]));
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_project_bar_picks_layout() {
        let dataset = ChartDataset::Single(vec![
            ChartRecord::new("Jan").with("Users", 100.0).with("Churn Rate", 5.0),
        ]);
        let view = project(
            ChartType::Bar,
            &dataset,
            &keys(&["Users", "Churn Rate"]),
            &PieDrillDown::new(),
        );
        match view {
            ChartView::Cartesian { layout, .. } => assert!(layout.is_dual()),
            other => panic!("expected cartesian view, got {other:?}"),
        }
    }

    #[test]
    fn test_project_pie_follows_drill_down() {
        let dataset = two_years();
        let mut drill = PieDrillDown::new();
        assert!(drill.select(&dataset, "Jan"));

        let view = project(ChartType::Pie, &dataset, &keys(&["Users"]), &drill);
        match view {
            ChartView::Pie {
                drilled, slices, ..
            } => {
                assert_eq!(drilled.as_deref(), Some("Jan"));
                let names: Vec<&str> = slices.iter().map(|s| s.name.as_str()).collect();
                assert_eq!(names, vec!["2023", "2024"]);
            }
            other => panic!("expected pie view, got {other:?}"),
        }
    }

    #[test]
    fn test_project_pie_without_series_is_empty() {
        let view = project(ChartType::Pie, &two_years(), &[], &PieDrillDown::new());
        assert!(view.is_empty());
    }
}
