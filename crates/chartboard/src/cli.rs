//! CLI helpers: action parsing and output formatting
//!
//! `filter` replays UI actions through a [`ChartWidget`]; `project` renders a dataset
//! the way the dashboard charts would.

use anyhow::{Context, Result};
use chartboard_core::projection::{format_tooltip_value, AxisLayout, PieSlice};
use chartboard_core::{
    ChartType, ChartView, ChartWidget, Clock, CoreError, FilterConfiguration, FilterError,
    Notice, NoticeSeverity, SeriesQuery, TimeRangeMode,
};
use chrono::NaiveDate;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};
use std::path::Path;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug)]
pub enum CliError {
    InvalidAction { action: String, reason: String },
    Core(CoreError),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::InvalidAction { action, reason } => {
                write!(f, "Invalid action '{}': {}", action, reason)
            }
            CliError::Core(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CliError {}

impl From<CoreError> for CliError {
    fn from(e: CoreError) -> Self {
        CliError::Core(e)
    }
}

// ============================================================================
// Actions
// ============================================================================

/// One UI interaction replayed against a widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Mode(TimeRangeMode),
    /// 0-based month index
    Month(u32),
    Year(i32),
    Toggle(i32),
    Date(NaiveDate),
    Clear,
    Reset,
    Apply,
    Open,
    Chart(ChartType),
    Gender(Option<String>),
    Conversion(Option<String>),
}

fn invalid(action: &str, reason: impl Into<String>) -> CliError {
    CliError::InvalidAction {
        action: action.to_string(),
        reason: reason.into(),
    }
}

fn optional_value(value: &str) -> Option<String> {
    match value {
        "" | "all" | "none" => None,
        v => Some(v.to_string()),
    }
}

impl Action {
    /// Parse `name[:value]`, e.g. `mode:weekly`, `month:3` (March), `date:2024-01-05`
    pub fn parse(s: &str) -> Result<Self, CliError> {
        let (name, value) = s.split_once(':').unwrap_or((s, ""));
        match name.trim().to_lowercase().as_str() {
            "mode" => value.parse().map(Action::Mode).map_err(|e| invalid(s, e)),
            "month" => {
                let month: u32 = value
                    .parse()
                    .map_err(|_| invalid(s, "expected a month number 1-12"))?;
                if !(1..=12).contains(&month) {
                    return Err(invalid(s, "expected a month number 1-12"));
                }
                Ok(Action::Month(month - 1))
            }
            "year" => value
                .parse()
                .map(Action::Year)
                .map_err(|_| invalid(s, "expected a year")),
            "toggle" => value
                .parse()
                .map(Action::Toggle)
                .map_err(|_| invalid(s, "expected a year")),
            "date" => NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map(Action::Date)
                .map_err(|_| invalid(s, "expected YYYY-MM-DD")),
            "clear" => Ok(Action::Clear),
            "reset" => Ok(Action::Reset),
            "apply" => Ok(Action::Apply),
            "open" => Ok(Action::Open),
            "chart" => value.parse().map(Action::Chart).map_err(|e| invalid(s, e)),
            "gender" => Ok(Action::Gender(optional_value(value))),
            "conversion" => Ok(Action::Conversion(optional_value(value))),
            other => Err(invalid(s, format!("unknown action '{other}'"))),
        }
    }

    /// Run against `widget`. Rejections are also queued as widget notices.
    pub fn run<C: Clock>(&self, widget: &mut ChartWidget<C>) -> Result<(), FilterError> {
        match self {
            Action::Mode(mode) => widget.set_time_range_mode(*mode).map(|_| ()),
            Action::Month(month) => widget.select_month(*month).map(|_| ()),
            Action::Year(year) => widget.select_year(*year).map(|_| ()),
            Action::Toggle(year) => widget.toggle_year(*year).map(|_| ()),
            Action::Date(date) => widget.click_date(*date).map(|_| ()),
            Action::Clear => widget.clear_range().map(|_| ()),
            Action::Reset => widget.reset_range().map(|_| ()),
            Action::Apply => widget.apply_pending_range().map(|_| ()),
            Action::Open => {
                widget.open_picker();
                Ok(())
            }
            Action::Chart(chart_type) => {
                widget.set_chart_type(*chart_type);
                Ok(())
            }
            Action::Gender(gender) => {
                let mut segment = widget.config().segment().clone();
                segment.gender = gender.clone();
                widget.set_segment(segment);
                Ok(())
            }
            Action::Conversion(conversion) => {
                let mut segment = widget.config().segment().clone();
                segment.conversion_type = conversion.clone();
                widget.set_segment(segment);
                Ok(())
            }
        }
    }
}

/// `--today` value, defaulting to the local date
pub fn parse_today(raw: Option<&str>) -> Result<Option<NaiveDate>> {
    raw.map(|s| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").context("Invalid --today (expected YYYY-MM-DD)")
    })
    .transpose()
}

/// Configuration from `filter --json` output, or a bare serialized configuration
pub fn parse_configuration(
    value: &serde_json::Value,
    today: NaiveDate,
) -> Result<FilterConfiguration, CliError> {
    let config = value.get("configuration").unwrap_or(value);
    Ok(FilterConfiguration::from_json(config, today)?)
}

pub fn load_configuration(
    path: &Path,
    today: NaiveDate,
) -> Result<FilterConfiguration, CliError> {
    let content = std::fs::read_to_string(path).map_err(|source| CoreError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let value: serde_json::Value =
        serde_json::from_str(&content).map_err(|source| CoreError::JsonParse {
            path: path.to_path_buf(),
            message: source.to_string(),
            source,
        })?;
    parse_configuration(&value, today)
}

// ============================================================================
// Output
// ============================================================================

fn header(table: &mut Table, names: &[&str], no_color: bool) {
    if no_color {
        table.set_header(names.to_vec());
    } else {
        table.set_header(
            names
                .iter()
                .map(|n| Cell::new(n).fg(Color::Cyan))
                .collect::<Vec<_>>(),
        );
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Configuration and the query it produces (human or JSON)
pub fn format_config(config: &FilterConfiguration, json: bool, no_color: bool) -> String {
    let query = SeriesQuery::from_config(config);
    if json {
        let value = serde_json::json!({ "configuration": config, "query": query });
        return serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string());
    }

    let mut table = new_table();
    header(&mut table, &["Field", "Value"], no_color);

    let segment = config.segment();
    let mut rows: Vec<(&str, String)> = vec![
        ("Chart", config.chart_type().to_string()),
        ("Mode", config.mode().to_string()),
        ("Range", config.date_range().to_string()),
    ];
    if let (Some(month), Some(year)) = (config.selected_month(), config.selected_year()) {
        rows.push(("Month", format!("{}-{:02}", year, month + 1)));
    }
    if let Some(years) = config.selected_years() {
        let years: Vec<String> = years.iter().map(i32::to_string).collect();
        rows.push(("Years", years.join(", ")));
    }
    rows.push(("Gender", segment.gender.clone().unwrap_or_else(|| "-".to_string())));
    rows.push((
        "Conversion",
        segment
            .conversion_type
            .clone()
            .unwrap_or_else(|| "-".to_string()),
    ));
    rows.push((
        "Query",
        query
            .map(|q| format!("{:?} buckets", q.granularity).to_lowercase())
            .unwrap_or_else(|| "incomplete range, not fetched".to_string()),
    ));

    for (field, value) in rows {
        table.add_row(Row::from(vec![field.to_string(), value]));
    }
    table.to_string()
}

/// Notices as `✗ message` / `⚠ message` lines
pub fn format_notices(notices: &[Notice]) -> String {
    notices
        .iter()
        .map(|n| match n.severity {
            NoticeSeverity::Blocking => format!("✗ {}", n.message),
            NoticeSeverity::Advisory => format!("⚠ {}", n.message),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_slices(
    slices: &[PieSlice],
    series: &str,
    drilled: Option<&str>,
    no_color: bool,
) -> String {
    if slices.is_empty() {
        return "No slices (every value is zero or missing).".to_string();
    }

    let total: f64 = slices.iter().map(|s| s.value).sum();
    let mut table = new_table();
    header(&mut table, &["Slice", series, "Share"], no_color);
    for slice in slices {
        table.add_row(Row::from(vec![
            slice.label.clone(),
            format_tooltip_value(series, Some(slice.value)),
            format!("{:.1}%", slice.value / total * 100.0),
        ]));
    }

    match drilled {
        Some(category) => format!("{category} by year\n{table}"),
        None => table.to_string(),
    }
}

/// Projected chart (human or JSON)
pub fn format_view(view: &ChartView, json: bool, no_color: bool) -> String {
    if json {
        return serde_json::to_string_pretty(view).unwrap_or_else(|_| "{}".to_string());
    }

    match view {
        ChartView::Pie {
            series,
            drilled,
            slices,
        } => format_slices(slices, series, drilled.as_deref(), no_color),
        ChartView::Cartesian {
            chart_type,
            layout,
            series,
            records,
        } => {
            if records.is_empty() {
                return "No data.".to_string();
            }

            let mut names = vec!["Category"];
            names.extend(series.iter().map(String::as_str));
            let mut table = new_table();
            header(&mut table, &names, no_color);
            for record in records {
                let mut cells = vec![record.name.clone()];
                cells.extend(
                    series
                        .iter()
                        .map(|key| format_tooltip_value(key, record.value(key))),
                );
                table.add_row(Row::from(cells));
            }

            let axis = match layout {
                AxisLayout::Single => "single axis".to_string(),
                AxisLayout::Dual { left, right } => {
                    format!(
                        "dual axis (left: {}; right: {})",
                        left.join(", "),
                        right.join(", ")
                    )
                }
            };
            format!("{chart_type} chart, {axis}\n{table}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartboard_core::{ChartPreferences, FixedClock};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parse_actions() {
        assert_eq!(
            Action::parse("mode:weekly").unwrap(),
            Action::Mode(TimeRangeMode::Weekly)
        );
        assert_eq!(Action::parse("month:3").unwrap(), Action::Month(2));
        assert_eq!(Action::parse("toggle:2023").unwrap(), Action::Toggle(2023));
        assert_eq!(
            Action::parse("date:2024-01-05").unwrap(),
            Action::Date(d(2024, 1, 5))
        );
        assert_eq!(Action::parse("chart:pie").unwrap(), Action::Chart(ChartType::Pie));
        assert_eq!(Action::parse("reset").unwrap(), Action::Reset);
        assert_eq!(Action::parse("gender:all").unwrap(), Action::Gender(None));
    }

    #[test]
    fn test_parse_invalid_actions() {
        assert!(Action::parse("month:13").is_err());
        assert!(Action::parse("month:0").is_err());
        assert!(Action::parse("mode:hourly").is_err());
        assert!(Action::parse("date:05/01/2024").is_err());
        let err = Action::parse("zoom:2").unwrap_err();
        assert!(err.to_string().contains("unknown action 'zoom'"));
    }

    #[test]
    fn test_run_actions_on_widget() {
        let mut widget =
            ChartWidget::with_clock(FixedClock(d(2024, 3, 15)), &ChartPreferences::default());
        for raw in ["mode:weekly", "month:2", "conversion:paid"] {
            Action::parse(raw).unwrap().run(&mut widget).unwrap();
        }
        assert_eq!(widget.config().selected_month(), Some(1));
        assert_eq!(
            widget.config().segment().conversion_type.as_deref(),
            Some("paid")
        );

        assert!(Action::Month(5).run(&mut widget).is_err());
        assert_eq!(widget.take_notices().len(), 1);
    }

    #[test]
    fn test_parse_today() {
        assert_eq!(parse_today(None).unwrap(), None);
        assert_eq!(parse_today(Some("2024-06-10")).unwrap(), Some(d(2024, 6, 10)));
        assert!(parse_today(Some("tomorrow")).is_err());
    }

    #[test]
    fn test_format_config_json_has_query() {
        let config = FilterConfiguration::new(d(2024, 6, 10));
        let out = format_config(&config, true, true);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["query"]["granularity"], "month");
        assert_eq!(value["configuration"]["chart_type"], "bar");
    }

    #[test]
    fn test_format_config_table_lists_years() {
        let config = FilterConfiguration::new(d(2024, 6, 10));
        let out = format_config(&config, false, true);
        assert!(out.contains("monthly"));
        assert!(out.contains("2024"));
    }

    #[test]
    fn test_filter_json_output_restores() {
        let today = d(2024, 6, 10);
        let mut widget =
            ChartWidget::with_clock(FixedClock(today), &ChartPreferences::default());
        for raw in ["mode:weekly", "year:2023", "month:11", "chart:line"] {
            Action::parse(raw).unwrap().run(&mut widget).unwrap();
        }

        let out = format_config(widget.config(), true, true);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        let restored = parse_configuration(&value, today).unwrap();
        assert_eq!(&restored, widget.config());
    }

    #[test]
    fn test_restore_rejects_future_selection() {
        let value = serde_json::json!({
            "configuration": {
                "time_range": {"mode": "daily", "selection": {"month": 0, "year": 2030}}
            }
        });
        let err = parse_configuration(&value, d(2024, 6, 10)).unwrap_err();
        assert!(err.to_string().contains("Cannot select a future year"));
    }

    #[test]
    fn test_format_notices() {
        let out = format_notices(&[Notice::blocking("no"), Notice::advisory("fixed")]);
        assert_eq!(out, "✗ no\n⚠ fixed");
    }
}
