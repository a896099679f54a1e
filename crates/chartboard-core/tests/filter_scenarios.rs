//! Integration tests for chart filter scenarios

use chartboard_core::dates::{end_of_week, start_of_week};
use chartboard_core::{
    ChartPreferences, ChartWidget, DateRange, FilterConfiguration, FilterError, FixedClock,
    NoticeSeverity, TimeRangeMode,
};
use chrono::NaiveDate;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn widget_on(today: NaiveDate) -> ChartWidget<FixedClock> {
    ChartWidget::with_clock(FixedClock(today), &ChartPreferences::default())
}

#[test]
fn test_monthly_compare_previous_year() {
    let mut widget = widget_on(d(2024, 6, 10));

    widget.set_time_range_mode(TimeRangeMode::Monthly).unwrap();
    assert_eq!(widget.config().selected_years(), Some(vec![2024]));
    assert_eq!(
        widget.config().date_range(),
        DateRange::new(d(2024, 1, 1), d(2024, 6, 10))
    );

    widget.toggle_year(2023).unwrap();
    assert_eq!(widget.config().selected_years(), Some(vec![2023, 2024]));
    assert_eq!(
        widget.config().date_range(),
        DateRange::new(d(2023, 1, 1), d(2024, 6, 10))
    );
}

#[test]
fn test_weekly_on_a_friday() {
    let today = d(2024, 3, 15);
    let mut widget = widget_on(today);

    let config = widget.set_time_range_mode(TimeRangeMode::Weekly).unwrap();
    assert_eq!(config.selected_month(), Some(2));
    assert_eq!(config.selected_year(), Some(2024));
    assert_eq!(
        config.date_range(),
        DateRange::new(start_of_week(d(2024, 3, 1)), end_of_week(d(2024, 3, 31)))
    );
    assert_eq!(config.date_range(), DateRange::new(d(2024, 2, 26), d(2024, 3, 31)));
}

#[test]
fn test_sole_year_cannot_be_removed() {
    let mut widget = widget_on(d(2024, 6, 10));
    let before = widget.config().clone();

    widget.toggle_year(2024).unwrap();
    assert_eq!(widget.config(), &before);
    assert!(widget.take_notices().is_empty());
}

#[test]
fn test_future_year_rejected_everywhere() {
    let today = d(2024, 6, 10);
    for mode in [TimeRangeMode::Daily, TimeRangeMode::Weekly, TimeRangeMode::Monthly] {
        let mut widget = widget_on(today);
        widget.set_time_range_mode(mode).unwrap();
        let before = widget.config().clone();

        let err = widget.select_year(2025).unwrap_err();
        assert_eq!(err, FilterError::FutureYear { year: 2025 });
        assert_eq!(widget.config(), &before);
    }
}

#[test]
fn test_three_click_range() {
    let mut widget = widget_on(d(2024, 6, 10));
    widget.set_time_range_mode(TimeRangeMode::Custom).unwrap();
    widget.clear_range().unwrap();

    let (a, b, c) = (d(2024, 2, 3), d(2024, 3, 9), d(2024, 5, 1));
    widget.click_date(a).unwrap();
    widget.click_date(b).unwrap();
    assert_eq!(widget.config().date_range(), DateRange::new(a, b));

    widget.click_date(c).unwrap();
    assert_eq!(widget.config().date_range(), DateRange::new(b, c));
}

#[test]
fn test_corrected_month_is_advisory() {
    let mut widget = widget_on(d(2024, 3, 15));
    widget.set_time_range_mode(TimeRangeMode::Daily).unwrap();
    widget.select_year(2023).unwrap();
    widget.select_month(11).unwrap();
    widget.select_year(2024).unwrap();

    assert_eq!(widget.config().selected_month(), Some(2));
    let notices = widget.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].severity, NoticeSeverity::Advisory);
}

#[test]
fn test_every_valid_month_has_ordered_range() {
    let today = d(2024, 3, 15);
    let base = FilterConfiguration::new(today);
    for mode in [TimeRangeMode::Daily, TimeRangeMode::Weekly] {
        let config = base.set_time_range_mode(mode, today).unwrap().config;
        for year in 2018..=2024 {
            let config = config.select_year(year, today).unwrap().config;
            let months = if year == 2024 { 0..=2 } else { 0..=11 };
            for month in months {
                let range = config.select_month(month, today).unwrap().config.date_range();
                assert!(range.from.unwrap() <= range.to.unwrap(), "{mode} {year}-{month}");
            }
        }
    }
}

#[test]
fn test_reset_then_apply() {
    let mut widget = widget_on(d(2024, 6, 10));
    widget.open_picker();
    widget.reset_range().unwrap();
    assert_eq!(widget.config().mode(), TimeRangeMode::Custom);
    assert_eq!(
        widget.config().date_range(),
        DateRange::new(d(2024, 3, 10), d(2024, 6, 10))
    );

    widget.apply_pending_range().unwrap();
    assert!(!widget.picker().is_open);
}
