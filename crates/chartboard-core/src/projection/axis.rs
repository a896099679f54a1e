//! Single vs dual y-axis selection for bar and line charts

use serde::Serialize;

use super::records::ChartRecord;

/// Largest-to-smallest series maximum above which series get separate axes
pub const DUAL_AXIS_RATIO: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AxisLayout {
    /// Every series shares one axis
    Single,
    /// Large series on the left axis, small ones on the right
    Dual {
        left: Vec<String>,
        right: Vec<String>,
    },
}

impl AxisLayout {
    pub fn is_dual(&self) -> bool {
        matches!(self, AxisLayout::Dual { .. })
    }
}

/// Maximum finite value of a series across records
pub fn series_max(records: &[ChartRecord], series: &str) -> Option<f64> {
    records
        .iter()
        .filter_map(|r| r.value(series))
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))))
}

/// Pick the axis layout for `series`.
///
/// Only series with a positive maximum take part in the ratio; anything else stays on
/// the left axis.
pub fn axis_layout(records: &[ChartRecord], series: &[String]) -> AxisLayout {
    let maxima: Vec<(&String, f64)> = series
        .iter()
        .filter_map(|key| series_max(records, key).map(|m| (key, m)))
        .filter(|(_, m)| *m > 0.0)
        .collect();

    if maxima.len() < 2 {
        return AxisLayout::Single;
    }

    let largest = maxima.iter().map(|(_, m)| *m).fold(f64::MIN, f64::max);
    let smallest = maxima.iter().map(|(_, m)| *m).fold(f64::MAX, f64::min);
    if largest / smallest <= DUAL_AXIS_RATIO {
        return AxisLayout::Single;
    }

    let mut left = Vec::new();
    let mut right = Vec::new();
    for key in series {
        let on_right = maxima
            .iter()
            .any(|(k, m)| *k == key && largest / m > DUAL_AXIS_RATIO);
        if on_right {
            right.push(key.clone());
        } else {
            left.push(key.clone());
        }
    }

    tracing::debug!(
        "Dual axis: ratio {:.1} (left {:?}, right {:?})",
        largest / smallest,
        left,
        right
    );
    AxisLayout::Dual { left, right }
}
