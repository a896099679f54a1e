//! Tooltip and label formatting
//!
//! The number format follows the series name: revenue style metrics are money,
//! rate metrics are percentages, everything else is a plain grouped number.

/// Slice labels longer than this are cut (tooltips keep the full name)
pub const LABEL_MAX_CHARS: usize = 20;

const CURRENCY_SERIES: &[&str] = &[
    "Average Revenue Per User",
    "Average Revenue Per Paying User",
    "Inactive Users Life Time Value",
];

const PERCENT_SERIES: &[&str] = &["Churn Rate", "Free to Paid Rate"];

/// Display format for a series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFormat {
    Currency,
    Percent,
    Plain,
}

impl ValueFormat {
    pub fn for_series(series: &str) -> Self {
        if CURRENCY_SERIES.iter().any(|s| series.contains(s)) {
            ValueFormat::Currency
        } else if PERCENT_SERIES.iter().any(|s| series.contains(s)) {
            ValueFormat::Percent
        } else {
            ValueFormat::Plain
        }
    }

    pub fn format(&self, value: f64) -> String {
        if !value.is_finite() {
            return "N/A".to_string();
        }
        match self {
            ValueFormat::Currency => {
                let amount = format_thousands(value.abs(), 2);
                if value < 0.0 && !is_zero_text(&amount) {
                    format!("-${amount}")
                } else {
                    format!("${amount}")
                }
            }
            ValueFormat::Percent => format!("{}%", format_thousands(value, 2)),
            ValueFormat::Plain => format_thousands(value, 2),
        }
    }
}

/// Tooltip text for a value of `series`; missing values render as `N/A`
pub fn format_tooltip_value(series: &str, value: Option<f64>) -> String {
    match value {
        Some(v) => ValueFormat::for_series(series).format(v),
        None => "N/A".to_string(),
    }
}

fn is_zero_text(text: &str) -> bool {
    text.chars().all(|c| !c.is_ascii_digit() || c == '0')
}

/// `value` (finite, non-negative) at `decimals` places.
///
/// Rounds the shortest decimal form of the float, ties away from zero, so `2.675`
/// gives `2.68` and `0.125` gives `0.13` even though neither is exact in binary.
fn round_half_away(value: f64, decimals: usize) -> String {
    let shortest = value.to_string();
    let (int_part, frac_part) = shortest.split_once('.').unwrap_or((shortest.as_str(), ""));

    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().chain(std::iter::repeat(b'0')).take(decimals))
        .map(|b| b - b'0')
        .collect();

    if frac_part.as_bytes().get(decimals).is_some_and(|&b| b >= b'5') {
        let mut i = digits.len();
        loop {
            if i == 0 {
                digits.insert(0, 1);
                break;
            }
            i -= 1;
            if digits[i] == 9 {
                digits[i] = 0;
            } else {
                digits[i] += 1;
                break;
            }
        }
    }

    let to_char = |d: &u8| char::from(b'0' + d);
    let int_len = digits.len() - decimals;
    let mut out: String = digits[..int_len].iter().map(to_char).collect();
    if decimals > 0 {
        out.push('.');
        out.extend(digits[int_len..].iter().map(to_char));
    }
    out
}

/// Fixed decimals with `,` thousands separators: `1234567.891` -> `1,234,567.89`
pub fn format_thousands(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "N/A".to_string();
    }

    let fixed = round_half_away(value.abs(), decimals);
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let mut out = String::new();
    if value < 0.0 && !is_zero_text(&fixed) {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Truncate to `max_chars` characters, appending `...` when cut
pub fn truncate_label(name: &str, max_chars: usize) -> String {
    if name.chars().count() <= max_chars {
        return name.to_string();
    }
    let cut: String = name.chars().take(max_chars).collect();
    format!("{cut}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_series() {
        assert_eq!(
            format_tooltip_value("Average Revenue Per User", Some(1234.5)),
            "$1,234.50"
        );
        assert_eq!(
            format_tooltip_value("Average Revenue Per Paying User (2023)", Some(0.5)),
            "$0.50"
        );
        assert_eq!(
            format_tooltip_value("Inactive Users Life Time Value", Some(-20.0)),
            "-$20.00"
        );
    }

    #[test]
    fn test_percent_series() {
        assert_eq!(format_tooltip_value("Churn Rate", Some(12.345)), "12.35%");
        assert_eq!(format_tooltip_value("Free to Paid Rate 2024", Some(3.0)), "3.00%");
    }

    #[test]
    fn test_plain_series() {
        assert_eq!(format_tooltip_value("Active Users", Some(1234567.891)), "1,234,567.89");
        assert_eq!(format_tooltip_value("Active Users", Some(999.0)), "999.00");
        assert_eq!(format_tooltip_value("Active Users", Some(-1000.0)), "-1,000.00");
    }

    #[test]
    fn test_missing_and_nan() {
        assert_eq!(format_tooltip_value("Churn Rate", Some(f64::NAN)), "N/A");
        assert_eq!(format_tooltip_value("Average Revenue Per User", Some(f64::NAN)), "N/A");
        assert_eq!(format_tooltip_value("Active Users", None), "N/A");
    }

    #[test]
    fn test_negative_rounding_to_zero_has_no_sign() {
        assert_eq!(format_thousands(-0.001, 2), "0.00");
    }

    #[test]
    fn test_ties_round_away_from_zero() {
        assert_eq!(format_tooltip_value("Churn Rate", Some(0.125)), "0.13%");
        assert_eq!(format_tooltip_value("Churn Rate", Some(2.675)), "2.68%");
        assert_eq!(format_tooltip_value("Churn Rate", Some(12.345)), "12.35%");
        assert_eq!(format_thousands(-1.005, 2), "-1.01");
        assert_eq!(format_thousands(0.995, 2), "1.00");
        assert_eq!(format_thousands(2.5, 0), "3");
        assert_eq!(format_thousands(1.2344, 2), "1.23");
        assert_eq!(format_thousands(7.0, 2), "7.00");
    }

    #[test]
    fn test_grouping_boundaries() {
        assert_eq!(format_thousands(100.0, 0), "100");
        assert_eq!(format_thousands(1000.0, 0), "1,000");
        assert_eq!(format_thousands(100000.0, 1), "100,000.0");
        assert_eq!(format_thousands(999.999, 2), "1,000.00");
    }

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("January", LABEL_MAX_CHARS), "January");
        assert_eq!(
            truncate_label("Enterprise Annual Subscriptions", LABEL_MAX_CHARS),
            "Enterprise Annual Su..."
        );
        // Exactly 20 characters stays whole
        assert_eq!(truncate_label("abcdefghijklmnopqrst", 20), "abcdefghijklmnopqrst");
        assert_eq!(truncate_label("ééééé", 3), "ééé...");
    }
}
