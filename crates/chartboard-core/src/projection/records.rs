//! Time series records as returned by the analytics API
//!
//! The API answers with one object per category (`{"name": "Jan", "Active Users": 120, ...}`),
//! or, when several years are compared, one such list per year keyed by the year.
//! Shapes are checked here so the projection code can rely on numeric values.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::CoreError;

/// One category (x-axis position) with its named series values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartRecord {
    pub name: String,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

impl ChartRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: BTreeMap::new(),
        }
    }

    /// Builder-style insert
    pub fn with(mut self, series: impl Into<String>, value: f64) -> Self {
        self.values.insert(series.into(), value);
        self
    }

    /// Finite value of a series, `None` when missing or NaN
    pub fn value(&self, series: &str) -> Option<f64> {
        self.values.get(series).copied().filter(|v| v.is_finite())
    }

    /// Validate one API object. `null` fields are treated as missing.
    pub fn from_json(index: usize, value: &Value) -> Result<Self, CoreError> {
        let Value::Object(fields) = value else {
            return Err(CoreError::InvalidRecord {
                index,
                message: "expected an object".to_string(),
            });
        };

        let name = match fields.get("name") {
            Some(Value::String(name)) => name.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => {
                return Err(CoreError::InvalidRecord {
                    index,
                    message: "missing string field 'name'".to_string(),
                })
            }
        };

        let mut values = BTreeMap::new();
        for (key, field) in fields {
            if key == "name" {
                continue;
            }
            match field {
                Value::Null => {}
                Value::Number(n) => {
                    let v = n.as_f64().ok_or_else(|| CoreError::InvalidRecord {
                        index,
                        message: format!("field '{key}' is out of range"),
                    })?;
                    values.insert(key.clone(), v);
                }
                _ => {
                    return Err(CoreError::InvalidRecord {
                        index,
                        message: format!("field '{key}' is not numeric"),
                    })
                }
            }
        }

        Ok(Self { name, values })
    }
}

/// Records for one query
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChartDataset {
    /// One list of categories
    Single(Vec<ChartRecord>),
    /// One list per selected year (monthly mode comparing years)
    MultiYear(BTreeMap<i32, Vec<ChartRecord>>),
}

impl Default for ChartDataset {
    fn default() -> Self {
        ChartDataset::Single(Vec::new())
    }
}

fn records_from_json(items: &[Value]) -> Result<Vec<ChartRecord>, CoreError> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| ChartRecord::from_json(index, item))
        .collect()
}

impl ChartDataset {
    /// Validate an API payload: an array of records, or an object of year -> array
    pub fn from_json(value: &Value) -> Result<Self, CoreError> {
        match value {
            Value::Array(items) => Ok(ChartDataset::Single(records_from_json(items)?)),
            Value::Object(years) => {
                let mut by_year = BTreeMap::new();
                for (key, items) in years {
                    let year: i32 = key.trim().parse().map_err(|_| CoreError::InvalidDataset {
                        message: format!("'{key}' is not a year"),
                    })?;
                    let Value::Array(items) = items else {
                        return Err(CoreError::InvalidDataset {
                            message: format!("records for {year} must be an array"),
                        });
                    };
                    let records = records_from_json(items).map_err(|e| match e {
                        CoreError::InvalidRecord { index, message } => CoreError::InvalidRecord {
                            index,
                            message: format!("{message} (year {year})"),
                        },
                        other => other,
                    })?;
                    by_year.insert(year, records);
                }
                Ok(ChartDataset::MultiYear(by_year))
            }
            _ => Err(CoreError::InvalidDataset {
                message: "expected an array of records or an object keyed by year".to_string(),
            }),
        }
    }

    /// Read and validate a JSON payload from disk
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path).map_err(|source| CoreError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let value: Value = serde_json::from_str(&content).map_err(|source| CoreError::JsonParse {
            path: path.to_path_buf(),
            message: source.to_string(),
            source,
        })?;
        Self::from_json(&value)
    }

    /// More than one year to compare
    pub fn is_multi_year(&self) -> bool {
        matches!(self, ChartDataset::MultiYear(years) if years.len() > 1)
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ChartDataset::Single(records) => records.is_empty(),
            ChartDataset::MultiYear(years) => years.values().all(Vec::is_empty),
        }
    }

    /// Category names in first-seen order (years visited ascending)
    pub fn categories(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for record in self.all_records() {
            if !seen.contains(&record.name) {
                seen.push(record.name.clone());
            }
        }
        seen
    }

    /// Series names present in any record, sorted
    pub fn series_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .all_records()
            .flat_map(|r| r.values.keys().cloned())
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }

    fn all_records(&self) -> Box<dyn Iterator<Item = &ChartRecord> + '_> {
        match self {
            ChartDataset::Single(records) => Box::new(records.iter()),
            ChartDataset::MultiYear(years) => Box::new(years.values().flatten()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_from_json() {
        let record =
            ChartRecord::from_json(0, &json!({"name": "Jan", "Active Users": 12, "Churn Rate": 1.5}))
                .unwrap();
        assert_eq!(record.name, "Jan");
        assert_eq!(record.value("Active Users"), Some(12.0));
        assert_eq!(record.value("Churn Rate"), Some(1.5));
    }

    #[test]
    fn test_record_null_is_missing() {
        let record = ChartRecord::from_json(0, &json!({"name": "Jan", "Revenue": null})).unwrap();
        assert!(record.values.is_empty());
        assert_eq!(record.value("Revenue"), None);
    }

    #[test]
    fn test_record_rejects_text_values() {
        let err = ChartRecord::from_json(3, &json!({"name": "Jan", "Revenue": "12"})).unwrap_err();
        assert!(matches!(err, CoreError::InvalidRecord { index: 3, .. }));
        assert!(err.to_string().contains("'Revenue' is not numeric"));
    }

    #[test]
    fn test_record_requires_name() {
        assert!(ChartRecord::from_json(0, &json!({"Revenue": 1})).is_err());
        assert!(ChartRecord::from_json(0, &json!([1, 2])).is_err());
    }

    #[test]
    fn test_dataset_single_and_multi_year() {
        let single = ChartDataset::from_json(&json!([{"name": "Jan", "Users": 1}])).unwrap();
        assert!(!single.is_multi_year());
        assert_eq!(single.categories(), vec!["Jan"]);

        let multi = ChartDataset::from_json(&json!({
            "2023": [{"name": "Jan", "Users": 1}, {"name": "Feb", "Users": 2}],
            "2024": [{"name": "Jan", "Users": 3}, {"name": "Mar", "Revenue": 4}]
        }))
        .unwrap();
        assert!(multi.is_multi_year());
        assert_eq!(multi.categories(), vec!["Jan", "Feb", "Mar"]);
        assert_eq!(multi.series_keys(), vec!["Revenue", "Users"]);
    }

    #[test]
    fn test_dataset_rejects_non_year_keys() {
        let err = ChartDataset::from_json(&json!({"latest": []})).unwrap_err();
        assert!(err.to_string().contains("'latest' is not a year"));
    }

    #[test]
    fn test_dataset_error_names_year() {
        let err = ChartDataset::from_json(&json!({"2023": [{"name": "Jan", "Users": true}]}))
            .unwrap_err();
        assert!(err.to_string().contains("(year 2023)"));
    }

    #[test]
    fn test_record_serializes_flat() {
        let record = ChartRecord::new("Jan").with("Users", 4.0);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, json!({"name": "Jan", "Users": 4.0}));
    }
}
