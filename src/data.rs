//! Dataset model: typed cells, rows, and header normalisation.
//!
//! A [`Dataset`] is the engine's only input. It keeps the header order that
//! the caller supplied (trimmed and deduplicated) and stores each row as a map
//! from header to a tagged [`Value`]. Missing keys and empty cells are both
//! treated as absent.

use std::{
    collections::{HashMap, HashSet},
    fmt,
};

use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Boolean(bool),
    Text(String),
}

impl Value {
    /// Infers a typed cell from a raw CSV field. Empty (or whitespace-only)
    /// fields are absent.
    pub fn infer(raw: &str) -> Option<Value> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.eq_ignore_ascii_case("true") {
            return Some(Value::Boolean(true));
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return Some(Value::Boolean(false));
        }
        match trimmed.parse::<f64>() {
            Ok(number) if number.is_finite() => Some(Value::Number(number)),
            _ => Some(Value::Text(raw.to_string())),
        }
    }

    pub fn as_display(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    (*n as i64).to_string()
                } else {
                    n.to_string()
                }
            }
            Value::Boolean(b) => b.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

/// One record: header name to cell. Keys that are not present are absent.
pub type Row = HashMap<String, Value>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DatasetError {
    #[error("Header at position {position} is blank")]
    BlankHeader { position: usize },
    #[error("Dataset must declare at least one header")]
    NoHeaders,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Row>,
}

impl Dataset {
    /// Builds a dataset from already-typed rows. Headers are trimmed; a blank
    /// header is an error and repeated headers keep their first position.
    pub fn new(headers: Vec<String>, rows: Vec<Row>) -> Result<Self, DatasetError> {
        let headers = normalize_headers(&headers)?;
        Ok(Self { headers, rows })
    }

    /// Builds a dataset from raw string records as produced by a CSV reader,
    /// inferring every cell with [`Value::infer`]. Cells beyond the header
    /// count are ignored.
    pub fn from_records(
        headers: Vec<String>,
        records: Vec<Vec<String>>,
    ) -> Result<Self, DatasetError> {
        let normalized = normalize_headers(&headers)?;
        // Only the first position of a repeated header feeds its column.
        let mut seen = HashSet::with_capacity(headers.len());
        let columns = headers
            .iter()
            .map(|h| {
                let name = h.trim();
                seen.insert(name).then(|| name.to_string())
            })
            .collect::<Vec<_>>();
        let rows = records
            .into_iter()
            .map(|record| {
                let mut row = Row::with_capacity(normalized.len());
                for (column, raw) in columns.iter().zip(record.iter()) {
                    let Some(name) = column else {
                        continue;
                    };
                    if let Some(value) = Value::infer(raw) {
                        row.insert(name.clone(), value);
                    }
                }
                row
            })
            .collect();
        let headers = normalized;
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// Cells of `column` in row order, `None` where absent.
    pub fn column<'a>(&'a self, column: &'a str) -> impl Iterator<Item = Option<&'a Value>> + 'a {
        self.rows.iter().map(move |row| row.get(column))
    }
}

fn normalize_headers(headers: &[String]) -> Result<Vec<String>, DatasetError> {
    if headers.is_empty() {
        return Err(DatasetError::NoHeaders);
    }
    let mut normalized: Vec<String> = Vec::with_capacity(headers.len());
    for (idx, header) in headers.iter().enumerate() {
        let trimmed = header.trim();
        if trimmed.is_empty() {
            return Err(DatasetError::BlankHeader { position: idx + 1 });
        }
        if normalized.iter().any(|existing| existing == trimmed) {
            warn!("Duplicate header '{trimmed}' at position {} ignored", idx + 1);
            continue;
        }
        normalized.push(trimmed.to_string());
    }
    Ok(normalized)
}

pub fn parse_naive_date(value: &str) -> Option<NaiveDate> {
    const DATE_FORMATS: &[&str] = &[
        "%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d", "%d-%m-%Y", "%b %d, %Y", "%b %d %Y",
        "%d %b %Y",
    ];
    let trimmed = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn infer_distinguishes_numbers_booleans_and_text() {
        assert_eq!(Value::infer(""), None);
        assert_eq!(Value::infer("   "), None);
        assert_eq!(Value::infer("42"), Some(Value::Number(42.0)));
        assert_eq!(Value::infer(" -3.5 "), Some(Value::Number(-3.5)));
        assert_eq!(Value::infer("TRUE"), Some(Value::Boolean(true)));
        assert_eq!(Value::infer("Jan"), Some(Value::Text("Jan".to_string())));
        assert_eq!(Value::infer("inf"), Some(Value::Text("inf".to_string())));
    }

    #[test]
    fn headers_are_trimmed_and_deduplicated() {
        let dataset = Dataset::from_records(
            strings(&[" month ", "revenue", "revenue"]),
            vec![strings(&["Jan", "100", "999"])],
        )
        .unwrap();
        assert_eq!(dataset.headers(), &["month", "revenue"]);
        assert_eq!(dataset.value(0, "revenue"), Some(&Value::Number(100.0)));
    }

    #[test]
    fn blank_header_is_rejected() {
        let err = Dataset::new(strings(&["a", "  "]), Vec::new()).unwrap_err();
        assert_eq!(err, DatasetError::BlankHeader { position: 2 });
        assert_eq!(Dataset::new(Vec::new(), Vec::new()).unwrap_err(), DatasetError::NoHeaders);
    }

    #[test]
    fn short_records_leave_cells_absent() {
        let dataset =
            Dataset::from_records(strings(&["a", "b"]), vec![strings(&["1"])]).unwrap();
        assert_eq!(dataset.value(0, "b"), None);
        assert_eq!(dataset.column("a").count(), 1);
    }

    #[test]
    fn duplicate_header_cells_never_fill_the_first_column() {
        let dataset = Dataset::from_records(
            strings(&["revenue", "revenue", "units"]),
            vec![strings(&["", "999", "4"]), strings(&["12", "999", "5"])],
        )
        .unwrap();
        assert_eq!(dataset.headers(), &["revenue", "units"]);
        assert_eq!(dataset.value(0, "revenue"), None);
        assert_eq!(dataset.value(0, "units"), Some(&Value::Number(4.0)));
        assert_eq!(dataset.value(1, "revenue"), Some(&Value::Number(12.0)));
    }

    #[test]
    fn parse_naive_date_supports_multiple_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        assert_eq!(parse_naive_date("2024-05-06"), Some(expected));
        assert_eq!(parse_naive_date("2024/05/06"), Some(expected));
        assert_eq!(parse_naive_date("May 06, 2024"), Some(expected));
        assert_eq!(parse_naive_date("revenue"), None);
    }
}
