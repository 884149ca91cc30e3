//! Numeric coercion of dataset columns.
//!
//! Every statistical stage reads its input through this module, so the rules
//! for what counts as a number live in exactly one place.

use crate::data::{Dataset, Value};

const CURRENCY_PREFIXES: &[char] = &['$', '\u{20AC}', '\u{00A3}', '\u{00A5}'];

/// Coerces a cell to a finite number. Text is accepted after stripping a
/// leading currency sign, thousands separators and a trailing percent sign.
/// Booleans never coerce.
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) if n.is_finite() => Some(*n),
        Value::Number(_) | Value::Boolean(_) => None,
        Value::Text(text) => coerce_text(text),
    }
}

fn coerce_text(text: &str) -> Option<f64> {
    let mut token = text.trim();
    let negative = token.starts_with('-');
    if let Some(rest) = token.strip_prefix(['-', '+']) {
        token = rest.trim_start();
    }
    token = token.trim_start_matches(CURRENCY_PREFIXES);
    token = token.strip_suffix('%').unwrap_or(token).trim();
    // Only one leading sign; later signs may appear in an exponent.
    if !token.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return None;
    }
    let cleaned = if token.contains(',') {
        token.replace(',', "")
    } else {
        token.to_string()
    };
    if !cleaned
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
        return None;
    }
    let parsed = cleaned.parse::<f64>().ok().filter(|n| n.is_finite())?;
    Some(if negative { -parsed } else { parsed })
}

/// Finite numeric values of `column` in row order.
pub fn numeric_values(dataset: &Dataset, column: &str) -> Vec<f64> {
    dataset
        .column(column)
        .filter_map(|cell| cell.and_then(coerce_number))
        .collect()
}

/// Finite numeric values of `column` paired with their 1-based row number.
pub fn indexed_numeric_values(dataset: &Dataset, column: &str) -> Vec<(usize, f64)> {
    dataset
        .column(column)
        .enumerate()
        .filter_map(|(idx, cell)| cell.and_then(coerce_number).map(|v| (idx + 1, v)))
        .collect()
}

/// True when more than `ratio` of the first `sample_rows` rows hold a value
/// that coerces to a number. Absent cells count against the column.
pub fn is_numeric_column(dataset: &Dataset, column: &str, sample_rows: usize, ratio: f64) -> bool {
    let sampled = dataset.column(column).take(sample_rows).collect::<Vec<_>>();
    if sampled.is_empty() {
        return false;
    }
    let numeric = sampled
        .iter()
        .filter(|cell| cell.and_then(coerce_number).is_some())
        .count();
    numeric as f64 / sampled.len() as f64 > ratio
}

/// Headers whose sampled values are mostly numeric, in header order.
pub fn numeric_headers(dataset: &Dataset, sample_rows: usize, ratio: f64) -> Vec<String> {
    dataset
        .headers()
        .iter()
        .filter(|header| is_numeric_column(dataset, header, sample_rows, ratio))
        .cloned()
        .collect()
}
