use serde::Serialize;

use crate::{data::Dataset, extract, format::format_number};

/// Descriptive statistics for one column's numeric values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnStats {
    pub sum: f64,
    pub average: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    pub std_dev: f64,
    pub count: usize,
    pub coefficient_of_variation: f64,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
}

/// A header paired with its statistics; `stats` is `None` when nothing in the
/// column coerced to a number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    pub stats: Option<ColumnStats>,
}

impl ColumnStats {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let sorted = sorted_copy(values);
        let count = values.len();
        let sum = saturating_sum(values.iter().copied());
        let average = mean(values)?;
        let min = sorted[0];
        let max = sorted[count - 1];
        let std_dev = population_std_dev(values, average);
        let (q1, q3) = quartiles(&sorted);
        Some(Self {
            sum,
            average,
            median: median_of_sorted(&sorted),
            min,
            max,
            range: saturate(max - min),
            std_dev,
            count,
            coefficient_of_variation: if average != 0.0 {
                saturate(std_dev / average * 100.0)
            } else {
                0.0
            },
            q1,
            q3,
            iqr: saturate(q3 - q1),
        })
    }

    pub fn is_all_zero(&self) -> bool {
        self.min == 0.0 && self.max == 0.0
    }
}

impl ColumnSummary {
    pub fn numeric(&self) -> Option<(&str, &ColumnStats)> {
        self.stats.as_ref().map(|s| (self.column.as_str(), s))
    }

    pub fn render_row(&self) -> Vec<String> {
        match &self.stats {
            Some(stats) => vec![
                self.column.clone(),
                stats.count.to_string(),
                format_number(stats.sum),
                format_number(stats.min),
                format_number(stats.max),
                format_number(stats.average),
                format_number(stats.median),
                format_number(stats.std_dev),
                format!("{:.1}%", stats.coefficient_of_variation),
            ],
            None => {
                let mut row = vec![self.column.clone(), "0".to_string()];
                row.extend(std::iter::repeat_n(String::new(), 7));
                row
            }
        }
    }
}

pub const RENDER_HEADERS: &[&str] = &[
    "column", "count", "sum", "min", "max", "mean", "median", "std_dev", "cv",
];

/// Statistics for every header, aligned with `dataset.headers()`.
pub fn calculate_basic_stats(dataset: &Dataset) -> Vec<ColumnSummary> {
    dataset
        .headers()
        .iter()
        .map(|header| ColumnSummary {
            column: header.clone(),
            stats: ColumnStats::from_values(&extract::numeric_values(dataset, header)),
        })
        .collect()
}

/// Clamps an overflowed result back into the finite range.
pub fn saturate(value: f64) -> f64 {
    value.clamp(f64::MIN, f64::MAX)
}

/// Sum that stops at `f64::MAX` in magnitude instead of overflowing.
pub fn saturating_sum(values: impl IntoIterator<Item = f64>) -> f64 {
    saturate(values.into_iter().sum())
}

/// Arithmetic mean; finite for any finite input, including values near
/// `f64::MAX` whose plain sum overflows.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let sum = values.iter().sum::<f64>();
    if sum.is_finite() {
        Some(sum / n)
    } else {
        Some(values.iter().map(|v| v / n).sum())
    }
}

/// Population standard deviation around a precomputed mean.
pub fn population_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    if variance.is_finite() {
        return variance.max(0.0).sqrt();
    }
    // Halved deviations rescaled by the largest one cannot overflow.
    let halves = values.iter().map(|v| v / 2.0 - mean / 2.0).collect::<Vec<_>>();
    let scale = halves.iter().fold(0.0_f64, |top, d| top.max(d.abs()));
    if scale == 0.0 {
        return 0.0;
    }
    let scaled = halves.iter().map(|d| (d / scale).powi(2)).sum::<f64>() / n;
    saturate(2.0 * scale * scaled.sqrt())
}

pub(crate) fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len().is_multiple_of(2) {
        // Halving first keeps the midpoint finite near `f64::MAX`.
        sorted[mid - 1] / 2.0 + sorted[mid] / 2.0
    } else {
        sorted[mid]
    }
}

/// Lower-index quartiles: `sorted[floor(n * 0.25)]` and `sorted[floor(n * 0.75)]`.
pub(crate) fn quartiles(sorted: &[f64]) -> (f64, f64) {
    let n = sorted.len();
    let q1 = sorted[(n as f64 * 0.25).floor() as usize];
    let q3 = sorted[((n as f64 * 0.75).floor() as usize).min(n - 1)];
    (q1, q3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_values_computes_population_statistics() {
        let stats = ColumnStats::from_values(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(stats.count, 8);
        assert_eq!(stats.sum, 40.0);
        assert_eq!(stats.average, 5.0);
        assert_eq!(stats.median, 4.5);
        assert_eq!(stats.std_dev, 2.0);
        assert_eq!(stats.range, 7.0);
        assert!((stats.coefficient_of_variation - 40.0).abs() < 1e-9);
    }

    #[test]
    fn from_values_handles_odd_length_and_empty_input() {
        let stats = ColumnStats::from_values(&[3.0, 1.0, 2.0]).unwrap();
        assert_eq!(stats.median, 2.0);
        assert_eq!((stats.min, stats.max), (1.0, 3.0));
        assert!(ColumnStats::from_values(&[]).is_none());
    }

    #[test]
    fn coefficient_of_variation_is_zero_for_zero_mean() {
        let stats = ColumnStats::from_values(&[-1.0, 1.0]).unwrap();
        assert_eq!(stats.average, 0.0);
        assert_eq!(stats.coefficient_of_variation, 0.0);
        assert!(ColumnStats::from_values(&[0.0, 0.0]).unwrap().is_all_zero());
    }

    #[test]
    fn values_near_f64_max_stay_finite_and_ordered() {
        let stats = ColumnStats::from_values(&[1e308, 1.5e308]).unwrap();
        assert_eq!(stats.sum, f64::MAX);
        assert!((stats.average - 1.25e308).abs() <= 1e293);
        assert!((stats.median - 1.25e308).abs() <= 1e293);
        assert!(stats.min <= stats.median && stats.median <= stats.max);
        assert!(stats.std_dev.is_finite());
        assert!((stats.std_dev - 0.25e308).abs() <= 1e293);

        let spread = ColumnStats::from_values(&[-1.5e308, 1.5e308]).unwrap();
        assert_eq!(spread.average, 0.0);
        assert_eq!(spread.median, 0.0);
        assert_eq!(spread.range, f64::MAX);
        assert!(spread.std_dev.is_finite());
    }

    #[test]
    fn quartiles_use_lower_index_rule() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        assert_eq!(quartiles(&sorted), (3.0, 7.0));
        assert_eq!(quartiles(&[5.0]), (5.0, 5.0));
    }

    #[test]
    fn render_row_leaves_blank_cells_for_non_numeric_columns() {
        let summary = ColumnSummary {
            column: "month".to_string(),
            stats: None,
        };
        let row = summary.render_row();
        assert_eq!(row.len(), RENDER_HEADERS.len());
        assert_eq!(row[0], "month");
        assert_eq!(row[1], "0");
    }
}
