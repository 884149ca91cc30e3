//! Z-score and IQR-fence outlier detection.

use std::cmp::Ordering;

use log::debug;
use serde::Serialize;

use crate::{
    config::AnalysisOptions,
    data::Dataset,
    extract,
    stats::{self, mean, population_std_dev},
};

/// Minimum number of values before quartile fences are meaningful.
pub const IQR_MIN_VALUES: usize = 4;
const IQR_FENCE: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalyKind {
    High,
    Low,
}

impl AnomalyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyKind::High => "high",
            AnomalyKind::Low => "low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyRecord {
    pub column: String,
    /// 1-based position in the dataset's row order.
    pub row: usize,
    pub value: f64,
    pub z_score: f64,
    #[serde(rename = "type")]
    pub kind: AnomalyKind,
    pub deviation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IqrOutlier {
    pub row: usize,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IqrOutliers {
    pub column: String,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower: f64,
    pub upper: f64,
    pub outliers: Vec<IqrOutlier>,
}

/// Z-score outliers for one column's `(row, value)` pairs. Columns with too
/// few values or no spread produce nothing.
pub fn column_anomalies(
    column: &str,
    indexed: &[(usize, f64)],
    options: &AnalysisOptions,
) -> Vec<AnomalyRecord> {
    if indexed.len() < options.anomaly_min_values {
        return Vec::new();
    }
    let values = indexed.iter().map(|(_, v)| *v).collect::<Vec<_>>();
    let Some(avg) = mean(&values) else {
        return Vec::new();
    };
    let std_dev = population_std_dev(&values, avg);
    if std_dev == 0.0 {
        return Vec::new();
    }
    indexed
        .iter()
        .filter_map(|&(row, value)| {
            let z_score = (value - avg) / std_dev;
            (z_score.abs() >= options.anomaly_z_threshold).then(|| AnomalyRecord {
                column: column.to_string(),
                row,
                value,
                z_score,
                kind: if value > avg {
                    AnomalyKind::High
                } else {
                    AnomalyKind::Low
                },
                deviation: format!("{:.1} standard deviations", z_score.abs()),
            })
        })
        .collect()
}

/// Anomalies across every header, strongest first. Ties keep header order and
/// then row order.
pub fn detect_anomalies(dataset: &Dataset, options: &AnalysisOptions) -> Vec<AnomalyRecord> {
    let mut anomalies = dataset
        .headers()
        .iter()
        .flat_map(|header| {
            let indexed = extract::indexed_numeric_values(dataset, header);
            column_anomalies(header, &indexed, options)
        })
        .collect::<Vec<_>>();
    anomalies.sort_by(|a, b| {
        b.z_score
            .abs()
            .partial_cmp(&a.z_score.abs())
            .unwrap_or(Ordering::Equal)
    });
    debug!("Detected {} z-score anomalies", anomalies.len());
    anomalies
}

/// Values outside `[q1 - 1.5*iqr, q3 + 1.5*iqr]`. `None` below four values.
pub fn iqr_outliers(column: &str, indexed: &[(usize, f64)]) -> Option<IqrOutliers> {
    if indexed.len() < IQR_MIN_VALUES {
        return None;
    }
    let values = indexed.iter().map(|(_, v)| *v).collect::<Vec<_>>();
    let sorted = stats::sorted_copy(&values);
    let (q1, q3) = stats::quartiles(&sorted);
    let iqr = q3 - q1;
    let lower = q1 - IQR_FENCE * iqr;
    let upper = q3 + IQR_FENCE * iqr;
    let outliers = indexed
        .iter()
        .filter(|(_, value)| *value < lower || *value > upper)
        .map(|&(row, value)| IqrOutlier { row, value })
        .collect();
    Some(IqrOutliers {
        column: column.to_string(),
        q1,
        q3,
        iqr,
        lower,
        upper,
        outliers,
    })
}

/// IQR fences for every header with enough values; columns without outliers
/// are left out.
pub fn detect_iqr_outliers(dataset: &Dataset) -> Vec<IqrOutliers> {
    dataset
        .headers()
        .iter()
        .filter_map(|header| {
            iqr_outliers(header, &extract::indexed_numeric_values(dataset, header))
        })
        .filter(|fences| !fences.outliers.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indexed(values: &[f64]) -> Vec<(usize, f64)> {
        values.iter().enumerate().map(|(i, v)| (i + 1, *v)).collect()
    }

    #[test]
    fn single_spike_is_the_only_anomaly() {
        let mut values = vec![10.0; 11];
        values.insert(6, 100.0);
        let found = column_anomalies("sales", &indexed(&values), &AnalysisOptions::default());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].row, 7);
        assert_eq!(found[0].kind, AnomalyKind::High);
        assert!(found[0].z_score > 3.0);
        assert!(found[0].deviation.ends_with("standard deviations"));
    }

    #[test]
    fn short_or_constant_columns_are_skipped() {
        let options = AnalysisOptions::default();
        let mut short = vec![1.0; 8];
        short.push(500.0);
        assert!(column_anomalies("x", &indexed(&short), &options).is_empty());
        assert!(column_anomalies("x", &indexed(&[3.0; 20]), &options).is_empty());
    }

    #[test]
    fn low_side_outliers_are_typed_low() {
        let mut values = vec![50.0; 11];
        values.push(-400.0);
        let found = column_anomalies("x", &indexed(&values), &AnalysisOptions::default());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, AnomalyKind::Low);
        assert!(found[0].z_score < 0.0);
    }

    #[test]
    fn iqr_fences_flag_extremes() {
        let fences = iqr_outliers("x", &indexed(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 100.0]))
            .unwrap();
        assert_eq!(fences.q1, 3.0);
        assert_eq!(fences.q3, 7.0);
        assert_eq!(fences.upper, 13.0);
        assert_eq!(fences.outliers, vec![IqrOutlier { row: 8, value: 100.0 }]);
        assert!(iqr_outliers("x", &indexed(&[1.0, 2.0, 3.0])).is_none());
    }
}
