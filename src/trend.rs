//! Linear trend fitting over a column's values in row order.

use std::cmp::Ordering;

use serde::Serialize;

use crate::{
    data::Dataset,
    extract,
    stats::mean,
    volatility::{self, VolatilityRecord},
};

/// Below this normalised strength a trend is reported as stable.
pub const STABLE_STRENGTH: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
    Volatile,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::Stable => "stable",
            TrendDirection::Volatile => "volatile",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendRecord {
    pub column: String,
    pub direction: TrendDirection,
    pub strength: f64,
    pub slope: f64,
    /// `None` when the series starts at zero and ends elsewhere.
    pub percent_change: Option<f64>,
    pub start_value: f64,
    pub end_value: f64,
    pub r_squared: f64,
    pub momentum: TrendDirection,
    pub period_change: Option<f64>,
    pub data_points: usize,
    pub average: f64,
}

/// A column's trend together with its volatility profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnTrend {
    pub trend: TrendRecord,
    pub volatility: VolatilityRecord,
}

impl ColumnTrend {
    pub fn column(&self) -> &str {
        &self.trend.column
    }
}

impl TrendRecord {
    /// Fits an ordinary least-squares line against the row index. Returns
    /// `None` for fewer than two values.
    pub fn from_values(column: &str, values: &[f64]) -> Option<Self> {
        let n = values.len();
        if n < 2 {
            return None;
        }
        let fit = least_squares(values);
        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(*v), hi.max(*v))
            });
        let range = max - min;
        let strength = if range == 0.0 {
            0.0
        } else {
            (fit.slope.abs() / (range / (n - 1) as f64)).min(1.0)
        };
        let direction = if strength < STABLE_STRENGTH {
            TrendDirection::Stable
        } else if fit.slope > 0.0 {
            TrendDirection::Increasing
        } else {
            TrendDirection::Decreasing
        };
        let first = values[0];
        let last = values[n - 1];
        let midpoint = n / 2;
        let period_change = match (mean(&values[..midpoint]), mean(&values[midpoint..])) {
            (Some(before), Some(after)) => growth_rate(before, after),
            _ => Some(0.0),
        };

        Some(Self {
            column: column.to_string(),
            direction,
            strength,
            slope: fit.slope,
            percent_change: growth_rate(first, last),
            start_value: first,
            end_value: last,
            r_squared: fit.r_squared,
            momentum: step_momentum(values),
            period_change,
            data_points: n,
            average: fit.y_mean,
        })
    }

    /// Absolute percent change used for ranking; undefined growth ranks below
    /// every defined change.
    pub fn magnitude(&self) -> f64 {
        self.percent_change.map_or(-1.0, f64::abs)
    }
}

/// `(new - old) / |old| * 100`. Two zeros give `Some(0)`; a zero baseline with
/// a nonzero end has no finite percentage and gives `None`.
pub fn growth_rate(old: f64, new: f64) -> Option<f64> {
    if old == 0.0 {
        return if new == 0.0 { Some(0.0) } else { None };
    }
    Some((new - old) / old.abs() * 100.0)
}

struct LinearFit {
    slope: f64,
    r_squared: f64,
    y_mean: f64,
}

fn least_squares(values: &[f64]) -> LinearFit {
    let n = values.len();
    let x_mean = (n as f64 - 1.0) / 2.0;
    let y_mean = mean(values).unwrap_or_default();
    let (mut ss_xy, mut ss_xx, mut ss_yy) = (0.0, 0.0, 0.0);
    for (idx, value) in values.iter().enumerate() {
        let dx = idx as f64 - x_mean;
        let dy = value - y_mean;
        ss_xy += dx * dy;
        ss_xx += dx * dx;
        ss_yy += dy * dy;
    }
    let slope = if ss_xx != 0.0 { ss_xy / ss_xx } else { 0.0 };
    let r_squared = if ss_xx == 0.0 || ss_yy == 0.0 {
        0.0
    } else {
        (ss_xy * ss_xy) / (ss_xx * ss_yy)
    };
    LinearFit {
        slope,
        r_squared,
        y_mean,
    }
}

/// Direction by majority of consecutive steps: more than 60% up or down wins;
/// when both exceed 30% the series is volatile.
pub fn step_momentum(values: &[f64]) -> TrendDirection {
    if values.len() < 2 {
        return TrendDirection::Stable;
    }
    let steps = values.len() - 1;
    let ups = values.windows(2).filter(|w| w[1] > w[0]).count();
    let downs = values.windows(2).filter(|w| w[1] < w[0]).count();
    let up_ratio = ups as f64 / steps as f64;
    let down_ratio = downs as f64 / steps as f64;
    if up_ratio > 0.6 {
        TrendDirection::Increasing
    } else if down_ratio > 0.6 {
        TrendDirection::Decreasing
    } else if up_ratio > 0.3 && down_ratio > 0.3 {
        TrendDirection::Volatile
    } else {
        TrendDirection::Stable
    }
}

/// Trend and volatility for every header with at least two numeric values,
/// ordered by absolute percent change (largest first).
pub fn detect_trends(dataset: &Dataset) -> Vec<ColumnTrend> {
    let mut trends = dataset
        .headers()
        .iter()
        .filter_map(|header| {
            let values = extract::numeric_values(dataset, header);
            let trend = TrendRecord::from_values(header, &values)?;
            Some(ColumnTrend {
                trend,
                volatility: volatility::calculate_volatility(&values),
            })
        })
        .collect::<Vec<_>>();
    trends.sort_by(|a, b| {
        b.trend
            .magnitude()
            .partial_cmp(&a.trend.magnitude())
            .unwrap_or(Ordering::Equal)
    });
    trends
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revenue_growth_is_increasing() {
        let trend = TrendRecord::from_values("revenue", &[100.0, 150.0, 225.0]).unwrap();
        assert_eq!(trend.direction, TrendDirection::Increasing);
        assert_eq!(trend.percent_change, Some(125.0));
        assert!((trend.slope - 62.5).abs() < 1e-9);
        assert!((trend.strength - 1.0).abs() < 1e-9);
        assert_eq!((trend.start_value, trend.end_value), (100.0, 225.0));
        assert_eq!(trend.data_points, 3);
    }

    #[test]
    fn flat_series_is_stable_with_zero_strength() {
        let trend = TrendRecord::from_values("flat", &[5.0, 5.0, 5.0, 5.0]).unwrap();
        assert_eq!(trend.direction, TrendDirection::Stable);
        assert_eq!(trend.strength, 0.0);
        assert_eq!(trend.r_squared, 0.0);
        assert_eq!(trend.percent_change, Some(0.0));
    }

    #[test]
    fn decreasing_series_has_negative_slope() {
        let trend = TrendRecord::from_values("units", &[40.0, 30.0, 20.0, 10.0]).unwrap();
        assert_eq!(trend.direction, TrendDirection::Decreasing);
        assert!(trend.slope < 0.0);
        assert_eq!(trend.percent_change, Some(-75.0));
        assert!((trend.r_squared - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_baseline_growth_is_undefined() {
        let trend = TrendRecord::from_values("signups", &[0.0, 5.0, 10.0]).unwrap();
        assert_eq!(trend.percent_change, None);
        assert_eq!(growth_rate(0.0, 0.0), Some(0.0));
        assert_eq!(trend.magnitude(), -1.0);
    }

    #[test]
    fn short_series_yield_no_trend() {
        assert!(TrendRecord::from_values("x", &[1.0]).is_none());
        assert!(TrendRecord::from_values("x", &[]).is_none());
    }

    #[test]
    fn momentum_detects_zigzag_as_volatile() {
        assert_eq!(
            step_momentum(&[1.0, 5.0, 2.0, 6.0, 3.0, 7.0]),
            TrendDirection::Volatile
        );
        assert_eq!(step_momentum(&[1.0, 2.0, 3.0, 2.5]), TrendDirection::Increasing);
        assert_eq!(step_momentum(&[3.0, 3.0, 3.0]), TrendDirection::Stable);
    }

    #[test]
    fn period_change_compares_halves() {
        let trend = TrendRecord::from_values("x", &[10.0, 10.0, 20.0, 20.0]).unwrap();
        assert_eq!(trend.period_change, Some(100.0));
    }
}
