//! Period-over-period volatility.

use std::fmt;

use serde::Serialize;

use crate::stats::{mean, population_std_dev};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum VolatilityRating {
    Low,
    Moderate,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl VolatilityRating {
    pub fn from_percent(volatility: f64) -> Self {
        if volatility < 5.0 {
            VolatilityRating::Low
        } else if volatility < 15.0 {
            VolatilityRating::Moderate
        } else if volatility < 30.0 {
            VolatilityRating::High
        } else {
            VolatilityRating::VeryHigh
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VolatilityRating::Low => "Low",
            VolatilityRating::Moderate => "Moderate",
            VolatilityRating::High => "High",
            VolatilityRating::VeryHigh => "Very High",
        }
    }

    pub fn is_high(&self) -> bool {
        matches!(self, VolatilityRating::High | VolatilityRating::VeryHigh)
    }
}

impl fmt::Display for VolatilityRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SwingDirection {
    Up,
    Down,
    Flat,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Swing {
    pub period: usize,
    /// Relative change in percent.
    pub change: f64,
    pub direction: SwingDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolatilityRecord {
    /// Standard deviation of relative returns, in percent.
    pub volatility: f64,
    pub rating: VolatilityRating,
    pub swings: Vec<Swing>,
}

impl VolatilityRecord {
    fn calm() -> Self {
        Self {
            volatility: 0.0,
            rating: VolatilityRating::Low,
            swings: Vec::new(),
        }
    }
}

/// Relative returns `(v[i] - v[i-1]) / |v[i-1]|`, skipping zero priors.
pub fn relative_returns(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0].abs())
        .collect()
}

pub fn calculate_volatility(values: &[f64]) -> VolatilityRecord {
    if values.len() < 3 {
        return VolatilityRecord::calm();
    }
    let returns = relative_returns(values);
    let Some(avg) = mean(&returns) else {
        return VolatilityRecord::calm();
    };
    let volatility = population_std_dev(&returns, avg) * 100.0;
    let swings = returns
        .iter()
        .enumerate()
        .map(|(idx, r)| Swing {
            period: idx + 1,
            change: r * 100.0,
            direction: if *r > 0.0 {
                SwingDirection::Up
            } else if *r < 0.0 {
                SwingDirection::Down
            } else {
                SwingDirection::Flat
            },
        })
        .collect();
    VolatilityRecord {
        volatility,
        rating: VolatilityRating::from_percent(volatility),
        swings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_growth_has_zero_volatility() {
        let record = calculate_volatility(&[100.0, 150.0, 225.0]);
        assert!(record.volatility.abs() < 1e-9);
        assert_eq!(record.rating, VolatilityRating::Low);
        assert_eq!(record.swings.len(), 2);
        assert_eq!(record.swings[0].direction, SwingDirection::Up);
        assert!((record.swings[0].change - 50.0).abs() < 1e-9);
    }

    #[test]
    fn alternating_series_is_very_volatile() {
        let record = calculate_volatility(&[100.0, 200.0, 100.0, 200.0]);
        // returns: +100%, -50%, +100%
        assert!(record.volatility > 30.0);
        assert_eq!(record.rating, VolatilityRating::VeryHigh);
        assert_eq!(record.swings[1].direction, SwingDirection::Down);
    }

    #[test]
    fn short_or_zero_series_report_low() {
        assert_eq!(calculate_volatility(&[1.0, 2.0]).rating, VolatilityRating::Low);
        let zeros = calculate_volatility(&[0.0, 0.0, 0.0]);
        assert_eq!(zeros.volatility, 0.0);
        assert!(zeros.swings.is_empty());
    }

    #[test]
    fn rating_bands() {
        assert_eq!(VolatilityRating::from_percent(4.9), VolatilityRating::Low);
        assert_eq!(VolatilityRating::from_percent(5.0), VolatilityRating::Moderate);
        assert_eq!(VolatilityRating::from_percent(29.9), VolatilityRating::High);
        assert_eq!(VolatilityRating::from_percent(30.0), VolatilityRating::VeryHigh);
        assert_eq!(VolatilityRating::VeryHigh.to_string(), "Very High");
    }
}
