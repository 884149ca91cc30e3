//! Narrative synthesis: summary, key findings, warnings and benchmark context.

use std::cmp::Ordering;

use itertools::Itertools;
use serde::Serialize;

use crate::{
    anomaly::{AnomalyKind, AnomalyRecord, IqrOutliers},
    classify::DomainClassification,
    config::AnalysisOptions,
    format::{format_number, quoted_list},
    stats::{ColumnStats, ColumnSummary, saturating_sum},
    trend::{ColumnTrend, TrendDirection},
    volatility::VolatilityRating,
};

/// Anomalies beyond this many standard deviations become warnings.
pub const WARNING_Z_SCORE: f64 = 2.5;
const STRONG_TREND_PERCENT: f64 = 10.0;
const STRONG_TREND_STRENGTH: f64 = 0.2;
const DECLINE_WARNING_PERCENT: f64 = 20.0;
const SEVERE_DECLINE_PERCENT: f64 = -50.0;
const CONSISTENT_R_SQUARED: f64 = 0.8;
const DIGEST_MOVERS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingKind {
    Positive,
    Negative,
    Warning,
    Neutral,
}

impl FindingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingKind::Positive => "positive",
            FindingKind::Negative => "negative",
            FindingKind::Warning => "warning",
            FindingKind::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: FindingKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Warning {
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub action: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Above,
    Below,
    At,
    Info,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Above => "above",
            Status::Below => "below",
            Status::At => "at",
            Status::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextItem {
    pub title: String,
    pub description: String,
    pub benchmark: String,
    pub status: Status,
}

/// Reference figures for a domain: typical growth and volatility in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Benchmark {
    pub growth_rate: f64,
    pub volatility: f64,
    pub top_metric: &'static str,
}

const fn bench(growth_rate: f64, volatility: f64, top_metric: &'static str) -> Benchmark {
    Benchmark {
        growth_rate,
        volatility,
        top_metric,
    }
}

static BENCHMARKS: &[(&str, Benchmark)] = &[
    ("sales", bench(10.0, 20.0, "Revenue")),
    ("jobs", bench(5.0, 15.0, "Hiring Rate")),
    ("marketing", bench(15.0, 25.0, "Conversion Rate")),
    ("financial", bench(8.0, 15.0, "Profit Margin")),
    ("inventory", bench(5.0, 10.0, "Turnover Rate")),
    ("healthcare", bench(3.0, 8.0, "Patient Satisfaction")),
    ("education", bench(2.0, 10.0, "Graduation Rate")),
    ("ecommerce", bench(12.0, 20.0, "Conversion Rate")),
    ("hr", bench(5.0, 10.0, "Retention Rate")),
    ("logistics", bench(5.0, 15.0, "On-Time Delivery")),
    ("manufacturing", bench(4.0, 12.0, "Production Yield")),
    ("realestate", bench(6.0, 18.0, "Days on Market")),
    ("customerService", bench(4.0, 12.0, "Resolution Rate")),
    ("websiteAnalytics", bench(20.0, 30.0, "Bounce Rate")),
    ("socialMedia", bench(25.0, 35.0, "Engagement Rate")),
    ("timeSeries", bench(5.0, 15.0, "Period Change")),
    ("general", bench(5.0, 15.0, "Average Value")),
    ("survey", bench(0.0, 10.0, "Response Rate")),
    ("categorical", bench(0.0, 0.0, "Category Count")),
];

const DEFAULT_BENCHMARK: Benchmark = bench(5.0, 15.0, "Average Value");

/// Benchmark for a classification tag; unknown tags use the general row.
pub fn benchmark_for(tag: &str) -> Benchmark {
    BENCHMARKS
        .iter()
        .find(|(key, _)| *key == tag)
        .map(|(_, benchmark)| *benchmark)
        .unwrap_or(DEFAULT_BENCHMARK)
}

fn numeric_stats(stats: &[ColumnSummary]) -> impl Iterator<Item = (&str, &ColumnStats)> {
    stats.iter().filter_map(ColumnSummary::numeric)
}

pub fn empty_summary() -> String {
    "No data available for analysis. The dataset contains no rows.".to_string()
}

/// Narrative paragraph describing the dataset's size, domain and headline
/// averages.
pub fn generate_summary(
    row_count: usize,
    column_count: usize,
    classification: &DomainClassification,
    stats: &[ColumnSummary],
    options: &AnalysisOptions,
) -> String {
    let mut summary = format!(
        "This {} dataset contains {} records across {} columns, focusing on {}. ",
        classification.noun(),
        format_number(row_count as f64),
        column_count,
        classification.context
    );

    let averages = numeric_stats(stats)
        .map(|(column, s)| (column, s.average))
        .sorted_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal))
        .collect::<Vec<_>>();
    let (Some(highest), Some(lowest)) = (averages.first(), averages.last()) else {
        summary.push_str(&format!(
            "This dataset contains categorical information organized across {column_count} columns."
        ));
        return summary;
    };

    let total = saturating_sum(numeric_stats(stats).map(|(_, s)| s.sum));
    let metrics = classification
        .metrics
        .iter()
        .take(3)
        .join(", ")
        .to_lowercase();
    let top = averages
        .iter()
        .take(options.summary_top_columns)
        .map(|(column, avg)| format!("\"{column}\" (avg: {})", format_number(*avg)))
        .join(", ");
    summary.push_str(&format!("Key {metrics} show that {top}. "));
    summary.push_str(&format!(
        "\"{}\" has the highest average at {}, while \"{}\" averages {}. ",
        highest.0,
        format_number(highest.1),
        lowest.0,
        format_number(lowest.1)
    ));
    summary.push_str(&format!(
        "The total across all metrics is {}.",
        format_number(total)
    ));
    summary
}

pub fn generate_key_findings(
    stats: &[ColumnSummary],
    trends: &[ColumnTrend],
    anomalies: &[AnomalyRecord],
    options: &AnalysisOptions,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    let strong = trends.iter().find(|t| {
        t.trend
            .percent_change
            .is_some_and(|pc| pc.abs() > STRONG_TREND_PERCENT)
            && t.trend.strength > STRONG_TREND_STRENGTH
    });
    if let Some(top) = strong {
        let increasing = top.trend.direction == TrendDirection::Increasing;
        let change = top.trend.percent_change.unwrap_or_default().abs();
        findings.push(Finding {
            title: "Strong Trend Detected".to_string(),
            description: format!(
                "The \"{}\" has {} by {change:.1}% over the observed period, indicating notable {} in this metric.",
                top.column(),
                if increasing {
                    "grown significantly"
                } else {
                    "declined substantially"
                },
                if increasing { "growth" } else { "decline" }
            ),
            kind: if increasing {
                FindingKind::Positive
            } else {
                FindingKind::Negative
            },
        });
    }

    let total = saturating_sum(numeric_stats(stats).map(|(_, s)| s.sum));
    let largest = numeric_stats(stats).reduce(|best, next| if next.1.sum > best.1.sum { next } else { best });
    if let Some((column, s)) = largest {
        let share = if total != 0.0 { s.sum / total * 100.0 } else { 0.0 };
        findings.push(Finding {
            title: "Highest Volume Identified".to_string(),
            description: format!(
                "\"{column}\" shows the highest cumulative total at {}, representing {share:.1}% of all activity in this dataset.",
                format_number(s.sum)
            ),
            kind: FindingKind::Neutral,
        });
    }

    let highs = anomalies
        .iter()
        .filter(|a| a.kind == AnomalyKind::High)
        .take(2)
        .collect::<Vec<_>>();
    if let Some(first) = highs.first() {
        findings.push(Finding {
            title: "Exceptional Values Detected".to_string(),
            description: format!(
                "Found {} unusually high values, including {} in \"{}\" (row {}), which is {} above the norm and warrants investigation.",
                highs.len(),
                format_number(first.value),
                first.column,
                first.row,
                first.deviation
            ),
            kind: FindingKind::Warning,
        });
    }

    if let Some(volatile) = trends.iter().find(|t| t.volatility.rating.is_high()) {
        findings.push(Finding {
            title: "High Variability Detected".to_string(),
            description: format!(
                "\"{}\" shows {} volatility ({:.1}%), indicating significant fluctuations that may require attention.",
                volatile.column(),
                volatile.volatility.rating.as_str().to_lowercase(),
                volatile.volatility.volatility
            ),
            kind: FindingKind::Warning,
        });
    }

    if let Some(stable) = trends
        .iter()
        .find(|t| t.trend.direction == TrendDirection::Stable)
    {
        findings.push(Finding {
            title: "Consistent Performance Observed".to_string(),
            description: format!(
                "\"{}\" maintains steady levels with minimal variation ({} change), suggesting reliable and predictable patterns in this area.",
                stable.column(),
                stable
                    .trend
                    .percent_change
                    .map_or_else(|| "undefined".to_string(), |pc| format!("{pc:.1}%"))
            ),
            kind: FindingKind::Positive,
        });
    }

    findings.truncate(options.max_findings);
    findings
}

pub fn generate_warnings(
    stats: &[ColumnSummary],
    trends: &[ColumnTrend],
    anomalies: &[AnomalyRecord],
    classification: &DomainClassification,
) -> Vec<Warning> {
    let context = classification.context;
    let mut warnings = Vec::new();

    let significant = anomalies
        .iter()
        .filter(|a| a.z_score.abs() > WARNING_Z_SCORE)
        .count();
    if significant > 0 {
        warnings.push(Warning {
            title: "Significant Outliers Detected".to_string(),
            description: format!(
                "{significant} values exceed {WARNING_Z_SCORE} standard deviations from the mean, which may indicate data anomalies, exceptional events, or errors requiring investigation within {context}."
            ),
            severity: Severity::High,
            action: "Review outlier rows for accuracy and contextual validity".to_string(),
        });
    }

    let declining = trends.iter().find_map(|t| {
        let pc = t.trend.percent_change?;
        (t.trend.direction == TrendDirection::Decreasing && pc.abs() > DECLINE_WARNING_PERCENT)
            .then_some((t.column(), pc))
    });
    if let Some((column, pc)) = declining {
        warnings.push(Warning {
            title: "Declining Metrics Need Attention".to_string(),
            description: format!(
                "\"{column}\" has declined by {:.1}%. This sustained decrease warrants investigation into root causes within {context}.",
                pc.abs()
            ),
            severity: if pc < SEVERE_DECLINE_PERCENT {
                Severity::High
            } else {
                Severity::Medium
            },
            action: format!("Investigate factors causing decline in \"{column}\" within {context}"),
        });
    }

    if let Some(extreme) = trends
        .iter()
        .find(|t| t.volatility.rating == VolatilityRating::VeryHigh)
    {
        warnings.push(Warning {
            title: "Extreme Variability Pattern".to_string(),
            description: format!(
                "\"{}\" exhibits very high volatility ({:.1}%), suggesting unpredictable fluctuations that could indicate instability in {context}.",
                extreme.column(),
                extreme.volatility.volatility
            ),
            severity: Severity::Medium,
            action: "Identify external factors causing volatility".to_string(),
        });
    }

    let inactive = numeric_stats(stats)
        .filter(|(_, s)| s.is_all_zero())
        .map(|(column, _)| column)
        .collect::<Vec<_>>();
    if !inactive.is_empty() {
        warnings.push(Warning {
            title: "Inactive Metrics Found".to_string(),
            description: format!(
                "{} column(s) contain only zero values: {}. These may be placeholder metrics or data that needs attention.",
                inactive.len(),
                quoted_list(inactive.iter().take(3).copied())
            ),
            severity: Severity::Low,
            action: "Verify if these columns should contain data for analysis".to_string(),
        });
    }

    warnings
}

/// Mean absolute percent change over trends with a defined change.
pub fn average_abs_change(trends: &[ColumnTrend]) -> Option<f64> {
    let changes = trends
        .iter()
        .filter_map(|t| t.trend.percent_change.map(f64::abs))
        .collect::<Vec<_>>();
    crate::stats::mean(&changes)
}

pub fn average_volatility(trends: &[ColumnTrend]) -> f64 {
    if trends.is_empty() {
        return 0.0;
    }
    trends.iter().map(|t| t.volatility.volatility).sum::<f64>() / trends.len() as f64
}

pub fn growth_assessment(avg_growth: f64, benchmark: &Benchmark) -> &'static str {
    let target = benchmark.growth_rate;
    if avg_growth > target * 2.0 {
        "exceptional"
    } else if avg_growth > target {
        "strong"
    } else if avg_growth > target / 2.0 {
        "moderate"
    } else {
        "subdued"
    }
}

pub fn generate_context(
    trends: &[ColumnTrend],
    classification: &DomainClassification,
) -> Vec<ContextItem> {
    let benchmark = benchmark_for(classification.tag);
    let noun = classification.noun();
    let context = classification.context;
    let mut items = Vec::new();

    if let Some(avg_growth) = average_abs_change(trends) {
        let target = benchmark.growth_rate;
        items.push(ContextItem {
            title: format!("{} Performance", benchmark.top_metric),
            description: format!(
                "Average change across all {noun} metrics is {avg_growth:.1}%, which is {} compared to typical {noun} benchmarks of {target}% in {context}.",
                growth_assessment(avg_growth, &benchmark)
            ),
            benchmark: format!("{target}%"),
            status: if avg_growth > target {
                Status::Above
            } else if avg_growth < target / 2.0 {
                Status::Below
            } else {
                Status::At
            },
        });
    }

    let avg_volatility = average_volatility(trends);
    if avg_volatility > 0.0 {
        let calmer = avg_volatility < benchmark.volatility;
        items.push(ContextItem {
            title: "Stability Assessment".to_string(),
            description: format!(
                "Average volatility is {avg_volatility:.1}%, {}",
                if calmer {
                    "indicating more stable performance than typical industry benchmarks."
                } else {
                    "suggesting higher fluctuation than typical standards in this domain."
                }
            ),
            benchmark: format!("{}%", benchmark.volatility),
            status: if calmer { Status::Above } else { Status::Below },
        });
    }

    items.push(ContextItem {
        title: "Domain Context".to_string(),
        description: format!(
            "This {noun} should be evaluated against industry standards for {context}."
        ),
        benchmark: "Industry Varies".to_string(),
        status: Status::Info,
    });
    items
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DirectionCounts {
    pub increasing: usize,
    pub decreasing: usize,
    pub volatile: usize,
    pub stable: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Mover {
    pub column: String,
    pub percent_change: Option<f64>,
}

/// Cross-column overview of the trend set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendDigest {
    pub total_columns: usize,
    /// Counted by step momentum, the only classification that can be volatile.
    pub distribution: DirectionCounts,
    pub biggest_movers: Vec<Mover>,
    /// Columns whose linear fit explains more than 80% of the variance.
    pub consistent_trends: usize,
    pub total_outliers: usize,
    pub messages: Vec<String>,
}

pub fn trend_digest(trends: &[ColumnTrend], outliers: &[IqrOutliers]) -> Option<TrendDigest> {
    if trends.is_empty() {
        return None;
    }
    let mut distribution = DirectionCounts::default();
    for t in trends {
        match t.trend.momentum {
            TrendDirection::Increasing => distribution.increasing += 1,
            TrendDirection::Decreasing => distribution.decreasing += 1,
            TrendDirection::Volatile => distribution.volatile += 1,
            TrendDirection::Stable => distribution.stable += 1,
        }
    }
    // Trends arrive ordered by magnitude already.
    let biggest_movers = trends
        .iter()
        .take(DIGEST_MOVERS)
        .map(|t| Mover {
            column: t.column().to_string(),
            percent_change: t.trend.percent_change,
        })
        .collect::<Vec<_>>();
    let consistent_trends = trends
        .iter()
        .filter(|t| t.trend.r_squared > CONSISTENT_R_SQUARED)
        .count();
    let total_outliers = outliers.iter().map(|o| o.outliers.len()).sum();

    let total = trends.len();
    let mut messages = vec![if distribution.increasing > distribution.decreasing {
        format!(
            "Overall positive trend: {} of {total} metrics are increasing",
            distribution.increasing
        )
    } else if distribution.decreasing > distribution.increasing {
        format!(
            "Overall declining trend: {} of {total} metrics are decreasing",
            distribution.decreasing
        )
    } else {
        format!("Mixed trends across {total} metrics")
    }];
    if let Some(Mover {
        column,
        percent_change: Some(pc),
    }) = biggest_movers.first()
    {
        let verb = if *pc > 0.0 { "increased" } else { "decreased" };
        messages.push(format!("\"{column}\" {verb} by {:.1}%", pc.abs()));
    }
    if consistent_trends > 0 {
        messages.push(format!(
            "{consistent_trends} metric(s) show very strong trends (>80% consistency)"
        ));
    }
    if total_outliers > 0 {
        let columns = outliers.iter().filter(|o| !o.outliers.is_empty()).count();
        messages.push(format!(
            "{total_outliers} outlier(s) detected across {columns} column(s)"
        ));
    }

    Some(TrendDigest {
        total_columns: total,
        distribution,
        biggest_movers,
        consistent_trends,
        total_outliers,
        messages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trend::TrendRecord;
    use crate::volatility::calculate_volatility;

    fn column_trend(column: &str, values: &[f64]) -> ColumnTrend {
        ColumnTrend {
            trend: TrendRecord::from_values(column, values).unwrap(),
            volatility: calculate_volatility(values),
        }
    }

    fn summary(column: &str, values: &[f64]) -> ColumnSummary {
        ColumnSummary {
            column: column.to_string(),
            stats: ColumnStats::from_values(values),
        }
    }

    #[test]
    fn benchmark_lookup_falls_back_to_general() {
        assert_eq!(benchmark_for("sales").top_metric, "Revenue");
        assert_eq!(benchmark_for("socialMedia").growth_rate, 25.0);
        assert_eq!(benchmark_for("empty"), benchmark_for("general"));
    }

    #[test]
    fn strong_growth_leads_the_findings() {
        let trends = vec![column_trend("revenue", &[100.0, 150.0, 225.0])];
        let stats = vec![summary("revenue", &[100.0, 150.0, 225.0])];
        let findings = generate_key_findings(&stats, &trends, &[], &AnalysisOptions::default());
        assert_eq!(findings[0].title, "Strong Trend Detected");
        assert_eq!(findings[0].kind, FindingKind::Positive);
        assert!(findings[0].description.contains("125.0%"));
        assert_eq!(findings[1].title, "Highest Volume Identified");
        assert!(findings[1].description.contains("100.0%"));
    }

    #[test]
    fn all_zero_column_is_an_inactive_warning() {
        let stats = vec![summary("refunds", &[0.0, 0.0, 0.0])];
        let warnings = generate_warnings(&stats, &[], &[], &DomainClassification::empty());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].title, "Inactive Metrics Found");
        assert_eq!(warnings[0].severity, Severity::Low);
        assert!(warnings[0].description.contains("\"refunds\""));
    }

    #[test]
    fn steep_decline_is_high_severity() {
        let trends = vec![column_trend("units", &[100.0, 70.0, 40.0, 10.0])];
        let warnings = generate_warnings(&[], &trends, &[], &DomainClassification::empty());
        assert_eq!(warnings[0].title, "Declining Metrics Need Attention");
        assert_eq!(warnings[0].severity, Severity::High);
        assert!(warnings[0].action.contains("\"units\""));
    }

    #[test]
    fn context_always_ends_with_domain_item() {
        let items = generate_context(&[], &DomainClassification::empty());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].status, Status::Info);
        assert_eq!(items[0].benchmark, "Industry Varies");
    }

    #[test]
    fn growth_assessment_bands() {
        let sales = benchmark_for("sales");
        assert_eq!(growth_assessment(25.0, &sales), "exceptional");
        assert_eq!(growth_assessment(15.0, &sales), "strong");
        assert_eq!(growth_assessment(6.0, &sales), "moderate");
        assert_eq!(growth_assessment(2.0, &sales), "subdued");
    }

    #[test]
    fn digest_counts_momentum_and_movers() {
        let trends = vec![
            column_trend("a", &[1.0, 2.0, 3.0, 4.0]),
            column_trend("b", &[4.0, 3.0, 2.0, 1.0]),
            column_trend("c", &[1.0, 2.0, 3.0, 5.0]),
        ];
        let digest = trend_digest(&trends, &[]).unwrap();
        assert_eq!(digest.distribution.increasing, 2);
        assert_eq!(digest.distribution.decreasing, 1);
        assert_eq!(digest.biggest_movers.len(), 3);
        assert!(digest.messages[0].starts_with("Overall positive trend"));
        assert!(trend_digest(&[], &[]).is_none());
    }
}
