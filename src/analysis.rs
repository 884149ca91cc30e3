//! One-shot pipeline over a [`Dataset`]: every stage runs once and the results
//! are kept so questions can be answered repeatedly without recomputation.

use log::{debug, info};
use serde::Serialize;

use crate::{
    anomaly::{self, AnomalyRecord, IqrOutliers},
    classify::{self, DomainClassification},
    config::AnalysisOptions,
    data::Dataset,
    extract,
    insight::{self, ContextItem, Finding, TrendDigest, Warning},
    qa::{self, Answer},
    stats::{self, ColumnStats, ColumnSummary},
    trend::{self, ColumnTrend},
};

/// Row positions of a column's largest and smallest values. The first
/// occurrence wins when a value repeats.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnExtremes {
    pub column: String,
    pub max: f64,
    pub max_row: usize,
    pub min: f64,
    pub min_row: usize,
}

impl ColumnExtremes {
    fn from_indexed(column: &str, indexed: &[(usize, f64)]) -> Option<Self> {
        let (&(first_row, first), rest) = indexed.split_first()?;
        let mut extremes = Self {
            column: column.to_string(),
            max: first,
            max_row: first_row,
            min: first,
            min_row: first_row,
        };
        for &(row, value) in rest {
            if value > extremes.max {
                extremes.max = value;
                extremes.max_row = row;
            }
            if value < extremes.min {
                extremes.min = value;
                extremes.min_row = row;
            }
        }
        Some(extremes)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub row_count: usize,
    pub column_count: usize,
    pub headers: Vec<String>,
    pub classification: DomainClassification,
    pub stats: Vec<ColumnSummary>,
    pub trends: Vec<ColumnTrend>,
    pub anomalies: Vec<AnomalyRecord>,
    pub iqr_outliers: Vec<IqrOutliers>,
    pub summary: String,
    pub findings: Vec<Finding>,
    pub warnings: Vec<Warning>,
    pub context: Vec<ContextItem>,
    pub trend_digest: Option<TrendDigest>,
    #[serde(skip)]
    question_columns: Vec<String>,
    #[serde(skip)]
    extremes: Vec<ColumnExtremes>,
}

impl Analysis {
    pub fn run(dataset: &Dataset, options: &AnalysisOptions) -> Self {
        if dataset.is_empty() {
            info!("Dataset has no rows; skipping analysis");
            return Self::empty(dataset);
        }

        let classification = classify::classify(dataset, options);
        let stats = stats::calculate_basic_stats(dataset);
        let trends = trend::detect_trends(dataset);
        let anomalies = anomaly::detect_anomalies(dataset, options);
        let iqr_outliers = anomaly::detect_iqr_outliers(dataset);
        debug!(
            "Computed {} column stats, {} trends, {} anomalies",
            stats.len(),
            trends.len(),
            anomalies.len()
        );

        let summary = insight::generate_summary(
            dataset.row_count(),
            dataset.column_count(),
            &classification,
            &stats,
            options,
        );
        let findings = insight::generate_key_findings(&stats, &trends, &anomalies, options);
        let warnings = insight::generate_warnings(&stats, &trends, &anomalies, &classification);
        let context = insight::generate_context(&trends, &classification);
        let trend_digest = insight::trend_digest(&trends, &iqr_outliers);

        let question_columns = extract::numeric_headers(
            dataset,
            options.numeric_sample_rows,
            options.question_numeric_ratio,
        );
        let extremes = dataset
            .headers()
            .iter()
            .filter_map(|header| {
                ColumnExtremes::from_indexed(
                    header,
                    &extract::indexed_numeric_values(dataset, header),
                )
            })
            .collect();

        Self {
            row_count: dataset.row_count(),
            column_count: dataset.column_count(),
            headers: dataset.headers().to_vec(),
            classification,
            stats,
            trends,
            anomalies,
            iqr_outliers,
            summary,
            findings,
            warnings,
            context,
            trend_digest,
            question_columns,
            extremes,
        }
    }

    fn empty(dataset: &Dataset) -> Self {
        Self {
            row_count: 0,
            column_count: dataset.column_count(),
            headers: dataset.headers().to_vec(),
            classification: DomainClassification::empty(),
            stats: Vec::new(),
            trends: Vec::new(),
            anomalies: Vec::new(),
            iqr_outliers: Vec::new(),
            summary: insight::empty_summary(),
            findings: Vec::new(),
            warnings: Vec::new(),
            context: Vec::new(),
            trend_digest: None,
            question_columns: Vec::new(),
            extremes: Vec::new(),
        }
    }

    pub fn answer_question(&self, question: &str) -> Answer {
        qa::answer_question(self, question)
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Columns considered numeric for question answering, in header order.
    pub fn question_columns(&self) -> &[String] {
        &self.question_columns
    }

    pub fn column_stats(&self, column: &str) -> Option<&ColumnStats> {
        self.stats
            .iter()
            .find(|s| s.column == column)
            .and_then(|s| s.stats.as_ref())
    }

    pub fn trend_for(&self, column: &str) -> Option<&ColumnTrend> {
        self.trends.iter().find(|t| t.column() == column)
    }

    pub fn anomalies_for<'a>(
        &'a self,
        column: &'a str,
    ) -> impl Iterator<Item = &'a AnomalyRecord> + 'a {
        self.anomalies.iter().filter(move |a| a.column == column)
    }

    pub fn extremes_for(&self, column: &str) -> Option<&ColumnExtremes> {
        self.extremes.iter().find(|e| e.column == column)
    }
}
