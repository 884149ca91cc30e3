//! Text and JSON renderings of analysis results for the command line.

use std::fmt::Write as _;

use anyhow::{Context, Result};
use itertools::Itertools;

use crate::{
    analysis::Analysis,
    anomaly::AnomalyRecord,
    classify::DomainClassification,
    format::{format_change, format_number, format_percent},
    qa::Answer,
    stats::{self, ColumnSummary},
    table,
    trend::ColumnTrend,
};

pub fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Serializing report to JSON")
}

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

pub fn stats_table(summaries: &[ColumnSummary]) -> String {
    let rows = summaries
        .iter()
        .map(ColumnSummary::render_row)
        .collect::<Vec<_>>();
    table::render_table(&headers(stats::RENDER_HEADERS), &rows)
}

pub fn trends_table(trends: &[ColumnTrend]) -> String {
    let rows = trends
        .iter()
        .map(|t| {
            vec![
                t.column().to_string(),
                t.trend.direction.as_str().to_string(),
                format!("{:.2}", t.trend.strength),
                format_change(t.trend.percent_change),
                format_number(t.trend.slope),
                format!("{:.2}", t.trend.r_squared),
                t.trend.momentum.as_str().to_string(),
                format_percent(t.volatility.volatility),
                t.volatility.rating.to_string(),
            ]
        })
        .collect::<Vec<_>>();
    table::render_table(
        &headers(&[
            "column",
            "direction",
            "strength",
            "change",
            "slope",
            "r_squared",
            "momentum",
            "volatility",
            "rating",
        ]),
        &rows,
    )
}

pub fn anomalies_table(anomalies: &[AnomalyRecord]) -> String {
    let rows = anomalies
        .iter()
        .map(|a| {
            vec![
                a.column.clone(),
                a.row.to_string(),
                format_number(a.value),
                format!("{:.2}", a.z_score),
                a.kind.as_str().to_string(),
            ]
        })
        .collect::<Vec<_>>();
    table::render_table(&headers(&["column", "row", "value", "z_score", "type"]), &rows)
}

pub fn classification_text(classification: &DomainClassification) -> String {
    let keywords = classification
        .keywords
        .iter()
        .map(|group| group.join("/"))
        .join(", ");
    table::render_pairs(&[
        ("type", classification.tag.to_string()),
        ("label", classification.label.to_string()),
        ("confidence", format!("{:.2}", classification.confidence)),
        ("description", classification.description.to_string()),
        ("context", classification.context.to_string()),
        ("metrics", classification.metrics.join(", ")),
        (
            "keywords",
            if keywords.is_empty() {
                "(none)".to_string()
            } else {
                keywords
            },
        ),
    ])
}

pub fn answer_text(question: &str, answer: &Answer) -> String {
    let mut output = format!("Q: {question}\n\n{}\n", answer.answer.trim_end());
    if !answer.follow_up.is_empty() {
        output.push_str("\nFollow-up questions:\n");
        for follow_up in &answer.follow_up {
            let _ = writeln!(output, "  - {follow_up}");
        }
    }
    output
}

fn section(output: &mut String, title: &str) {
    let _ = writeln!(output, "\n{title}\n{}", "=".repeat(title.len()));
}

/// Full narrative report for the `analyze` command.
pub fn analysis_text(analysis: &Analysis) -> String {
    let mut output = String::new();
    let _ = writeln!(
        output,
        "{} ({:.0}% confidence)",
        analysis.classification.label,
        analysis.classification.confidence * 100.0
    );
    let _ = writeln!(output, "\n{}", analysis.summary);
    if analysis.is_empty() {
        return output;
    }

    if !analysis.findings.is_empty() {
        section(&mut output, "Key Findings");
        for finding in &analysis.findings {
            let _ = writeln!(output, "[{}] {}", finding.kind.as_str(), finding.title);
            let _ = writeln!(output, "    {}", finding.description);
        }
    }

    if !analysis.warnings.is_empty() {
        section(&mut output, "What To Watch");
        for warning in &analysis.warnings {
            let _ = writeln!(
                output,
                "[{}] {}",
                warning.severity.as_str(),
                warning.title
            );
            let _ = writeln!(output, "    {}", warning.description);
            let _ = writeln!(output, "    Action: {}", warning.action);
        }
    }

    if !analysis.context.is_empty() {
        section(&mut output, "Context");
        for item in &analysis.context {
            let _ = writeln!(
                output,
                "{} (benchmark {}, {})",
                item.title,
                item.benchmark,
                item.status.as_str()
            );
            let _ = writeln!(output, "    {}", item.description);
        }
    }

    if let Some(digest) = &analysis.trend_digest {
        section(&mut output, "Trend Overview");
        for message in &digest.messages {
            let _ = writeln!(output, "- {message}");
        }
    }

    if analysis.stats.iter().any(|s| s.stats.is_some()) {
        section(&mut output, "Column Statistics");
        output.push_str(&stats_table(&analysis.stats));
    }
    if !analysis.trends.is_empty() {
        section(&mut output, "Trends");
        output.push_str(&trends_table(&analysis.trends));
    }
    if !analysis.anomalies.is_empty() {
        section(&mut output, "Anomalies");
        output.push_str(&anomalies_table(&analysis.anomalies));
    }
    output
}
