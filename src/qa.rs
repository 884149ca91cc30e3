//! Keyword-driven question answering over a finished [`Analysis`].
//!
//! Questions are matched against an ordered list of intents; the first intent
//! whose keywords appear and whose handler finds enough data produces the
//! answer. A handler that lacks data declines, letting dispatch fall through
//! to later intents and finally to a generic help answer.

use std::{collections::HashSet, fmt::Write as _, sync::OnceLock};

use itertools::Itertools;
use log::debug;
use regex::Regex;
use serde::Serialize;

use crate::{
    analysis::Analysis,
    format::{format_change, format_number, format_percent},
    insight::FindingKind,
    stats::{ColumnStats, saturating_sum},
    trend::{ColumnTrend, TrendDirection},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub answer: String,
    pub follow_up: Vec<String>,
}

impl Answer {
    fn new(answer: String, follow_up: Vec<String>) -> Self {
        Self { answer, follow_up }
    }
}

type Handler = fn(&Analysis, &str) -> Option<Answer>;

/// A question category: keyword predicate plus the handler answering it.
pub struct Intent {
    pub name: &'static str,
    matches: fn(&str) -> bool,
    handler: Handler,
}

impl Intent {
    pub fn matches(&self, question: &str) -> bool {
        (self.matches)(question)
    }
}

fn contains_any(question: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| question.contains(k))
}

const HIGH_WORDS: &[&str] = &["highest", "largest", "biggest", "max", "peak"];
const LOW_WORDS: &[&str] = &["lowest", "smallest", "min", "bottom", "trough"];
const AVERAGE_WORDS: &[&str] = &["average", "mean", "typical"];
const CAUSE_WORDS: &[&str] = &["why", "reason", "cause", "explain"];
const CHANGE_WORDS: &[&str] = &[
    "high", "low", "increase", "decrease", "unusual", "anomaly", " spike", "drop",
];
const TOTAL_WORDS: &[&str] = &["total", "sum", "overall", "aggregate"];
const TREND_WORDS: &[&str] = &["trend", "changing", "over time", "pattern"];
const ANOMALY_WORDS: &[&str] = &[
    "anomaly", "unusual", "outlier", "strange", "abnormal", "exceptional",
];
const GROWTH_WORDS: &[&str] = &["growth", "increase", "decrease", "change"];
const COMPARE_WORDS: &[&str] = &["compare", "comparison", "vs", "versus", "difference between"];
const DESCRIBE_WORDS: &[&str] = &[
    "what is", "what are", "tell me about", "overview of", "summary of",
];
const RECOMMEND_WORDS: &[&str] = &[
    "recommend", "suggest", "should i", "action", "what to do", "advice", "next step",
];
const BENCHMARK_WORDS: &[&str] = &["benchmark", "industry", "standard", "normal", "typical"];

/// Dispatch order; the first intent that matches and does not decline wins.
pub static INTENTS: &[Intent] = &[
    Intent {
        name: "highest",
        matches: |q| contains_any(q, HIGH_WORDS),
        handler: answer_highest,
    },
    Intent {
        name: "lowest",
        matches: |q| contains_any(q, LOW_WORDS),
        handler: answer_lowest,
    },
    Intent {
        name: "average",
        matches: |q| contains_any(q, AVERAGE_WORDS),
        handler: answer_average,
    },
    Intent {
        name: "cause",
        matches: |q| contains_any(q, CAUSE_WORDS) && contains_any(q, CHANGE_WORDS),
        handler: answer_cause,
    },
    Intent {
        name: "total",
        matches: |q| contains_any(q, TOTAL_WORDS),
        handler: answer_total,
    },
    Intent {
        name: "trend",
        matches: |q| contains_any(q, TREND_WORDS),
        handler: answer_trend,
    },
    Intent {
        name: "anomaly",
        matches: |q| contains_any(q, ANOMALY_WORDS),
        handler: answer_anomalies,
    },
    Intent {
        name: "growth",
        matches: |q| contains_any(q, GROWTH_WORDS),
        handler: answer_growth,
    },
    Intent {
        name: "comparison",
        matches: |q| contains_any(q, COMPARE_WORDS),
        handler: answer_comparison,
    },
    Intent {
        name: "describe",
        matches: |q| contains_any(q, DESCRIBE_WORDS),
        handler: answer_describe,
    },
    Intent {
        name: "recommendation",
        matches: |q| contains_any(q, RECOMMEND_WORDS),
        handler: answer_recommendations,
    },
    Intent {
        name: "benchmark",
        matches: |q| contains_any(q, BENCHMARK_WORDS),
        handler: answer_benchmarks,
    },
];

/// Answers `question` from the precomputed analysis. Never fails; unmatched
/// questions receive the help answer.
pub fn answer_question(analysis: &Analysis, question: &str) -> Answer {
    if analysis.row_count == 0 {
        return no_data_answer();
    }
    let lowered = question.to_lowercase();
    for intent in INTENTS {
        if !intent.matches(&lowered) {
            continue;
        }
        match (intent.handler)(analysis, &lowered) {
            Some(answer) => {
                debug!("Question answered by '{}' intent", intent.name);
                return answer;
            }
            None => debug!("Intent '{}' declined; trying the next one", intent.name),
        }
    }
    debug!("No intent answered; using help text");
    fallback_answer(analysis)
}

const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "what", "which", "with", "how", "does", "did", "this", "that", "are",
    "was", "were", "has", "have", "about", "tell", "show", "from", "into", "your", "my", "our",
    "there", "any", "its", "why", "is", "so", "me", "of", "in", "on", "to",
];

fn tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() >= 3 && !STOP_WORDS.contains(t))
        .map(str::to_string)
        .collect()
}

/// True when `phrase` occurs in `text` without being glued to neighbouring
/// letters or digits, so `id` does not match inside "did".
fn contains_phrase(text: &str, phrase: &str) -> bool {
    let (Some(first), Some(last)) = (phrase.chars().next(), phrase.chars().next_back()) else {
        return false;
    };
    text.match_indices(phrase).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + phrase.len()..].chars().next();
        let open = !first.is_alphanumeric() || !before.is_some_and(char::is_alphanumeric);
        let close = !last.is_alphanumeric() || !after.is_some_and(char::is_alphanumeric);
        open && close
    })
}

/// Picks the column a question refers to. A header whose whole lower-cased
/// name appears in the question as whole words wins, longest name first;
/// otherwise the header sharing the most significant words with the question
/// wins. Ties keep candidate order.
pub fn resolve_column<'a>(question: &str, candidates: &'a [String]) -> Option<&'a str> {
    let lowered = question.to_lowercase();
    let mut named: Option<&'a String> = None;
    for candidate in candidates {
        if contains_phrase(&lowered, &candidate.to_lowercase())
            && named.is_none_or(|best| candidate.len() > best.len())
        {
            named = Some(candidate);
        }
    }
    if let Some(column) = named {
        return Some(column.as_str());
    }

    let question_tokens = tokens(&lowered).into_iter().collect::<HashSet<_>>();
    if question_tokens.is_empty() {
        return None;
    }
    let mut best: Option<(&'a String, usize)> = None;
    for candidate in candidates {
        let shared = tokens(candidate)
            .into_iter()
            .unique()
            .filter(|t| question_tokens.contains(t))
            .count();
        if shared > 0 && best.is_none_or(|(_, top)| shared > top) {
            best = Some((candidate, shared));
        }
    }
    best.map(|(column, _)| column.as_str())
}

fn comparison_splitter() -> Option<&'static Regex> {
    static SPLITTER: OnceLock<Option<Regex>> = OnceLock::new();
    SPLITTER
        .get_or_init(|| {
            Regex::new(r"\s+(?:vs\.?|versus|compared?(?:\s+(?:to|with))?|and)\s+").ok()
        })
        .as_ref()
}

fn label(analysis: &Analysis) -> String {
    analysis.classification.noun()
}

fn primary_metric(analysis: &Analysis, fallback: &'static str) -> &'static str {
    analysis.classification.metric(0, fallback)
}

/// Numeric question columns whose stats satisfy `keep`, in header order.
fn numeric_columns<'a>(
    analysis: &'a Analysis,
    keep: impl Fn(&ColumnStats) -> bool,
) -> Vec<(&'a str, &'a ColumnStats)> {
    analysis
        .question_columns()
        .iter()
        .filter_map(|column| {
            analysis
                .column_stats(column)
                .filter(|s| keep(s))
                .map(|s| (column.as_str(), s))
        })
        .collect()
}

fn named_or<'a>(
    question: &str,
    columns: &[(&'a str, &'a ColumnStats)],
    default: impl FnOnce() -> Option<(&'a str, &'a ColumnStats)>,
) -> Option<(&'a str, &'a ColumnStats)> {
    let names = columns.iter().map(|(c, _)| c.to_string()).collect::<Vec<_>>();
    resolve_column(question, &names)
        .and_then(|name| columns.iter().find(|(c, _)| *c == name).copied())
        .or_else(default)
}

fn answer_highest(analysis: &Analysis, question: &str) -> Option<Answer> {
    let columns = numeric_columns(analysis, |s| s.max > 0.0);
    let (column, stats) = named_or(question, &columns, || {
        columns
            .iter()
            .copied()
            .reduce(|best, next| if next.1.max > best.1.max { next } else { best })
    })?;
    let extremes = analysis.extremes_for(column)?;
    let verb = analysis.classification.verb(0, "measured");
    Some(Answer::new(
        format!(
            "The peak {} in your {} is {}, found in row {}. This metric {verb} an average of {}, ranging from {} to {}. This represents the highest performance or maximum measurement for this {} in your dataset.",
            column.to_lowercase(),
            label(analysis),
            format_number(extremes.max),
            extremes.max_row,
            format_number(stats.average),
            format_number(stats.min),
            format_number(stats.max),
            primary_metric(analysis, "metric")
        ),
        vec![
            format!("What caused the high {column} in row {}?", extremes.max_row),
            format!("How does this compare to the average {column}?"),
            format!("Are there other periods with high {column}?"),
        ],
    ))
}

fn answer_lowest(analysis: &Analysis, question: &str) -> Option<Answer> {
    let columns = numeric_columns(analysis, |s| s.min >= 0.0);
    let (column, stats) = named_or(question, &columns, || {
        columns
            .iter()
            .copied()
            .reduce(|best, next| if next.1.min < best.1.min { next } else { best })
    })?;
    let extremes = analysis.extremes_for(column)?;
    Some(Answer::new(
        format!(
            "The lowest {} in your {} is {}, found in row {}. This metric {} {}. This could indicate a data anomaly, a seasonal low, a special case, or an area needing improvement within {}.",
            column.to_lowercase(),
            label(analysis),
            format_number(extremes.min),
            extremes.min_row,
            analysis.classification.verb(1, "averaged"),
            format_number(stats.average),
            analysis.classification.context
        ),
        vec![
            format!("Why is {column} so low in row {}?", extremes.min_row),
            "Is this a data error or real value?".to_string(),
            format!("What should the minimum {column} be?"),
        ],
    ))
}

const HEADLINE_COLUMN_WORDS: &[&str] = &["total", "sum", "revenue", "sales"];

fn answer_average(analysis: &Analysis, question: &str) -> Option<Answer> {
    let columns = numeric_columns(analysis, |_| true);
    let (column, stats) = named_or(question, &columns, || {
        let headline = analysis.headers.iter().find(|h| {
            let lower = h.to_lowercase();
            HEADLINE_COLUMN_WORDS.iter().any(|w| lower.contains(w))
        });
        headline
            .and_then(|h| analysis.column_stats(h).map(|s| (h.as_str(), s)))
            .or_else(|| columns.iter().copied().find(|(_, s)| s.average > 0.0))
    })?;
    Some(Answer::new(
        format!(
            "The average (mean) {} in your {} is {}. The median (middle value) is {}, with values ranging from {} to {}. The standard deviation of {} indicates how spread out the {} are from this average.",
            column.to_lowercase(),
            label(analysis),
            format_number(stats.average),
            format_number(stats.median),
            format_number(stats.min),
            format_number(stats.max),
            format_number(stats.std_dev),
            primary_metric(analysis, "values")
        ),
        vec![
            format!(
                "Is this average higher or lower than expected for {}?",
                analysis.classification.context
            ),
            format!("What affects the {column} average?"),
            "How has this average changed over time?".to_string(),
        ],
    ))
}

fn answer_cause(analysis: &Analysis, question: &str) -> Option<Answer> {
    let column = resolve_column(question, analysis.question_columns())?;
    let stats = analysis.column_stats(column)?;
    let extremes = analysis.extremes_for(column)?;
    let trend = analysis.trend_for(column);
    let context = analysis.classification.context;

    let mut answer = match trend {
        Some(t) => format!(
            "The \"{column}\" shows {} behavior with a {} change in your {}. ",
            t.trend.direction.as_str(),
            t.trend
                .percent_change
                .map_or_else(|| format_change(None), |pc| format_percent(pc.abs())),
            label(analysis)
        ),
        None => format!(
            "The \"{column}\" shows stable behavior in your {}. ",
            label(analysis)
        ),
    };

    let upward = contains_any(question, &["high", "increase", " spike"]);
    let (row, value) = if upward {
        (extremes.max_row, extremes.max)
    } else {
        (extremes.min_row, extremes.min)
    };
    let _ = write!(
        answer,
        "The most extreme value is {} in row {row}",
        format_number(value)
    );
    if stats.average != 0.0 {
        let deviation = (value - stats.average) / stats.average.abs() * 100.0;
        let _ = write!(
            answer,
            ", which is {:.1}% {} the typical {}.",
            deviation.abs(),
            if deviation >= 0.0 { "above" } else { "below" },
            primary_metric(analysis, "value")
        );
    } else {
        answer.push('.');
    }

    let flagged = analysis.anomalies_for(column).count();
    if flagged > 0 {
        let _ = write!(
            answer,
            " Found {flagged} unusual data point(s) in this {}.",
            primary_metric(analysis, "column")
        );
    }
    let _ = write!(
        answer,
        " Common factors that could explain this pattern within {context} include seasonal variations, external events, operational changes, or data collection timing."
    );

    Some(Answer::new(
        answer,
        vec![
            format!("What business event caused the {column} to peak or dip?"),
            "Is this a trend or one-time event?".to_string(),
            format!("Should I investigate row {row} specifically?"),
        ],
    ))
}

fn answer_total(analysis: &Analysis, _question: &str) -> Option<Answer> {
    let columns = numeric_columns(analysis, |s| s.sum > 0.0);
    if columns.is_empty() {
        return None;
    }
    let grand_total = saturating_sum(columns.iter().map(|(_, s)| s.sum));
    let top = columns
        .iter()
        .sorted_by(|a, b| b.1.sum.total_cmp(&a.1.sum))
        .take(3)
        .collect::<Vec<_>>();

    let mut answer = format!("Summary of totals in your {}:\n\n", label(analysis));
    let _ = writeln!(answer, "Grand Total: {}\n", format_number(grand_total));
    answer.push_str("Top contributors:\n");
    for (column, stats) in &top {
        let _ = writeln!(answer, "\u{2022} {column}: {}", format_number(stats.sum));
    }
    let _ = write!(
        answer,
        "\nThis represents the sum of all {} across your {} records in {}.",
        primary_metric(analysis, "values"),
        analysis.row_count,
        analysis.classification.context
    );

    let leader = top.first().map_or("metric", |(column, _)| *column);
    Some(Answer::new(
        answer,
        vec![
            "What period does this total cover?".to_string(),
            "How does this total compare to previous periods?".to_string(),
            format!("Which {leader} contributes most to the total?"),
        ],
    ))
}

fn direction_count(trends: &[ColumnTrend], direction: TrendDirection) -> usize {
    trends
        .iter()
        .filter(|t| t.trend.direction == direction)
        .count()
}

fn answer_trend(analysis: &Analysis, _question: &str) -> Option<Answer> {
    let trends = &analysis.trends;
    // Trends are ordered by magnitude, so the first is the strongest mover.
    let strongest = trends.first()?;
    let t = &strongest.trend;
    let context = analysis.classification.context;

    let mut answer = format!(
        "Your {} shows {} significant patterns:\n\n",
        label(analysis),
        trends.len()
    );
    let _ = writeln!(
        answer,
        "Strongest Pattern: \"{}\" is {} by {} ({:.0}% confidence)\n",
        t.column,
        t.direction.as_str(),
        t.percent_change
            .map_or_else(|| format_change(None), |pc| format_percent(pc.abs())),
        t.strength * 100.0
    );
    let _ = writeln!(
        answer,
        "Overall Direction: {} metrics increasing, {} decreasing, {} stable\n",
        direction_count(trends, TrendDirection::Increasing),
        direction_count(trends, TrendDirection::Decreasing),
        direction_count(trends, TrendDirection::Stable)
    );
    match t.direction {
        TrendDirection::Increasing => {
            let _ = writeln!(
                answer,
                "This indicates positive growth or improvement in this {} within {context}.",
                primary_metric(analysis, "metric")
            );
        }
        TrendDirection::Decreasing => {
            let _ = writeln!(
                answer,
                "This indicates decline that may need attention in your {}.",
                label(analysis)
            );
        }
        TrendDirection::Stable | TrendDirection::Volatile => {
            let _ = writeln!(
                answer,
                "This indicates consistent, stable patterns in {context}."
            );
        }
    }
    if strongest.volatility.volatility > 20.0 {
        let _ = write!(
            answer,
            "Note: This metric shows {} volatility, suggesting fluctuations in the pattern.",
            format_percent(strongest.volatility.volatility)
        );
    }

    Some(Answer::new(
        answer,
        vec![
            format!("What caused the {} in {}?", t.direction.as_str(), t.column),
            "Is this trend sustainable?".to_string(),
            "Should I be concerned about the decreasing metrics?".to_string(),
        ],
    ))
}

fn answer_anomalies(analysis: &Analysis, _question: &str) -> Option<Answer> {
    let noun = label(analysis);
    let context = analysis.classification.context;
    // Anomalies are sorted strongest first.
    let Some(top) = analysis.anomalies.first() else {
        return Some(Answer::new(
            format!(
                "Great news! No significant anomalies were detected in your {noun}. All values fall within expected ranges based on statistical analysis. This suggests your data is consistent and reliable for {context}."
            ),
            vec![
                "How are anomalies detected?".to_string(),
                "What if I expect unusual values?".to_string(),
                "Can I set custom thresholds?".to_string(),
            ],
        ));
    };

    let mut answer = format!(
        "Found {} unusual data point(s) in your {noun}:\n\n",
        analysis.anomalies.len()
    );
    answer.push_str("Most Significant Anomaly:\n");
    let _ = writeln!(answer, "\u{2022} Column: {}", top.column);
    let _ = writeln!(answer, "\u{2022} Row: {}", top.row);
    let _ = writeln!(answer, "\u{2022} Value: {}", format_number(top.value));
    let _ = writeln!(answer, "\u{2022} Deviation: {} from average\n", top.deviation);
    let _ = write!(
        answer,
        "This means the value in row {} is unusually {} compared to typical {} in this {noun}. This could be a data entry issue, a special event, a genuine breakthrough, or an anomaly worth investigating within {context}.",
        top.row,
        top.kind.as_str(),
        primary_metric(analysis, "values")
    );

    Some(Answer::new(
        answer,
        vec![
            format!("Should I investigate row {}?", top.row),
            "Is this a data error or real value?".to_string(),
            "How should I handle these anomalies?".to_string(),
        ],
    ))
}

fn answer_growth(analysis: &Analysis, _question: &str) -> Option<Answer> {
    let growing = analysis
        .trends
        .iter()
        .filter(|t| t.trend.direction == TrendDirection::Increasing)
        .collect::<Vec<_>>();
    let declining = analysis
        .trends
        .iter()
        .filter(|t| t.trend.direction == TrendDirection::Decreasing)
        .collect::<Vec<_>>();
    if growing.is_empty() && declining.is_empty() {
        return None;
    }
    let metric = primary_metric(analysis, "Metrics");
    let context = analysis.classification.context;
    // Undefined growth from a zero baseline outranks every finite rate.
    let change = |t: &ColumnTrend| t.trend.percent_change.unwrap_or(f64::INFINITY);
    let fastest_growing = growing
        .iter()
        .copied()
        .reduce(|best, next| if change(next) > change(best) { next } else { best });
    let fastest_declining = declining
        .iter()
        .copied()
        .reduce(|best, next| if change(next) < change(best) { next } else { best });

    let mut answer = format!("Growth Analysis for your {}:\n\n", label(analysis));
    if !growing.is_empty() {
        let _ = writeln!(answer, "Growing {metric} ({}):", growing.len());
        for t in growing.iter().take(3) {
            let _ = writeln!(
                answer,
                "\u{2022} {}: {} ({:.0}% confidence)",
                t.column(),
                format_change(t.trend.percent_change),
                t.trend.strength * 100.0
            );
        }
    }
    if !declining.is_empty() {
        let _ = writeln!(answer, "\nDeclining {metric} ({}):", declining.len());
        for t in declining.iter().take(3) {
            let _ = writeln!(
                answer,
                "\u{2022} {}: {} ({:.0}% confidence)",
                t.column(),
                format_change(t.trend.percent_change),
                t.trend.strength * 100.0
            );
        }
    }
    answer.push('\n');
    if let Some(t) = fastest_growing {
        let _ = writeln!(
            answer,
            "Fastest Growing: \"{}\" at {}",
            t.column(),
            format_change(t.trend.percent_change)
        );
    }
    if let Some(t) = fastest_declining {
        let _ = writeln!(
            answer,
            "Fastest Declining: \"{}\" at {}",
            t.column(),
            format_change(t.trend.percent_change)
        );
    }
    answer.push('\n');
    let metric_lower = metric.to_lowercase();
    answer.push_str(&if declining.len() > growing.len() {
        format!("More {metric_lower} are declining than growing, which may indicate challenges in {context} that need attention.")
    } else if growing.len() > declining.len() {
        format!("More {metric_lower} are showing positive growth, indicating positive momentum in {context}.")
    } else {
        format!("Growth and decline are balanced, suggesting stable patterns in {context}.")
    });

    Some(Answer::new(
        answer,
        vec![
            format!(
                "What caused {} to grow so fast?",
                fastest_growing.map_or("growth", |t| t.column())
            ),
            format!(
                "Why is {} declining?",
                fastest_declining.map_or("decline", |t| t.column())
            ),
            format!("How can I improve the declining {metric_lower}?"),
        ],
    ))
}

fn write_column_block(answer: &mut String, column: &str, stats: &ColumnStats) {
    let _ = writeln!(answer, "\"{column}\":");
    let _ = writeln!(answer, "\u{2022} Average: {}", format_number(stats.average));
    let _ = writeln!(answer, "\u{2022} Total: {}", format_number(stats.sum));
    let _ = writeln!(
        answer,
        "\u{2022} Range: {} - {}\n",
        format_number(stats.min),
        format_number(stats.max)
    );
}

fn comparison_pair<'a>(analysis: &'a Analysis, question: &str) -> Option<(&'a str, &'a str)> {
    let splitter = comparison_splitter()?;
    let mut parts = splitter.splitn(question, 2);
    let (left, right) = (parts.next()?, parts.next()?);
    let columns = analysis.question_columns();
    let first = resolve_column(left, columns)?;
    let second = resolve_column(right, columns)?;
    (first != second).then_some((first, second))
}

fn answer_comparison(analysis: &Analysis, question: &str) -> Option<Answer> {
    let noun = label(analysis);
    let context = analysis.classification.context;

    if let Some((first, second)) = comparison_pair(analysis, question) {
        let (a, b) = (analysis.column_stats(first)?, analysis.column_stats(second)?);
        let mut answer = format!("Comparison: \"{first}\" vs \"{second}\" in your {noun}\n\n");
        write_column_block(&mut answer, first, a);
        write_column_block(&mut answer, second, b);
        if a.average != 0.0 && b.average != 0.0 {
            let _ = write!(
                answer,
                "\"{first}\" is {:.2}x \"{second}\" on average in {context}.",
                a.average / b.average
            );
        }
        return Some(Answer::new(
            answer,
            vec![
                format!(
                    "Why is {} higher than {}?",
                    if a.average >= b.average { first } else { second },
                    if a.average >= b.average { second } else { first }
                ),
                "Should these metrics be related?".to_string(),
                "What factors affect both metrics?".to_string(),
            ],
        ));
    }

    let columns = numeric_columns(analysis, |_| true);
    if columns.is_empty() {
        return None;
    }
    let metric = primary_metric(analysis, "metrics");
    let mut answer = format!("Quick comparison of your key {metric} in {noun}:\n\n");
    for (column, stats) in columns.iter().take(5) {
        write_column_block(&mut answer, column, stats);
    }
    Some(Answer::new(
        answer.trim_end().to_string(),
        vec![
            format!("Which {} is most important?", primary_metric(analysis, "metric")),
            "How do these relate to each other?".to_string(),
            "What benchmarks should I use?".to_string(),
        ],
    ))
}

fn answer_describe(analysis: &Analysis, question: &str) -> Option<Answer> {
    let column = resolve_column(question, analysis.question_columns())?;
    let stats = analysis.column_stats(column)?;
    let context = analysis.classification.context;

    let mut answer = format!("\"{column}\" Analysis in your {}:\n\n", label(analysis));
    answer.push_str("Statistics:\n");
    for (name, value) in [
        ("Total", stats.sum),
        ("Average", stats.average),
        ("Median", stats.median),
        ("Minimum", stats.min),
        ("Maximum", stats.max),
    ] {
        let _ = writeln!(answer, "\u{2022} {name}: {}", format_number(value));
    }
    answer.push_str("\nTrend: ");
    match analysis.trend_for(column) {
        Some(t) => {
            let _ = writeln!(
                answer,
                "{} by {} ({:.0}% confidence)",
                t.trend.direction.as_str(),
                t.trend
                    .percent_change
                    .map_or_else(|| format_change(None), |pc| format_percent(pc.abs())),
                t.trend.strength * 100.0
            );
        }
        None => answer.push_str("Stable - no significant trend detected\n"),
    }
    let _ = writeln!(
        answer,
        "\nAnomalies: {} unusual data point(s) found",
        analysis.anomalies_for(column).count()
    );
    let _ = write!(
        answer,
        "\nData Points: {} records across {} rows in {context}",
        stats.count, analysis.row_count
    );

    Some(Answer::new(
        answer,
        vec![
            format!("How has {column} changed over time?"),
            format!("What affects {column}?"),
            format!("Is this a good or bad {column} for {context}?"),
        ],
    ))
}

fn answer_recommendations(analysis: &Analysis, _question: &str) -> Option<Answer> {
    let context = analysis.classification.context;
    let metric = primary_metric(analysis, "Metrics");
    let mut recommendations = Vec::new();

    let declining = analysis
        .trends
        .iter()
        .filter(|t| t.trend.direction == TrendDirection::Decreasing)
        .collect::<Vec<_>>();
    if let Some(first) = declining.first() {
        recommendations.push(format!(
            "Address Declining {metric}: {} {}(s) are showing decline, including \"{}\" ({}). Investigate root causes in {context}.",
            declining.len(),
            metric.to_lowercase(),
            first.column(),
            format_change(first.trend.percent_change)
        ));
    }
    if let Some(volatile) = analysis
        .trends
        .iter()
        .find(|t| t.volatility.volatility > 20.0)
    {
        recommendations.push(format!(
            "Reduce Volatility: \"{}\" shows {} volatility. Consider smoothing techniques or identify causes of fluctuation in {context}.",
            volatile.column(),
            format_percent(volatile.volatility.volatility)
        ));
    }
    if !analysis.anomalies.is_empty() {
        let rows = analysis.anomalies.iter().take(3).map(|a| a.row).join(", ");
        recommendations.push(format!(
            "Investigate Anomalies: {} unusual data point(s) detected. Review rows {rows} for data quality or special events within {context}.",
            analysis.anomalies.len()
        ));
    }
    if let Some(success) = analysis
        .findings
        .iter()
        .find(|f| f.kind == FindingKind::Positive)
    {
        recommendations.push(format!(
            "Leverage Success: {}. Build on this momentum in {context}.",
            success.title
        ));
    }
    if recommendations.is_empty() {
        recommendations.push(format!(
            "Data Looks Good: No critical issues detected in {context}. Continue monitoring trends and {}.",
            metric.to_lowercase()
        ));
    }

    let mut answer = format!("Recommendations for your {}:\n\n", label(analysis));
    answer.push_str(
        &recommendations
            .iter()
            .map(|r| format!("\u{2022} {r}"))
            .join("\n\n"),
    );
    Some(Answer::new(
        answer,
        vec![
            format!("How can I improve the declining {}?", metric.to_lowercase()),
            "What tools can help me monitor this?".to_string(),
            format!("How often should I review this {}?", label(analysis)),
        ],
    ))
}

fn answer_benchmarks(analysis: &Analysis, _question: &str) -> Option<Answer> {
    let mut answer = format!("Benchmarks and context for your {}:\n\n", label(analysis));
    answer.push_str(
        &analysis
            .context
            .iter()
            .map(|item| format!("{}: {} (benchmark: {})", item.title, item.description, item.benchmark))
            .join("\n\n"),
    );
    Some(Answer::new(
        answer,
        vec![
            "How do I compare to industry standards?".to_string(),
            format!(
                "What are typical values for {}?",
                analysis.classification.context
            ),
            "How can I improve my benchmarks?".to_string(),
        ],
    ))
}

fn fallback_answer(analysis: &Analysis) -> Answer {
    let noun = label(analysis);
    let context = analysis.classification.context;
    let metric = primary_metric(analysis, "Metrics");
    let values = primary_metric(analysis, "values");

    let mut answer = format!(
        "I'd be happy to help you analyze your {noun}! Based on your {} records and {} columns covering {context}, here are some things I can help you understand:\n\n",
        analysis.row_count, analysis.column_count
    );
    let columns = analysis.question_columns();
    if columns.is_empty() {
        answer.push_str("No numeric columns were detected, so answers will focus on the dataset's structure.\n");
    } else {
        let _ = writeln!(answer, "Key {metric} Available:");
        for (idx, column) in columns.iter().take(5).enumerate() {
            let _ = writeln!(answer, "{}. {column}", idx + 1);
        }
    }
    answer.push_str("\nWhat I Can Help You Understand:\n");
    let _ = writeln!(answer, "\u{2022} Questions about specific {values}, averages, and totals");
    answer.push_str("\u{2022} Trend analysis and growth patterns\n");
    answer.push_str("\u{2022} Anomaly detection and unusual data points\n");
    let _ = writeln!(answer, "\u{2022} Comparisons between different {values}");
    let _ = writeln!(answer, "\u{2022} Recommendations based on your {noun}\n");
    answer.push_str("Try asking:\n");
    for example in [
        "What is the total [metric]?",
        "Why is [column] so high/low?",
        "What trends exist in my data?",
        "Are there any anomalies?",
        "Compare [metric1] and [metric2]",
        "What should I do about my data?",
        "How does this compare to industry standards?",
    ] {
        let _ = writeln!(answer, "\u{2022} \"{example}\"");
    }

    Answer::new(
        answer.trim_end().to_string(),
        vec![
            "What is the total across all metrics?".to_string(),
            format!("What trends exist in my {noun}?"),
            "Are there any anomalies I should know about?".to_string(),
            format!("What recommendations do you have for {context}?"),
        ],
    )
}

fn no_data_answer() -> Answer {
    Answer::new(
        "There is no data to analyze yet. Load a dataset with at least one row and ask again."
            .to_string(),
        vec![
            "What columns does my file need?".to_string(),
            "How many rows are analyzed?".to_string(),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn full_name_match_prefers_longest_header() {
        let cols = headers(&["Sales", "Sales Tax", "Units"]);
        assert_eq!(resolve_column("what is the sales tax total", &cols), Some("Sales Tax"));
        assert_eq!(resolve_column("what were sales like", &cols), Some("Sales"));
    }

    #[test]
    fn token_overlap_resolves_partial_names() {
        let cols = headers(&["Monthly Revenue", "Unit Cost"]);
        assert_eq!(resolve_column("why is revenue so high", &cols), Some("Monthly Revenue"));
        assert_eq!(resolve_column("tell me about the weather", &cols), None);
    }

    #[test]
    fn short_headers_only_match_whole_words() {
        let cols = headers(&["id", "Revenue"]);
        assert_eq!(resolve_column("why did revenue drop", &cols), Some("Revenue"));
        assert_eq!(resolve_column("why did it drop", &cols), None);
        assert_eq!(resolve_column("which id is highest", &cols), Some("id"));
        assert!(contains_phrase("cost (usd) today", "cost (usd)"));
        assert!(!contains_phrase("costs", "cost"));
    }

    #[test]
    fn token_overlap_ties_keep_header_order() {
        let cols = headers(&["Gross Revenue", "Net Revenue"]);
        assert_eq!(resolve_column("revenue please", &cols), Some("Gross Revenue"));
    }

    #[test]
    fn intent_order_routes_keywords() {
        let names = |q: &str| {
            INTENTS
                .iter()
                .filter(|i| i.matches(q))
                .map(|i| i.name)
                .collect::<Vec<_>>()
        };
        assert_eq!(names("what is the total revenue?")[0], "total");
        assert_eq!(names("why is cost so high")[0], "cause");
        assert!(names("revenue vs cost").contains(&"comparison"));
        assert!(names("hello there").is_empty());
    }

    #[test]
    fn comparison_splitter_handles_variants() {
        let splitter = comparison_splitter().unwrap();
        for question in ["sales vs cost", "sales versus cost", "sales compared to cost", "sales and cost"] {
            let parts = splitter.splitn(question, 2).collect::<Vec<_>>();
            assert_eq!(parts, vec!["sales", "cost"], "{question}");
        }
    }
}
