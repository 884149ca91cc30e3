pub mod analysis;
pub mod anomaly;
pub mod classify;
pub mod cli;
pub mod config;
pub mod data;
pub mod extract;
pub mod format;
pub mod insight;
pub mod io_utils;
pub mod qa;
pub mod report;
pub mod stats;
pub mod table;
pub mod trend;
pub mod volatility;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::cli::{Cli, Commands, InputArgs, OutputFormat};

pub use crate::{
    analysis::Analysis,
    config::AnalysisOptions,
    data::{Dataset, DatasetError, Value},
    qa::Answer,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_insights", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze(args) => handle_analyze(&args),
        Commands::Stats(args) => handle_stats(&args),
        Commands::Trends(args) => handle_trends(&args),
        Commands::Anomalies(args) => handle_anomalies(&args),
        Commands::Classify(args) => handle_classify(&args),
        Commands::Ask(args) => handle_ask(&args),
    }
}

fn load_options(input: &InputArgs) -> Result<AnalysisOptions> {
    let mut options = match &input.config {
        Some(path) => AnalysisOptions::load(path)
            .with_context(|| format!("Loading analysis options from {path:?}"))?,
        None => AnalysisOptions::default(),
    };
    if let Some(limit) = input.limit {
        options.max_rows = limit;
        options.validate().context("Applying --limit")?;
    }
    debug!("Analysis options: {options:?}");
    Ok(options)
}

fn load_input(input: &InputArgs) -> Result<(Dataset, AnalysisOptions)> {
    let options = load_options(input)?;
    let encoding = io_utils::resolve_encoding(input.input_encoding.as_deref())?;
    let delimiter = io_utils::resolve_input_delimiter(&input.input, input.delimiter);
    info!(
        "Reading '{}' with delimiter '{}' and encoding {}",
        input.input.display(),
        printable_delimiter(delimiter),
        encoding.name()
    );
    let dataset =
        io_utils::load_dataset(&input.input, Some(delimiter), encoding, options.max_rows)?;
    Ok((dataset, options))
}

fn emit(
    format: OutputFormat,
    json: impl FnOnce() -> Result<String>,
    text: impl FnOnce() -> String,
) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", json()?),
        OutputFormat::Text => print!("{}", text()),
    }
    Ok(())
}

fn handle_analyze(args: &cli::AnalyzeArgs) -> Result<()> {
    let (dataset, options) = load_input(&args.input)?;
    let analysis = Analysis::run(&dataset, &options);
    info!(
        "Analyzed {} row(s) as '{}' with {} finding(s) and {} warning(s)",
        analysis.row_count,
        analysis.classification.tag,
        analysis.findings.len(),
        analysis.warnings.len()
    );
    emit(
        args.format,
        || report::to_json(&analysis),
        || report::analysis_text(&analysis),
    )
}

fn handle_stats(args: &cli::StatsArgs) -> Result<()> {
    let (dataset, _) = load_input(&args.input)?;
    let requested = args
        .columns
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>();
    if let Some(missing) = requested
        .iter()
        .find(|c| !dataset.headers().iter().any(|h| h == *c))
    {
        anyhow::bail!("Column '{missing}' not found in input headers");
    }
    let summaries = stats::calculate_basic_stats(&dataset)
        .into_iter()
        .filter(|s| requested.is_empty() || requested.contains(&s.column.as_str()))
        .filter(|s| !requested.is_empty() || s.stats.is_some())
        .collect::<Vec<_>>();
    info!("Computed statistics for {} column(s)", summaries.len());
    emit(
        args.format,
        || report::to_json(&summaries),
        || report::stats_table(&summaries),
    )
}

fn handle_trends(args: &cli::TrendsArgs) -> Result<()> {
    let (dataset, _) = load_input(&args.input)?;
    let trends = trend::detect_trends(&dataset);
    info!("Detected trends for {} column(s)", trends.len());
    emit(
        args.format,
        || report::to_json(&trends),
        || report::trends_table(&trends),
    )
}

fn handle_anomalies(args: &cli::AnomaliesArgs) -> Result<()> {
    let (dataset, options) = load_input(&args.input)?;
    let mut anomalies = anomaly::detect_anomalies(&dataset, &options);
    let found = anomalies.len();
    if args.top > 0 {
        anomalies.truncate(args.top);
    }
    info!("Found {found} anomaly record(s); showing {}", anomalies.len());
    emit(
        args.format,
        || report::to_json(&anomalies),
        || {
            if anomalies.is_empty() {
                "No anomalies detected.\n".to_string()
            } else {
                report::anomalies_table(&anomalies)
            }
        },
    )
}

fn handle_classify(args: &cli::ClassifyArgs) -> Result<()> {
    let (dataset, options) = load_input(&args.input)?;
    let classification = if dataset.is_empty() {
        classify::DomainClassification::empty()
    } else {
        classify::classify(&dataset, &options)
    };
    info!(
        "Classified dataset as '{}' ({:.2} confidence)",
        classification.tag, classification.confidence
    );
    emit(
        args.format,
        || report::to_json(&classification),
        || report::classification_text(&classification),
    )
}

fn handle_ask(args: &cli::AskArgs) -> Result<()> {
    let (dataset, options) = load_input(&args.input)?;
    let analysis = Analysis::run(&dataset, &options);
    let answers = args
        .questions
        .iter()
        .map(|question| (question.as_str(), analysis.answer_question(question)))
        .collect::<Vec<_>>();
    info!("Answered {} question(s)", answers.len());
    emit(
        args.format,
        || {
            let payload = answers
                .iter()
                .map(|(question, answer)| {
                    serde_json::json!({
                        "question": question,
                        "answer": answer.answer,
                        "followUp": answer.follow_up,
                    })
                })
                .collect::<Vec<_>>();
            report::to_json(&payload)
        },
        || {
            answers
                .iter()
                .map(|(question, answer)| report::answer_text(question, answer))
                .collect::<Vec<_>>()
                .join("\n")
        },
    )
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
