use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about = "Understand tabular data: domain, statistics, trends and answers", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the full pipeline and print a narrative report
    Analyze(AnalyzeArgs),
    /// Produce descriptive statistics for numeric columns
    Stats(StatsArgs),
    /// Fit linear trends and volatility for every numeric column
    Trends(TrendsArgs),
    /// List z-score outliers across numeric columns
    Anomalies(AnomaliesArgs),
    /// Classify the dataset's business domain from its headers
    Classify(ClassifyArgs),
    /// Answer free-text questions about the dataset
    Ask(AskArgs),
}

/// Input options shared by every command.
#[derive(Debug, Args)]
pub struct InputArgs {
    /// Input CSV file (use '-' for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Maximum number of rows to analyze (overrides the options file)
    #[arg(long)]
    pub limit: Option<usize>,
    /// YAML file overriding analysis thresholds
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Restrict output to this comma-separated list of columns
    #[arg(short = 'C', long = "columns", value_delimiter = ',')]
    pub columns: Vec<String>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct TrendsArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct AnomaliesArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Show only the strongest N anomalies (0 shows all)
    #[arg(long, default_value_t = 0)]
    pub top: usize,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct ClassifyArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct AskArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Question to answer; repeat to ask several against one analysis
    #[arg(short = 'q', long = "question", action = clap::ArgAction::Append, required = true)]
    pub questions: Vec<String>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_delimiter_accepts_names_and_characters() {
        assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
        assert_eq!(parse_delimiter(";"), Ok(b';'));
        assert!(parse_delimiter("ab").is_err());
        assert!(parse_delimiter("").is_err());
    }

    #[test]
    fn ask_collects_repeated_questions() {
        let cli = Cli::try_parse_from([
            "csv-insights",
            "ask",
            "-i",
            "data.csv",
            "-q",
            "What is the total?",
            "-q",
            "Any anomalies?",
        ])
        .unwrap();
        match cli.command {
            Commands::Ask(args) => {
                assert_eq!(args.questions.len(), 2);
                assert_eq!(args.input.input, PathBuf::from("data.csv"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn shared_flags_parse_on_every_command() {
        let cli = Cli::try_parse_from([
            "csv-insights",
            "anomalies",
            "-i",
            "data.tsv",
            "--delimiter",
            "tab",
            "--limit",
            "50",
            "--top",
            "3",
        ])
        .unwrap();
        let Commands::Anomalies(args) = cli.command else {
            panic!("expected anomalies command");
        };
        assert_eq!(args.input.delimiter, Some(b'\t'));
        assert_eq!(args.input.limit, Some(50));
        assert_eq!(args.top, 3);
    }
}
