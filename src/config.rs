//! Tunable thresholds for the analysis pipeline.
//!
//! Every field has a default, so a YAML options file only needs the keys it
//! wants to override:
//!
//! ```yaml
//! max_rows: 5000
//! anomaly_z_threshold: 2.5
//! ```

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisOptions {
    /// Rows analysed per dataset; the loader drops anything beyond this.
    pub max_rows: usize,
    /// Leading rows sampled when deciding whether a column is numeric.
    pub numeric_sample_rows: usize,
    /// Share of sampled rows that must coerce for the domain classifier.
    pub classifier_numeric_ratio: f64,
    /// Share of sampled rows that must coerce for question answering.
    pub question_numeric_ratio: f64,
    pub anomaly_min_values: usize,
    pub anomaly_z_threshold: f64,
    /// Columns named in the summary's "top by average" list.
    pub summary_top_columns: usize,
    pub max_findings: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            max_rows: 10_000,
            numeric_sample_rows: 10,
            classifier_numeric_ratio: 0.7,
            question_numeric_ratio: 0.8,
            anomaly_min_values: 10,
            anomaly_z_threshold: 2.0,
            summary_top_columns: 3,
            max_findings: 5,
        }
    }
}

impl AnalysisOptions {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening options file {path:?}"))?;
        let options: AnalysisOptions = serde_yaml::from_reader(BufReader::new(file))
            .context("Parsing analysis options YAML")?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.max_rows > 0, "max_rows must be greater than zero");
        ensure!(
            self.numeric_sample_rows > 0,
            "numeric_sample_rows must be greater than zero"
        );
        for (name, ratio) in [
            ("classifier_numeric_ratio", self.classifier_numeric_ratio),
            ("question_numeric_ratio", self.question_numeric_ratio),
        ] {
            ensure!(
                (0.0..1.0).contains(&ratio),
                "{name} must be within [0, 1), got {ratio}"
            );
        }
        ensure!(
            self.anomaly_z_threshold > 0.0,
            "anomaly_z_threshold must be positive"
        );
        ensure!(
            self.anomaly_min_values >= 2,
            "anomaly_min_values must be at least 2"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let options = AnalysisOptions::default();
        options.validate().unwrap();
        assert_eq!(options.max_rows, 10_000);
        assert_eq!(options.anomaly_min_values, 10);
    }

    #[test]
    fn load_overrides_only_listed_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_rows: 50\nanomaly_z_threshold: 2.5").unwrap();
        let options = AnalysisOptions::load(file.path()).unwrap();
        assert_eq!(options.max_rows, 50);
        assert_eq!(options.anomaly_z_threshold, 2.5);
        assert_eq!(options.numeric_sample_rows, 10);
    }

    #[test]
    fn load_rejects_unknown_keys_and_bad_ratios() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_row: 50").unwrap();
        assert!(AnalysisOptions::load(file.path()).is_err());

        let invalid = AnalysisOptions {
            question_numeric_ratio: 1.5,
            ..AnalysisOptions::default()
        };
        let err = invalid.validate().unwrap_err();
        assert!(err.to_string().contains("question_numeric_ratio"));
    }
}
