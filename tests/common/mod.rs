#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use csv_insights::{Analysis, AnalysisOptions, Dataset};
use tempfile::{TempDir, tempdir};

/// Returns the absolute path to a fixture under `tests/data`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Builds a dataset from string literals, inferring cell types the same way
/// the CSV loader does.
pub fn dataset(headers: &[&str], rows: &[&[&str]]) -> Dataset {
    Dataset::from_records(
        headers.iter().map(|h| h.to_string()).collect(),
        rows.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect(),
    )
    .expect("valid dataset")
}

/// Single numeric column named `column` holding `values` in row order.
pub fn numeric_dataset(column: &str, values: &[f64]) -> Dataset {
    Dataset::from_records(
        vec![column.to_string()],
        values.iter().map(|v| vec![v.to_string()]).collect(),
    )
    .expect("valid dataset")
}

pub fn analyze(dataset: &Dataset) -> Analysis {
    Analysis::run(dataset, &AnalysisOptions::default())
}

pub fn monthly_sales() -> Dataset {
    csv_insights::io_utils::load_dataset(
        &fixture_path("monthly_sales.csv"),
        None,
        encoding_rs::UTF_8,
        10_000,
    )
    .expect("load monthly_sales fixture")
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}
