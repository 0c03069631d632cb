//! Run reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during report export.
#[derive(Debug, Error)]
pub enum ReportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// One header line and one record.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Pick a format from a file extension, defaulting to pretty JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Self::Csv,
            _ => Self::PrettyJson,
        }
    }
}

/// Outcome of one training run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    /// Reference date the run was invoked with.
    pub date: String,

    /// When the run finished.
    pub finished_at: DateTime<Utc>,

    /// Training source identifier.
    pub train_source: String,

    /// Validation source identifier.
    pub validation_source: String,

    /// Training rows after preparation.
    pub train_rows: usize,

    /// Validation rows after preparation.
    pub validation_rows: usize,

    /// Mean training duration in minutes.
    pub train_mean_duration: Option<f64>,

    /// Mean validation duration in minutes.
    pub validation_mean_duration: Option<f64>,

    /// Width of the encoded feature space.
    pub n_features: usize,

    /// In-sample RMSE.
    pub train_rmse: f64,

    /// Held-out RMSE.
    pub validation_rmse: f64,

    /// Vectorizer artifact path.
    pub vectorizer_path: String,

    /// Model artifact path.
    pub model_path: String,
}

impl RunSummary {
    /// Serialize to a string in the given format.
    pub fn export_to_string(&self, format: ExportFormat) -> Result<String, ReportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                wtr.serialize(self)?;
                let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }

    /// Write to a file in the given format.
    pub fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ReportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn summary() -> RunSummary {
        RunSummary {
            date: "2022-03-15".to_string(),
            finished_at: Utc::now(),
            train_source: "fhv_tripdata_2022-01.parquet".to_string(),
            validation_source: "fhv_tripdata_2022-02.parquet".to_string(),
            train_rows: 3,
            validation_rows: 2,
            train_mean_duration: Some(12.5),
            validation_mean_duration: None,
            n_features: 4,
            train_rmse: 0.0,
            validation_rmse: 3.25,
            vectorizer_path: "models/dv-2022-03-15.bin".to_string(),
            model_path: "models/model-2022-03-15.bin".to_string(),
        }
    }

    #[test]
    fn test_json_roundtrip() {
        let s = summary();
        let json = s.export_to_string(ExportFormat::PrettyJson).unwrap();
        let back: RunSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn test_csv_has_header_and_record() {
        let csv = summary().export_to_string(ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("date,finished_at,train_source"));
        assert!(lines[1].starts_with("2022-03-15,"));
    }

    #[rstest]
    #[case("run.csv", ExportFormat::Csv)]
    #[case("run.CSV", ExportFormat::Csv)]
    #[case("run.json", ExportFormat::PrettyJson)]
    #[case("run", ExportFormat::PrettyJson)]
    fn test_format_from_path(#[case] path: &str, #[case] expected: ExportFormat) {
        assert_eq!(ExportFormat::from_path(Path::new(path)), expected);
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        summary()
            .export_to_file(&path, ExportFormat::Json)
            .unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"validation_rmse\":3.25"));
    }
}
