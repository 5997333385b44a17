use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::metrics::IntegrityReport;

/// Options for dataset verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyOptions {
    /// Fail when any violation is found.
    pub strict: bool,
    /// Limit the number of violations listed in the markdown report.
    pub max_examples: usize,
    /// Write `integrity_metrics.json` and `integrity_report.md`.
    pub write_outputs: bool,
    /// Where outputs go; defaults to the dataset directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            strict: true,
            max_examples: 20,
            write_outputs: true,
            out_dir: None,
        }
    }
}

/// Structured violation record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub code: String,
    pub path: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_index: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

/// Result of a dataset verification.
#[derive(Debug, Clone)]
pub struct VerificationResult {
    pub metrics_path: Option<PathBuf>,
    pub report_path: Option<PathBuf>,
    pub metrics: IntegrityReport,
    pub report: String,
    pub violations: Vec<Violation>,
}

impl VerificationResult {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}
