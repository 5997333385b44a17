use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::continuity::ContinuityReport;
use crate::output::FileOutput;

/// Options for the generation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Dataset directory; previous files in it are archived.
    pub out_dir: PathBuf,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("data"),
        }
    }
}

/// Customer counts of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerReport {
    /// Rows written to `customers.csv`.
    pub total: u64,
    /// Carried over from the previous dataset.
    pub preserved: u64,
    /// Created during this run.
    pub created: u64,
    /// Sales that drew an existing customer.
    pub reuse_draws: u64,
    /// Synthesized emails that resolved to an existing customer.
    pub email_collisions: u64,
    /// Derived ids that resolved to an existing customer.
    pub id_collisions: u64,
}

/// Report for a generation run, written as `generation_report.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub run_id: String,
    pub dataset_version: String,
    pub started_at: DateTime<Utc>,
    pub seed: u64,
    pub config_fingerprint: String,
    pub identity_policy: String,
    pub timestamp_mode: String,
    pub sales_requested: u64,
    pub sales_generated: u64,
    pub products: u64,
    pub customers: CustomerReport,
    pub continuity: ContinuityReport,
    pub archived: Vec<PathBuf>,
    pub files: Vec<FileOutput>,
    pub batches: u64,
    pub bytes_written: u64,
    pub duration_ms: u64,
}
