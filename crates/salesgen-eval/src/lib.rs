//! Integrity checks for generated datasets.

pub mod engine;
pub mod errors;
pub mod metrics;
pub mod model;
pub mod report;

pub use engine::VerificationEngine;
pub use errors::EvalError;
pub use metrics::{ConstraintStats, ConstraintSummary, IntegrityReport, TableMetrics};
pub use model::{VerificationResult, VerifyOptions, Violation};
pub use report::render_report;
