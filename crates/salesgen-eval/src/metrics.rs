use serde::{Deserialize, Serialize};

/// Metrics contract version for dataset verification.
pub const METRICS_VERSION: &str = "0.1";

/// Machine-readable result of a dataset verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrityReport {
    pub metrics_version: String,
    pub run_id: String,
    pub tables: Vec<TableMetrics>,
    pub distinct_customers_in_sales: u64,
    pub constraints: ConstraintSummary,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<WarningItem>,
    pub performance: PerformanceMetrics,
}

/// Per-file row counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMetrics {
    pub table: String,
    pub rows_found: u64,
    /// Count recorded in `generation_report.json`, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows_expected: Option<u64>,
}

/// Counters per invariant family.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintSummary {
    /// Unique ids in every file.
    pub pk: ConstraintStats,
    /// Unique product names and customer emails.
    pub unique: ConstraintStats,
    /// Sale references to customers and products.
    pub fk: ConstraintStats,
    /// Sale ids increasing in file order.
    pub sequence: ConstraintStats,
    /// `total == round(unit_price * quantity, 2)`.
    pub total: ConstraintStats,
    /// `quantity >= 1`.
    pub quantity: ConstraintStats,
    /// Rows whose fields could not be parsed.
    pub parse: ConstraintStats,
}

impl ConstraintSummary {
    pub fn violations(&self) -> u64 {
        self.pk.violations
            + self.unique.violations
            + self.fk.violations
            + self.sequence.violations
            + self.total.violations
            + self.quantity.violations
            + self.parse.violations
    }
}

/// Generic constraint counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintStats {
    pub checked: u64,
    pub violations: u64,
}

impl ConstraintStats {
    pub(crate) fn record(&mut self, ok: bool) {
        self.checked += 1;
        if !ok {
            self.violations += 1;
        }
    }
}

/// Structured warning entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningItem {
    pub code: String,
    pub path: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

/// Performance timings for the verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub load_ms: u128,
    pub validate_ms: u128,
    pub total_ms: u128,
}
