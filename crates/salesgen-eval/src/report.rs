use crate::metrics::{ConstraintStats, IntegrityReport};
use crate::model::Violation;

/// Render a deterministic markdown report from metrics and violations.
pub fn render_report(
    metrics: &IntegrityReport,
    violations: &[Violation],
    max_examples: usize,
) -> String {
    let mut lines = Vec::new();

    lines.push("# Salesgen Integrity Report".to_string());
    lines.push(String::new());
    lines.push("## Run summary".to_string());
    lines.push(format!("- run_id: {}", metrics.run_id));
    lines.push(format!("- metrics_version: {}", metrics.metrics_version));
    lines.push(format!(
        "- distinct customers in sales: {}",
        metrics.distinct_customers_in_sales
    ));
    lines.push(String::new());

    lines.push("## Row counts".to_string());
    lines.push("| file | rows_expected | rows_found |".to_string());
    lines.push("| --- | --- | --- |".to_string());
    for table in &metrics.tables {
        let expected = table
            .rows_expected
            .map(|value| value.to_string())
            .unwrap_or_else(|| "-".to_string());
        lines.push(format!(
            "| {}.csv | {} | {} |",
            table.table, expected, table.rows_found
        ));
    }
    lines.push(String::new());

    lines.push("## Constraint summary".to_string());
    lines.push("| constraint | checked | violations |".to_string());
    lines.push("| --- | --- | --- |".to_string());
    let constraints = &metrics.constraints;
    for (name, stats) in [
        ("parse", constraints.parse),
        ("pk", constraints.pk),
        ("unique", constraints.unique),
        ("fk", constraints.fk),
        ("sequence", constraints.sequence),
        ("total", constraints.total),
        ("quantity", constraints.quantity),
    ] {
        push_constraint_row(&mut lines, name, stats);
    }
    lines.push(String::new());

    if !metrics.warnings.is_empty() {
        lines.push("## Warnings".to_string());
        for warning in &metrics.warnings {
            let hint = warning
                .hint
                .as_ref()
                .map(|hint| format!(" (hint: {hint})"))
                .unwrap_or_default();
            lines.push(format!("- {}: {}{}", warning.path, warning.message, hint));
        }
        lines.push(String::new());
    }

    if !violations.is_empty() {
        lines.push("## Top violations".to_string());
        for violation in violations.iter().take(max_examples) {
            let row = violation
                .row_index
                .map(|row| format!(" row {row}"))
                .unwrap_or_default();
            let example = violation
                .example
                .as_ref()
                .map(|value| format!(" example={value}"))
                .unwrap_or_default();
            lines.push(format!(
                "- {}{}: {}{}",
                violation.path, row, violation.message, example
            ));
        }
        if violations.len() > max_examples {
            lines.push(format!(
                "- ... {} more",
                violations.len() - max_examples
            ));
        }
        lines.push(String::new());
    }

    lines.push("## Verdict".to_string());
    if violations.is_empty() {
        lines.push("- dataset is consistent.".to_string());
    } else {
        lines.push(format!(
            "- {} violation(s); regenerate the dataset instead of patching rows.",
            violations.len()
        ));
    }
    lines.join("\n")
}

fn push_constraint_row(lines: &mut Vec<String>, name: &str, stats: ConstraintStats) {
    lines.push(format!(
        "| {} | {} | {} |",
        name, stats.checked, stats.violations
    ));
}
