//! @ai:module:intent Markdown report generation
//! @ai:module:layer infrastructure
//! @ai:module:public_api MarkdownReporter
//! @ai:module:stateless true

use crate::compare::{ComparisonRecord, ComparisonReport};
use anyhow::Result;
use std::fmt::Write as FmtWrite;
use std::path::Path;

/// @ai:intent Trait for Markdown report generation
pub trait MarkdownReporterTrait: Send + Sync {
    /// @ai:intent Generate Markdown report from a comparison
    fn generate(&self, report: &ComparisonReport, output_path: &Path) -> Result<()>;
}

/// @ai:intent Generates Markdown ranking tables
pub struct MarkdownReporter;

impl MarkdownReporter {
    /// @ai:intent Create a new Markdown reporter
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }

    /// @ai:intent Render the whole report as Markdown
    /// @ai:effects pure
    pub fn render(report: &ComparisonReport) -> String {
        let mut output = Self::generate_summary(report);
        output.push_str(&Self::generate_ranking_table(report));
        output.push_str(&Self::generate_failures_section(&report.records));
        output
    }

    /// @ai:intent Header with dataset, solver and best model
    /// @ai:effects pure
    fn generate_summary(report: &ComparisonReport) -> String {
        let mut output = String::new();

        writeln!(output, "# Job-Shop Model Comparison").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "**Date:** {}", report.timestamp).unwrap();
        writeln!(output, "**Dataset:** {}", report.dataset_name).unwrap();
        writeln!(
            output,
            "**Solver:** {} (`{}`)",
            report.solver_name, report.solver
        )
        .unwrap();
        writeln!(
            output,
            "**Succeeded:** {}/{}",
            report.successful_count(),
            report.records.len()
        )
        .unwrap();

        if let Some(best) = report.best() {
            writeln!(
                output,
                "**Best:** {} with makespan {}",
                best.model_name, best.makespan
            )
            .unwrap();
        }

        writeln!(output).unwrap();
        output
    }

    /// @ai:intent Ranking table; the best row is bold
    /// @ai:effects pure
    fn generate_ranking_table(report: &ComparisonReport) -> String {
        let mut output = String::new();
        let best_id = report.best().map(|r| r.model_id.as_str());

        writeln!(output, "## Ranking").unwrap();
        writeln!(output).unwrap();
        writeln!(
            output,
            "| # | Model | Category | Makespan | Time (s) | Resources | Imbalance | Status |"
        )
        .unwrap();
        writeln!(
            output,
            "|---|-------|----------|----------|----------|-----------|-----------|--------|"
        )
        .unwrap();

        for (rank, record) in report.records.iter().enumerate() {
            let name = if Some(record.model_id.as_str()) == best_id {
                format!("**{}**", record.model_name)
            } else {
                record.model_name.clone()
            };

            writeln!(
                output,
                "| {} | {} | {} | {} | {} | {} | {} | {} |",
                rank + 1,
                name,
                record.category,
                record.makespan,
                record.execution_time,
                Self::optional(record.num_resources),
                Self::optional(record.imbalance),
                record.status
            )
            .unwrap();
        }

        writeln!(output).unwrap();
        output
    }

    /// @ai:intent Full error text of failed records
    /// @ai:effects pure
    fn generate_failures_section(records: &[ComparisonRecord]) -> String {
        let mut output = String::new();
        let failed: Vec<_> = records
            .iter()
            .filter(|r| !r.success && r.error_detail.is_some())
            .collect();

        if failed.is_empty() {
            return output;
        }

        writeln!(output, "## Failures").unwrap();
        writeln!(output).unwrap();
        for record in failed {
            writeln!(
                output,
                "- **{}**: {}",
                record.model_id,
                record.error_detail.as_deref().unwrap_or_default()
            )
            .unwrap();
        }
        writeln!(output).unwrap();
        output
    }

    fn optional<T: std::fmt::Display>(value: Option<T>) -> String {
        value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
    }
}

impl Default for MarkdownReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownReporterTrait for MarkdownReporter {
    /// @ai:intent Generate Markdown report to file
    /// @ai:effects fs:write
    fn generate(&self, report: &ComparisonReport, output_path: &Path) -> Result<()> {
        std::fs::write(output_path, Self::render(report))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SolveStatus;
    use crate::extract::{ExtractedMetrics, LoadSource, LoadSummary};
    use crate::registry::ModelRegistry;

    fn report() -> ComparisonReport {
        let registry = ModelRegistry::builtin("models");
        let solution = crate::engine::RawSolution::new(SolveStatus::Optimal);
        let metrics = ExtractedMetrics::OpLimit {
            start_times: vec![vec![0, 3]],
            operator_assignment: vec![vec![1, 2]],
            operator_load: LoadSummary::resolve(
                &solution,
                vec![5, 3, 8],
                LoadSource::Reported("carga".to_string()),
                &[],
                &[],
            ),
        };

        ComparisonReport {
            dataset_name: "t1.dzn".to_string(),
            solver: "org.gecode.gecode".to_string(),
            solver_name: "Gecode".to_string(),
            timestamp: "2026-01-19T00:00:00Z".to_string(),
            records: vec![
                ComparisonRecord::succeeded(
                    registry.resolve("jobshop_op_limit_2").unwrap(),
                    SolveStatus::Optimal,
                    18,
                    0.1234,
                    metrics,
                ),
                ComparisonRecord::unsuccessful(
                    registry.resolve("jobshop_op_limit_1").unwrap(),
                    SolveStatus::Unknown,
                ),
            ],
        }
    }

    #[test]
    fn test_best_row_is_highlighted() {
        let md = MarkdownReporter::render(&report());

        assert!(md.contains("**Best:** Limited Operators - dom_w_deg + first_fail with makespan 18"));
        assert!(md.contains("| 1 | **Limited Operators - dom_w_deg + first_fail** |"));
        assert!(md.contains("| 18 | 0.1234 | 3 | 5 | OPTIMAL_SOLUTION |"));
    }

    #[test]
    fn test_failed_rows_show_status_and_dashes() {
        let md = MarkdownReporter::render(&report());

        assert!(md.contains("| inf | N/A | - | - | UNKNOWN |"));
        assert!(md.contains("## Failures"));
        assert!(md.contains("- **jobshop_op_limit_1**:"));
    }

    #[test]
    fn test_no_best_when_everything_failed() {
        let mut report = report();
        report.records.remove(0);

        let md = MarkdownReporter::render(&report);
        assert!(!md.contains("**Best:**"));
    }
}
