//! @ai:module:intent Report generation for comparison runs
//! @ai:module:layer infrastructure
//! @ai:module:public_api ReportGenerator, JsonReporter, MarkdownReporter

pub mod json_report;
pub mod markdown_report;

pub use json_report::{JsonReporter, JsonReporterTrait};
pub use markdown_report::{MarkdownReporter, MarkdownReporterTrait};

use crate::compare::ComparisonReport;
use anyhow::{Context, Result};
use std::path::Path;

/// File name of the JSON report inside an output directory.
pub const JSON_REPORT_FILE: &str = "comparison.json";
/// File name of the Markdown report inside an output directory.
pub const MARKDOWN_REPORT_FILE: &str = "comparison.md";

/// @ai:intent Combined report generator
pub struct ReportGenerator {
    json: JsonReporter,
    markdown: MarkdownReporter,
}

impl ReportGenerator {
    /// @ai:intent Create a new report generator
    /// @ai:effects pure
    pub fn new() -> Self {
        Self {
            json: JsonReporter::new(),
            markdown: MarkdownReporter::new(),
        }
    }

    /// @ai:intent Write comparison.json and comparison.md into output_dir
    /// @ai:effects fs:write
    pub fn generate_all(&self, report: &ComparisonReport, output_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create {}", output_dir.display()))?;

        self.json.generate(report, &output_dir.join(JSON_REPORT_FILE))?;
        self.markdown
            .generate(report, &output_dir.join(MARKDOWN_REPORT_FILE))?;

        tracing::info!("Reports generated in {}", output_dir.display());
        Ok(())
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::ComparisonRecord;
    use tempfile::TempDir;

    #[test]
    fn test_generate_all_writes_both_files() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("run");
        let report = ComparisonReport {
            dataset_name: "t1.dzn".to_string(),
            solver: "org.gecode.gecode".to_string(),
            solver_name: "Gecode".to_string(),
            timestamp: "2026-01-19T00:00:00Z".to_string(),
            records: vec![ComparisonRecord::unknown_model("ghost")],
        };

        ReportGenerator::new().generate_all(&report, &output).unwrap();

        assert!(output.join(JSON_REPORT_FILE).exists());
        assert!(output.join(MARKDOWN_REPORT_FILE).exists());
    }
}
