//! @ai:module:intent Extraction for job-shop models with machine maintenance windows
//! @ai:module:layer domain
//! @ai:module:public_api MaintenanceExtractor
//! @ai:module:stateless true

use crate::dataset::DurationMatrix;
use crate::engine::RawSolution;
use crate::error::ExtractionResult;
use crate::extract::{mandatory_matrix, ExtractedMetrics, ResultExtractor, START_TIMES_VAR};
use crate::registry::ModelFamily;

/// @ai:intent Reads the start-time matrix only; no resource dimension
pub struct MaintenanceExtractor;

impl ResultExtractor for MaintenanceExtractor {
    fn family(&self) -> ModelFamily {
        ModelFamily::Maintenance
    }

    fn extract(
        &self,
        solution: &RawSolution,
        _durations: Option<&DurationMatrix>,
    ) -> ExtractionResult<ExtractedMetrics> {
        Ok(ExtractedMetrics::Maintenance {
            start_times: mandatory_matrix(solution, self.family(), START_TIMES_VAR)?,
        })
    }
}
