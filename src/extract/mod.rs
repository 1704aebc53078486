//! @ai:module:intent Per-family extraction of typed metrics from raw engine bindings
//! @ai:module:layer domain
//! @ai:module:public_api ResultExtractor, ExtractedMetrics, LoadSummary, LoadSource, read_makespan
//! @ai:module:stateless true

pub mod maintenance;
pub mod op_limit;
pub mod resolve;
pub mod workers;

pub use maintenance::MaintenanceExtractor;
pub use op_limit::OpLimitExtractor;
pub use resolve::{ResolutionChain, Resolved, ValueSource};
pub use workers::WorkersSkillsExtractor;

use crate::dataset::DurationMatrix;
use crate::engine::{Binding, RawSolution};
use crate::error::{ExtractionError, ExtractionResult};
use crate::registry::ModelFamily;
use serde::{Deserialize, Serialize};

/// Matrix indexed by job then task.
pub type JobTaskMatrix = Vec<Vec<i64>>;

/// Start-time matrix variable exported by every family.
pub const START_TIMES_VAR: &str = "s";
/// Makespan variable.
pub const MAKESPAN_VAR: &str = "end";

/// @ai:intent Trait for turning raw bindings into metrics for one model family
pub trait ResultExtractor: Send + Sync {
    /// @ai:intent Family this strategy handles
    fn family(&self) -> ModelFamily;

    /// @ai:intent Extract metrics; fails only on a missing mandatory variable
    fn extract(
        &self,
        solution: &RawSolution,
        durations: Option<&DurationMatrix>,
    ) -> ExtractionResult<ExtractedMetrics>;
}

impl ModelFamily {
    /// @ai:intent Extraction strategy for this family
    /// @ai:effects pure
    pub fn extractor(&self) -> &'static dyn ResultExtractor {
        match self {
            ModelFamily::OpLimit => &OpLimitExtractor,
            ModelFamily::WorkersSkills => &WorkersSkillsExtractor,
            ModelFamily::Maintenance => &MaintenanceExtractor,
        }
    }
}

/// @ai:intent How a load vector was obtained
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "variable")]
pub enum LoadSource {
    /// Exported directly by the model
    Reported(String),
    /// Summed from the boolean assignment tensor and dataset durations
    AssignedTensor,
    /// Summed from the 1-indexed assignment matrix and dataset durations
    AssignmentMatrix,
    /// Nothing to derive it from
    Unavailable,
}

/// @ai:intent Per-resource load with its spread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadSummary {
    pub load: Vec<u64>,
    pub load_source: LoadSource,
    pub max_load: u64,
    pub max_source: ValueSource,
    pub min_load: u64,
    pub min_source: ValueSource,
    pub imbalance: u64,
}

impl LoadSummary {
    /// @ai:intent Resolve max/min through named candidates, computing from the vector otherwise
    /// @ai:post imbalance == max_load - min_load, never negative
    /// @ai:effects pure
    pub fn resolve(
        solution: &RawSolution,
        load: Vec<u64>,
        load_source: LoadSource,
        max_candidates: &[&'static str],
        min_candidates: &[&'static str],
    ) -> Self {
        let max = ResolutionChain::new(solution, max_candidates).or_compute(Binding::as_u64, || {
            load.iter().copied().max().unwrap_or_else(|| {
                report_degenerate("max_load");
                0
            })
        });

        let min = ResolutionChain::new(solution, min_candidates).or_compute(Binding::as_u64, || {
            load.iter().copied().min().unwrap_or_else(|| {
                report_degenerate("min_load");
                0
            })
        });

        Self {
            imbalance: max.value.saturating_sub(min.value),
            load,
            load_source,
            max_load: max.value,
            max_source: max.source,
            min_load: min.value,
            min_source: min.source,
        }
    }

    pub fn num_resources(&self) -> usize {
        self.load.len()
    }
}

/// @ai:intent Family-specific typed projection of a solution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum ExtractedMetrics {
    OpLimit {
        start_times: JobTaskMatrix,
        operator_assignment: JobTaskMatrix,
        operator_load: LoadSummary,
    },
    WorkersSkills {
        start_times: JobTaskMatrix,
        worker_assignment: JobTaskMatrix,
        worker_load: LoadSummary,
    },
    Maintenance {
        start_times: JobTaskMatrix,
    },
}

impl ExtractedMetrics {
    pub fn family(&self) -> ModelFamily {
        match self {
            ExtractedMetrics::OpLimit { .. } => ModelFamily::OpLimit,
            ExtractedMetrics::WorkersSkills { .. } => ModelFamily::WorkersSkills,
            ExtractedMetrics::Maintenance { .. } => ModelFamily::Maintenance,
        }
    }

    pub fn start_times(&self) -> &JobTaskMatrix {
        match self {
            ExtractedMetrics::OpLimit { start_times, .. }
            | ExtractedMetrics::WorkersSkills { start_times, .. }
            | ExtractedMetrics::Maintenance { start_times } => start_times,
        }
    }

    /// @ai:intent Operator or worker assignment, when the family has one
    pub fn assignment(&self) -> Option<&JobTaskMatrix> {
        match self {
            ExtractedMetrics::OpLimit {
                operator_assignment,
                ..
            } => Some(operator_assignment),
            ExtractedMetrics::WorkersSkills {
                worker_assignment, ..
            } => Some(worker_assignment),
            ExtractedMetrics::Maintenance { .. } => None,
        }
    }

    /// @ai:intent Load summary, when the family has a resource dimension
    pub fn load(&self) -> Option<&LoadSummary> {
        match self {
            ExtractedMetrics::OpLimit { operator_load, .. } => Some(operator_load),
            ExtractedMetrics::WorkersSkills { worker_load, .. } => Some(worker_load),
            ExtractedMetrics::Maintenance { .. } => None,
        }
    }
}

/// @ai:intent Read a mandatory integer matrix
/// @ai:effects pure
pub(crate) fn mandatory_matrix(
    solution: &RawSolution,
    family: ModelFamily,
    variable: &'static str,
) -> ExtractionResult<JobTaskMatrix> {
    solution
        .get(variable)
        .and_then(Binding::as_i64_matrix)
        .ok_or(ExtractionError::MissingMandatoryVariable { family, variable })
}

/// @ai:intent Read the makespan (`end`) of a successful solution
/// @ai:effects pure
pub fn read_makespan(solution: &RawSolution, family: ModelFamily) -> ExtractionResult<i64> {
    solution
        .get(MAKESPAN_VAR)
        .and_then(Binding::as_i64)
        .ok_or(ExtractionError::MissingMandatoryVariable {
            family,
            variable: MAKESPAN_VAR,
        })
}

pub(crate) fn report_degenerate(metric: &'static str) {
    tracing::warn!("{}", ExtractionError::DegenerateMetric { metric });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SolveStatus;

    #[test]
    fn test_family_dispatch() {
        for family in [
            ModelFamily::OpLimit,
            ModelFamily::WorkersSkills,
            ModelFamily::Maintenance,
        ] {
            assert_eq!(family.extractor().family(), family);
        }
    }

    #[test]
    fn test_load_summary_on_empty_load_is_zero() {
        let solution = RawSolution::new(SolveStatus::Optimal);
        let summary =
            LoadSummary::resolve(&solution, vec![], LoadSource::Unavailable, &["maxLoad"], &["minLoad"]);

        assert_eq!(summary.max_load, 0);
        assert_eq!(summary.min_load, 0);
        assert_eq!(summary.imbalance, 0);
        assert_eq!(summary.num_resources(), 0);
    }

    #[test]
    fn test_read_makespan() {
        let solution = RawSolution::new(SolveStatus::Optimal).with_binding("end", 17i64);
        assert_eq!(read_makespan(&solution, ModelFamily::Maintenance), Ok(17));

        let empty = RawSolution::new(SolveStatus::Optimal);
        assert_eq!(
            read_makespan(&empty, ModelFamily::OpLimit),
            Err(ExtractionError::MissingMandatoryVariable {
                family: ModelFamily::OpLimit,
                variable: "end"
            })
        );
    }

    #[test]
    fn test_metrics_serialize_with_family_tag() {
        let metrics = ExtractedMetrics::Maintenance {
            start_times: vec![vec![0, 2]],
        };
        let json = serde_json::to_value(&metrics).unwrap();
        assert_eq!(json["family"], "maintenance");
        assert_eq!(json["start_times"][0][1], 2);
    }
}
