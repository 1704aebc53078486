//! @ai:module:intent Extraction for job-shop models with a limited operator pool
//! @ai:module:layer domain
//! @ai:module:public_api OpLimitExtractor
//! @ai:module:stateless true

use crate::dataset::DurationMatrix;
use crate::engine::{Binding, RawSolution};
use crate::error::{ExtractionError, ExtractionResult};
use crate::extract::{
    mandatory_matrix, ExtractedMetrics, LoadSource, LoadSummary, ResultExtractor, START_TIMES_VAR,
};
use crate::registry::ModelFamily;

const OPERATOR_ASSIGNMENT_VAR: &str = "o";
const OPERATOR_LOAD_VAR: &str = "carga";

const MAX_LOAD_NAMES: &[&str] = &["maxload", "maxLoad", "max_load", "maxCarga"];
const MIN_LOAD_NAMES: &[&str] = &["minload", "minLoad", "min_load", "minCarga"];

/// @ai:intent Reads start times, operator assignment and operator load
pub struct OpLimitExtractor;

impl ResultExtractor for OpLimitExtractor {
    fn family(&self) -> ModelFamily {
        ModelFamily::OpLimit
    }

    /// @ai:intent Copy s/o/carga directly; resolve max/min by name or compute them
    /// @ai:effects pure
    fn extract(
        &self,
        solution: &RawSolution,
        _durations: Option<&DurationMatrix>,
    ) -> ExtractionResult<ExtractedMetrics> {
        let family = self.family();

        let start_times = mandatory_matrix(solution, family, START_TIMES_VAR)?;
        let operator_assignment = mandatory_matrix(solution, family, OPERATOR_ASSIGNMENT_VAR)?;

        let load = solution
            .get(OPERATOR_LOAD_VAR)
            .and_then(Binding::as_u64_vector)
            .ok_or(ExtractionError::MissingMandatoryVariable {
                family,
                variable: OPERATOR_LOAD_VAR,
            })?;

        let operator_load = LoadSummary::resolve(
            solution,
            load,
            LoadSource::Reported(OPERATOR_LOAD_VAR.to_string()),
            MAX_LOAD_NAMES,
            MIN_LOAD_NAMES,
        );

        Ok(ExtractedMetrics::OpLimit {
            start_times,
            operator_assignment,
            operator_load,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SolveStatus;
    use crate::extract::ValueSource;
    use pretty_assertions::assert_eq;

    fn base_solution() -> RawSolution {
        RawSolution::new(SolveStatus::Optimal)
            .with_binding("s", vec![vec![0i64, 3], vec![3, 8]])
            .with_binding("o", vec![vec![1i64, 2], vec![3, 1]])
            .with_binding("carga", vec![5i64, 3, 8])
    }

    #[test]
    fn test_computes_max_min_from_load() {
        let metrics = OpLimitExtractor.extract(&base_solution(), None).unwrap();
        let load = metrics.load().unwrap();

        assert_eq!(load.load, vec![5, 3, 8]);
        assert_eq!(load.max_load, 8);
        assert_eq!(load.min_load, 3);
        assert_eq!(load.imbalance, 5);
        assert_eq!(load.max_source, ValueSource::Computed);
        assert_eq!(metrics.assignment(), Some(&vec![vec![1, 2], vec![3, 1]]));
    }

    #[test]
    fn test_named_variables_take_precedence() {
        let solution = base_solution()
            .with_binding("maxCarga", 10i64)
            .with_binding("minLoad", 2i64);

        let metrics = OpLimitExtractor.extract(&solution, None).unwrap();
        let load = metrics.load().unwrap();

        assert_eq!(load.max_load, 10);
        assert_eq!(load.max_source, ValueSource::Named("maxCarga".to_string()));
        assert_eq!(load.min_load, 2);
        assert_eq!(load.imbalance, 8);
    }

    #[test]
    fn test_candidate_order_is_respected() {
        let solution = base_solution()
            .with_binding("maxLoad", 11i64)
            .with_binding("maxload", 9i64);

        let metrics = OpLimitExtractor.extract(&solution, None).unwrap();
        assert_eq!(metrics.load().unwrap().max_load, 9);
    }

    #[test]
    fn test_missing_operator_load_is_mandatory() {
        let mut solution = base_solution();
        solution.bindings.remove("carga");

        let err = OpLimitExtractor.extract(&solution, None).unwrap_err();
        assert_eq!(
            err,
            ExtractionError::MissingMandatoryVariable {
                family: ModelFamily::OpLimit,
                variable: "carga"
            }
        );
    }

    #[test]
    fn test_missing_start_times_is_mandatory() {
        let mut solution = base_solution();
        solution.bindings.remove("s");

        assert!(matches!(
            OpLimitExtractor.extract(&solution, None),
            Err(ExtractionError::MissingMandatoryVariable { variable: "s", .. })
        ));
    }
}
