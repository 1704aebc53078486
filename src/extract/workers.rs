//! @ai:module:intent Extraction for job-shop models with skilled workers
//! @ai:module:layer domain
//! @ai:module:public_api WorkersSkillsExtractor
//! @ai:module:stateless true

use crate::dataset::DurationMatrix;
use crate::engine::{Binding, RawSolution};
use crate::error::ExtractionResult;
use crate::extract::{
    mandatory_matrix, report_degenerate, ExtractedMetrics, JobTaskMatrix, LoadSource, LoadSummary,
    ResultExtractor, START_TIMES_VAR,
};
use crate::registry::ModelFamily;

const WORKER_ASSIGNMENT_VAR: &str = "w_assign";
const WORKER_LOAD_VAR: &str = "load";
const ASSIGNED_TENSOR_VAR: &str = "assigned";

const MAX_LOAD_NAMES: &[&str] = &["maxLoad", "maxload", "max_load"];
const MIN_LOAD_NAMES: &[&str] = &["minLoad", "minload", "min_load"];

/// @ai:intent Reads start times, worker assignment and a derived worker load
pub struct WorkersSkillsExtractor;

impl ResultExtractor for WorkersSkillsExtractor {
    fn family(&self) -> ModelFamily {
        ModelFamily::WorkersSkills
    }

    /// @ai:intent Copy s/w_assign; derive load through the tier chain
    /// @ai:effects pure
    fn extract(
        &self,
        solution: &RawSolution,
        durations: Option<&DurationMatrix>,
    ) -> ExtractionResult<ExtractedMetrics> {
        let family = self.family();

        let start_times = mandatory_matrix(solution, family, START_TIMES_VAR)?;
        let worker_assignment = mandatory_matrix(solution, family, WORKER_ASSIGNMENT_VAR)?;

        let (load, load_source) = reported_load(solution)
            .or_else(|| tensor_load(solution, durations))
            .or_else(|| assignment_load(&worker_assignment, durations))
            .unwrap_or_else(|| {
                report_degenerate("worker_load");
                (vec![], LoadSource::Unavailable)
            });

        let worker_load =
            LoadSummary::resolve(solution, load, load_source, MAX_LOAD_NAMES, MIN_LOAD_NAMES);

        Ok(ExtractedMetrics::WorkersSkills {
            start_times,
            worker_assignment,
            worker_load,
        })
    }
}

/// Tier 1: the model exports the load vector itself.
fn reported_load(solution: &RawSolution) -> Option<(Vec<u64>, LoadSource)> {
    let load = solution.get(WORKER_LOAD_VAR)?.as_u64_vector()?;
    Some((load, LoadSource::Reported(WORKER_LOAD_VAR.to_string())))
}

/// Tier 2: `assigned[worker][job][task]`, workers indexed by position.
fn tensor_load(
    solution: &RawSolution,
    durations: Option<&DurationMatrix>,
) -> Option<(Vec<u64>, LoadSource)> {
    let assigned = solution
        .get(ASSIGNED_TENSOR_VAR)
        .and_then(Binding::as_bool_tensor3)?;
    let durations = durations?;

    let num_jobs = durations.len();
    let num_tasks = durations.first().map(Vec::len).unwrap_or(0);

    let mut load = Vec::with_capacity(assigned.len());
    for plane in &assigned {
        let mut total = 0u64;
        for job in 0..num_jobs {
            for task in 0..num_tasks {
                if *plane.get(job)?.get(task)? {
                    total += *durations[job].get(task)?;
                }
            }
        }
        load.push(total);
    }

    Some((load, LoadSource::AssignedTensor))
}

/// Tier 3: 1-indexed worker ids in `w_assign`; resource count is the highest id.
/// Ids above the number of assignment cells cannot name real workers and disable the tier.
fn assignment_load(
    assignment: &JobTaskMatrix,
    durations: Option<&DurationMatrix>,
) -> Option<(Vec<u64>, LoadSource)> {
    let durations = durations?;

    let num_tasks = assignment.first().map(Vec::len).unwrap_or(0);
    let cells: usize = assignment.iter().map(Vec::len).sum();
    let max_id = assignment
        .iter()
        .flat_map(|row| row.iter().copied())
        .max()
        .unwrap_or(0)
        .max(0);
    let num_workers = usize::try_from(max_id).ok().filter(|&n| n <= cells)?;

    let mut load = vec![0u64; num_workers];
    for (job, row) in assignment.iter().enumerate() {
        for task in 0..num_tasks {
            let worker = row
                .get(task)?
                .checked_sub(1)
                .and_then(|w| usize::try_from(w).ok())
                .filter(|&w| w < num_workers);
            if let Some(worker) = worker {
                load[worker] += *durations.get(job)?.get(task)?;
            }
        }
    }

    Some((load, LoadSource::AssignmentMatrix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SolveStatus;
    use crate::extract::ValueSource;
    use pretty_assertions::assert_eq;

    fn base_solution() -> RawSolution {
        RawSolution::new(SolveStatus::Satisfied)
            .with_binding("s", vec![vec![0i64, 3], vec![0, 5]])
            .with_binding("w_assign", vec![vec![1i64, 2], vec![2, 1]])
    }

    fn durations() -> DurationMatrix {
        vec![vec![3, 4], vec![5, 2]]
    }

    #[test]
    fn test_reported_load_wins() {
        let solution = base_solution()
            .with_binding("load", vec![7i64, 7])
            .with_binding("assigned", vec![vec![vec![true, false]]]);

        let metrics = WorkersSkillsExtractor
            .extract(&solution, Some(&durations()))
            .unwrap();
        let load = metrics.load().unwrap();

        assert_eq!(load.load, vec![7, 7]);
        assert_eq!(load.load_source, LoadSource::Reported("load".to_string()));
        assert_eq!(load.imbalance, 0);
    }

    #[test]
    fn test_tensor_tier_sums_true_cells() {
        let assigned = vec![
            vec![vec![true, false], vec![false, true]],
            vec![vec![false, true], vec![true, false]],
        ];
        let solution = base_solution().with_binding("assigned", assigned);

        let metrics = WorkersSkillsExtractor
            .extract(&solution, Some(&durations()))
            .unwrap();
        let load = metrics.load().unwrap();

        assert_eq!(load.load, vec![5, 9]);
        assert_eq!(load.load_source, LoadSource::AssignedTensor);
    }

    #[test]
    fn test_assignment_tier_uses_one_indexed_ids() {
        let metrics = WorkersSkillsExtractor
            .extract(&base_solution(), Some(&durations()))
            .unwrap();
        let load = metrics.load().unwrap();

        assert_eq!(load.load, vec![5, 9]);
        assert_eq!(load.load_source, LoadSource::AssignmentMatrix);
        assert_eq!(load.max_load, 9);
        assert_eq!(load.min_load, 5);
        assert_eq!(load.imbalance, 4);
        assert_eq!(load.max_source, ValueSource::Computed);
    }

    #[test]
    fn test_assignment_tier_counts_idle_workers() {
        let solution = RawSolution::new(SolveStatus::Satisfied)
            .with_binding("s", vec![vec![0i64, 3], vec![0, 2]])
            .with_binding("w_assign", vec![vec![3i64, 3], vec![3, 1]]);

        let metrics = WorkersSkillsExtractor
            .extract(&solution, Some(&vec![vec![2, 6], vec![1, 4]]))
            .unwrap();

        assert_eq!(metrics.load().unwrap().load, vec![4, 0, 9]);
        assert_eq!(metrics.load().unwrap().imbalance, 9);
    }

    #[test]
    fn test_assignment_tier_rejects_ids_beyond_cell_count() {
        let solution = RawSolution::new(SolveStatus::Satisfied)
            .with_binding("s", vec![vec![0i64, 3]])
            .with_binding("w_assign", vec![vec![1i64, 1_000_000_000_000]]);

        let metrics = WorkersSkillsExtractor
            .extract(&solution, Some(&vec![vec![3, 4]]))
            .unwrap();
        let load = metrics.load().unwrap();

        assert_eq!(load.load_source, LoadSource::Unavailable);
        assert!(load.load.is_empty());
    }

    #[test]
    fn test_assignment_tier_skips_non_positive_ids() {
        let solution = RawSolution::new(SolveStatus::Satisfied)
            .with_binding("s", vec![vec![0i64, 3]])
            .with_binding("w_assign", vec![vec![1i64, i64::MIN]]);

        let metrics = WorkersSkillsExtractor
            .extract(&solution, Some(&vec![vec![3, 4]]))
            .unwrap();

        assert_eq!(metrics.load().unwrap().load, vec![3]);
        assert_eq!(metrics.load().unwrap().load_source, LoadSource::AssignmentMatrix);
    }

    #[test]
    fn test_mismatched_tensor_falls_through_to_assignment() {
        // tensor covers a single job while durations have two
        let solution =
            base_solution().with_binding("assigned", vec![vec![vec![true, true]]]);

        let metrics = WorkersSkillsExtractor
            .extract(&solution, Some(&durations()))
            .unwrap();

        assert_eq!(metrics.load().unwrap().load_source, LoadSource::AssignmentMatrix);
        assert_eq!(metrics.load().unwrap().load, vec![5, 9]);
    }

    #[test]
    fn test_without_durations_load_is_empty() {
        let metrics = WorkersSkillsExtractor.extract(&base_solution(), None).unwrap();
        let load = metrics.load().unwrap();

        assert!(load.load.is_empty());
        assert_eq!(load.load_source, LoadSource::Unavailable);
        assert_eq!(load.max_load, 0);
        assert_eq!(load.min_load, 0);
        assert_eq!(load.imbalance, 0);
    }

    #[test]
    fn test_named_max_min_with_empty_load() {
        let solution = base_solution()
            .with_binding("maxload", 12i64)
            .with_binding("min_load", 4i64);

        let metrics = WorkersSkillsExtractor.extract(&solution, None).unwrap();
        let load = metrics.load().unwrap();

        assert_eq!(load.max_load, 12);
        assert_eq!(load.min_load, 4);
        assert_eq!(load.imbalance, 8);
    }

    #[test]
    fn test_missing_worker_assignment_is_mandatory() {
        let mut solution = base_solution();
        solution.bindings.remove("w_assign");

        assert!(WorkersSkillsExtractor
            .extract(&solution, Some(&durations()))
            .is_err());
    }
}
