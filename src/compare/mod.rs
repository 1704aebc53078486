//! @ai:module:intent Concurrent comparison of model variants on one dataset
//! @ai:module:layer application
//! @ai:module:public_api ComparisonOrchestrator, ComparisonRequest, SingleRun, ComparisonRecord, ComparisonReport
//! @ai:module:stateless true

pub mod record;

pub use record::{
    rank_records, ComparisonRecord, ComparisonReport, ExecutionTime, Makespan,
    STATUS_MESSAGE_LIMIT,
};

use crate::dataset::{load_durations, DurationMatrix};
use crate::engine::SolverEngine;
use crate::error::{CompareError, SolveError, SolveResult};
use crate::extract::read_makespan;
use crate::invoker::{SolveInvoker, SolveRequest};
use crate::registry::{ModelDescriptor, ModelRegistry};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Concurrent solves when the caller does not choose.
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 4;

/// @ai:intent One batch: several models, one dataset, one solver
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRequest {
    pub model_ids: Vec<String>,
    pub dataset_name: String,
    pub solver: String,
    pub timeout: Duration,
    pub concurrency_limit: usize,
}

impl ComparisonRequest {
    /// @ai:effects pure
    pub fn new(
        model_ids: Vec<String>,
        dataset_name: impl Into<String>,
        solver: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            model_ids,
            dataset_name: dataset_name.into(),
            solver: solver.into(),
            timeout,
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
        }
    }

    /// @ai:effects pure
    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit;
        self
    }
}

/// @ai:intent Record of a single run plus the durations it was measured against
#[derive(Debug, Clone, PartialEq)]
pub struct SingleRun {
    pub record: ComparisonRecord,
    pub durations: DurationMatrix,
    pub elapsed: Duration,
}

/// Per-slot plan before any task is spawned.
enum Planned {
    Ready(ComparisonRecord),
    Run(SolveRequest),
}

/// @ai:intent Fans requests out to the engine and folds the records into a ranked report
pub struct ComparisonOrchestrator<E: SolverEngine + 'static> {
    registry: Arc<ModelRegistry>,
    invoker: Arc<SolveInvoker<E>>,
}

impl<E: SolverEngine + 'static> ComparisonOrchestrator<E> {
    /// @ai:intent Create an orchestrator over a registry and an invoker
    /// @ai:effects pure
    pub fn new(registry: Arc<ModelRegistry>, invoker: Arc<SolveInvoker<E>>) -> Self {
        Self { registry, invoker }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn invoker(&self) -> &SolveInvoker<E> {
        &self.invoker
    }

    /// @ai:intent Run every requested model and rank the records by makespan
    /// @ai:pre model_ids non-empty, concurrency_limit > 0
    /// @ai:post one record per distinct model id, sorted by makespan, ties in request order
    /// @ai:effects io, fs:read
    pub async fn compare(
        &self,
        request: &ComparisonRequest,
    ) -> Result<ComparisonReport, CompareError> {
        if request.model_ids.is_empty() {
            return Err(CompareError::NoModels);
        }
        if request.concurrency_limit == 0 {
            return Err(CompareError::ZeroConcurrency);
        }

        let mut model_ids: Vec<&str> = Vec::with_capacity(request.model_ids.len());
        for id in &request.model_ids {
            if model_ids.contains(&id.as_str()) {
                tracing::warn!("Model '{}' requested twice, keeping the first", id);
            } else {
                model_ids.push(id);
            }
        }

        tracing::info!(
            "Comparing {} models on {} with {} (limit {})",
            model_ids.len(),
            request.dataset_name,
            request.solver,
            request.concurrency_limit
        );

        let plan: Vec<Planned> = model_ids
            .iter()
            .map(|id| self.plan(id, &request.dataset_name, &request.solver, request.timeout))
            .collect();

        let permits = model_ids.len().min(request.concurrency_limit);
        let semaphore = Arc::new(Semaphore::new(permits));
        let mut join_set: JoinSet<(usize, ComparisonRecord)> = JoinSet::new();
        let mut slots: Vec<Option<ComparisonRecord>> = vec![None; plan.len()];

        for (slot, planned) in plan.iter().enumerate() {
            match planned {
                Planned::Ready(record) => slots[slot] = Some(record.clone()),
                Planned::Run(solve_request) => {
                    let semaphore = semaphore.clone();
                    let invoker = self.invoker.clone();
                    let solve_request = solve_request.clone();

                    join_set.spawn(async move {
                        let _permit = semaphore.acquire_owned().await.ok();
                        let (record, _) = execute(&invoker, &solve_request).await;
                        (slot, record)
                    });
                }
            }
        }

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((slot, record)) => {
                    tracing::info!("{}: {} ({})", record.model_id, record.status, record.makespan);
                    slots[slot] = Some(record);
                }
                Err(e) => tracing::error!("Solve task aborted: {}", e),
            }
        }

        let mut records: Vec<ComparisonRecord> = slots
            .into_iter()
            .zip(plan)
            .map(|(slot, planned)| match (slot, planned) {
                (Some(record), _) => record,
                (None, Planned::Run(req)) => ComparisonRecord::failed(
                    &req.descriptor,
                    &SolveError::Unexpected("solve task did not complete".to_string()),
                ),
                (None, Planned::Ready(record)) => record,
            })
            .collect();

        rank_records(&mut records);

        let report = ComparisonReport {
            dataset_name: request.dataset_name.clone(),
            solver: request.solver.clone(),
            solver_name: self.registry.solver_name(&request.solver),
            timestamp: chrono::Utc::now().to_rfc3339(),
            records,
        };

        tracing::info!(
            "Comparison finished: {}/{} models succeeded",
            report.successful_count(),
            report.records.len()
        );

        Ok(report)
    }

    /// @ai:intent Run one model against an explicit dataset path
    /// @ai:post failures come back as a failed record, never as Err
    /// @ai:effects io, fs:read
    pub async fn solve_one(
        &self,
        model_id: &str,
        dataset_path: &Path,
        solver: &str,
        timeout: Duration,
    ) -> SingleRun {
        let started = Instant::now();

        let planned = match self.registry.resolve(model_id) {
            Err(_) => Planned::Ready(ComparisonRecord::unknown_model(model_id)),
            Ok(descriptor) => self.plan_for_path(
                descriptor.clone(),
                dataset_path.to_path_buf(),
                solver,
                timeout,
            ),
        };

        let (record, durations) = match planned {
            Planned::Ready(record) => (record, vec![]),
            Planned::Run(request) => execute(&self.invoker, &request).await,
        };

        SingleRun {
            record,
            durations,
            elapsed: started.elapsed(),
        }
    }

    /// @ai:intent Resolve an id into a ready-made failure or a runnable request
    /// @ai:effects fs:read
    fn plan(&self, model_id: &str, dataset_name: &str, solver: &str, timeout: Duration) -> Planned {
        match self.registry.resolve(model_id) {
            Err(_) => {
                tracing::error!("Model '{}' is not in the catalog", model_id);
                Planned::Ready(ComparisonRecord::unknown_model(model_id))
            }
            Ok(descriptor) => {
                let dataset_path = self
                    .registry
                    .dataset_path(descriptor.family.as_str(), dataset_name);
                self.plan_for_path(descriptor.clone(), dataset_path, solver, timeout)
            }
        }
    }

    fn plan_for_path(
        &self,
        descriptor: ModelDescriptor,
        dataset_path: PathBuf,
        solver: &str,
        timeout: Duration,
    ) -> Planned {
        if !dataset_path.is_file() {
            tracing::error!(
                "{}: dataset not found at {}",
                descriptor.id,
                dataset_path.display()
            );
            return Planned::Ready(ComparisonRecord::dataset_missing(&descriptor, &dataset_path));
        }

        Planned::Run(SolveRequest {
            model_path: self.registry.model_path(&descriptor),
            descriptor,
            dataset_path,
            solver: solver.to_string(),
            timeout,
        })
    }
}

/// @ai:intent Failure boundary around one request: every error becomes a record
/// @ai:effects io, fs:read
async fn execute<E: SolverEngine>(
    invoker: &SolveInvoker<E>,
    request: &SolveRequest,
) -> (ComparisonRecord, DurationMatrix) {
    match solve_and_extract(invoker, request).await {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::error!("{} failed: {}", request.descriptor.id, err);
            (ComparisonRecord::failed(&request.descriptor, &err), vec![])
        }
    }
}

async fn solve_and_extract<E: SolverEngine>(
    invoker: &SolveInvoker<E>,
    request: &SolveRequest,
) -> SolveResult<(ComparisonRecord, DurationMatrix)> {
    let raw = invoker.invoke(request).await?;

    let durations = load_durations(&request.dataset_path)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!("{}: durations unavailable: {}", request.descriptor.id, e);
            vec![]
        });

    if !raw.status.is_success() {
        tracing::info!(
            "{}: engine finished with {}",
            request.descriptor.id,
            raw.status.as_str()
        );
        return Ok((
            ComparisonRecord::unsuccessful(&request.descriptor, raw.status),
            durations,
        ));
    }

    let family = request.descriptor.family;
    let makespan = read_makespan(&raw, family)?;
    let duration_view = (!durations.is_empty()).then_some(&durations);
    let metrics = family.extractor().extract(&raw, duration_view)?;

    let record = ComparisonRecord::succeeded(
        &request.descriptor,
        raw.status,
        makespan,
        raw.statistics.solve_seconds(),
        metrics,
    );

    Ok((record, durations))
}
