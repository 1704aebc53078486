//! @ai:module:intent Execute one solve request against the engine
//! @ai:module:layer application
//! @ai:module:public_api SolveInvoker, SolveRequest
//! @ai:module:stateless true

use crate::engine::{RawSolution, SolverEngine};
use crate::error::{SolveError, SolveResult};
use crate::registry::{ModelDescriptor, DEFAULT_SOLVER};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// @ai:intent One (model, dataset, solver, timeout) request
#[derive(Debug, Clone, PartialEq)]
pub struct SolveRequest {
    pub descriptor: ModelDescriptor,
    pub model_path: PathBuf,
    pub dataset_path: PathBuf,
    pub solver: String,
    pub timeout: Duration,
}

/// @ai:intent Resolves the solver and runs a single engine attempt
pub struct SolveInvoker<E: SolverEngine> {
    engine: Arc<E>,
    default_solver: String,
}

impl<E: SolverEngine> SolveInvoker<E> {
    /// @ai:intent Create an invoker falling back to Gecode
    /// @ai:effects pure
    pub fn new(engine: Arc<E>) -> Self {
        Self {
            engine,
            default_solver: DEFAULT_SOLVER.to_string(),
        }
    }

    /// @ai:effects pure
    pub fn with_default_solver(mut self, solver: impl Into<String>) -> Self {
        self.default_solver = solver.into();
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// @ai:intent Pick the requested solver, else the default one
    /// @ai:post error only when neither solver is installed
    /// @ai:effects io
    pub async fn select_solver(&self, requested: &str) -> SolveResult<String> {
        let solvers = self.engine.available_solvers().await?;

        if solvers.iter().any(|s| s.matches(requested)) {
            return Ok(requested.to_string());
        }

        if solvers.iter().any(|s| s.matches(&self.default_solver)) {
            tracing::warn!(
                "Solver '{}' is not available, falling back to '{}'",
                requested,
                self.default_solver
            );
            return Ok(self.default_solver.clone());
        }

        Err(SolveError::engine(format!(
            "solver '{}' not found and default solver '{}' is unavailable",
            requested, self.default_solver
        )))
    }

    /// @ai:intent Run the request once; no retry on timeout or error
    /// @ai:pre model and dataset files exist
    /// @ai:effects io
    pub async fn invoke(&self, request: &SolveRequest) -> SolveResult<RawSolution> {
        if !request.model_path.exists() {
            return Err(SolveError::ModelNotFound(
                request.model_path.display().to_string(),
            ));
        }

        if !request.dataset_path.exists() {
            return Err(SolveError::DatasetNotFound(request.dataset_path.clone()));
        }

        let solver = self.select_solver(&request.solver).await?;

        tracing::info!(
            "Solving {} with {} (timeout {}s)",
            request.descriptor.id,
            solver,
            request.timeout.as_secs()
        );

        self.engine
            .solve(
                &request.model_path,
                &request.dataset_path,
                &solver,
                request.timeout,
            )
            .await
    }
}
