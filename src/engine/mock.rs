//! @ai:module:intent Scripted in-process engine for tests and dry runs
//! @ai:module:layer infrastructure
//! @ai:module:public_api MockEngine, MockOutcome
//! @ai:module:stateless false

use crate::engine::{RawSolution, SolverEngine, SolverInfo};
use crate::error::{SolveError, SolveResult};
use crate::registry::DEFAULT_SOLVER;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// @ai:intent What the mock returns for one model
#[derive(Debug, Clone)]
pub enum MockOutcome {
    Solution(RawSolution),
    Error(String),
    /// Panics inside the solve task
    Panic,
}

/// @ai:intent Engine double keyed by model file stem; records every solve call
#[derive(Debug)]
pub struct MockEngine {
    solvers: Vec<SolverInfo>,
    outcomes: HashMap<String, MockOutcome>,
    delay: Duration,
    calls: Mutex<Vec<(String, String)>>,
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl MockEngine {
    /// @ai:intent Create a mock offering only the default solver
    /// @ai:effects pure
    pub fn new() -> Self {
        Self {
            solvers: vec![solver_info(DEFAULT_SOLVER)],
            outcomes: HashMap::new(),
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// @ai:effects pure
    pub fn with_solvers(mut self, ids: &[&str]) -> Self {
        self.solvers = ids.iter().map(|id| solver_info(id)).collect();
        self
    }

    /// @ai:intent Script the outcome for a model id (its file stem)
    /// @ai:effects pure
    pub fn with_outcome(mut self, model_id: &str, outcome: MockOutcome) -> Self {
        self.outcomes.insert(model_id.to_string(), outcome);
        self
    }

    /// @ai:intent Make every solve take this long
    /// @ai:effects pure
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// @ai:intent Model ids solved so far, in call order
    /// @ai:effects state:read
    pub fn calls(&self) -> Vec<String> {
        self.lock_calls().iter().map(|(model, _)| model.clone()).collect()
    }

    /// @ai:intent Solver ids used so far, in call order
    /// @ai:effects state:read
    pub fn solvers_used(&self) -> Vec<String> {
        self.lock_calls().iter().map(|(_, solver)| solver.clone()).collect()
    }

    pub fn calls_for(&self, model_id: &str) -> usize {
        self.lock_calls().iter().filter(|(m, _)| m == model_id).count()
    }

    /// @ai:intent Highest number of solves observed running at once
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<(String, String)>> {
        // A panicking test thread must not hide the recorded calls
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn solver_info(id: &str) -> SolverInfo {
    SolverInfo {
        id: id.to_string(),
        name: id.rsplit('.').next().unwrap_or(id).to_string(),
        version: "mock".to_string(),
        tags: vec![],
    }
}

impl SolverEngine for MockEngine {
    async fn version(&self) -> SolveResult<String> {
        Ok("MiniZinc mock engine".to_string())
    }

    async fn available_solvers(&self) -> SolveResult<Vec<SolverInfo>> {
        Ok(self.solvers.clone())
    }

    /// @ai:intent Return the scripted outcome for the model file stem
    /// @ai:effects state:write, time
    async fn solve(
        &self,
        model: &Path,
        _dataset: &Path,
        solver: &str,
        _timeout: Duration,
    ) -> SolveResult<RawSolution> {
        let model_id = model
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        self.lock_calls().push((model_id.clone(), solver.to_string()));

        let running = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(running, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.active.fetch_sub(1, Ordering::SeqCst);

        match self.outcomes.get(&model_id) {
            Some(MockOutcome::Solution(solution)) => Ok(solution.clone()),
            Some(MockOutcome::Error(message)) => Err(SolveError::engine(message.clone())),
            Some(MockOutcome::Panic) => panic!("scripted panic for model '{model_id}'"),
            None => Err(SolveError::Unexpected(format!(
                "no scripted outcome for model '{model_id}'"
            ))),
        }
    }
}
