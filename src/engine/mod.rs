//! @ai:module:intent Contract of the external constraint-solving engine and its raw output
//! @ai:module:layer infrastructure
//! @ai:module:public_api SolverEngine, RawSolution, Binding, SolveStatus, SolveStatistics, SolverInfo, MiniZincDriver, MockEngine

pub mod minizinc;
pub mod mock;
pub mod stream;

pub use minizinc::MiniZincDriver;
pub use mock::{MockEngine, MockOutcome};

use crate::error::SolveResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// @ai:intent Trait for an engine able to run a model file against a dataset file
pub trait SolverEngine: Send + Sync {
    /// @ai:intent Report the engine version string
    fn version(&self) -> impl std::future::Future<Output = SolveResult<String>> + Send;

    /// @ai:intent List the solvers the engine can run
    fn available_solvers(
        &self,
    ) -> impl std::future::Future<Output = SolveResult<Vec<SolverInfo>>> + Send;

    /// @ai:intent Execute one solve; a single attempt bounded by `timeout`
    fn solve(
        &self,
        model: &Path,
        dataset: &Path,
        solver: &str,
        timeout: Duration,
    ) -> impl std::future::Future<Output = SolveResult<RawSolution>> + Send;
}

/// @ai:intent Solver known to the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl SolverInfo {
    /// @ai:intent True when a lookup key names this solver by id or tag
    /// @ai:effects pure
    pub fn matches(&self, key: &str) -> bool {
        self.id == key || self.tags.iter().any(|t| t == key)
    }
}

/// @ai:intent Final status reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolveStatus {
    Optimal,
    Satisfied,
    AllSolutions,
    Unsatisfiable,
    Unknown,
    Error,
}

impl SolveStatus {
    /// @ai:intent Map a MiniZinc status string onto the status set
    /// @ai:effects pure
    pub fn from_minizinc(status: &str) -> Self {
        match status {
            "OPTIMAL_SOLUTION" => SolveStatus::Optimal,
            "SATISFIED" => SolveStatus::Satisfied,
            "ALL_SOLUTIONS" => SolveStatus::AllSolutions,
            "UNSATISFIABLE" | "UNSAT_OR_UNBOUNDED" => SolveStatus::Unsatisfiable,
            "ERROR" => SolveStatus::Error,
            _ => SolveStatus::Unknown,
        }
    }

    /// @ai:intent Status text shown in comparison records
    /// @ai:effects pure
    pub fn as_str(&self) -> &'static str {
        match self {
            SolveStatus::Optimal => "OPTIMAL_SOLUTION",
            SolveStatus::Satisfied => "SATISFIED",
            SolveStatus::AllSolutions => "ALL_SOLUTIONS",
            SolveStatus::Unsatisfiable => "UNSATISFIABLE",
            SolveStatus::Unknown => "UNKNOWN",
            SolveStatus::Error => "ERROR",
        }
    }

    /// @ai:intent Only these statuses carry bindings worth extracting
    /// @ai:effects pure
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            SolveStatus::Optimal | SolveStatus::Satisfied | SolveStatus::AllSolutions
        )
    }

    pub fn description(&self) -> &'static str {
        match self {
            SolveStatus::Optimal => "optimal solution found",
            SolveStatus::Satisfied => "solution found, optimality not proven",
            SolveStatus::AllSolutions => "all solutions enumerated",
            SolveStatus::Unsatisfiable => "the model has no solution for this dataset",
            SolveStatus::Unknown => "no solution found within the time limit",
            SolveStatus::Error => "the engine reported an error status",
        }
    }
}

impl std::fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// @ai:intent One value bound to an output variable: scalar, vector or nested array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Binding {
    Bool(bool),
    Int(i64),
    Float(f64),
    Array(Vec<Binding>),
    Other(serde_json::Value),
}

impl Binding {
    /// @ai:effects pure
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Binding::Int(v) => Some(*v),
            Binding::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    /// @ai:effects pure
    pub fn as_u64(&self) -> Option<u64> {
        self.as_i64().and_then(|v| u64::try_from(v).ok())
    }

    /// @ai:intent Booleans, or 0/1 integers as some solvers print them
    /// @ai:effects pure
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Binding::Bool(b) => Some(*b),
            Binding::Int(0) => Some(false),
            Binding::Int(1) => Some(true),
            _ => None,
        }
    }

    fn as_array(&self) -> Option<&[Binding]> {
        match self {
            Binding::Array(items) => Some(items),
            _ => None,
        }
    }

    /// @ai:effects pure
    pub fn as_i64_vector(&self) -> Option<Vec<i64>> {
        self.as_array()?.iter().map(Binding::as_i64).collect()
    }

    /// @ai:effects pure
    pub fn as_u64_vector(&self) -> Option<Vec<u64>> {
        self.as_array()?.iter().map(Binding::as_u64).collect()
    }

    /// @ai:effects pure
    pub fn as_i64_matrix(&self) -> Option<Vec<Vec<i64>>> {
        self.as_array()?.iter().map(Binding::as_i64_vector).collect()
    }

    /// @ai:intent Read a 3-dimensional boolean array
    /// @ai:effects pure
    pub fn as_bool_tensor3(&self) -> Option<Vec<Vec<Vec<bool>>>> {
        self.as_array()?
            .iter()
            .map(|plane| {
                plane
                    .as_array()?
                    .iter()
                    .map(|row| row.as_array()?.iter().map(Binding::as_bool).collect())
                    .collect()
            })
            .collect()
    }
}

impl From<i64> for Binding {
    fn from(v: i64) -> Self {
        Binding::Int(v)
    }
}

impl From<bool> for Binding {
    fn from(v: bool) -> Self {
        Binding::Bool(v)
    }
}

impl<T: Into<Binding>> From<Vec<T>> for Binding {
    fn from(items: Vec<T>) -> Self {
        Binding::Array(items.into_iter().map(Into::into).collect())
    }
}

/// @ai:intent Statistics reported alongside a solve
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolveStatistics {
    /// Engine-reported solving time
    pub solve_time: Option<Duration>,
    #[serde(default)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl SolveStatistics {
    /// @ai:effects pure
    pub fn solve_seconds(&self) -> f64 {
        self.solve_time.map(|d| d.as_secs_f64()).unwrap_or(0.0)
    }
}

/// @ai:intent Status, bindings and statistics of one engine execution
#[derive(Debug, Clone, PartialEq)]
pub struct RawSolution {
    pub status: SolveStatus,
    pub bindings: BTreeMap<String, Binding>,
    pub statistics: SolveStatistics,
}

impl RawSolution {
    /// @ai:intent Create a solution with no bindings
    /// @ai:effects pure
    pub fn new(status: SolveStatus) -> Self {
        Self {
            status,
            bindings: BTreeMap::new(),
            statistics: SolveStatistics::default(),
        }
    }

    /// @ai:intent Builder-style binding insertion
    /// @ai:effects pure
    pub fn with_binding(mut self, name: &str, value: impl Into<Binding>) -> Self {
        self.bindings.insert(name.to_string(), value.into());
        self
    }

    /// @ai:effects pure
    pub fn with_solve_time(mut self, solve_time: Duration) -> Self {
        self.statistics.solve_time = Some(solve_time);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping_from_minizinc() {
        assert_eq!(SolveStatus::from_minizinc("OPTIMAL_SOLUTION"), SolveStatus::Optimal);
        assert_eq!(SolveStatus::from_minizinc("UNSAT_OR_UNBOUNDED"), SolveStatus::Unsatisfiable);
        assert_eq!(SolveStatus::from_minizinc("UNBOUNDED"), SolveStatus::Unknown);
        assert!(SolveStatus::AllSolutions.is_success());
        assert!(!SolveStatus::Unknown.is_success());
    }

    #[test]
    fn test_binding_deserializes_nested_arrays() {
        let value: Binding = serde_json::from_str("[[1, 2], [3, 4]]").unwrap();
        assert_eq!(value.as_i64_matrix(), Some(vec![vec![1, 2], vec![3, 4]]));
        assert_eq!(value.as_i64_vector(), None);
    }

    #[test]
    fn test_binding_rejects_negative_loads() {
        let value: Binding = vec![3i64, -1].into();
        assert_eq!(value.as_i64_vector(), Some(vec![3, -1]));
        assert_eq!(value.as_u64_vector(), None);
    }

    #[test]
    fn test_bool_tensor_accepts_zero_one() {
        let value: Binding = serde_json::from_str("[[[true, 0]], [[1, false]]]").unwrap();
        assert_eq!(
            value.as_bool_tensor3(),
            Some(vec![vec![vec![true, false]], vec![vec![true, false]]])
        );
    }

    #[test]
    fn test_solver_info_matches_id_or_tag() {
        let info = SolverInfo {
            id: "org.gecode.gecode".to_string(),
            name: "Gecode".to_string(),
            version: "6.3.0".to_string(),
            tags: vec!["cp".to_string(), "gecode".to_string()],
        };
        assert!(info.matches("org.gecode.gecode"));
        assert!(info.matches("gecode"));
        assert!(!info.matches("chuffed"));
    }
}
