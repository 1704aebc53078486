//! @ai:module:intent Validate that the MiniZinc engine and catalog solvers are installed
//! @ai:module:layer infrastructure
//! @ai:module:public_api ToolchainValidator, ToolchainStatus, MissingSolver
//! @ai:module:stateless true

use crate::engine::{SolverEngine, SolverInfo};
use crate::registry::ModelRegistry;

/// @ai:intent Status of toolchain validation
#[derive(Debug)]
pub struct ToolchainStatus {
    pub engine_version: Option<String>,
    pub engine_error: Option<String>,
    pub available_solvers: Vec<SolverInfo>,
    pub missing_solvers: Vec<MissingSolver>,
}

impl ToolchainStatus {
    pub fn engine_available(&self) -> bool {
        self.engine_version.is_some()
    }
}

/// @ai:intent Catalog solver the engine does not offer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingSolver {
    pub id: String,
    pub name: String,
    pub install_hint: &'static str,
}

/// @ai:intent Validates that required tools are installed
pub struct ToolchainValidator;

impl ToolchainValidator {
    /// @ai:intent Get install hint for a solver id
    /// @ai:effects pure
    fn get_install_hint(solver_id: &str) -> &'static str {
        match solver_id {
            "org.gecode.gecode" | "org.chuffed.chuffed" => {
                "Bundled with the MiniZinc IDE: https://www.minizinc.org/downloads/"
            }
            "org.minizinc.mip.coin-bc" => "Bundled with the MiniZinc IDE (COIN-BC MIP backend)",
            "org.minizinc.mip.highs" => "Install HiGHS and make its library visible to MiniZinc",
            _ => "Check the solver documentation for installation instructions",
        }
    }

    /// @ai:intent Query the engine version and solver list, and diff against the catalog
    /// @ai:effects io
    pub async fn validate<E: SolverEngine>(engine: &E, registry: &ModelRegistry) -> ToolchainStatus {
        let (engine_version, engine_error) = match engine.version().await {
            Ok(version) => (Some(version), None),
            Err(e) => (None, Some(e.to_string())),
        };

        let available_solvers = if engine_version.is_some() {
            engine.available_solvers().await.unwrap_or_else(|e| {
                tracing::warn!("Could not list solvers: {}", e);
                vec![]
            })
        } else {
            vec![]
        };

        let missing_solvers = registry
            .solvers()
            .iter()
            .filter(|entry| !available_solvers.iter().any(|s| s.matches(&entry.id)))
            .map(|entry| MissingSolver {
                id: entry.id.clone(),
                name: entry.name.clone(),
                install_hint: Self::get_install_hint(&entry.id),
            })
            .collect();

        ToolchainStatus {
            engine_version,
            engine_error,
            available_solvers,
            missing_solvers,
        }
    }

    /// @ai:intent Log warnings for a missing engine or missing solvers
    /// @ai:effects io
    pub fn log_warnings(status: &ToolchainStatus) {
        if let Some(error) = &status.engine_error {
            tracing::warn!(
                "MiniZinc is not reachable - every solve will fail. {}",
                error
            );
            return;
        }

        for missing in &status.missing_solvers {
            tracing::warn!(
                "Solver '{}' ({}) not installed - requests for it fall back to the default solver. {}",
                missing.name,
                missing.id,
                missing.install_hint
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MockEngine;

    #[tokio::test]
    async fn test_reports_missing_catalog_solvers() {
        let engine = MockEngine::new().with_solvers(&["org.gecode.gecode", "org.chuffed.chuffed"]);
        let registry = ModelRegistry::builtin("models");

        let status = ToolchainValidator::validate(&engine, &registry).await;

        assert!(status.engine_available());
        assert_eq!(status.available_solvers.len(), 2);
        assert!(status
            .missing_solvers
            .iter()
            .all(|m| m.id != "org.gecode.gecode" && m.id != "org.chuffed.chuffed"));
        assert_eq!(
            status.missing_solvers.len(),
            registry.solvers().len() - 2
        );
    }

    #[test]
    fn test_get_install_hint_known_solvers() {
        assert!(ToolchainValidator::get_install_hint("org.gecode.gecode").contains("minizinc.org"));
        assert!(ToolchainValidator::get_install_hint("org.minizinc.mip.highs").contains("HiGHS"));
        assert!(ToolchainValidator::get_install_hint("unknown").contains("documentation"));
    }
}
