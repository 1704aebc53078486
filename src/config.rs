//! @ai:module:intent Configuration structs for comparison runs
//! @ai:module:layer infrastructure
//! @ai:module:public_api CompareConfig, PathConfig, EngineConfig, RunConfig
//! @ai:module:stateless true

use crate::engine::MiniZincDriver;
use crate::registry::{
    builtin_models, builtin_solvers, ModelDescriptor, ModelRegistry, SolverEntry, DEFAULT_SOLVER,
};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file picked up from the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "jobshop.toml";

/// @ai:intent Main configuration for the comparison tool
/// @ai:effects pure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompareConfig {
    #[serde(default)]
    pub paths: PathConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub run: RunConfig,
    /// Solver id to display name; empty means the built-in list
    #[serde(default)]
    pub solvers: BTreeMap<String, String>,
    /// Catalog override; absent means the built-in models
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub models: Option<Vec<ModelDescriptor>>,
}

/// @ai:intent Input and output directories
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    #[serde(default = "default_models_dir")]
    pub models_dir: PathBuf,
    #[serde(default = "default_reports_dir")]
    pub reports_dir: PathBuf,
}

/// @ai:intent How the MiniZinc executable is found and stopped
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary: Option<PathBuf>,
    #[serde(default = "default_solver")]
    pub default_solver: String,
    #[serde(default = "default_kill_grace_secs")]
    pub kill_grace_secs: u64,
}

/// @ai:intent Defaults for a comparison batch
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_solver")]
    pub solver: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_concurrency_limit")]
    pub concurrency_limit: usize,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            models_dir: default_models_dir(),
            reports_dir: default_reports_dir(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binary: None,
            default_solver: default_solver(),
            kill_grace_secs: default_kill_grace_secs(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            solver: default_solver(),
            timeout_secs: default_timeout_secs(),
            concurrency_limit: default_concurrency_limit(),
        }
    }
}

fn default_models_dir() -> PathBuf {
    PathBuf::from("models")
}

fn default_reports_dir() -> PathBuf {
    PathBuf::from("reports")
}

fn default_solver() -> String {
    DEFAULT_SOLVER.to_string()
}

fn default_kill_grace_secs() -> u64 {
    5
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_concurrency_limit() -> usize {
    crate::compare::DEFAULT_CONCURRENCY_LIMIT
}

impl CompareConfig {
    /// @ai:intent Load configuration from a TOML file
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    /// @ai:intent Load the given file, else jobshop.toml if present, else defaults
    /// @ai:effects fs:read
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// @ai:intent Save configuration to a TOML file
    /// @ai:effects fs:write
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        Ok(())
    }

    /// @ai:intent Build the registry from the configured catalog
    /// @ai:effects pure
    pub fn to_registry(&self) -> ModelRegistry {
        let models = self.models.clone().unwrap_or_else(builtin_models);

        let solvers = if self.solvers.is_empty() {
            builtin_solvers()
        } else {
            self.solvers
                .iter()
                .map(|(id, name)| SolverEntry {
                    id: id.clone(),
                    name: name.clone(),
                })
                .collect()
        };

        ModelRegistry::new(&self.paths.models_dir, models, solvers)
    }

    /// @ai:intent Build the MiniZinc driver; MINIZINC_BIN_PATH wins over engine.binary
    /// @ai:effects env:read
    pub fn to_driver(&self) -> MiniZincDriver {
        MiniZincDriver::from_env_or(self.engine.binary.clone())
            .with_kill_grace(Duration::from_secs(self.engine.kill_grace_secs))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.run.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ModelFamily;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_empty_file_yields_defaults() {
        let config: CompareConfig = toml::from_str("").unwrap();

        assert_eq!(config.paths.models_dir, PathBuf::from("models"));
        assert_eq!(config.engine.default_solver, "org.gecode.gecode");
        assert_eq!(config.engine.kill_grace_secs, 5);
        assert_eq!(config.run.timeout_secs, 60);
        assert_eq!(config.run.concurrency_limit, 4);
        assert!(config.models.is_none());
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config: CompareConfig = toml::from_str(
            r#"
            [run]
            solver = "org.chuffed.chuffed"

            [solvers]
            "org.chuffed.chuffed" = "Chuffed"
            "#,
        )
        .unwrap();

        assert_eq!(config.run.solver, "org.chuffed.chuffed");
        assert_eq!(config.run.timeout_secs, 60);

        let registry = config.to_registry();
        assert_eq!(registry.solvers().len(), 1);
        assert_eq!(registry.solver_name("org.chuffed.chuffed"), "Chuffed");
        assert_eq!(registry.models().len(), 9);
    }

    #[test]
    fn test_models_override_replaces_catalog() {
        let config: CompareConfig = toml::from_str(
            r#"
            [[models]]
            id = "custom"
            name = "Custom"
            family = "workers_skills"
            category = "Experimental"
            file = "jobshop_workers_skills/custom.mzn"
            "#,
        )
        .unwrap();

        let registry = config.to_registry();
        let descriptor = registry.resolve("custom").unwrap();
        assert_eq!(descriptor.family, ModelFamily::WorkersSkills);
        assert!(registry.resolve("jobshop_op_limit_1").is_err());
    }

    #[test]
    fn test_save_then_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("jobshop.toml");

        let mut config = CompareConfig::default();
        config.run.concurrency_limit = 2;
        config.engine.binary = Some(PathBuf::from("/opt/minizinc/bin/minizinc"));
        config.save(&path).unwrap();

        let loaded = CompareConfig::load(&path).unwrap();
        assert_eq!(loaded.run.concurrency_limit, 2);
        assert_eq!(
            loaded.engine.binary,
            Some(PathBuf::from("/opt/minizinc/bin/minizinc"))
        );
    }
}
