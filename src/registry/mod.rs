//! @ai:module:intent Model and solver registry with dataset path conventions
//! @ai:module:layer domain
//! @ai:module:public_api ModelRegistry, ModelDescriptor, ModelFamily, SolverEntry
//! @ai:module:stateless true

pub mod catalog;

pub use catalog::{builtin_models, builtin_solvers, DEFAULT_SOLVER};

use crate::error::{SolveError, SolveResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Folder used when a family name has no registered folder.
const FALLBACK_DATASET_FOLDER: &str = "jobshop_op_limit";

/// @ai:intent Family of a job-shop model; decides how its output is read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFamily {
    OpLimit,
    WorkersSkills,
    Maintenance,
}

impl ModelFamily {
    /// @ai:intent Convert family to string representation
    /// @ai:effects pure
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelFamily::OpLimit => "op_limit",
            ModelFamily::WorkersSkills => "workers_skills",
            ModelFamily::Maintenance => "maintenance",
        }
    }

    /// @ai:intent Folder (under the models dir) holding this family's models and tests
    /// @ai:effects pure
    pub fn dataset_folder(&self) -> &'static str {
        dataset_folder_for(self.as_str())
    }
}

impl std::fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// @ai:intent Map a family name to its folder, defaulting for unknown names
/// @ai:effects pure
pub fn dataset_folder_for(family: &str) -> &'static str {
    match family {
        "op_limit" => "jobshop_op_limit",
        "workers_skills" => "jobshop_workers_skills",
        "maintenance" => "jobshop_maintenance",
        _ => FALLBACK_DATASET_FOLDER,
    }
}

/// @ai:intent Static description of one registered model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub family: ModelFamily,
    pub category: String,
    /// Model file, relative to the models directory
    pub file: PathBuf,
}

/// @ai:intent Solver id with its display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverEntry {
    pub id: String,
    pub name: String,
}

/// @ai:intent Immutable lookup of models, solvers and dataset locations
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models_dir: PathBuf,
    models: Vec<ModelDescriptor>,
    solvers: Vec<SolverEntry>,
}

impl ModelRegistry {
    /// @ai:intent Create a registry over an explicit catalog
    /// @ai:effects pure
    pub fn new(
        models_dir: impl Into<PathBuf>,
        models: Vec<ModelDescriptor>,
        solvers: Vec<SolverEntry>,
    ) -> Self {
        Self {
            models_dir: models_dir.into(),
            models,
            solvers,
        }
    }

    /// @ai:intent Create a registry with the built-in models and solvers
    /// @ai:effects pure
    pub fn builtin(models_dir: impl Into<PathBuf>) -> Self {
        Self::new(models_dir, builtin_models(), builtin_solvers())
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    pub fn models(&self) -> &[ModelDescriptor] {
        &self.models
    }

    pub fn solvers(&self) -> &[SolverEntry] {
        &self.solvers
    }

    /// @ai:intent Look up a model descriptor by id
    /// @ai:effects pure
    pub fn resolve(&self, model_id: &str) -> SolveResult<&ModelDescriptor> {
        self.models
            .iter()
            .find(|m| m.id == model_id)
            .ok_or_else(|| SolveError::ModelNotFound(model_id.to_string()))
    }

    /// @ai:intent Absolute-ish path of a model file
    /// @ai:effects pure
    pub fn model_path(&self, descriptor: &ModelDescriptor) -> PathBuf {
        self.models_dir.join(&descriptor.file)
    }

    /// @ai:intent Dataset path for a family name: <models>/<folder>/tests/<dataset>
    /// @ai:effects pure
    pub fn dataset_path(&self, family: &str, dataset_name: &str) -> PathBuf {
        self.models_dir
            .join(dataset_folder_for(family))
            .join("tests")
            .join(dataset_name)
    }

    /// @ai:intent List .dzn test files available for a model, sorted by name
    /// @ai:effects fs:read
    pub fn list_datasets(&self, model_id: &str) -> Vec<String> {
        let Ok(descriptor) = self.resolve(model_id) else {
            return vec![];
        };

        let model_dir = descriptor.file.parent().unwrap_or(Path::new(""));
        let tests_dir = self.models_dir.join(model_dir).join("tests");

        if !tests_dir.is_dir() {
            return vec![];
        }

        let mut files: Vec<String> = WalkDir::new(&tests_dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "dzn")
                    .unwrap_or(false)
            })
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();

        files.sort();
        files
    }

    /// @ai:intent Display name of a solver, falling back to its id
    /// @ai:effects pure
    pub fn solver_name(&self, solver_id: &str) -> String {
        self.solvers
            .iter()
            .find(|s| s.id == solver_id)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| solver_id.to_string())
    }
}
