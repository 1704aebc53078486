//! @ai:module:intent Error taxonomy for solving, extraction and comparison
//! @ai:module:layer domain
//! @ai:module:public_api SolveError, ExtractionError, CompareError, DatasetError, EngineErrorKind
//! @ai:module:stateless true

use crate::registry::ModelFamily;
use std::path::PathBuf;
use thiserror::Error;

/// @ai:intent Classification of an engine failure, taken from the engine's message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineErrorKind {
    Syntax,
    Type,
    Execution,
}

impl EngineErrorKind {
    /// @ai:intent Classify an engine error message
    /// @ai:effects pure
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();

        if lower.contains("syntax error") {
            EngineErrorKind::Syntax
        } else if lower.contains("type error") {
            EngineErrorKind::Type
        } else {
            EngineErrorKind::Execution
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EngineErrorKind::Syntax => "syntax error",
            EngineErrorKind::Type => "type error",
            EngineErrorKind::Execution => "engine error",
        }
    }
}

impl std::fmt::Display for EngineErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// @ai:intent Errors raised while resolving or executing a single solve request
#[derive(Error, Debug)]
pub enum SolveError {
    #[error("dataset not found: {}", .0.display())]
    DatasetNotFound(PathBuf),

    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("{kind}: {message}")]
    EngineInvocation {
        kind: EngineErrorKind,
        message: String,
    },

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl SolveError {
    /// @ai:intent Build an engine error, classifying it by its message
    /// @ai:effects pure
    pub fn engine(message: impl Into<String>) -> Self {
        let message = message.into();
        SolveError::EngineInvocation {
            kind: EngineErrorKind::classify(&message),
            message,
        }
    }
}

/// @ai:intent Errors raised by result extractors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("variable '{variable}' required by {family} models is missing from the solution")]
    MissingMandatoryVariable {
        family: ModelFamily,
        variable: &'static str,
    },

    /// Never fails a record; reported through logs and the load source tag.
    #[error("metric '{metric}' could not be derived and resolves to an empty value")]
    DegenerateMetric { metric: &'static str },
}

/// @ai:intent Errors raised while parsing a dataset file
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("failed to read dataset {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid matrix cell '{cell}' in row {row}")]
    InvalidCell { row: usize, cell: String },
}

/// @ai:intent Batch-level errors; per-model failures never surface here
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CompareError {
    #[error("at least one model must be requested")]
    NoModels,

    #[error("concurrency limit must be greater than zero")]
    ZeroConcurrency,
}

pub type SolveResult<T> = std::result::Result<T, SolveError>;
pub type ExtractionResult<T> = std::result::Result<T, ExtractionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_engine_messages() {
        assert_eq!(
            EngineErrorKind::classify("model.mzn:3.1: Error: syntax error, unexpected ';'"),
            EngineErrorKind::Syntax
        );
        assert_eq!(
            EngineErrorKind::classify("MiniZinc: type error: undefined identifier `x'"),
            EngineErrorKind::Type
        );
        assert_eq!(
            EngineErrorKind::classify("solver crashed"),
            EngineErrorKind::Execution
        );
    }

    #[test]
    fn test_engine_error_display_carries_message() {
        let err = SolveError::engine("Error: syntax error near 'int'");
        assert_eq!(err.to_string(), "syntax error: Error: syntax error near 'int'");
    }

    #[test]
    fn test_missing_variable_message_names_family() {
        let err = ExtractionError::MissingMandatoryVariable {
            family: ModelFamily::OpLimit,
            variable: "carga",
        };
        assert!(err.to_string().contains("op_limit"));
        assert!(err.to_string().contains("carga"));
    }
}
