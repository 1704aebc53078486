//! @ai:module:intent Job-shop MiniZinc model comparison library
//! @ai:module:layer application
//! @ai:module:public_api config, registry, engine, invoker, extract, compare, dataset, report, toolchain

pub mod compare;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod extract;
pub mod invoker;
pub mod registry;
pub mod report;
pub mod toolchain;

pub use compare::{
    ComparisonOrchestrator, ComparisonRecord, ComparisonReport, ComparisonRequest, SingleRun,
};
pub use config::CompareConfig;
pub use engine::{MiniZincDriver, MockEngine, RawSolution, SolveStatus, SolverEngine};
pub use error::{CompareError, ExtractionError, SolveError};
pub use extract::{ExtractedMetrics, ResultExtractor};
pub use invoker::{SolveInvoker, SolveRequest};
pub use registry::{ModelDescriptor, ModelFamily, ModelRegistry};
pub use report::ReportGenerator;
pub use toolchain::{ToolchainStatus, ToolchainValidator};
