//! @ai:module:intent Per-model comparison records and the ranked report
//! @ai:module:layer domain
//! @ai:module:public_api ComparisonRecord, ComparisonReport, Makespan, ExecutionTime, rank_records
//! @ai:module:stateless true

use crate::engine::SolveStatus;
use crate::error::SolveError;
use crate::extract::ExtractedMetrics;
use crate::registry::{ModelDescriptor, ModelFamily};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::Path;

/// Characters of an error message kept in the status column.
pub const STATUS_MESSAGE_LIMIT: usize = 50;

/// @ai:intent Makespan of a run; failed runs rank as infinite
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Makespan {
    Finite(i64),
    Infinite,
}

impl Makespan {
    pub fn is_finite(&self) -> bool {
        matches!(self, Makespan::Finite(_))
    }

    pub fn value(&self) -> Option<i64> {
        match self {
            Makespan::Finite(v) => Some(*v),
            Makespan::Infinite => None,
        }
    }
}

impl std::fmt::Display for Makespan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Makespan::Finite(v) => write!(f, "{v}"),
            Makespan::Infinite => write!(f, "inf"),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(i64),
    Text(String),
}

impl Serialize for Makespan {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Makespan::Finite(v) => serializer.serialize_i64(*v),
            Makespan::Infinite => serializer.serialize_str("inf"),
        }
    }
}

impl<'de> Deserialize<'de> for Makespan {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match NumberOrText::deserialize(deserializer)? {
            NumberOrText::Number(v) => Ok(Makespan::Finite(v)),
            NumberOrText::Text(t) if t == "inf" => Ok(Makespan::Infinite),
            NumberOrText::Text(t) => Err(serde::de::Error::custom(format!(
                "invalid makespan '{t}'"
            ))),
        }
    }
}

/// @ai:intent Engine solve time, or the sentinel shown when there is none
///
/// Serialized at display precision (four decimals), so a loaded report keeps that precision only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExecutionTime {
    Seconds(f64),
    NotAvailable,
    Error,
}

impl std::fmt::Display for ExecutionTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionTime::Seconds(s) => write!(f, "{s:.4}"),
            ExecutionTime::NotAvailable => write!(f, "N/A"),
            ExecutionTime::Error => write!(f, "Error"),
        }
    }
}

impl Serialize for ExecutionTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ExecutionTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        match text.as_str() {
            "N/A" => Ok(ExecutionTime::NotAvailable),
            "Error" => Ok(ExecutionTime::Error),
            other => other
                .parse::<f64>()
                .map(ExecutionTime::Seconds)
                .map_err(|_| serde::de::Error::custom(format!("invalid execution time '{other}'"))),
        }
    }
}

/// @ai:intent Outcome of one model in a comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRecord {
    pub model_id: String,
    pub model_name: String,
    pub category: String,
    pub family: Option<ModelFamily>,
    pub makespan: Makespan,
    pub execution_time: ExecutionTime,
    pub status: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_resources: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imbalance: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ExtractedMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl ComparisonRecord {
    fn blank(descriptor: &ModelDescriptor) -> Self {
        Self {
            model_id: descriptor.id.clone(),
            model_name: descriptor.name.clone(),
            category: descriptor.category.clone(),
            family: Some(descriptor.family),
            makespan: Makespan::Infinite,
            execution_time: ExecutionTime::NotAvailable,
            status: String::new(),
            success: false,
            num_resources: None,
            imbalance: None,
            metrics: None,
            error_detail: None,
        }
    }

    /// @ai:intent Record of a run with extracted metrics
    /// @ai:post success && makespan finite
    /// @ai:effects pure
    pub fn succeeded(
        descriptor: &ModelDescriptor,
        status: SolveStatus,
        makespan: i64,
        solve_seconds: f64,
        metrics: ExtractedMetrics,
    ) -> Self {
        let load = metrics.load();

        Self {
            makespan: Makespan::Finite(makespan),
            execution_time: ExecutionTime::Seconds(solve_seconds),
            status: status.as_str().to_string(),
            success: true,
            num_resources: load.map(|l| l.num_resources()),
            imbalance: load.map(|l| l.imbalance),
            metrics: Some(metrics),
            ..Self::blank(descriptor)
        }
    }

    /// @ai:intent Record of a run the engine finished without a usable solution
    /// @ai:effects pure
    pub fn unsuccessful(descriptor: &ModelDescriptor, status: SolveStatus) -> Self {
        Self {
            status: status.as_str().to_string(),
            error_detail: Some(status.description().to_string()),
            ..Self::blank(descriptor)
        }
    }

    /// @ai:intent Short-circuit record for a dataset that does not exist
    /// @ai:effects pure
    pub fn dataset_missing(descriptor: &ModelDescriptor, dataset_path: &Path) -> Self {
        Self {
            status: "ERROR: dataset not found".to_string(),
            error_detail: Some(format!("File not found: {}", dataset_path.display())),
            ..Self::blank(descriptor)
        }
    }

    /// @ai:intent Record for an id the registry does not know
    /// @ai:effects pure
    pub fn unknown_model(model_id: &str) -> Self {
        Self {
            model_id: model_id.to_string(),
            model_name: model_id.to_string(),
            category: String::new(),
            family: None,
            makespan: Makespan::Infinite,
            execution_time: ExecutionTime::NotAvailable,
            status: "ERROR: model not found".to_string(),
            success: false,
            num_resources: None,
            imbalance: None,
            metrics: None,
            error_detail: Some(SolveError::ModelNotFound(model_id.to_string()).to_string()),
        }
    }

    /// @ai:intent Record of a run that raised an error at any stage
    /// @ai:post status holds the truncated message, error_detail the full one
    /// @ai:effects pure
    pub fn failed(descriptor: &ModelDescriptor, error: &SolveError) -> Self {
        let message = error.to_string();

        Self {
            execution_time: ExecutionTime::Error,
            status: format!("ERROR: {}", truncate_chars(&message, STATUS_MESSAGE_LIMIT)),
            error_detail: Some(message),
            ..Self::blank(descriptor)
        }
    }
}

/// @ai:intent Keep at most `limit` characters, respecting char boundaries
/// @ai:effects pure
fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// @ai:intent Stable sort by makespan; ties keep submission order, failures last
/// @ai:effects pure
pub fn rank_records(records: &mut [ComparisonRecord]) {
    records.sort_by_key(|r| r.makespan);
}

/// @ai:intent Ranked outcome of one comparison run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub dataset_name: String,
    pub solver: String,
    pub solver_name: String,
    pub timestamp: String,
    pub records: Vec<ComparisonRecord>,
}

impl ComparisonReport {
    /// @ai:intent Best successful record, if any
    pub fn best(&self) -> Option<&ComparisonRecord> {
        self.records.first().filter(|r| r.success)
    }

    pub fn successful_count(&self) -> usize {
        self.records.iter().filter(|r| r.success).count()
    }
}
