//! @ai:module:intent Parse the MiniZinc `--json-stream` message protocol
//! @ai:module:layer infrastructure
//! @ai:module:public_api parse_json_stream, StreamOutcome
//! @ai:module:stateless true

use crate::engine::{Binding, SolveStatistics, SolveStatus};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// @ai:intent Everything gathered from one engine output stream
#[derive(Debug, Clone, Default)]
pub struct StreamOutcome {
    /// Explicit final status message, if the engine sent one
    pub status: Option<SolveStatus>,
    /// Bindings of the last solution seen
    pub solution: Option<BTreeMap<String, Binding>>,
    pub statistics: SolveStatistics,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl StreamOutcome {
    /// @ai:intent Final status, inferring SATISFIED from a solution without a status line
    /// @ai:effects pure
    pub fn final_status(&self) -> SolveStatus {
        match (self.status, &self.solution, self.errors.is_empty()) {
            (Some(status), _, _) => status,
            (None, Some(_), _) => SolveStatus::Satisfied,
            (None, None, false) => SolveStatus::Error,
            (None, None, true) => SolveStatus::Unknown,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Message {
    Solution {
        output: SolutionOutput,
    },
    Status {
        status: String,
    },
    Statistics {
        statistics: BTreeMap<String, serde_json::Value>,
    },
    Error {
        #[serde(default)]
        what: String,
        #[serde(default)]
        message: String,
    },
    Warning {
        #[serde(default)]
        message: String,
    },
    #[serde(other)]
    Ignored,
}

#[derive(Debug, Deserialize)]
struct SolutionOutput {
    #[serde(default)]
    json: Option<serde_json::Value>,
}

/// @ai:intent Decode the `json` section of a solution; older engines send it as a string
/// @ai:effects pure
fn decode_solution(json: serde_json::Value) -> Option<BTreeMap<String, Binding>> {
    let value = match json {
        serde_json::Value::String(text) => serde_json::from_str(&text).ok()?,
        other => other,
    };

    let mut bindings: BTreeMap<String, Binding> = serde_json::from_value(value).ok()?;
    // Objective and section markers are not model variables
    bindings.retain(|name, _| !name.starts_with('_'));
    Some(bindings)
}

/// @ai:intent Parse every JSON line of engine stdout; malformed lines are skipped
/// @ai:effects pure
pub fn parse_json_stream(stdout: &str) -> StreamOutcome {
    let mut outcome = StreamOutcome::default();

    for line in stdout.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let message: Message = match serde_json::from_str(line) {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!("Skipping non-protocol line ({}): {}", e, line);
                continue;
            }
        };

        match message {
            Message::Solution { output } => {
                if let Some(bindings) = output.json.and_then(decode_solution) {
                    outcome.solution = Some(bindings);
                }
            }
            Message::Status { status } => {
                outcome.status = Some(SolveStatus::from_minizinc(&status));
            }
            Message::Statistics { statistics } => {
                for (key, value) in statistics {
                    if key == "solveTime" {
                        if let Some(secs) = value.as_f64().filter(|s| *s >= 0.0) {
                            outcome.statistics.solve_time = Some(Duration::from_secs_f64(secs));
                        }
                    }
                    outcome.statistics.extra.insert(key, value);
                }
            }
            Message::Error { what, message } => {
                let text = if what.is_empty() {
                    message
                } else {
                    format!("{what}: {message}")
                };
                outcome.errors.push(text);
            }
            Message::Warning { message } => outcome.warnings.push(message),
            Message::Ignored => {}
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_optimal_stream() {
        let stdout = r#"
{"type": "statistics", "statistics": {"flatTime": 0.05}}
{"type": "solution", "output": {"json": {"s": [[0, 3], [3, 7]], "end": 9, "_objective": 9}}, "time": 12}
{"type": "solution", "output": {"json": {"s": [[0, 3], [3, 5]], "end": 8, "_objective": 8}}, "time": 20}
{"type": "statistics", "statistics": {"solveTime": 0.25, "nodes": 120}}
{"type": "status", "status": "OPTIMAL_SOLUTION", "time": 21}
"#;
        let outcome = parse_json_stream(stdout);

        assert_eq!(outcome.final_status(), SolveStatus::Optimal);
        let solution = outcome.solution.unwrap();
        assert_eq!(solution.get("end").and_then(Binding::as_i64), Some(8));
        assert!(!solution.contains_key("_objective"));
        assert_eq!(outcome.statistics.solve_time, Some(Duration::from_millis(250)));
        assert!(outcome.statistics.extra.contains_key("nodes"));
        assert!(outcome.statistics.extra.contains_key("flatTime"));
    }

    #[test]
    fn test_solution_without_status_is_satisfied() {
        let stdout = r#"{"type": "solution", "output": {"json": "{\"end\": 4}"}}"#;
        let outcome = parse_json_stream(stdout);

        assert_eq!(outcome.final_status(), SolveStatus::Satisfied);
        assert_eq!(
            outcome.solution.unwrap().get("end").and_then(Binding::as_i64),
            Some(4)
        );
    }

    #[test]
    fn test_error_messages_collected() {
        let stdout = concat!(
            r#"{"type": "error", "what": "syntax error", "message": "unexpected ';'"}"#,
            "\nnot json at all\n",
            r#"{"type": "comment", "comment": "% hi"}"#
        );
        let outcome = parse_json_stream(stdout);

        assert_eq!(outcome.errors, vec!["syntax error: unexpected ';'".to_string()]);
        assert_eq!(outcome.final_status(), SolveStatus::Error);
    }

    #[test]
    fn test_empty_stream_is_unknown() {
        assert_eq!(parse_json_stream("").final_status(), SolveStatus::Unknown);
    }

    #[test]
    fn test_unsatisfiable_status() {
        let outcome = parse_json_stream(r#"{"type": "status", "status": "UNSATISFIABLE"}"#);
        assert_eq!(outcome.final_status(), SolveStatus::Unsatisfiable);
        assert!(outcome.solution.is_none());
    }
}
