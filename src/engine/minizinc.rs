//! @ai:module:intent MiniZinc CLI driver implementing the solver engine contract
//! @ai:module:layer infrastructure
//! @ai:module:public_api MiniZincDriver
//! @ai:module:stateless true

use crate::engine::stream::parse_json_stream;
use crate::engine::{RawSolution, SolverEngine, SolverInfo};
use crate::error::{SolveError, SolveResult};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Environment variable pointing at the MiniZinc binary or its directory.
pub const BIN_PATH_ENV: &str = "MINIZINC_BIN_PATH";

const DEFAULT_BINARY: &str = "minizinc";
const DEFAULT_KILL_GRACE: Duration = Duration::from_secs(5);

/// @ai:intent Runs the `minizinc` executable as a child process per solve
#[derive(Debug, Clone)]
pub struct MiniZincDriver {
    binary: PathBuf,
    kill_grace: Duration,
}

impl MiniZincDriver {
    /// @ai:intent Create a driver for an explicit binary path
    /// @ai:effects pure
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            kill_grace: DEFAULT_KILL_GRACE,
        }
    }

    /// @ai:intent Resolve the binary from MINIZINC_BIN_PATH, then config, then PATH
    /// @ai:effects env, fs:read
    pub fn from_env_or(configured: Option<PathBuf>) -> Self {
        let from_env = std::env::var_os(BIN_PATH_ENV)
            .map(PathBuf::from)
            .and_then(|path| resolve_bin_path(&path));

        let binary = from_env
            .or(configured)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BINARY));

        Self::new(binary)
    }

    /// @ai:intent Extra time allowed past the solver time limit before the process is killed
    /// @ai:effects pure
    pub fn with_kill_grace(mut self, grace: Duration) -> Self {
        self.kill_grace = grace;
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// @ai:intent Run the binary with arguments, returning stdout on success
    /// @ai:effects io
    async fn run_capture(&self, args: &[&str]) -> SolveResult<String> {
        let output = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SolveError::engine(stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn spawn_error(&self, err: std::io::Error) -> SolveError {
        if err.kind() == std::io::ErrorKind::NotFound {
            SolveError::engine(format!(
                "MiniZinc executable not found at '{}'. Set {} or install MiniZinc.",
                self.binary.display(),
                BIN_PATH_ENV
            ))
        } else {
            SolveError::Unexpected(format!("failed to start MiniZinc: {err}"))
        }
    }
}

impl Default for MiniZincDriver {
    fn default() -> Self {
        Self::new(DEFAULT_BINARY)
    }
}

/// @ai:intent Accept either a directory containing `minizinc` or the binary itself
/// @ai:effects fs:read
fn resolve_bin_path(path: &Path) -> Option<PathBuf> {
    if path.is_dir() {
        let exe = path.join(DEFAULT_BINARY);
        exe.exists().then_some(exe)
    } else if path.exists() {
        Some(path.to_path_buf())
    } else {
        None
    }
}

impl SolverEngine for MiniZincDriver {
    /// @ai:intent Report `minizinc --version` output
    /// @ai:effects io
    async fn version(&self) -> SolveResult<String> {
        let stdout = self.run_capture(&["--version"]).await?;
        Ok(stdout.lines().next().unwrap_or_default().trim().to_string())
    }

    /// @ai:intent List installed solvers via `--solvers-json`
    /// @ai:effects io
    async fn available_solvers(&self) -> SolveResult<Vec<SolverInfo>> {
        let stdout = self.run_capture(&["--solvers-json"]).await?;
        serde_json::from_str(&stdout)
            .map_err(|e| SolveError::Unexpected(format!("unreadable solver list: {e}")))
    }

    /// @ai:intent Solve model+dataset with the given solver and time limit
    /// @ai:effects io
    async fn solve(
        &self,
        model: &Path,
        dataset: &Path,
        solver: &str,
        timeout: Duration,
    ) -> SolveResult<RawSolution> {
        let time_limit_ms = timeout.as_millis().to_string();

        let mut cmd = Command::new(&self.binary);
        cmd.arg("--solver")
            .arg(solver)
            .arg("--json-stream")
            .arg("--output-mode")
            .arg("json")
            .arg("--statistics")
            .arg("--time-limit")
            .arg(&time_limit_ms)
            .arg(model)
            .arg(dataset)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!(
            "Running {} --solver {} --time-limit {} {} {}",
            self.binary.display(),
            solver,
            time_limit_ms,
            model.display(),
            dataset.display()
        );

        let hard_limit = timeout.saturating_add(self.kill_grace);
        let output = match tokio::time::timeout(hard_limit, cmd.output()).await {
            Ok(result) => result.map_err(|e| self.spawn_error(e))?,
            Err(_) => {
                return Err(SolveError::engine(format!(
                    "engine did not finish within {:.1}s and was terminated",
                    hard_limit.as_secs_f64()
                )))
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let outcome = parse_json_stream(&stdout);

        for warning in &outcome.warnings {
            tracing::warn!("MiniZinc warning for {}: {}", model.display(), warning);
        }

        if !outcome.errors.is_empty() {
            return Err(SolveError::engine(outcome.errors.join("; ")));
        }

        if !output.status.success() && outcome.solution.is_none() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SolveError::engine(format!(
                "MiniZinc exited with {:?}: {}",
                output.status.code(),
                stderr.trim()
            )));
        }

        let status = outcome.final_status();
        let bindings = outcome.solution.unwrap_or_default();

        Ok(RawSolution {
            status,
            bindings,
            statistics: outcome.statistics,
        })
    }
}
