//! External generation jobs.
//!
//! A [`JobDispatcher`] turns a trigger (fixed or parameterized) into one
//! external process invocation and maps the captured output back to a
//! [`GenerationOutcome`]. At most one job runs at a time: the generator is
//! the single writer to the watched directory, and a second concurrent
//! request is rejected with [`DispatchError::Busy`].

pub mod request;

use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::process::Command;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use uuid::Uuid;

use crate::config::Config;

pub use request::{GenerationRequest, ValidationError};

/// Errors that prevent a job from producing an outcome
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("invalid generation request: {0}")]
    Validation(#[from] ValidationError),

    #[error("a generation job is already running")]
    Busy,

    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("generator command is empty")]
    EmptyCommand,
}

/// How the generator process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitStatus {
    Success,
    Failure(i32),
    /// The job exceeded the configured timeout and was killed.
    Timeout,
}

impl ExitStatus {
    pub fn is_success(self) -> bool {
        matches!(self, ExitStatus::Success)
    }
}

/// Captured result of one generation job. Immutable once produced.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    pub job_id: Uuid,
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
    pub finished_at: DateTime<Utc>,
}

/// Launches and supervises external generator processes.
pub struct JobDispatcher {
    simple_command: Vec<String>,
    generator_command: Vec<String>,
    generator_cwd: Option<PathBuf>,
    job_timeout: Duration,
    slot: Semaphore,
}

impl JobDispatcher {
    pub fn new(config: &Config) -> Self {
        Self {
            simple_command: config.simple_command.clone(),
            generator_command: config.generator_command.clone(),
            generator_cwd: config.generator_cwd.clone(),
            job_timeout: Duration::from_secs(config.job_timeout_secs),
            // Single job slot: two generators racing on one output directory
            // is never allowed.
            slot: Semaphore::new(1),
        }
    }

    /// Run the fixed, non-parameterized generator (the `generateMotifs`
    /// trigger).
    pub async fn run_direct(&self) -> Result<GenerationOutcome, DispatchError> {
        let _permit = self.slot.try_acquire().map_err(|_| DispatchError::Busy)?;
        self.execute(&self.simple_command, &[]).await
    }

    /// Validate `request` and run the parameterized generator with discrete
    /// arguments. Validation failure short-circuits before any launch.
    pub async fn run_parameterized(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationOutcome, DispatchError> {
        request.validate()?;
        let _permit = self.slot.try_acquire().map_err(|_| DispatchError::Busy)?;
        self.execute(&self.generator_command, &request.to_args()).await
    }

    async fn execute(
        &self,
        command: &[String],
        extra_args: &[String],
    ) -> Result<GenerationOutcome, DispatchError> {
        let (program, leading_args) = command.split_first().ok_or(DispatchError::EmptyCommand)?;

        let job_id = Uuid::new_v4();
        let started = Instant::now();

        let mut cmd = Command::new(program);
        cmd.args(leading_args)
            .args(extra_args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(cwd) = &self.generator_cwd {
            cmd.current_dir(cwd);
        }

        tracing::info!(%job_id, program, "Launching generation job");

        let child = cmd.spawn().map_err(|source| DispatchError::Launch {
            program: program.clone(),
            source,
        })?;

        let outcome = match timeout(self.job_timeout, child.wait_with_output()).await {
            Err(_elapsed) => {
                // Dropping the timed-out future kills the child (kill_on_drop).
                tracing::warn!(%job_id, timeout = ?self.job_timeout, "Generation job timed out");
                GenerationOutcome {
                    job_id,
                    status: ExitStatus::Timeout,
                    stdout: String::new(),
                    stderr: String::new(),
                    duration_ms: started.elapsed().as_millis() as u64,
                    finished_at: Utc::now(),
                }
            }
            Ok(Err(source)) => {
                return Err(DispatchError::Launch {
                    program: program.clone(),
                    source,
                })
            }
            Ok(Ok(output)) => {
                let status = if output.status.success() {
                    ExitStatus::Success
                } else {
                    ExitStatus::Failure(output.status.code().unwrap_or(-1))
                };
                GenerationOutcome {
                    job_id,
                    status,
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                    duration_ms: started.elapsed().as_millis() as u64,
                    finished_at: Utc::now(),
                }
            }
        };

        match outcome.status {
            ExitStatus::Success => {
                tracing::info!(%job_id, duration_ms = outcome.duration_ms, "Generation job finished")
            }
            ExitStatus::Failure(code) => {
                tracing::warn!(%job_id, code, "Generation job exited non-zero")
            }
            ExitStatus::Timeout => {}
        }

        Ok(outcome)
    }
}
