//! Builder for running external tools with consistent error handling.
//!
//! Both collaborators of a run, the source provider (`git`) and the generator
//! (`protoc`), are plain executables. [`ToolCommand`] runs one of them to
//! completion, captures its output, and turns a non-zero exit into a
//! [`ProtobuildError::CommandFailed`] carrying the exit code and stderr
//! unchanged.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use crate::core::ProtobuildError;
use crate::utils::platform::resolve_command;

/// Builder for one external command invocation.
///
/// # Examples
///
/// ```rust,no_run
/// use protobuild::process::ToolCommand;
///
/// # async fn example() -> anyhow::Result<()> {
/// let output = ToolCommand::new("protoc")
///     .arg("--version")
///     .with_log_target("protoc")
///     .execute()
///     .await?;
/// println!("{}", output.stdout.trim());
/// # Ok(())
/// # }
/// ```
///
/// New commands capture output, run in the current directory, and have no
/// timeout.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    /// Program name or path
    program: String,

    /// Arguments in invocation order
    args: Vec<String>,

    /// Working directory (defaults to the process directory)
    current_dir: Option<PathBuf>,

    /// Extra environment variables
    env_vars: Vec<(String, String)>,

    /// Maximum time to wait for the process (None = wait forever)
    timeout_duration: Option<Duration>,

    /// Short label included in log lines
    context: Option<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            env_vars: Vec::new(),
            timeout_duration: None,
            context: None,
        }
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.push((key.into(), value.into()));
        self
    }

    /// Set a timeout for the command (None for no timeout)
    pub const fn with_timeout(mut self, duration: Option<Duration>) -> Self {
        self.timeout_duration = duration;
        self
    }

    /// Label used in log lines, e.g. "git" or "protoc"
    pub fn with_log_target(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Runs the command to completion and returns its captured output.
    ///
    /// # Errors
    ///
    /// - [`ProtobuildError::ToolNotFound`] when the program cannot be located
    /// - [`ProtobuildError::CommandFailed`] on a non-zero exit
    /// - [`ProtobuildError::CommandTimedOut`] when the timeout elapses
    /// - an I/O error with context when the process cannot be spawned
    pub async fn execute(self) -> Result<ToolOutput> {
        let start = std::time::Instant::now();
        let label = self.context.as_deref().unwrap_or(&self.program).to_string();
        let operation = self.args.first().cloned().unwrap_or_else(|| "unknown".to_string());

        let executable = resolve_command(&self.program)?;
        let mut cmd = Command::new(&executable);
        cmd.args(&self.args);
        if let Some(ref dir) = self.current_dir {
            cmd.current_dir(dir);
        }

        tracing::debug!(
            target: "protobuild::process",
            "({}) Executing command: {} {}",
            label,
            self.program,
            self.args.join(" ")
        );

        for (key, value) in &self.env_vars {
            tracing::trace!(target: "protobuild::process", "Setting env var: {}={}", key, value);
            cmd.env(key, value);
        }

        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        let output_future = cmd.output();
        let output = if let Some(duration) = self.timeout_duration {
            if let Ok(result) = timeout(duration, output_future).await {
                result.with_context(|| format!("Failed to execute {}", self.program))?
            } else {
                tracing::warn!(
                    target: "protobuild::process",
                    "({}) Command timed out after {} seconds",
                    label,
                    duration.as_secs()
                );
                return Err(ProtobuildError::CommandTimedOut {
                    tool: self.program,
                    operation,
                    seconds: duration.as_secs(),
                }
                .into());
            }
        } else {
            output_future.await.with_context(|| format!("Failed to execute {}", self.program))?
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            tracing::debug!(
                target: "protobuild::process",
                "({}) Command failed with exit code: {:?}",
                label,
                output.status.code()
            );
            if !stderr.is_empty() {
                tracing::debug!(target: "protobuild::process", "({}) {}", label, stderr.trim());
            }
            return Err(ProtobuildError::CommandFailed {
                tool: self.program,
                operation,
                exit_code: output.status.code(),
                stderr,
            }
            .into());
        }

        if !stdout.is_empty() {
            tracing::trace!(target: "protobuild::process", "({}) {}", label, stdout.trim());
        }
        if !stderr.is_empty() {
            tracing::debug!(target: "protobuild::process", "({}) {}", label, stderr.trim());
        }

        let elapsed = start.elapsed();
        if elapsed.as_secs() > 1 {
            tracing::info!(
                target: "protobuild::perf",
                "({}) {} took {:.2}s",
                label,
                operation,
                elapsed.as_secs_f64()
            );
        } else {
            tracing::debug!(
                target: "protobuild::perf",
                "({}) {} took {}ms",
                label,
                operation,
                elapsed.as_millis()
            );
        }

        Ok(ToolOutput {
            stdout,
            stderr,
        })
    }

    /// Runs the command and discards its output.
    pub async fn execute_success(self) -> Result<()> {
        self.execute().await?;
        Ok(())
    }
}

/// Captured output of a successful command.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}
