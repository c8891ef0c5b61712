use anyhow::Result;
use std::time::Duration;
use tokio_retry::RetryIf;
use tokio_retry::strategy::ExponentialBackoff;

use crate::config::BuildConfig;
use crate::constants::{MAX_BACKOFF_DELAY, STARTING_BACKOFF_DELAY_MS};
use crate::core::{ProtobuildError, find_protobuild_error};
use crate::generator::{GenerationRequest, Generator};
use crate::process::ToolCommand;

/// [`Generator`] backed by the `protoc` executable.
///
/// Generation is deterministic, so by default a failure is final. A bounded
/// number of retries can be enabled for environments where the compiler or
/// its plugins fail intermittently; only non-zero exits are retried, never a
/// missing executable.
#[derive(Debug, Clone)]
pub struct ProtocGenerator {
    program: String,
    retries: u32,
    timeout: Option<Duration>,
}

impl ProtocGenerator {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            retries: 0,
            timeout: None,
        }
    }

    #[must_use]
    pub fn from_config(config: &BuildConfig) -> Self {
        Self::new(&config.protoc_program)
            .with_retries(config.generator_retries)
            .with_timeout(config.command_timeout)
    }

    #[must_use]
    pub const fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    async fn run_once(&self, request: &GenerationRequest, attempt: u32) -> Result<()> {
        if attempt > 1 {
            tracing::warn!(target: "protoc", "Retrying generation (attempt {})", attempt);
        }

        let result = ToolCommand::new(&self.program)
            .args(request.to_args())
            .current_dir(&request.working_dir)
            .with_timeout(self.timeout)
            .with_log_target("protoc")
            .execute_success()
            .await;

        result.map_err(|error| match error.downcast::<ProtobuildError>() {
            Ok(ProtobuildError::CommandFailed {
                exit_code,
                stderr,
                ..
            }) => ProtobuildError::GenerationFailed {
                exit_code,
                stderr,
            }
            .into(),
            Ok(other) => other.into(),
            Err(error) => error,
        })
    }
}

impl Generator for ProtocGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<()> {
        tracing::info!(
            target: "protoc",
            "Generating {} outputs for {} schema files",
            request.output_kinds.join(", "),
            request.files.len()
        );

        let strategy = ExponentialBackoff::from_millis(STARTING_BACKOFF_DELAY_MS)
            .factor(2)
            .max_delay(MAX_BACKOFF_DELAY)
            .take(self.retries as usize);

        let mut attempt = 0;
        RetryIf::start(
            strategy,
            move || {
                attempt += 1;
                self.run_once(request, attempt)
            },
            |error: &anyhow::Error| {
                matches!(find_protobuild_error(error), Some(ProtobuildError::GenerationFailed { .. }))
            },
        )
        .await
    }
}
