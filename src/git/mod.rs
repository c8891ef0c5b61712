//! Source tree provider backed by the system `git` command.
//!
//! The schema tree is materialized by a shallow clone of a pinned revision.
//! The provider is opaque to the rest of the run: it either produces the tree
//! at the requested destination or fails with git's own diagnostics and exit
//! code ([`ProtobuildError::FetchFailed`]).
//!
//! [`SourceProvider`] is the seam the pipeline depends on, so tests (and other
//! hosts) can materialize a tree without a network.

use anyhow::Result;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::BuildConfig;
use crate::core::ProtobuildError;
use crate::process::ToolCommand;

/// Everything needed to materialize one revision of the schema tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Repository URL
    pub repository: String,
    /// Pinned revision (commit SHA, branch or tag)
    pub revision: String,
    /// Shallow depth; `None` fetches full history
    pub depth: Option<u32>,
    /// Destination directory, relative to `working_dir`
    pub destination: PathBuf,
    /// Directory the provider runs in
    pub working_dir: PathBuf,
}

impl FetchRequest {
    #[must_use]
    pub fn from_config(config: &BuildConfig) -> Self {
        Self {
            repository: config.repository.clone(),
            revision: config.revision.clone(),
            depth: config.clone_depth,
            destination: config.tree_dir.clone(),
            working_dir: config.project_dir.clone(),
        }
    }

    /// Arguments for `git clone`, e.g.
    /// `clone <url> --depth=1 --revision <rev> proto`.
    #[must_use]
    pub fn clone_args(&self) -> Vec<String> {
        let mut args = vec!["clone".to_string(), self.repository.clone()];
        if let Some(depth) = self.depth {
            args.push(format!("--depth={depth}"));
        }
        args.push("--revision".to_string());
        args.push(self.revision.clone());
        args.push(self.destination.display().to_string());
        args
    }
}

/// Materializes the schema tree for a run.
pub trait SourceProvider {
    /// Fetches `request.revision` into `request.working_dir/request.destination`.
    ///
    /// Failures reported by the provider itself should surface as
    /// [`ProtobuildError::FetchFailed`] so their exit code is propagated.
    fn fetch(&self, request: &FetchRequest) -> impl Future<Output = Result<()>>;
}

impl<T: SourceProvider + ?Sized> SourceProvider for &T {
    fn fetch(&self, request: &FetchRequest) -> impl Future<Output = Result<()>> {
        (**self).fetch(request)
    }
}

/// [`SourceProvider`] that shells out to `git clone`.
#[derive(Debug, Clone)]
pub struct GitSourceProvider {
    program: String,
    timeout: Option<Duration>,
}

impl GitSourceProvider {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            timeout: None,
        }
    }

    #[must_use]
    pub fn from_config(config: &BuildConfig) -> Self {
        Self::new(&config.git_program).with_timeout(config.command_timeout)
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl SourceProvider for GitSourceProvider {
    async fn fetch(&self, request: &FetchRequest) -> Result<()> {
        tracing::info!(
            target: "git",
            "Cloning {} at {} into {}",
            request.repository,
            request.revision,
            request.destination.display()
        );

        let result = ToolCommand::new(&self.program)
            .args(request.clone_args())
            .current_dir(&request.working_dir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .with_timeout(self.timeout)
            .with_log_target("git")
            .execute_success()
            .await;

        result.map_err(|error| match error.downcast::<ProtobuildError>() {
            Ok(ProtobuildError::CommandFailed {
                exit_code,
                stderr,
                ..
            }) => ProtobuildError::FetchFailed {
                url: request.repository.clone(),
                revision: request.revision.clone(),
                exit_code,
                stderr,
            }
            .into(),
            Ok(other) => other.into(),
            Err(error) => error,
        })
    }
}
