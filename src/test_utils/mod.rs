//! Test utilities for protobuild
//!
//! Fakes for the two external collaborators, so pipeline behavior can be
//! tested without `git`, `protoc`, or a network:
//!
//! - [`FakeSourceProvider`] writes a fixed set of files into the fetch destination
//! - [`RecordingGenerator`] records each request, snapshots the files it was
//!   given, and returns a configured outcome
//!
//! ```rust,no_run
//! use protobuild::test_utils::{FakeSourceProvider, RecordingGenerator};
//!
//! let provider = FakeSourceProvider::new([("root.proto", "syntax = \"proto3\";\n")]);
//! let generator = RecordingGenerator::failing(3, "bad syntax");
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::core::ProtobuildError;
use crate::generator::{GenerationRequest, Generator};
use crate::git::{FetchRequest, SourceProvider};

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, otherwise `RUST_LOG`; with neither, logging stays off.
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// Writes `files` (relative path, contents) under `root`, creating directories.
pub fn write_tree<P, C>(root: &Path, files: impl IntoIterator<Item = (P, C)>) -> Result<()>
where
    P: AsRef<Path>,
    C: AsRef<[u8]>,
{
    for (relative, contents) in files {
        let path = root.join(relative.as_ref());
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&path, contents.as_ref())
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}

/// [`SourceProvider`] that materializes a fixed tree, or fails like `git` would.
#[derive(Debug, Default)]
pub struct FakeSourceProvider {
    files: Vec<(PathBuf, String)>,
    read_only: Vec<PathBuf>,
    skip_materialize: bool,
    failure: Option<(i32, String)>,
    requests: Mutex<Vec<FetchRequest>>,
}

impl FakeSourceProvider {
    pub fn new<P, C>(files: impl IntoIterator<Item = (P, C)>) -> Self
    where
        P: Into<PathBuf>,
        C: Into<String>,
    {
        Self {
            files: files.into_iter().map(|(p, c)| (p.into(), c.into())).collect(),
            ..Self::default()
        }
    }

    /// Fails every fetch with `exit_code` and `stderr`, after writing the files.
    ///
    /// Writing first mimics a clone that dies halfway.
    #[must_use]
    pub fn failing_after_write(mut self, exit_code: i32, stderr: impl Into<String>) -> Self {
        self.failure = Some((exit_code, stderr.into()));
        self
    }

    /// Marks a written file read-only, so appending to it fails.
    #[must_use]
    pub fn with_read_only(mut self, relative: impl Into<PathBuf>) -> Self {
        self.read_only.push(relative.into());
        self
    }

    /// Reports success without creating the destination.
    #[must_use]
    pub fn without_tree(mut self) -> Self {
        self.skip_materialize = true;
        self
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl SourceProvider for FakeSourceProvider {
    async fn fetch(&self, request: &FetchRequest) -> Result<()> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        if self.skip_materialize {
            return Ok(());
        }

        let destination = request.working_dir.join(&request.destination);
        std::fs::create_dir_all(&destination)?;
        write_tree(&destination, self.files.iter().map(|(p, c)| (p, c)))?;
        for relative in &self.read_only {
            let path = destination.join(relative);
            let mut permissions = std::fs::metadata(&path)?.permissions();
            permissions.set_readonly(true);
            std::fs::set_permissions(&path, permissions)?;
        }

        if let Some((exit_code, stderr)) = &self.failure {
            return Err(ProtobuildError::FetchFailed {
                url: request.repository.clone(),
                revision: request.revision.clone(),
                exit_code: Some(*exit_code),
                stderr: stderr.clone(),
            }
            .into());
        }
        Ok(())
    }
}

/// What a [`RecordingGenerator`] saw during one invocation.
#[derive(Debug, Clone)]
pub struct RecordedGeneration {
    pub request: GenerationRequest,
    /// Contents of each requested file at invocation time (path as requested)
    pub contents: Vec<(PathBuf, String)>,
    /// Whether the tree root existed at invocation time
    pub tree_existed: bool,
}

/// [`Generator`] that records its input and returns a configured outcome.
#[derive(Debug, Default)]
pub struct RecordingGenerator {
    failure: Option<(i32, String)>,
    outputs: Vec<(PathBuf, String)>,
    calls: Mutex<Vec<RecordedGeneration>>,
}

impl RecordingGenerator {
    #[must_use]
    pub fn succeeding() -> Self {
        Self::default()
    }

    /// Fails like a compiler that exits with `exit_code` and prints `stderr`.
    pub fn failing(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            failure: Some((exit_code, stderr.into())),
            ..Self::default()
        }
    }

    /// Files (relative to the working directory) written on success.
    #[must_use]
    pub fn with_output(mut self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.outputs.push((path.into(), contents.into()));
        self
    }

    pub fn calls(&self) -> Vec<RecordedGeneration> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Generator for RecordingGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<()> {
        let mut contents = Vec::with_capacity(request.files.len());
        for file in &request.files {
            let text = std::fs::read_to_string(request.working_dir.join(file))
                .with_context(|| format!("Generator could not read {}", file.display()))?;
            contents.push((file.clone(), text));
        }
        let tree_existed = request
            .include_dirs
            .last()
            .is_some_and(|root| request.working_dir.join(root).is_dir());

        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedGeneration {
                request: request.clone(),
                contents,
                tree_existed,
            });
        }

        if let Some((exit_code, stderr)) = &self.failure {
            return Err(ProtobuildError::GenerationFailed {
                exit_code: Some(*exit_code),
                stderr: stderr.clone(),
            }
            .into());
        }

        write_tree(&request.working_dir, self.outputs.iter().map(|(p, c)| (p, c)))
    }
}
