//! The external code generator.
//!
//! A [`GenerationRequest`] is built fresh for every run from the annotated
//! file set and handed to a [`Generator`] exactly once (plus any configured
//! retries). [`ProtocGenerator`] runs `protoc` with one output plugin per
//! output kind.

mod protoc;

pub use protoc::ProtocGenerator;

use anyhow::Result;
use std::future::Future;
use std::path::PathBuf;

use crate::config::BuildConfig;

/// One generator invocation, fully resolved.
///
/// All paths are relative to `working_dir`, the parent of the tree root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Output plugins, e.g. `go` and `go-grpc`
    pub output_kinds: Vec<String>,
    /// Directory generated code is written under
    pub output_dir: PathBuf,
    /// Module prefix stripped from generated paths (`--<kind>_opt=module=`)
    pub module_override: String,
    /// Include-search directories in lookup order
    pub include_dirs: Vec<PathBuf>,
    /// Schema files to generate
    pub files: Vec<PathBuf>,
    /// Directory the generator runs in
    pub working_dir: PathBuf,
}

impl GenerationRequest {
    /// A request with the configured options and no files yet.
    #[must_use]
    pub fn from_config(config: &BuildConfig) -> Self {
        Self {
            output_kinds: config.output_kinds.clone(),
            output_dir: PathBuf::from("."),
            module_override: config.base_module.clone(),
            include_dirs: config.include_search_dirs(),
            files: Vec::new(),
            working_dir: config.project_dir.clone(),
        }
    }

    #[must_use]
    pub fn with_files(mut self, files: Vec<PathBuf>) -> Self {
        self.files = files;
        self
    }

    /// Command-line arguments in the order protoc expects them: output
    /// options per kind, then include paths, then the files.
    #[must_use]
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.output_kinds.len() * 2 + self.include_dirs.len() + self.files.len());
        for kind in &self.output_kinds {
            args.push(format!("--{kind}_out={}", self.output_dir.display()));
            args.push(format!("--{kind}_opt=module={}", self.module_override));
        }
        for dir in &self.include_dirs {
            args.push(format!("-I{}", dir.display()));
        }
        args.extend(self.files.iter().map(|f| f.display().to_string()));
        args
    }
}

/// Turns schema files into source code.
pub trait Generator {
    /// Runs generation for `request`.
    ///
    /// A non-zero exit of the underlying tool should surface as
    /// [`crate::core::ProtobuildError::GenerationFailed`] carrying the tool's
    /// own stderr and exit code.
    fn generate(&self, request: &GenerationRequest) -> impl Future<Output = Result<()>>;
}

impl<T: Generator + ?Sized> Generator for &T {
    fn generate(&self, request: &GenerationRequest) -> impl Future<Output = Result<()>> {
        (**self).generate(request)
    }
}
