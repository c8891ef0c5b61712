//! Build configuration.
//!
//! A [`BuildConfig`] carries every parameter of a run: where the schema tree
//! comes from, how it is laid out, and how module paths and generator options
//! are derived. It is built once (from the compiled-in defaults in
//! [`crate::constants`] plus any command-line overrides), validated, and then
//! handed to each component by shared reference. Nothing mutates it during a
//! run.
//!
//! # Examples
//!
//! ```rust,no_run
//! use protobuild::config::BuildConfig;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = BuildConfig::default()
//!     .with_project_dir("/work/sdk")
//!     .with_revision("0123456789abcdef0123456789abcdef01234567");
//! config.validate()?;
//! assert_eq!(config.tree_path(), std::path::Path::new("/work/sdk/proto"));
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use crate::constants;
use crate::core::ProtobuildError;
use crate::schema::ModulePath;
use crate::utils::platform::{get_git_command, get_protoc_command};

/// Immutable parameters of one protobuild run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Working area: receives the fetched tree and the generated artifacts.
    pub project_dir: PathBuf,
    /// Directory name of the fetched tree, relative to `project_dir`.
    pub tree_dir: PathBuf,
    /// Repository the tree is cloned from.
    pub repository: String,
    /// Pinned revision to clone.
    pub revision: String,
    /// Shallow clone depth; `None` clones the full history.
    pub clone_depth: Option<u32>,
    /// Base module identifier every module path is rooted at.
    pub base_module: String,
    /// Segment appended to the base module for the shared common module.
    pub common_segment: String,
    /// File basenames that always resolve to the common module.
    pub common_files: BTreeSet<String>,
    /// Subtrees, relative to the tree root, that are never generated.
    pub excluded_subtrees: Vec<PathBuf>,
    /// Include-search directories relative to the tree root (empty = the root).
    pub include_dirs: Vec<PathBuf>,
    /// Generator output plugins.
    pub output_kinds: Vec<String>,
    /// Suffix of schema files.
    pub schema_suffix: String,
    /// Suffix of previously generated artifacts.
    pub artifact_suffix: String,
    /// Source provider executable.
    pub git_program: String,
    /// Generator executable.
    pub protoc_program: String,
    /// Extra generator attempts after a non-zero exit.
    pub generator_retries: u32,
    /// Timeout applied to each external command; `None` waits forever.
    pub command_timeout: Option<Duration>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            project_dir: PathBuf::from("."),
            tree_dir: PathBuf::from(constants::TREE_DIR),
            repository: constants::PROTO_REPOSITORY.to_string(),
            revision: constants::PROTO_REVISION.to_string(),
            clone_depth: Some(constants::CLONE_DEPTH),
            base_module: constants::BASE_MODULE.to_string(),
            common_segment: constants::COMMON_MODULE_SEGMENT.to_string(),
            common_files: constants::COMMON_FILES.iter().map(|f| (*f).to_string()).collect(),
            excluded_subtrees: constants::EXCLUDED_SUBTREES.iter().map(PathBuf::from).collect(),
            include_dirs: constants::INCLUDE_DIRS.iter().map(PathBuf::from).collect(),
            output_kinds: constants::OUTPUT_KINDS.iter().map(|k| (*k).to_string()).collect(),
            schema_suffix: constants::SCHEMA_SUFFIX.to_string(),
            artifact_suffix: constants::ARTIFACT_SUFFIX.to_string(),
            git_program: get_git_command().to_string(),
            protoc_program: get_protoc_command().to_string(),
            generator_retries: 0,
            command_timeout: None,
        }
    }
}

impl BuildConfig {
    #[must_use]
    pub fn with_project_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.project_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = repository.into();
        self
    }

    #[must_use]
    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = revision.into();
        self
    }

    #[must_use]
    pub fn with_base_module(mut self, base_module: impl Into<String>) -> Self {
        self.base_module = base_module.into();
        self
    }

    #[must_use]
    pub fn with_common_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.common_files = files.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_excluded_subtrees<I, P>(mut self, subtrees: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.excluded_subtrees = subtrees.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_git_program(mut self, program: impl Into<String>) -> Self {
        self.git_program = program.into();
        self
    }

    #[must_use]
    pub fn with_protoc_program(mut self, program: impl Into<String>) -> Self {
        self.protoc_program = program.into();
        self
    }

    #[must_use]
    pub const fn with_generator_retries(mut self, retries: u32) -> Self {
        self.generator_retries = retries;
        self
    }

    #[must_use]
    pub const fn with_command_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Absolute (or project-relative) location of the fetched tree.
    #[must_use]
    pub fn tree_path(&self) -> PathBuf {
        self.project_dir.join(&self.tree_dir)
    }

    /// The shared module that common files are hoisted into.
    #[must_use]
    pub fn common_module(&self) -> ModulePath {
        ModulePath::new(&self.base_module).child(&self.common_segment)
    }

    /// Include-search directories relative to the project directory, in
    /// the order they are passed to the generator.
    #[must_use]
    pub fn include_search_dirs(&self) -> Vec<PathBuf> {
        self.include_dirs
            .iter()
            .map(|dir| {
                if dir.as_os_str().is_empty() {
                    self.tree_dir.clone()
                } else {
                    self.tree_dir.join(dir)
                }
            })
            .collect()
    }

    /// Rejects configurations that cannot produce a meaningful run.
    pub fn validate(&self) -> Result<(), ProtobuildError> {
        let fail = |message: String| {
            Err(ProtobuildError::ConfigError {
                message,
            })
        };

        if self.base_module.trim().is_empty() {
            return fail("base module must not be empty".to_string());
        }
        if self.common_segment.trim().is_empty() || self.common_segment.contains('/') {
            return fail(format!("invalid common module segment '{}'", self.common_segment));
        }
        if self.repository.trim().is_empty() {
            return fail("repository must not be empty".to_string());
        }
        if self.revision.trim().is_empty() {
            return fail("revision must not be empty".to_string());
        }
        if !is_plain_relative(&self.tree_dir) || self.tree_dir.as_os_str().is_empty() {
            return fail(format!(
                "tree directory '{}' must be a relative path inside the project",
                self.tree_dir.display()
            ));
        }
        if let Some(subtree) = self
            .excluded_subtrees
            .iter()
            .find(|s| s.as_os_str().is_empty() || !is_plain_relative(s))
        {
            return fail(format!(
                "excluded subtree '{}' must be a non-empty path relative to the tree root",
                subtree.display()
            ));
        }
        if let Some(dir) = self.include_dirs.iter().find(|d| !is_plain_relative(d)) {
            return fail(format!(
                "include directory '{}' must be relative to the tree root",
                dir.display()
            ));
        }
        if self.output_kinds.is_empty() {
            return fail("at least one output kind is required".to_string());
        }
        if !self.schema_suffix.starts_with('.') || !self.artifact_suffix.starts_with('.') {
            return fail("file suffixes must start with '.'".to_string());
        }
        Ok(())
    }
}

/// True when the path has only normal (or `.`) components.
fn is_plain_relative(path: &Path) -> bool {
    path.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
