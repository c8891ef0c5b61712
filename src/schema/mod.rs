//! Schema tree model and the per-file decisions made over it.
//!
//! - [`scanner`] walks the fetched tree and loads every candidate file
//! - [`filter`] decides which files take part in generation
//! - [`resolver`] assigns each included file its [`ModulePath`]
//! - [`annotate`] appends the module declaration to each included file

pub mod annotate;
pub mod filter;
pub mod resolver;
pub mod scanner;

pub use annotate::{AnnotationWriter, module_directive};
pub use filter::{ExclusionReason, Inclusion, InclusionFilter};
pub use resolver::ModuleResolver;
pub use scanner::{ScanOutcome, scan_tree, walk_tree};

use serde::{Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;

/// A schema file discovered in the fetched tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaFile {
    /// Identity: path relative to the tree root
    pub relative: PathBuf,
    /// Location on disk
    pub absolute: PathBuf,
    /// Raw contents as last read or written by this run
    pub contents: Vec<u8>,
}

/// Hierarchical output package for generated code: a base identifier followed
/// by zero or more segments, rendered joined with `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModulePath {
    base: String,
    segments: Vec<String>,
}

impl ModulePath {
    /// A module path consisting of just the base identifier.
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            segments: Vec::new(),
        }
    }

    /// Returns this path extended by one segment.
    #[must_use]
    pub fn child(mut self, segment: impl Into<String>) -> Self {
        self.push(segment);
        self
    }

    pub fn push(&mut self, segment: impl Into<String>) {
        self.segments.push(segment.into());
    }

    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Segments below the base identifier, in order.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base)?;
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl Serialize for ModulePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
