//! Module path resolution.
//!
//! Generated Go packages must not import each other in a cycle. The policy
//! has two rules:
//!
//! 1. A file whose basename is in the common set resolves to the shared
//!    common module, wherever it sits in the tree. These files (timestamps,
//!    basic types) are imported from every subtree; generating them per
//!    directory would make the most-imported package import its dependents.
//! 2. Any other file resolves to the base module followed by the directories
//!    between the tree root and the file. The directory layout of the tree is
//!    trusted to be acyclic once the common files are hoisted.
//!
//! The common set is maintained by hand and is not checked against the real
//! import graph.

use std::collections::BTreeSet;
use std::path::{Component, Path};

use crate::config::BuildConfig;
use crate::schema::ModulePath;

#[derive(Debug, Clone)]
pub struct ModuleResolver {
    base_module: String,
    common_module: ModulePath,
    common_files: BTreeSet<String>,
}

impl ModuleResolver {
    pub fn new<I, S>(base_module: impl Into<String>, common_module: ModulePath, common_files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            base_module: base_module.into(),
            common_module,
            common_files: common_files.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn from_config(config: &BuildConfig) -> Self {
        Self::new(
            config.base_module.clone(),
            config.common_module(),
            config.common_files.iter().cloned(),
        )
    }

    /// True when the file's basename is in the common set.
    #[must_use]
    pub fn is_common(&self, relative: &Path) -> bool {
        relative
            .file_name()
            .is_some_and(|name| self.common_files.contains(&*name.to_string_lossy()))
    }

    /// Module path for a file given relative to the tree root. Total.
    #[must_use]
    pub fn resolve(&self, relative: &Path) -> ModulePath {
        if self.is_common(relative) {
            return self.common_module.clone();
        }

        let mut module = ModulePath::new(&self.base_module);
        if let Some(parent) = relative.parent() {
            for component in parent.components() {
                if let Component::Normal(segment) = component {
                    module.push(segment.to_string_lossy());
                }
            }
        }
        module
    }
}
