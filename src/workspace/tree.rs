//! Scoped ownership of the fetched schema tree.

use anyhow::Result;
use std::path::PathBuf;

use crate::utils::fs::remove_dir_all;

/// Guard over the directory the schema tree is fetched into.
///
/// The tree belongs to one run. [`FetchedTree::release`] removes it and
/// reports failures; a guard dropped without being released (early return,
/// panic unwinding) still removes the tree and logs any failure. An absent
/// tree is a valid, clean state.
#[derive(Debug)]
pub struct FetchedTree {
    path: PathBuf,
    released: bool,
}

impl FetchedTree {
    /// Takes ownership of `path` for this run.
    ///
    /// A tree left behind by a run that was killed before cleanup is removed
    /// first, so the provider starts from an empty destination.
    pub fn acquire(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if std::fs::symlink_metadata(&path).is_ok() {
            tracing::warn!("Removing leftover schema tree at {}", path.display());
            remove_dir_all(&path)?;
        }
        Ok(Self {
            path,
            released: false,
        })
    }

    /// Removes the tree if it exists.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        let result = remove_dir_all(&self.path);
        if result.is_ok() {
            tracing::debug!("Removed schema tree {}", self.path.display());
        }
        result
    }
}

impl Drop for FetchedTree {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = remove_dir_all(&self.path) {
            tracing::error!("Failed to remove schema tree {}: {:#}", self.path.display(), e);
        }
    }
}
