//! Traversal of the fetched schema tree.
//!
//! [`walk_tree`] yields every regular file under the root as a path relative
//! to it. Entries are sorted by file name within each directory, so the order
//! is stable across runs and platforms. Symbolic links are not followed. Any
//! traversal error aborts the scan.
//!
//! [`scan_tree`] applies an [`InclusionFilter`] on top and loads the contents
//! of every included file.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::schema::{ExclusionReason, Inclusion, InclusionFilter, SchemaFile};

/// Result of scanning the tree: what goes to the generator and what is left out.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Included schema files, in traversal order
    pub included: Vec<SchemaFile>,
    /// Excluded paths (relative to the root) and why
    pub excluded: Vec<(PathBuf, ExclusionReason)>,
}

/// Lists every file under `root`, relative to it, in deterministic order.
pub fn walk_tree(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry =
            entry.with_context(|| format!("Failed to scan schema tree {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .with_context(|| format!("{} is outside {}", entry.path().display(), root.display()))?;
        tracing::trace!("Found {}", relative.display());
        files.push(relative.to_path_buf());
    }

    Ok(files)
}

/// Walks `root`, classifies each file, and reads the included ones.
pub fn scan_tree(root: &Path, filter: &InclusionFilter) -> Result<ScanOutcome> {
    let mut outcome = ScanOutcome::default();

    for relative in walk_tree(root)? {
        match filter.classify(&relative) {
            Inclusion::Included => {
                let absolute = root.join(&relative);
                let contents = std::fs::read(&absolute)
                    .with_context(|| format!("Failed to read schema file {}", absolute.display()))?;
                outcome.included.push(SchemaFile {
                    relative,
                    absolute,
                    contents,
                });
            }
            Inclusion::Excluded(reason) => {
                tracing::debug!("Skipping {} ({:?})", relative.display(), reason);
                outcome.excluded.push((relative, reason));
            }
        }
    }

    tracing::info!(
        "Scanned {}: {} schema files included, {} paths excluded",
        root.display(),
        outcome.included.len(),
        outcome.excluded.len()
    );
    Ok(outcome)
}
