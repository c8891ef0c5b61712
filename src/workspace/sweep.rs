//! Removal of previously generated artifacts.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::core::ProtobuildError;

/// Files removed by one sweep.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub removed: Vec<PathBuf>,
}

impl SweepReport {
    #[must_use]
    pub fn count(&self) -> usize {
        self.removed.len()
    }
}

/// Deletes every file under `root` whose name ends with `suffix`.
///
/// Directories are never removed, and links are removed without following
/// them. The first traversal or deletion error aborts the sweep: a
/// half-swept tree must not be handed to the generator. Sweeping an already
/// clean tree is a no-op.
pub fn sweep_artifacts(root: &Path, suffix: &str) -> Result<SweepReport> {
    let mut report = SweepReport::default();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.with_context(|| format!("Failed to scan {}", root.display()))?;
        if entry.file_type().is_dir() || !entry.file_name().to_string_lossy().ends_with(suffix) {
            continue;
        }

        let path = entry.path();
        std::fs::remove_file(path).with_context(|| ProtobuildError::FileSystemError {
            operation: "remove generated artifact".to_string(),
            path: path.display().to_string(),
        })?;
        tracing::trace!("Removed {}", path.display());
        report.removed.push(path.to_path_buf());
    }

    tracing::info!("Removed {} stale *{} files under {}", report.count(), suffix, root.display());
    Ok(report)
}
