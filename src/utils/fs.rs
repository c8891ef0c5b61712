//! File system helpers for the working area.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Removes a directory tree, treating an absent path as success.
///
/// A symbolic link at `path` is removed without touching its target.
pub fn remove_dir_all(path: &Path) -> Result<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to inspect {}", path.display()));
        }
    };

    if metadata.is_dir() {
        fs::remove_dir_all(path)
            .with_context(|| format!("Failed to remove directory: {}", path.display()))?;
    } else {
        fs::remove_file(path)
            .with_context(|| format!("Failed to remove file: {}", path.display()))?;
    }
    Ok(())
}

/// Appends `data` to an existing file without truncating it.
///
/// The file must already exist; it is never created here.
pub fn append_to_file(path: &Path, data: &[u8]) -> Result<()> {
    let mut file = fs::OpenOptions::new()
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open file for append: {}", path.display()))?;
    file.write_all(data).with_context(|| format!("Failed to append to {}", path.display()))?;
    file.flush().with_context(|| format!("Failed to flush {}", path.display()))?;
    Ok(())
}
