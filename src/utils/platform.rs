//! Platform-specific helpers for locating external tools.
//!
//! protobuild shells out to `git` and `protoc`. On Windows both are invoked
//! through their `.exe` names; everywhere else the bare name is resolved
//! through `PATH`.

use std::path::PathBuf;

use crate::core::ProtobuildError;

/// Checks if the current platform is Windows.
#[must_use]
pub const fn is_windows() -> bool {
    cfg!(windows)
}

/// Returns the platform-appropriate name of the Git executable.
#[must_use]
pub const fn get_git_command() -> &'static str {
    if is_windows() {
        "git.exe"
    } else {
        "git"
    }
}

/// Returns the platform-appropriate name of the protobuf compiler.
#[must_use]
pub const fn get_protoc_command() -> &'static str {
    if is_windows() {
        "protoc.exe"
    } else {
        "protoc"
    }
}

/// Resolves a program name or path to the executable that will be run.
///
/// # Errors
///
/// Returns [`ProtobuildError::ToolNotFound`] when nothing executable matches.
pub fn resolve_command(cmd: &str) -> Result<PathBuf, ProtobuildError> {
    which::which(cmd).map_err(|_| ProtobuildError::ToolNotFound {
        tool: cmd.to_string(),
    })
}
