//! Error handling for protobuild
//!
//! Two layers cooperate here:
//! - [`ProtobuildError`] - typed failures that callers need to tell apart
//! - [`ErrorContext`] - a user-facing wrapper with details and a suggestion
//!
//! Internal code returns [`anyhow::Result`] and attaches context with
//! `.with_context(...)`. At the top level, errors reported by an external tool
//! (`git`, `protoc`) carry that tool's exit code and diagnostics, which are
//! surfaced verbatim. Anything else goes through [`user_friendly_error`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use protobuild::core::{ProtobuildError, user_friendly_error};
//!
//! let error = anyhow::Error::from(ProtobuildError::ToolNotFound {
//!     tool: "protoc".to_string(),
//! });
//! user_friendly_error(error).display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// Failures a protobuild run can end with.
///
/// The variants follow the run's failure taxonomy:
/// - fetching the tree: [`FetchFailed`](Self::FetchFailed)
/// - the generator: [`GenerationFailed`](Self::GenerationFailed)
/// - running any external tool: [`ToolNotFound`](Self::ToolNotFound),
///   [`CommandFailed`](Self::CommandFailed), [`CommandTimedOut`](Self::CommandTimedOut)
/// - the working area: [`FileSystemError`](Self::FileSystemError)
/// - bad parameters: [`ConfigError`](Self::ConfigError)
#[derive(Error, Debug)]
pub enum ProtobuildError {
    /// The source provider could not materialize the schema tree.
    #[error("Failed to fetch {url} at revision {revision}")]
    FetchFailed {
        /// Repository that was being cloned
        url: String,
        /// Revision that was requested
        revision: String,
        /// Exit code reported by the provider, if it exited normally
        exit_code: Option<i32>,
        /// Diagnostic output of the provider
        stderr: String,
    },

    /// The generator exited with a non-zero status.
    #[error("Code generation failed")]
    GenerationFailed {
        /// Exit code reported by the generator, if it exited normally
        exit_code: Option<i32>,
        /// Diagnostic output of the generator
        stderr: String,
    },

    /// An external executable could not be located.
    #[error("{tool} is not installed or not found in PATH")]
    ToolNotFound {
        /// Program name or path that was looked up
        tool: String,
    },

    /// An external command exited with a non-zero status.
    #[error("{tool} {operation} failed")]
    CommandFailed {
        /// Program that was run
        tool: String,
        /// First argument of the invocation (e.g. "clone")
        operation: String,
        /// Exit code, or `None` when the process was terminated by a signal
        exit_code: Option<i32>,
        /// Captured standard error
        stderr: String,
    },

    /// An external command exceeded its configured timeout.
    #[error("{tool} {operation} timed out after {seconds} seconds")]
    CommandTimedOut {
        /// Program that was run
        tool: String,
        /// First argument of the invocation
        operation: String,
        /// The timeout that elapsed
        seconds: u64,
    },

    /// A filesystem operation on the working area failed.
    #[error("File system error: {operation} ({path})")]
    FileSystemError {
        /// What was being done (e.g. "remove generated artifact")
        operation: String,
        /// Path the operation targeted
        path: String,
    },

    /// The build configuration is unusable.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the problem
        message: String,
    },
}

impl ProtobuildError {
    /// Exit code to propagate for failures reported by an external tool.
    ///
    /// Returns `Some` only for [`FetchFailed`](Self::FetchFailed) and
    /// [`GenerationFailed`](Self::GenerationFailed). A tool killed by a signal
    /// has no exit code and maps to 1.
    #[must_use]
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::FetchFailed {
                exit_code,
                ..
            }
            | Self::GenerationFailed {
                exit_code,
                ..
            } => Some(exit_code.unwrap_or(1)),
            _ => None,
        }
    }

    /// The external tool's own diagnostic output, if this error carries one.
    #[must_use]
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            Self::FetchFailed {
                stderr,
                ..
            }
            | Self::GenerationFailed {
                stderr,
                ..
            }
            | Self::CommandFailed {
                stderr,
                ..
            } => Some(stderr),
            _ => None,
        }
    }
}

/// Finds the first [`ProtobuildError`] anywhere in an error chain.
///
/// Also finds one attached as context (`.with_context(|| ProtobuildError::...)`).
#[must_use]
pub fn find_protobuild_error(error: &anyhow::Error) -> Option<&ProtobuildError> {
    error
        .downcast_ref::<ProtobuildError>()
        .or_else(|| error.chain().find_map(|cause| cause.downcast_ref::<ProtobuildError>()))
}

/// An error prepared for display on the terminal.
#[derive(Debug)]
pub struct ErrorContext {
    /// Headline of the failure
    pub message: String,
    /// Additional information, typically the error's cause chain
    pub details: Option<String>,
    /// What the user can try next
    pub suggestion: Option<String>,
}

impl ErrorContext {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: None,
            suggestion: None,
        }
    }

    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Prints the error to stderr with colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Converts any error into an [`ErrorContext`] with a suggestion where one is known.
///
/// The details always carry the full cause chain so that unexpected failures
/// are reported with their complete context.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let chain = error.chain().skip(1).map(ToString::to_string).collect::<Vec<_>>();
    let mut context = ErrorContext::new(error.to_string());
    if !chain.is_empty() {
        context = context.with_details(chain.join(": "));
    }

    let Some(typed) = find_protobuild_error(&error) else {
        return context;
    };

    match typed {
        ProtobuildError::ToolNotFound {
            tool,
        } => context.with_suggestion(format!(
            "Install {tool} and make sure it is on your PATH, or pass its location explicitly"
        )),
        ProtobuildError::CommandTimedOut {
            ..
        } => context.with_suggestion("Check network connectivity or raise the command timeout"),
        ProtobuildError::FileSystemError {
            ..
        } => context.with_suggestion("Check that the project directory exists and is writable"),
        ProtobuildError::ConfigError {
            ..
        } => context.with_suggestion("Review the command-line overrides passed to protobuild"),
        ProtobuildError::CommandFailed {
            stderr,
            ..
        } if !stderr.trim().is_empty() => context.with_details(stderr.trim().to_string()),
        _ => context,
    }
}
