//! Core types shared across protobuild.
//!
//! At the moment this is the error layer: the typed [`ProtobuildError`] and
//! the user-facing [`ErrorContext`] the binary prints on failure.

pub mod error;

pub use error::{ErrorContext, ProtobuildError, find_protobuild_error, user_friendly_error};
