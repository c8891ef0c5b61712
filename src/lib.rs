//! protobuild - prepare a protobuf schema tree for Go code generation
//!
//! protobuild fetches a pinned revision of a protobuf schema repository,
//! decides which Go package the code generated for each schema file belongs
//! to, writes that decision into the file as an `option go_package`
//! declaration, and runs `protoc` once over the whole included set.
//!
//! # Architecture Overview
//!
//! A run is a strictly sequential pipeline:
//!
//! ```text
//! sweep *.pb.go -> git clone -> scan + filter -> resolve + annotate -> protoc -> remove tree
//! ```
//!
//! The last step always runs, whether the earlier ones succeeded or not.
//!
//! ## Module paths without import cycles
//!
//! Every schema file is assigned the base module followed by its directory
//! segments, with one exception: a small, hand-maintained set of widely
//! shared files (`timestamp.proto`, `basic_types.proto`) is hoisted into a
//! single `common` module. See [`schema::resolver`].
//!
//! # Core Modules
//!
//! - [`config`] - immutable [`config::BuildConfig`] passed to every stage
//! - [`schema`] - scanning, filtering, module resolution, and annotation
//! - [`workspace`] - artifact sweeping and the scoped fetched-tree guard
//! - [`git`] - the source provider (`git clone`)
//! - [`generator`] - the code generator (`protoc`)
//! - [`pipeline`] - stage ordering and the cleanup guarantee
//! - [`process`] - execution of external tools
//! - [`core`] - error types and user-facing error reporting
//! - [`cli`] - command-line interface
//! - [`utils`] - file system, platform, and progress helpers
//!
//! # Command-Line Usage
//!
//! ```bash
//! # Regenerate everything from the pinned revision
//! protobuild build
//!
//! # Inspect module assignments for another revision
//! protobuild plan --revision 0123abcd --format json
//!
//! # Remove generated files
//! protobuild sweep
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod generator;
pub mod git;
pub mod pipeline;
pub mod process;
pub mod schema;
pub mod utils;
pub mod workspace;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
