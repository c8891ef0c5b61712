//! Compiled-in defaults for a protobuild run.
//!
//! These values pin the schema repository and describe its layout. They are
//! read once by [`crate::config::BuildConfig::default`]; everything else takes
//! its parameters from the config struct.

use std::time::Duration;

/// Go module that every generated package lives under.
pub const BASE_MODULE: &str = "github.com/hashgraph/hedera-protobufs-go";

/// Segment appended to [`BASE_MODULE`] for the shared common package.
pub const COMMON_MODULE_SEGMENT: &str = "common";

/// Directory, relative to the project directory, that the schema tree is cloned into.
pub const TREE_DIR: &str = "proto";

/// Repository holding the schema tree.
pub const PROTO_REPOSITORY: &str = "https://github.com/hashgraph/hedera-protobufs";

/// Pinned revision of [`PROTO_REPOSITORY`].
pub const PROTO_REVISION: &str = "8c27786cec93abab974309074feaef9b48a695b7";

/// Shallow clone depth used when fetching the tree.
pub const CLONE_DEPTH: u32 = 1;

/// Suffix identifying schema files.
pub const SCHEMA_SUFFIX: &str = ".proto";

/// Suffix identifying files produced by a previous generation run.
pub const ARTIFACT_SUFFIX: &str = ".pb.go";

/// Schema files referenced from so many subtrees that they are hoisted into
/// the common package. Generating them per directory would create import cycles.
pub const COMMON_FILES: &[&str] = &["timestamp.proto", "basic_types.proto"];

/// Subtrees of the schema tree that are never generated.
///
/// `mirror` holds the mirror node API, which consumers of the generated code
/// never call.
pub const EXCLUDED_SUBTREES: &[&str] = &["mirror"];

/// Include-search directories relative to the tree root. The empty entry is
/// the tree root itself.
pub const INCLUDE_DIRS: &[&str] = &["services", "block", "sdk", "streams", "platform", ""];

/// protoc output plugins to run, each receiving `--<kind>_out` and `--<kind>_opt`.
pub const OUTPUT_KINDS: &[&str] = &["go", "go-grpc"];

/// Starting delay for generator retry backoff.
pub const STARTING_BACKOFF_DELAY_MS: u64 = 100;

/// Upper bound on a single generator retry delay.
pub const MAX_BACKOFF_DELAY: Duration = Duration::from_secs(5);
