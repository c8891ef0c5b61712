//! Command-line interface for protobuild.
//!
//! # Commands
//!
//! - `build` - sweep stale output, fetch the schema tree, annotate it, and run protoc
//! - `plan` - fetch the schema tree and show which module every file resolves to
//! - `sweep` - remove previously generated `*.pb.go` files only
//!
//! # Global Options
//!
//! - `--verbose` - debug logging
//! - `--quiet` - errors only
//! - `--no-progress` - disable the stage spinner
//! - `--project-dir` - working area (defaults to the current directory)
//!
//! `RUST_LOG` overrides the verbosity flags when set.
//!
//! ```bash
//! protobuild build
//! protobuild plan --format json
//! protobuild build --revision 0123abcd --retries 2 --verbose
//! ```

mod build;
mod plan;
mod sweep;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use crate::config::BuildConfig;

#[derive(Parser)]
#[command(
    name = "protobuild",
    about = "Prepare a pinned protobuf schema tree and generate Go code from it",
    version,
    long_about = "protobuild fetches a pinned revision of a protobuf schema repository, assigns every \
                  schema file a Go package that cannot form an import cycle, and runs protoc over the result."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable progress spinners
    #[arg(
        long,
        global = true,
        env = "PROTOBUILD_NO_PROGRESS",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    no_progress: bool,

    /// Project directory that receives the schema tree and generated code
    #[arg(long, global = true, value_name = "DIR")]
    project_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, annotate, and generate code for the schema tree
    Build(build::BuildCommand),

    /// Show the module each schema file resolves to, without generating
    Plan(plan::PlanCommand),

    /// Remove previously generated files
    Sweep(sweep::SweepCommand),
}

/// Overrides for where the schema tree comes from, shared by `build` and `plan`.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Schema repository URL
    #[arg(long, value_name = "URL")]
    repository: Option<String>,

    /// Revision to fetch instead of the pinned one
    #[arg(long, value_name = "REV")]
    revision: Option<String>,

    /// git executable to use
    #[arg(long, value_name = "PATH", env = "PROTOBUILD_GIT")]
    git: Option<String>,

    /// Timeout in seconds for each external command (default: none)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
}

impl SourceArgs {
    fn apply(&self, mut config: BuildConfig) -> BuildConfig {
        if let Some(ref repository) = self.repository {
            config = config.with_repository(repository);
        }
        if let Some(ref revision) = self.revision {
            config = config.with_revision(revision);
        }
        if let Some(ref git) = self.git {
            config = config.with_git_program(git);
        }
        if let Some(secs) = self.timeout {
            config = config.with_command_timeout(Some(Duration::from_secs(secs)));
        }
        config
    }
}

impl Cli {
    /// Chooses the log filter: `RUST_LOG` when set, otherwise the verbosity flags.
    #[must_use]
    pub fn log_filter(&self, rust_log: Option<&str>) -> String {
        if let Some(filter) = rust_log.filter(|f| !f.trim().is_empty()) {
            return filter.to_string();
        }
        if self.verbose {
            "debug".to_string()
        } else if self.quiet {
            "error".to_string()
        } else {
            "info".to_string()
        }
    }

    /// Installs the global tracing subscriber, writing to stderr.
    pub fn init_logging(&self) {
        let rust_log = std::env::var("RUST_LOG").ok();
        let filter = EnvFilter::try_new(self.log_filter(rust_log.as_deref()))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(self.verbose)
            .without_time()
            .try_init();
    }

    /// Base configuration for this invocation.
    #[must_use]
    pub fn base_config(&self) -> BuildConfig {
        let config = BuildConfig::default();
        match &self.project_dir {
            Some(dir) => config.with_project_dir(dir),
            None => config,
        }
    }

    pub async fn execute(self) -> Result<()> {
        let config = self.base_config();
        let progress = !self.no_progress && !self.quiet;

        match self.command {
            Commands::Build(cmd) => cmd.execute(config, progress).await,
            Commands::Plan(cmd) => cmd.execute(config, progress).await,
            Commands::Sweep(cmd) => cmd.execute(&config),
        }
    }
}
