//! `protobuild sweep`: remove generated files without regenerating.

use anyhow::{Context, Result};
use clap::Args;

use crate::config::BuildConfig;
use crate::workspace::sweep_artifacts;

/// Remove previously generated files from the project directory.
#[derive(Args, Debug)]
pub struct SweepCommand {
    /// List every removed file
    #[arg(long)]
    list: bool,
}

impl SweepCommand {
    pub fn execute(self, config: &BuildConfig) -> Result<()> {
        let report = sweep_artifacts(&config.project_dir, &config.artifact_suffix)
            .context("Failed to remove previously generated files")?;

        if self.list {
            for path in &report.removed {
                println!("{}", path.display());
            }
        }
        println!("Removed {} generated files", report.count());
        Ok(())
    }
}
