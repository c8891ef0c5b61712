//! `protobuild build`: the full regeneration run.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::SourceArgs;
use crate::config::BuildConfig;
use crate::generator::ProtocGenerator;
use crate::git::GitSourceProvider;
use crate::pipeline::Pipeline;

/// Regenerate Go code from the pinned schema tree.
#[derive(Args, Debug)]
pub struct BuildCommand {
    #[command(flatten)]
    source: SourceArgs,

    /// protoc executable to use
    #[arg(long, value_name = "PATH", env = "PROTOBUILD_PROTOC")]
    protoc: Option<String>,

    /// Extra protoc attempts after a non-zero exit
    #[arg(long, value_name = "N", default_value_t = 0)]
    retries: u32,
}

impl BuildCommand {
    fn config(&self, base: BuildConfig) -> BuildConfig {
        let mut config = self.source.apply(base).with_generator_retries(self.retries);
        if let Some(ref protoc) = self.protoc {
            config = config.with_protoc_program(protoc);
        }
        config
    }

    pub async fn execute(self, base: BuildConfig, progress: bool) -> Result<()> {
        let config = self.config(base);
        let provider = GitSourceProvider::from_config(&config);
        let generator = ProtocGenerator::from_config(&config);

        let report = Pipeline::new(config, provider, generator).with_progress(progress).build().await?;

        println!("{}", "Generation complete".green().bold());
        println!("  {} stale files removed", report.swept);
        println!("  {} schema files generated", report.modules.len());
        println!("  {} paths excluded", report.excluded);
        Ok(())
    }
}
