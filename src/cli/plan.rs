//! `protobuild plan`: show module assignments without generating.

use anyhow::Result;
use clap::{Args, ValueEnum};
use colored::Colorize;

use super::SourceArgs;
use crate::config::BuildConfig;
use crate::generator::ProtocGenerator;
use crate::git::GitSourceProvider;
use crate::pipeline::{BuildPlan, Pipeline};
use crate::schema::ExclusionReason;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Fetch the schema tree and print each file's module path.
#[derive(Args, Debug)]
pub struct PlanCommand {
    #[command(flatten)]
    source: SourceArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

impl PlanCommand {
    pub async fn execute(self, base: BuildConfig, progress: bool) -> Result<()> {
        let config = self.source.apply(base);
        let provider = GitSourceProvider::from_config(&config);
        let generator = ProtocGenerator::from_config(&config);

        let plan = Pipeline::new(config, provider, generator).with_progress(progress).plan().await?;
        println!("{}", render(&plan, self.format)?);
        Ok(())
    }
}

fn render(plan: &BuildPlan, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(plan)?);
    }

    let mut out = format!("{} {}\n", "Revision".bold(), plan.revision);
    for entry in &plan.files {
        let marker = if entry.common {
            " (common)".yellow().to_string()
        } else {
            String::new()
        };
        out.push_str(&format!("  {} -> {}{}\n", entry.file.display(), entry.module, marker));
    }
    if !plan.excluded.is_empty() {
        out.push_str(&format!("{}\n", "Excluded".bold()));
        for entry in &plan.excluded {
            let why = match &entry.reason {
                ExclusionReason::NotSchema => "not a schema file".to_string(),
                ExclusionReason::ExcludedSubtree {
                    subtree,
                } => format!("under {}", subtree.display()),
            };
            out.push_str(&format!("  {} ({})\n", entry.file.display(), why));
        }
    }
    Ok(out.trim_end().to_string())
}
