//! The build pipeline.
//!
//! A full build runs, in order and one stage at a time:
//!
//! 1. sweep stale `*.pb.go` artifacts from the project directory
//! 2. fetch the pinned schema tree
//! 3. scan and filter the tree
//! 4. resolve and append the module declaration of every included file
//! 5. invoke the generator once over the included set
//! 6. remove the fetched tree, whatever happened in 1 to 5
//!
//! The tree location is taken over (and any leftover tree removed) before
//! step 1. A fatal error in any stage aborts the stages after it, and cleanup
//! still runs; if cleanup itself
//! fails after an earlier error, the earlier error is the one reported.
//!
//! [`Pipeline::plan`] runs the fetch and resolution stages without touching
//! files, for inspecting which module each schema file would land in.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;

use crate::config::BuildConfig;
use crate::generator::{GenerationRequest, Generator};
use crate::git::{FetchRequest, SourceProvider};
use crate::schema::{
    AnnotationWriter, ExclusionReason, InclusionFilter, ModulePath, ModuleResolver, ScanOutcome,
    scan_tree,
};
use crate::utils::progress::StageSpinner;
use crate::workspace::{FetchedTree, sweep_artifacts};

/// Summary of a completed build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Stale artifacts removed before fetching
    pub swept: usize,
    /// Included files (relative to the tree root) and their module paths
    pub modules: Vec<(PathBuf, ModulePath)>,
    /// Number of scanned paths left out of generation
    pub excluded: usize,
}

/// Module assignment for one included file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedFile {
    pub file: PathBuf,
    pub module: ModulePath,
    pub common: bool,
}

/// A path left out of generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub file: PathBuf,
    #[serde(flatten)]
    pub reason: ExclusionReason,
}

/// What a build would do, computed without modifying any schema file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildPlan {
    pub revision: String,
    pub files: Vec<PlannedFile>,
    pub excluded: Vec<SkippedFile>,
}

/// Drives one run over a [`SourceProvider`] and a [`Generator`].
pub struct Pipeline<P, G> {
    config: BuildConfig,
    provider: P,
    generator: G,
    spinner: StageSpinner,
}

impl<P: SourceProvider, G: Generator> Pipeline<P, G> {
    pub fn new(config: BuildConfig, provider: P, generator: G) -> Self {
        Self {
            config,
            provider,
            generator,
            spinner: StageSpinner::hidden(),
        }
    }

    /// Shows a stage spinner while the run is in progress.
    #[must_use]
    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.spinner = StageSpinner::new(enabled);
        self
    }

    /// Runs a full build.
    pub async fn build(&self) -> Result<BuildReport> {
        self.config.validate()?;

        let tree = FetchedTree::acquire(self.config.tree_path())?;
        let outcome = self.build_in_tree().await;
        let result = finish(tree, outcome);
        self.spinner.finish_and_clear();
        result
    }

    /// Fetches the tree and reports every file's module without annotating or generating.
    pub async fn plan(&self) -> Result<BuildPlan> {
        self.config.validate()?;

        let tree = FetchedTree::acquire(self.config.tree_path())?;
        let outcome = self.plan_in_tree().await;
        let result = finish(tree, outcome);
        self.spinner.finish_and_clear();
        result
    }

    async fn fetch_and_scan(&self) -> Result<ScanOutcome> {
        self.spinner.stage(format!("Fetching {}", self.config.repository));
        self.provider
            .fetch(&FetchRequest::from_config(&self.config))
            .await
            .context("Failed to fetch schema tree")?;

        self.spinner.stage("Scanning schema tree");
        scan_tree(&self.config.tree_path(), &InclusionFilter::from_config(&self.config))
    }

    /// Everything after the tree location is owned, so a failure in any of
    /// these stages (the sweep included) still ends with the tree removed.
    async fn build_in_tree(&self) -> Result<BuildReport> {
        self.spinner.stage("Removing stale generated files");
        let swept = sweep_artifacts(&self.config.project_dir, &self.config.artifact_suffix)
            .context("Failed to remove previously generated files")?;

        let ScanOutcome {
            mut included,
            excluded,
        } = self.fetch_and_scan().await?;

        self.spinner.stage(format!("Annotating {} schema files", included.len()));
        let writer = AnnotationWriter::new(ModuleResolver::from_config(&self.config));
        let mut modules = Vec::with_capacity(included.len());
        for file in &mut included {
            let module = writer.annotate(file)?;
            modules.push((file.relative.clone(), module));
        }

        let files = included.iter().map(|f| self.config.tree_dir.join(&f.relative)).collect();
        let request = GenerationRequest::from_config(&self.config).with_files(files);

        self.spinner.stage(format!("Generating code for {} schema files", included.len()));
        self.generator.generate(&request).await.context("Code generation failed")?;

        tracing::info!(
            "Generated code for {} schema files ({} paths excluded)",
            modules.len(),
            excluded.len()
        );
        Ok(BuildReport {
            swept: swept.count(),
            modules,
            excluded: excluded.len(),
        })
    }

    async fn plan_in_tree(&self) -> Result<BuildPlan> {
        let outcome = self.fetch_and_scan().await?;
        let resolver = ModuleResolver::from_config(&self.config);

        let files = outcome
            .included
            .iter()
            .map(|f| PlannedFile {
                module: resolver.resolve(&f.relative),
                common: resolver.is_common(&f.relative),
                file: f.relative.clone(),
            })
            .collect();
        let excluded = outcome
            .excluded
            .into_iter()
            .map(|(file, reason)| SkippedFile {
                file,
                reason,
            })
            .collect();

        Ok(BuildPlan {
            revision: self.config.revision.clone(),
            files,
            excluded,
        })
    }
}

/// Releases the tree and combines the stage outcome with the cleanup outcome.
fn finish<T>(tree: FetchedTree, outcome: Result<T>) -> Result<T> {
    let cleanup = tree.release().context("Failed to remove fetched schema tree");
    match (outcome, cleanup) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(cleanup_error)) => Err(cleanup_error),
        (Err(error), Ok(())) => Err(error),
        (Err(error), Err(cleanup_error)) => {
            tracing::error!("{:#}", cleanup_error);
            Err(error)
        }
    }
}
