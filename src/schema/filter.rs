//! Inclusion filter for scanned paths.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::BuildConfig;

/// Why a path was left out of generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ExclusionReason {
    /// The file does not carry the schema suffix.
    NotSchema,
    /// The file lies under a configured excluded subtree.
    ExcludedSubtree {
        subtree: PathBuf,
    },
}

/// Outcome of classifying one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inclusion {
    Included,
    Excluded(ExclusionReason),
}

impl Inclusion {
    #[must_use]
    pub const fn is_included(&self) -> bool {
        matches!(self, Self::Included)
    }
}

/// Classifies paths relative to the tree root as included or excluded.
///
/// Subtree matching is per path component, so excluding `mirror` leaves
/// `mirrored/x.proto` alone; a trailing `/` on a configured subtree is
/// irrelevant.
#[derive(Debug, Clone)]
pub struct InclusionFilter {
    schema_suffix: String,
    excluded_subtrees: Vec<PathBuf>,
}

impl InclusionFilter {
    pub fn new<I, P>(schema_suffix: impl Into<String>, excluded_subtrees: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            schema_suffix: schema_suffix.into(),
            excluded_subtrees: excluded_subtrees.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn from_config(config: &BuildConfig) -> Self {
        Self::new(config.schema_suffix.clone(), config.excluded_subtrees.iter().cloned())
    }

    #[must_use]
    pub fn classify(&self, relative: &Path) -> Inclusion {
        if let Some(subtree) = self.excluded_subtrees.iter().find(|s| relative.starts_with(s)) {
            return Inclusion::Excluded(ExclusionReason::ExcludedSubtree {
                subtree: subtree.clone(),
            });
        }

        let has_suffix = relative
            .file_name()
            .is_some_and(|name| name.to_string_lossy().ends_with(&self.schema_suffix));
        if !has_suffix {
            return Inclusion::Excluded(ExclusionReason::NotSchema);
        }

        Inclusion::Included
    }
}
