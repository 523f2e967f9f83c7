//! Replacement classification.
//!
//! Marks the property changes that force a resource to be destroyed and
//! recreated, and derives the resource-level [`ReplacementType`].

use crate::plan::{ChangeType, Overlay, PathSegment};

use super::types::{PropertyChangeAnalysis, ReplacementType};

/// Classifier for replacement-triggering changes.
#[derive(Debug, Default)]
pub struct ReplacementClassifier;

impl ReplacementClassifier {
    /// Creates a new replacement classifier.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Flags every change whose path exactly matches a declared replace path.
    pub fn mark_triggers(&self, analysis: &mut PropertyChangeAnalysis, replace_paths: &[Vec<PathSegment>]) {
        for change in &mut analysis.changes {
            change.triggers_replacement = replace_paths.iter().any(|p| *p == change.path);
        }
    }

    /// Derives the resource-level replacement type.
    ///
    /// A replace whose declared paths all resolve to known after-values is
    /// `always`; one that hinges on a value known only after apply is
    /// `conditional`.
    #[must_use]
    pub fn classify(
        &self,
        change_type: ChangeType,
        replace_paths: &[Vec<PathSegment>],
        after_unknown: Overlay<'_>,
    ) -> ReplacementType {
        if change_type != ChangeType::Replace {
            return ReplacementType::Never;
        }

        let hinges_on_unknown = replace_paths
            .iter()
            .any(|path| after_unknown.at_path(path).covers_any());

        if hinges_on_unknown {
            ReplacementType::Conditional
        } else {
            ReplacementType::Always
        }
    }
}
