//! Risk-first display ordering.

use std::cmp::Ordering;

use super::types::ResourceChange;

/// Stable total ordering of resources for display.
///
/// Dangerous resources come first, then by action priority
/// (delete, replace, update, create, no-op), then by address.
#[derive(Debug, Default)]
pub struct PriorityRanker;

impl PriorityRanker {
    /// Creates a new ranker.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Compares two resources by display priority.
    #[must_use]
    pub fn compare(&self, a: &ResourceChange, b: &ResourceChange) -> Ordering {
        b.is_dangerous
            .cmp(&a.is_dangerous)
            .then_with(|| a.change_type.priority().cmp(&b.change_type.priority()))
            .then_with(|| a.address.cmp(&b.address))
    }

    /// Returns the resources in display order without reordering the input.
    #[must_use]
    pub fn rank<'a>(&self, resources: &'a [ResourceChange]) -> Vec<&'a ResourceChange> {
        let mut ranked: Vec<&ResourceChange> = resources.iter().collect();
        ranked.sort_by(|a, b| self.compare(a, b));
        ranked
    }

    /// Sorts a borrowed list in place, keeping ties in their original order.
    pub fn sort(&self, resources: &mut [&ResourceChange]) {
        resources.sort_by(|a, b| self.compare(a, b));
    }
}
