//! Grouping of resources by provider.
//!
//! The provider key is the part of a resource type before its first `_`.
//! Extraction is memoized in a [`ProviderCache`] that callers share by
//! handing the same `Arc` to every grouper.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

use crate::config::GroupingConfig;

use super::types::ResourceChange;

/// Provider key used when a resource type has no recognizable prefix.
pub const UNKNOWN_PROVIDER: &str = "unknown";

const PROVIDER_SEPARATOR: char = '_';

/// Memoized provider extraction, safe for concurrent use.
#[derive(Debug, Default)]
pub struct ProviderCache {
    /// Resource type to provider key.
    entries: RwLock<HashMap<String, String>>,
}

impl ProviderCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the provider key for a resource type, computing it once.
    #[must_use]
    pub fn provider_for(&self, resource_type: &str) -> String {
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(provider) = entries.get(resource_type) {
                return provider.clone();
            }
        }

        let provider = extract_provider(resource_type);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(resource_type.to_string())
            .or_insert_with(|| provider.clone());
        provider
    }

    /// Returns the number of memoized types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns true if nothing has been memoized yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn extract_provider(resource_type: &str) -> String {
    match resource_type.split_once(PROVIDER_SEPARATOR) {
        Some((prefix, _)) if !prefix.is_empty() => prefix.to_string(),
        _ => String::from(UNKNOWN_PROVIDER),
    }
}

/// Resources sharing a provider key, in their original relative order.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderGroup<'a> {
    /// Provider key.
    pub provider: String,
    /// Resources in this group.
    pub resources: Vec<&'a ResourceChange>,
}

/// Groups resources by provider when the plan is large and varied enough.
#[derive(Debug, Clone)]
pub struct ProviderGrouper {
    /// Shared extraction cache.
    cache: Arc<ProviderCache>,
    /// Grouping settings.
    config: GroupingConfig,
}

impl ProviderGrouper {
    /// Creates a grouper over a shared cache.
    #[must_use]
    pub const fn new(cache: Arc<ProviderCache>, config: GroupingConfig) -> Self {
        Self { cache, config }
    }

    /// Returns the provider key for a resource type.
    #[must_use]
    pub fn provider_for(&self, resource_type: &str) -> String {
        self.cache.provider_for(resource_type)
    }

    /// Groups resources by provider, ordered by provider key.
    ///
    /// Returns an empty list when grouping is disabled, the resource count is
    /// below the threshold, or fewer than two providers are present. Callers
    /// treat an empty result as "show a flat list".
    #[must_use]
    pub fn group<'a>(&self, resources: &'a [ResourceChange]) -> Vec<ProviderGroup<'a>> {
        let threshold = self.config.effective_threshold();
        if !self.config.enabled || resources.len() < threshold {
            debug!(
                enabled = self.config.enabled,
                count = resources.len(),
                threshold,
                "Grouping skipped"
            );
            return Vec::new();
        }

        let mut groups: BTreeMap<String, Vec<&'a ResourceChange>> = BTreeMap::new();
        for resource in resources {
            groups
                .entry(self.cache.provider_for(&resource.resource_type))
                .or_default()
                .push(resource);
        }

        if groups.len() < 2 {
            debug!(providers = groups.len(), "Grouping skipped, single provider");
            return Vec::new();
        }

        debug!(providers = groups.len(), "Grouped resources by provider");
        groups
            .into_iter()
            .map(|(provider, resources)| ProviderGroup { provider, resources })
            .collect()
    }
}
