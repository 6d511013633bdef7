//! Provider registry for managing multiple [`MetadataProvider`] implementations.
//!
//! The [`ProviderRegistry`] aggregates metadata providers. The cached client
//! queries each available provider (through the cache) and merges their
//! results with [`merge_candidates`]: entries sharing the same title and year
//! are deduplicated keeping the highest-confidence hit, and the final list is
//! sorted by descending confidence.

use std::sync::Arc;

use super::provider::{MetadataProvider, SearchResult};

/// A registry that manages multiple [`MetadataProvider`] implementations.
///
/// Providers are stored in registration order.
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn MetadataProvider>>,
}

impl ProviderRegistry {
    /// Create an empty registry with no providers.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Register a new metadata provider.
    pub fn register(&mut self, provider: Arc<dyn MetadataProvider>) {
        self.providers.push(provider);
    }

    /// Return all providers that are currently available (i.e. configured
    /// with valid credentials), in registration order.
    pub fn available(&self) -> Vec<Arc<dyn MetadataProvider>> {
        self.providers
            .iter()
            .filter(|p| p.is_available())
            .cloned()
            .collect()
    }

    /// Look up a provider by its [`MetadataProvider::name`].
    pub fn get(&self, name: &str) -> Option<Arc<dyn MetadataProvider>> {
        self.providers
            .iter()
            .find(|p| p.name() == name)
            .cloned()
    }

    /// Number of registered providers, available or not.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether no providers have been registered.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Merge results from multiple providers.
///
/// Entries sharing the same (lowercased title, year) are deduplicated,
/// keeping the highest-confidence hit. The merged list is sorted by
/// descending confidence.
pub fn merge_candidates(all_results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut seen = std::collections::HashMap::<(String, Option<u16>), usize>::new();
    let mut deduped: Vec<SearchResult> = Vec::new();

    for result in all_results {
        let key = (result.title.to_lowercase(), result.year);
        if let Some(&idx) = seen.get(&key) {
            if result.confidence > deduped[idx].confidence {
                deduped[idx] = result;
            }
        } else {
            seen.insert(key, deduped.len());
            deduped.push(result);
        }
    }

    deduped.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    deduped
}
