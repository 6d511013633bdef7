//! Cache-fronted provider queries.
//!
//! The [`CachedProviderClient`] is the one path match workers use to reach
//! external metadata: every lookup consults the [`ProviderCache`] first and
//! only calls the provider on a miss, storing successful responses for the
//! configured TTL. Results from all available providers are merged and
//! sorted by confidence.

use std::sync::Arc;

use reelkeep_common::{Error, MediaKind, Result};
use reelkeep_parser::VideoMetadata;
use tracing::{debug, warn};

use super::cache::{CacheKey, ProviderCache};
use super::provider::SearchResult;
use super::registry::{merge_candidates, ProviderRegistry};

/// Provider client that routes every query through the response cache.
pub struct CachedProviderClient {
    registry: Arc<ProviderRegistry>,
    cache: ProviderCache,
}

impl CachedProviderClient {
    pub fn new(registry: Arc<ProviderRegistry>, cache: ProviderCache) -> Self {
        Self { registry, cache }
    }

    /// Search all available providers for candidates matching `metadata`.
    ///
    /// Per provider: cache hit short-circuits the network; a miss calls the
    /// provider and caches a successful response (empty candidate lists are
    /// cached too, since "nothing found" is worth remembering for a TTL). A
    /// failing provider is skipped so the others can still contribute.
    ///
    /// Returns an error only when every provider failed and nothing usable
    /// was cached, so callers can distinguish "providers down" (retry later)
    /// from "no candidates exist" (no match).
    pub async fn search(&self, metadata: &VideoMetadata) -> Result<Vec<SearchResult>> {
        let providers = self.registry.available();
        if providers.is_empty() {
            return Ok(Vec::new());
        }

        let mut all_results = Vec::new();
        let mut failures = 0usize;

        for provider in &providers {
            let key = match metadata.kind {
                MediaKind::Movie => {
                    CacheKey::movie_search(provider.name(), &metadata.title, metadata.year)
                }
                MediaKind::Tv => CacheKey::tv_search(
                    provider.name(),
                    &metadata.title,
                    metadata.season,
                    metadata.episode,
                ),
            };

            if let Some(cached) = self.cache.get(&key)? {
                all_results.extend(cached);
                continue;
            }

            debug!(
                provider = provider.name(),
                title = %metadata.title,
                "Provider cache miss; querying provider"
            );

            let response = match metadata.kind {
                MediaKind::Movie => provider.search_movie(&metadata.title, metadata.year).await,
                MediaKind::Tv => {
                    provider
                        .search_tv(&metadata.title, metadata.season, metadata.episode)
                        .await
                }
            };

            match response {
                Ok(results) => {
                    self.cache.put(&key, &results)?;
                    all_results.extend(results);
                }
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        title = %metadata.title,
                        error = %e,
                        "Provider query failed; continuing with remaining providers"
                    );
                    failures += 1;
                }
            }
        }

        if failures == providers.len() && all_results.is_empty() {
            return Err(Error::provider(format!(
                "All {} provider(s) failed for '{}'",
                failures, metadata.title
            )));
        }

        Ok(merge_candidates(all_results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::provider::MetadataProvider;
    use async_trait::async_trait;
    use chrono::Duration;
    use reelkeep_db::pool::init_memory_pool;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Stub provider that counts calls and returns a canned candidate.
    struct CountingProvider {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl MetadataProvider for CountingProvider {
        fn name(&self) -> &'static str {
            "stub"
        }

        fn is_available(&self) -> bool {
            true
        }

        async fn search_movie(
            &self,
            title: &str,
            year: Option<u16>,
        ) -> anyhow::Result<Vec<SearchResult>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("provider unavailable");
            }
            Ok(vec![SearchResult {
                id: "99".to_string(),
                title: title.to_string(),
                year,
                overview: None,
                confidence: 0.95,
                provider_name: "stub".to_string(),
            }])
        }

        async fn search_tv(
            &self,
            _title: &str,
            _season: Option<u16>,
            _episode: Option<u16>,
        ) -> anyhow::Result<Vec<SearchResult>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    fn movie_metadata(title: &str, year: Option<u16>) -> VideoMetadata {
        VideoMetadata {
            path: PathBuf::from(format!("/media/{title}.mkv")),
            title: title.to_string(),
            kind: MediaKind::Movie,
            year,
            season: None,
            episode: None,
            tokens: vec![title.to_string()],
        }
    }

    fn client_with(provider: CountingProvider) -> CachedProviderClient {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(provider));
        let pool = init_memory_pool().unwrap();
        let cache = ProviderCache::new(pool, Duration::seconds(300));
        CachedProviderClient::new(Arc::new(registry), cache)
    }

    #[tokio::test]
    async fn test_second_search_is_served_from_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let client = client_with(CountingProvider {
            calls: calls.clone(),
            fail: false,
        });
        let metadata = movie_metadata("Inception", Some(2010));

        let first = client.search(&metadata).await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let second = client.search(&metadata).await.unwrap();
        assert_eq!(second.len(), 1);
        // The provider was not called again.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_equivalent_queries_share_a_cache_entry() {
        let calls = Arc::new(AtomicUsize::new(0));
        let client = client_with(CountingProvider {
            calls: calls.clone(),
            fail: false,
        });

        client
            .search(&movie_metadata("Inception", Some(2010)))
            .await
            .unwrap();
        client
            .search(&movie_metadata("INCEPTION", Some(2010)))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_all_providers_failing_is_an_error() {
        let client = client_with(CountingProvider {
            calls: Arc::new(AtomicUsize::new(0)),
            fail: true,
        });

        let err = client
            .search(&movie_metadata("Nothing", None))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Provider(_)));
    }

    #[tokio::test]
    async fn test_no_providers_yields_no_candidates() {
        let pool = init_memory_pool().unwrap();
        let cache = ProviderCache::new(pool, Duration::seconds(300));
        let client = CachedProviderClient::new(Arc::new(ProviderRegistry::new()), cache);

        let results = client.search(&movie_metadata("Anything", None)).await.unwrap();
        assert!(results.is_empty());
    }
}
