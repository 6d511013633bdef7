//! TTL-bounded cache of provider responses, backed by the `provider_cache`
//! table.
//!
//! Keys are the composite (provider name, query type, serialized parameters).
//! Parameter serialization is deterministic (a `BTreeMap` keeps key order
//! stable) so equivalent queries collide. A lookup hit bumps the entry's hit
//! count and last-access time; an expired entry reports a miss but stays
//! stored until [`ProviderCache::sweep_expired`] removes it.

use std::collections::BTreeMap;

use chrono::{Duration, Utc};
use reelkeep_common::{Error, Result};
use reelkeep_db::pool::DbPool;
use reelkeep_db::queries::provider_cache;
use tracing::debug;

use super::provider::SearchResult;

/// Composite cache key for one provider query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub provider: String,
    pub query_type: String,
    /// Deterministic JSON encoding of the query parameters.
    pub params: String,
}

impl CacheKey {
    /// Key for a movie title search.
    pub fn movie_search(provider: &str, title: &str, year: Option<u16>) -> Self {
        let mut params = BTreeMap::new();
        params.insert("title", title.to_lowercase());
        if let Some(year) = year {
            params.insert("year", year.to_string());
        }
        Self::new(provider, "movie_search", &params)
    }

    /// Key for a TV episode search.
    pub fn tv_search(
        provider: &str,
        title: &str,
        season: Option<u16>,
        episode: Option<u16>,
    ) -> Self {
        let mut params = BTreeMap::new();
        params.insert("title", title.to_lowercase());
        if let Some(season) = season {
            params.insert("season", season.to_string());
        }
        if let Some(episode) = episode {
            params.insert("episode", episode.to_string());
        }
        Self::new(provider, "tv_search", &params)
    }

    fn new(provider: &str, query_type: &str, params: &BTreeMap<&str, String>) -> Self {
        // BTreeMap iteration order is sorted, so the encoding is stable.
        let params = serde_json::to_string(params).unwrap_or_else(|_| "{}".to_string());
        Self {
            provider: provider.to_string(),
            query_type: query_type.to_string(),
            params,
        }
    }
}

/// Database-backed provider response cache with a fixed TTL.
#[derive(Clone)]
pub struct ProviderCache {
    pool: DbPool,
    ttl: Duration,
}

impl ProviderCache {
    pub fn new(pool: DbPool, ttl: Duration) -> Self {
        Self { pool, ttl }
    }

    /// Look up cached candidates for a key. `None` is a normal miss (absent
    /// or expired), never an error.
    pub fn get(&self, key: &CacheKey) -> Result<Option<Vec<SearchResult>>> {
        let conn = reelkeep_db::pool::get_conn(&self.pool)?;
        let entry = provider_cache::get(
            &conn,
            &key.provider,
            &key.query_type,
            &key.params,
            Utc::now(),
        )?;

        match entry {
            Some(entry) => {
                debug!(
                    provider = %key.provider,
                    query_type = %key.query_type,
                    hit_count = entry.hit_count,
                    "Provider cache hit"
                );
                let results: Vec<SearchResult> = serde_json::from_str(&entry.payload)
                    .map_err(|e| Error::internal(format!("Corrupt cache payload: {}", e)))?;
                Ok(Some(results))
            }
            None => Ok(None),
        }
    }

    /// Store candidates for a key, overwriting any previous entry.
    pub fn put(&self, key: &CacheKey, results: &[SearchResult]) -> Result<()> {
        let payload = serde_json::to_string(results)
            .map_err(|e| Error::internal(format!("Failed to encode cache payload: {}", e)))?;

        let conn = reelkeep_db::pool::get_conn(&self.pool)?;
        provider_cache::put(
            &conn,
            &key.provider,
            &key.query_type,
            &key.params,
            &payload,
            self.ttl,
            Utc::now(),
        )
    }

    /// Remove entries past their expiry. Returns the number removed.
    pub fn sweep_expired(&self) -> Result<usize> {
        let conn = reelkeep_db::pool::get_conn(&self.pool)?;
        provider_cache::sweep_expired(&conn, Utc::now())
    }
}
