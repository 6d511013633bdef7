//! Trait definition and types for metadata providers.
//!
//! This module defines the [`MetadataProvider`] trait that all metadata
//! backends must implement, along with the shared data types returned by
//! provider queries. Reelkeep does not ship HTTP provider clients itself;
//! they are external collaborators plugged in through this trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single result returned from a metadata search query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Provider-specific identifier for this item (e.g. a TMDB numeric ID).
    pub id: String,
    /// Display title of the item.
    pub title: String,
    /// Release or premiere year, if known.
    pub year: Option<u16>,
    /// Short synopsis / overview text.
    pub overview: Option<String>,
    /// How confident the provider is that this result matches the query (0.0 - 1.0).
    pub confidence: f64,
    /// Name of the provider that returned this result.
    pub provider_name: String,
}

/// Async trait that all metadata providers must implement.
///
/// Each provider wraps a single external API and exposes a uniform interface
/// for searching movies and TV episodes.
///
/// Providers are expected to be cheaply cloneable or wrapped in an `Arc` so
/// they can be shared across tasks.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Short, lowercase identifier for this provider (e.g. `"tmdb"`).
    fn name(&self) -> &'static str;

    /// Returns `true` when the provider has been configured with valid
    /// credentials and is ready to serve requests.
    fn is_available(&self) -> bool;

    /// Search for movies matching `title`, optionally constrained by `year`.
    ///
    /// Results are sorted by descending `confidence`.
    async fn search_movie(
        &self,
        title: &str,
        year: Option<u16>,
    ) -> anyhow::Result<Vec<SearchResult>>;

    /// Search for TV episodes matching `title`, optionally constrained by
    /// season and episode numbers.
    ///
    /// Results are sorted by descending `confidence`.
    async fn search_tv(
        &self,
        title: &str,
        season: Option<u16>,
        episode: Option<u16>,
    ) -> anyhow::Result<Vec<SearchResult>>;
}
