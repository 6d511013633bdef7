//! Metadata provider layer: the provider trait, the registry that aggregates
//! providers, and the cache-fronted client that match workers query.

pub mod cache;
pub mod client;
pub mod filename;
pub mod provider;
pub mod registry;

pub use cache::{CacheKey, ProviderCache};
pub use client::CachedProviderClient;
pub use filename::FilenameProvider;
pub use provider::{MetadataProvider, SearchResult};
pub use registry::ProviderRegistry;
