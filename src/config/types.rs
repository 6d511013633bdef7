use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub scan: ScanSectionConfig,

    #[serde(default)]
    pub matching: MatchingConfig,

    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("reelkeep.db")
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ScanSectionConfig {
    /// Library root directories to scan.
    #[serde(default)]
    pub roots: Vec<PathBuf>,

    /// Extensions to accept (lowercase, no dot). Empty means the built-in
    /// video extension list.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Only scan files whose name contains this substring.
    #[serde(default)]
    pub name_contains: Option<String>,

    /// Follow symlinks while walking.
    #[serde(default)]
    pub follow_links: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MatchingConfig {
    /// Minimum candidate score for an automatic match. Anything below goes
    /// to review.
    #[serde(default = "default_review_threshold")]
    pub review_threshold: f64,

    /// Maximum concurrently running background units.
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            review_threshold: default_review_threshold(),
            max_workers: default_max_workers(),
        }
    }
}

fn default_review_threshold() -> f64 {
    0.7
}

fn default_max_workers() -> usize {
    4
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// How long a cached provider response stays fresh, in seconds.
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl(),
        }
    }
}

fn default_cache_ttl() -> i64 {
    // One day.
    86_400
}
