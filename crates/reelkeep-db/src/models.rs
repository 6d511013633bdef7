//! Database model structs.
//!
//! These are the persisted projections of discovery/matching results. The
//! matching core works on in-memory records; these structs mirror the rows
//! the catalog tables store.

use chrono::{DateTime, Utc};
use reelkeep_common::{ItemId, LibraryId, MatchStatus, MediaKind};
use serde::{Deserialize, Serialize};

/// A media library: a named set of root paths with one media kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Library {
    pub id: LibraryId,
    pub name: String,
    pub media_kind: MediaKind,
    /// Root paths scanned for this library.
    pub paths: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// One catalog item: a discovered file plus its reconciliation bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: ItemId,
    pub library_id: LibraryId,
    pub title: String,
    pub media_kind: MediaKind,
    pub year: Option<u16>,
    pub season_number: Option<u16>,
    pub episode_number: Option<u16>,
    /// Absolute path of the underlying file; unique, and the identity the
    /// match layer keys on.
    pub file_path: String,
    pub match_status: MatchStatus,
    pub match_confidence: f64,
    pub user_confirmed: bool,
    /// Provider that supplied the accepted candidate, if matched.
    pub provider_name: Option<String>,
    /// Provider-side identifier of the accepted candidate, if matched.
    pub provider_id: Option<String>,
    pub date_created: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
}

/// One cached provider response row.
///
/// The composite `(provider, query_type, params)` key is unique. `params` is
/// a deterministic serialization of the query parameters so equivalent
/// queries collide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderCacheEntry {
    pub provider: String,
    pub query_type: String,
    pub params: String,
    /// Serialized response payload (JSON).
    pub payload: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub hit_count: u32,
    pub last_accessed: DateTime<Utc>,
}

impl ProviderCacheEntry {
    /// Whether the entry is still eligible for reuse at `now`.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now <= self.expires_at
    }
}

/// An audit event recorded on match-state transitions and scan runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEvent {
    pub id: i64,
    pub item_id: Option<ItemId>,
    pub event: String,
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_cache_entry_freshness() {
        let now = Utc::now();
        let entry = ProviderCacheEntry {
            provider: "stub".into(),
            query_type: "movie_search".into(),
            params: "{}".into(),
            payload: "[]".into(),
            created_at: now,
            expires_at: now + Duration::seconds(60),
            hit_count: 0,
            last_accessed: now,
        };

        assert!(entry.is_fresh(now));
        assert!(entry.is_fresh(now + Duration::seconds(60)));
        assert!(!entry.is_fresh(now + Duration::seconds(61)));
    }
}
