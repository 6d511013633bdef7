//! Match-state tracking for discovered files.
//!
//! The [`MatchManager`] owns the reconciliation record for every discovered
//! item. Records are keyed by the underlying file path; updates are
//! last-write-wins with no merge or version check, so callers racing on the
//! same item must serialize themselves.

pub mod engine;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use reelkeep_common::MatchStatus;
use reelkeep_parser::VideoMetadata;
use serde::{Deserialize, Serialize};

use crate::metadata::SearchResult;

/// Mutable reconciliation record for one discovered file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaMatch {
    /// The parsed metadata this record wraps. Its path is the record's
    /// identity.
    pub metadata: VideoMetadata,
    pub status: MatchStatus,
    /// Confidence of the accepted/best candidate, in [0, 1].
    pub confidence: f64,
    /// Whether a human confirmed this match.
    pub user_confirmed: bool,
    /// Provider candidates from the last lookup, if any were fetched.
    pub candidates: Option<Vec<SearchResult>>,
}

impl MediaMatch {
    /// Fresh record for newly discovered metadata: pending, zero confidence,
    /// no candidates.
    pub fn new(metadata: VideoMetadata) -> Self {
        Self {
            metadata,
            status: MatchStatus::Pending,
            confidence: 0.0,
            user_confirmed: false,
            candidates: None,
        }
    }

    /// The file path that identifies this record.
    pub fn path(&self) -> &Path {
        &self.metadata.path
    }

    /// Holds iff the status is `Matched`.
    pub fn is_matched(&self) -> bool {
        self.status == MatchStatus::Matched
    }

    /// Whether this record still needs a human decision: pending without
    /// user confirmation, or confidence below the review threshold.
    pub fn needs_review(&self, threshold: f64) -> bool {
        (self.status == MatchStatus::Pending && !self.user_confirmed)
            || self.confidence < threshold
    }
}

#[derive(Default)]
struct MatchState {
    matches: Vec<MediaMatch>,
    by_path: HashMap<PathBuf, usize>,
}

/// Owner of the full ordered collection of [`MediaMatch`] records.
///
/// Shared between the scan flow (which adds records), match workers (which
/// apply provider outcomes), and the interactive user (who confirms or
/// rejects). All access goes through one mutex.
#[derive(Default)]
pub struct MatchManager {
    state: Mutex<MatchState>,
}

impl MatchManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pending record for each item, preserving input order.
    ///
    /// An item whose path is already tracked resets the existing record to a
    /// fresh pending one in place, keeping its original position.
    pub fn add_metadata(&self, items: Vec<VideoMetadata>) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        for metadata in items {
            let record = MediaMatch::new(metadata);
            match state.by_path.get(record.path()) {
                Some(&idx) => state.matches[idx] = record,
                None => {
                    let idx = state.matches.len();
                    state.by_path.insert(record.path().to_path_buf(), idx);
                    state.matches.push(record);
                }
            }
        }
    }

    /// Full current collection, in insertion order.
    pub fn get_matches(&self) -> Vec<MediaMatch> {
        self.state.lock().matches.clone()
    }

    /// Look up one record by file path.
    pub fn get_match(&self, path: &Path) -> Option<MediaMatch> {
        let state = self.state.lock();
        state.by_path.get(path).map(|&idx| state.matches[idx].clone())
    }

    /// Replace the stored record for the same metadata identity (path) with
    /// the given one. Last write wins: no merge, no version check. A record
    /// for an unknown path is silently dropped.
    pub fn update_match(&self, updated: MediaMatch) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        if let Some(&idx) = state.by_path.get(updated.path()) {
            state.matches[idx] = updated;
        }
    }

    /// Number of records currently pending, recomputed from current state.
    pub fn get_pending_count(&self) -> usize {
        self.count_status(MatchStatus::Pending)
    }

    /// Number of records currently matched, recomputed from current state.
    pub fn get_matched_count(&self) -> usize {
        self.count_status(MatchStatus::Matched)
    }

    fn count_status(&self, status: MatchStatus) -> usize {
        self.state
            .lock()
            .matches
            .iter()
            .filter(|m| m.status == status)
            .count()
    }

    /// Total number of tracked records.
    pub fn len(&self) -> usize {
        self.state.lock().matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().matches.is_empty()
    }

    /// Drop the record for a removed library item.
    pub fn remove(&self, path: &Path) -> Option<MediaMatch> {
        let mut state = self.state.lock();
        let idx = state.by_path.remove(path)?;
        let removed = state.matches.remove(idx);
        // Positions after the removed record shift down by one.
        for stored in state.by_path.values_mut() {
            if *stored > idx {
                *stored -= 1;
            }
        }
        Some(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelkeep_common::MediaKind;
    use std::path::PathBuf;

    fn metadata(name: &str) -> VideoMetadata {
        VideoMetadata {
            path: PathBuf::from(format!("/media/{name}.mkv")),
            title: name.to_string(),
            kind: MediaKind::Movie,
            year: None,
            season: None,
            episode: None,
            tokens: vec![name.to_string()],
        }
    }

    #[test]
    fn test_add_metadata_creates_pending_records_in_order() {
        let manager = MatchManager::new();
        manager.add_metadata(vec![metadata("a"), metadata("b"), metadata("c")]);

        let matches = manager.get_matches();
        assert_eq!(matches.len(), 3);
        let titles: Vec<_> = matches.iter().map(|m| m.metadata.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);

        for m in &matches {
            assert_eq!(m.status, MatchStatus::Pending);
            assert_eq!(m.confidence, 0.0);
            assert!(!m.user_confirmed);
            assert!(m.candidates.is_none());
        }
    }

    #[test]
    fn test_update_match_replaces_by_path_identity() {
        let manager = MatchManager::new();
        manager.add_metadata(vec![metadata("a"), metadata("b")]);

        let mut record = manager.get_match(Path::new("/media/a.mkv")).unwrap();
        record.status = MatchStatus::Matched;
        record.confidence = 0.91;
        manager.update_match(record);

        let fetched = manager.get_match(Path::new("/media/a.mkv")).unwrap();
        assert!(fetched.is_matched());
        assert!((fetched.confidence - 0.91).abs() < f64::EPSILON);

        // The other record is untouched.
        let other = manager.get_match(Path::new("/media/b.mkv")).unwrap();
        assert_eq!(other.status, MatchStatus::Pending);
    }

    #[test]
    fn test_update_match_unknown_path_is_a_noop() {
        let manager = MatchManager::new();
        manager.add_metadata(vec![metadata("a")]);

        let stray = MediaMatch::new(metadata("ghost"));
        manager.update_match(stray);

        assert_eq!(manager.len(), 1);
        assert!(manager.get_match(Path::new("/media/ghost.mkv")).is_none());
    }

    #[test]
    fn test_counts_track_updates() {
        let manager = MatchManager::new();
        manager.add_metadata(vec![metadata("a"), metadata("b")]);

        assert_eq!(manager.get_pending_count(), 2);
        assert_eq!(manager.get_matched_count(), 0);

        let mut record = manager.get_match(Path::new("/media/a.mkv")).unwrap();
        record.status = MatchStatus::Matched;
        manager.update_match(record);

        assert_eq!(manager.get_pending_count(), 1);
        assert_eq!(manager.get_matched_count(), 1);
    }

    #[test]
    fn test_needs_review_semantics() {
        let mut record = MediaMatch::new(metadata("a"));
        // Pending and unconfirmed.
        assert!(record.needs_review(0.7));

        record.status = MatchStatus::Matched;
        record.confidence = 0.9;
        assert!(!record.needs_review(0.7));

        // Matched but below the threshold still wants review.
        record.confidence = 0.5;
        assert!(record.needs_review(0.7));

        // Pending but user-confirmed and above threshold does not.
        record.status = MatchStatus::Pending;
        record.user_confirmed = true;
        record.confidence = 0.9;
        assert!(!record.needs_review(0.7));
    }

    #[test]
    fn test_re_adding_a_path_resets_in_place() {
        let manager = MatchManager::new();
        manager.add_metadata(vec![metadata("a"), metadata("b")]);

        let mut record = manager.get_match(Path::new("/media/a.mkv")).unwrap();
        record.status = MatchStatus::Matched;
        manager.update_match(record);

        manager.add_metadata(vec![metadata("a")]);

        let matches = manager.get_matches();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].metadata.title, "a");
        assert_eq!(matches[0].status, MatchStatus::Pending);
    }

    #[test]
    fn test_remove_keeps_index_consistent() {
        let manager = MatchManager::new();
        manager.add_metadata(vec![metadata("a"), metadata("b"), metadata("c")]);

        assert!(manager.remove(Path::new("/media/b.mkv")).is_some());
        assert_eq!(manager.len(), 2);

        let c = manager.get_match(Path::new("/media/c.mkv")).unwrap();
        assert_eq!(c.metadata.title, "c");
    }
}
