//! Persistence of match results into the catalog tables.
//!
//! The in-memory match layer is the working set; this module writes its
//! outcome down as [`MediaItem`] rows plus history events once a scan-and-
//! match run settles.

use chrono::Utc;
use reelkeep_common::{ItemId, MediaKind, Result};
use reelkeep_db::models::{Library, MediaItem};
use reelkeep_db::queries::{history, items, libraries};
use rusqlite::Connection;
use tracing::debug;

use crate::matcher::MediaMatch;

/// Counts of what a persistence pass wrote.
#[derive(Debug, Default, Clone, Copy)]
pub struct PersistSummary {
    pub written: usize,
    pub matched: usize,
    pub pending: usize,
}

/// Fetch the named library, creating it if this is the first run.
///
/// Each item carries its own media kind, so a library's kind is only the
/// default for its roots.
pub fn get_or_create_library(
    conn: &Connection,
    name: &str,
    paths: &[String],
) -> Result<Library> {
    if let Some(library) = libraries::get_library_by_name(conn, name)? {
        return Ok(library);
    }
    libraries::create_library(conn, name, MediaKind::Movie, paths)
}

/// Write every match record into the catalog, keyed by file path.
///
/// Existing rows for the same path are updated in place. Each newly matched
/// item gets a history event carrying the accepted provider candidate.
pub fn persist_matches(
    conn: &Connection,
    library: &Library,
    matches: &[MediaMatch],
) -> Result<PersistSummary> {
    let mut summary = PersistSummary::default();
    let now = Utc::now();

    for record in matches {
        let file_path = record.metadata.path.display().to_string();

        let existing = items::get_item_by_path(conn, &file_path)?;
        let (id, date_created) = match &existing {
            Some(item) => (item.id, item.date_created),
            None => (ItemId::new(), now),
        };

        let accepted = record
            .candidates
            .as_deref()
            .and_then(|c| c.first())
            .filter(|_| record.is_matched());

        let item = MediaItem {
            id,
            library_id: library.id,
            title: record.metadata.title.clone(),
            media_kind: record.metadata.kind,
            year: record.metadata.year,
            season_number: record.metadata.season,
            episode_number: record.metadata.episode,
            file_path,
            match_status: record.status,
            match_confidence: record.confidence,
            user_confirmed: record.user_confirmed,
            provider_name: accepted.map(|c| c.provider_name.clone()),
            provider_id: accepted.map(|c| c.id.clone()),
            date_created,
            date_modified: now,
        };

        items::upsert_item(conn, &item)?;
        summary.written += 1;

        if record.is_matched() {
            summary.matched += 1;
            // Only record a transition, not every re-persist of a matched
            // row.
            let already_matched = existing.map(|i| i.match_status == record.status).unwrap_or(false);
            if !already_matched {
                let detail = accepted.map(|c| format!("{}:{}", c.provider_name, c.id));
                history::record_event(conn, Some(id), "matched", detail.as_deref())?;
                debug!("Recorded match for {:?}", record.metadata.path);
            }
        } else if record.status == reelkeep_common::MatchStatus::Pending {
            summary.pending += 1;
        }
    }

    Ok(summary)
}
