//! Media item database queries.
//!
//! Items are the persisted projection of discovered files plus their match
//! bookkeeping. `file_path` is unique and serves as the natural identity for
//! upserts, matching the path-keyed identity the in-memory match layer uses.

use chrono::{DateTime, Utc};
use reelkeep_common::{Error, ItemId, LibraryId, MatchStatus, MediaKind, Result};
use rusqlite::Connection;
use uuid::Uuid;

use crate::models::MediaItem;

const ITEM_COLUMNS: &str = "id, library_id, title, media_kind, year, season_number, \
     episode_number, file_path, match_status, match_confidence, user_confirmed, \
     provider_name, provider_id, date_created, date_modified";

fn parse_item_row(row: &rusqlite::Row) -> rusqlite::Result<MediaItem> {
    Ok(MediaItem {
        id: ItemId::from(Uuid::parse_str(&row.get::<_, String>(0)?).unwrap()),
        library_id: LibraryId::from(Uuid::parse_str(&row.get::<_, String>(1)?).unwrap()),
        title: row.get(2)?,
        media_kind: row.get::<_, String>(3)?.parse().unwrap(),
        year: row.get(4)?,
        season_number: row.get(5)?,
        episode_number: row.get(6)?,
        file_path: row.get(7)?,
        match_status: row.get::<_, String>(8)?.parse().unwrap(),
        match_confidence: row.get(9)?,
        user_confirmed: row.get(10)?,
        provider_name: row.get(11)?,
        provider_id: row.get(12)?,
        date_created: DateTime::parse_from_rfc3339(&row.get::<_, String>(13)?)
            .unwrap()
            .with_timezone(&Utc),
        date_modified: DateTime::parse_from_rfc3339(&row.get::<_, String>(14)?)
            .unwrap()
            .with_timezone(&Utc),
    })
}

/// Insert or update an item, keyed on its unique file path.
pub fn upsert_item(conn: &Connection, item: &MediaItem) -> Result<()> {
    conn.execute(
        "INSERT INTO media_items (
            id, library_id, title, media_kind, year, season_number, episode_number,
            file_path, match_status, match_confidence, user_confirmed,
            provider_name, provider_id, date_created, date_modified
         ) VALUES (
            :id, :library_id, :title, :media_kind, :year, :season_number, :episode_number,
            :file_path, :match_status, :match_confidence, :user_confirmed,
            :provider_name, :provider_id, :date_created, :date_modified
         )
         ON CONFLICT(file_path) DO UPDATE SET
            library_id = :library_id,
            title = :title,
            media_kind = :media_kind,
            year = :year,
            season_number = :season_number,
            episode_number = :episode_number,
            match_status = :match_status,
            match_confidence = :match_confidence,
            user_confirmed = :user_confirmed,
            provider_name = :provider_name,
            provider_id = :provider_id,
            date_modified = :date_modified",
        rusqlite::named_params! {
            ":id": item.id.to_string(),
            ":library_id": item.library_id.to_string(),
            ":title": &item.title,
            ":media_kind": item.media_kind.to_string(),
            ":year": item.year,
            ":season_number": item.season_number,
            ":episode_number": item.episode_number,
            ":file_path": &item.file_path,
            ":match_status": item.match_status.to_string(),
            ":match_confidence": item.match_confidence,
            ":user_confirmed": item.user_confirmed,
            ":provider_name": &item.provider_name,
            ":provider_id": &item.provider_id,
            ":date_created": item.date_created.to_rfc3339(),
            ":date_modified": item.date_modified.to_rfc3339(),
        },
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(())
}

/// Get an item by ID.
pub fn get_item(conn: &Connection, id: ItemId) -> Result<Option<MediaItem>> {
    match conn.query_row(
        &format!("SELECT {ITEM_COLUMNS} FROM media_items WHERE id = ?1"),
        [id.to_string()],
        parse_item_row,
    ) {
        Ok(item) => Ok(Some(item)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Get an item by its file path.
pub fn get_item_by_path(conn: &Connection, file_path: &str) -> Result<Option<MediaItem>> {
    match conn.query_row(
        &format!("SELECT {ITEM_COLUMNS} FROM media_items WHERE file_path = ?1"),
        [file_path],
        parse_item_row,
    ) {
        Ok(item) => Ok(Some(item)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// List all items in a library, newest first.
pub fn list_items(conn: &Connection, library_id: LibraryId) -> Result<Vec<MediaItem>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {ITEM_COLUMNS} FROM media_items
             WHERE library_id = ?1 ORDER BY date_created DESC"
        ))
        .map_err(|e| Error::database(e.to_string()))?;

    let items = stmt
        .query_map([library_id.to_string()], parse_item_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(items)
}

/// Update an item's match state after a reconciliation decision.
///
/// The write is a single statement, so an item and its match fields can never
/// be observed half-updated.
pub fn set_match_result(
    conn: &Connection,
    id: ItemId,
    status: MatchStatus,
    confidence: f64,
    user_confirmed: bool,
    provider_name: Option<&str>,
    provider_id: Option<&str>,
) -> Result<bool> {
    let affected = conn
        .execute(
            "UPDATE media_items SET
                match_status = ?2,
                match_confidence = ?3,
                user_confirmed = ?4,
                provider_name = ?5,
                provider_id = ?6,
                date_modified = ?7
             WHERE id = ?1",
            rusqlite::params![
                id.to_string(),
                status.to_string(),
                confidence,
                user_confirmed,
                provider_name,
                provider_id,
                Utc::now().to_rfc3339(),
            ],
        )
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(affected > 0)
}

/// Count items in a library by match status.
pub fn count_by_status(
    conn: &Connection,
    library_id: LibraryId,
    status: MatchStatus,
) -> Result<u64> {
    conn.query_row(
        "SELECT COUNT(*) FROM media_items WHERE library_id = ?1 AND match_status = ?2",
        rusqlite::params![library_id.to_string(), status.to_string()],
        |row| row.get::<_, u64>(0),
    )
    .map_err(|e| Error::database(e.to_string()))
}

/// Delete an item.
pub fn delete_item(conn: &Connection, id: ItemId) -> Result<bool> {
    let affected = conn
        .execute("DELETE FROM media_items WHERE id = ?1", [id.to_string()])
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(affected > 0)
}
