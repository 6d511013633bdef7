//! History event queries.
//!
//! Small append-only audit trail for scan runs and match-state transitions.

use chrono::{DateTime, Utc};
use reelkeep_common::{Error, ItemId, Result};
use rusqlite::Connection;
use uuid::Uuid;

use crate::models::HistoryEvent;

/// Record an event, optionally tied to an item.
pub fn record_event(
    conn: &Connection,
    item_id: Option<ItemId>,
    event: &str,
    detail: Option<&str>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO history_events (item_id, event, detail, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![
            item_id.map(|id| id.to_string()),
            event,
            detail,
            Utc::now().to_rfc3339(),
        ],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(())
}

/// List events for one item, oldest first.
pub fn list_events_for_item(conn: &Connection, item_id: ItemId) -> Result<Vec<HistoryEvent>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, item_id, event, detail, created_at
             FROM history_events WHERE item_id = ?1 ORDER BY id",
        )
        .map_err(|e| Error::database(e.to_string()))?;

    let events = stmt
        .query_map([item_id.to_string()], |row| {
            Ok(HistoryEvent {
                id: row.get(0)?,
                item_id: row
                    .get::<_, Option<String>>(1)?
                    .map(|s| ItemId::from(Uuid::parse_str(&s).unwrap())),
                event: row.get(2)?,
                detail: row.get(3)?,
                created_at: DateTime::parse_from_rfc3339(&row.get::<_, String>(4)?)
                    .unwrap()
                    .with_timezone(&Utc),
            })
        })
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(events)
}
