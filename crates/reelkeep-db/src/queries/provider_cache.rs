//! Provider response cache queries.
//!
//! Stores TTL-bounded provider responses keyed by the composite
//! `(provider, query_type, params)` tuple. A hit is a read with an observable
//! side effect: the hit count and last-access time are bumped in the same
//! UPDATE that checks freshness, so concurrent hits on one key never lose an
//! increment. Expired rows report a miss but stay in storage until an
//! explicit sweep removes them.

use chrono::{DateTime, Utc};
use reelkeep_common::{Error, Result};
use rusqlite::Connection;

use crate::models::ProviderCacheEntry;

fn parse_cache_row(row: &rusqlite::Row) -> rusqlite::Result<ProviderCacheEntry> {
    Ok(ProviderCacheEntry {
        provider: row.get(0)?,
        query_type: row.get(1)?,
        params: row.get(2)?,
        payload: row.get(3)?,
        created_at: DateTime::parse_from_rfc3339(&row.get::<_, String>(4)?)
            .unwrap()
            .with_timezone(&Utc),
        expires_at: DateTime::parse_from_rfc3339(&row.get::<_, String>(5)?)
            .unwrap()
            .with_timezone(&Utc),
        hit_count: row.get(6)?,
        last_accessed: DateTime::parse_from_rfc3339(&row.get::<_, String>(7)?)
            .unwrap()
            .with_timezone(&Utc),
    })
}

/// Look up a fresh cache entry, recording the hit.
///
/// Returns `None` for both absent and expired rows. On a hit, the returned
/// entry already reflects the bumped `hit_count` and `last_accessed`.
pub fn get(
    conn: &Connection,
    provider: &str,
    query_type: &str,
    params: &str,
    now: DateTime<Utc>,
) -> Result<Option<ProviderCacheEntry>> {
    let hit = conn
        .execute(
            "UPDATE provider_cache
             SET hit_count = hit_count + 1, last_accessed = ?4
             WHERE provider = ?1 AND query_type = ?2 AND params = ?3
               AND expires_at >= ?4",
            rusqlite::params![provider, query_type, params, now.to_rfc3339()],
        )
        .map_err(|e| Error::database(e.to_string()))?;

    if hit == 0 {
        return Ok(None);
    }

    match conn.query_row(
        "SELECT provider, query_type, params, payload, created_at, expires_at,
                hit_count, last_accessed
         FROM provider_cache
         WHERE provider = ?1 AND query_type = ?2 AND params = ?3",
        rusqlite::params![provider, query_type, params],
        parse_cache_row,
    ) {
        Ok(entry) => Ok(Some(entry)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Read an entry without the hit side effect, regardless of freshness.
///
/// Used by maintenance and tests; normal lookups go through [`get`].
pub fn peek(
    conn: &Connection,
    provider: &str,
    query_type: &str,
    params: &str,
) -> Result<Option<ProviderCacheEntry>> {
    match conn.query_row(
        "SELECT provider, query_type, params, payload, created_at, expires_at,
                hit_count, last_accessed
         FROM provider_cache
         WHERE provider = ?1 AND query_type = ?2 AND params = ?3",
        rusqlite::params![provider, query_type, params],
        parse_cache_row,
    ) {
        Ok(entry) => Ok(Some(entry)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Insert or overwrite the entry for a key.
///
/// Resets `created_at`/`last_accessed` to `now`, `expires_at` to `now + ttl`,
/// and the hit count to zero.
pub fn put(
    conn: &Connection,
    provider: &str,
    query_type: &str,
    params: &str,
    payload: &str,
    ttl: chrono::Duration,
    now: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO provider_cache
            (provider, query_type, params, payload, created_at, expires_at,
             hit_count, last_accessed)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?5)",
        rusqlite::params![
            provider,
            query_type,
            params,
            payload,
            now.to_rfc3339(),
            (now + ttl).to_rfc3339(),
        ],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(())
}

/// Delete entries whose expiry has passed. Returns the number removed.
pub fn sweep_expired(conn: &Connection, now: DateTime<Utc>) -> Result<usize> {
    conn.execute(
        "DELETE FROM provider_cache WHERE expires_at < ?1",
        [now.to_rfc3339()],
    )
    .map_err(|e| Error::database(e.to_string()))
}

/// Total number of stored entries, fresh or stale.
pub fn count_entries(conn: &Connection) -> Result<u64> {
    conn.query_row("SELECT COUNT(*) FROM provider_cache", [], |row| {
        row.get::<_, u64>(0)
    })
    .map_err(|e| Error::database(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::init_memory_pool;
    use chrono::Duration;

    const KEY: (&str, &str, &str) = ("stub", "movie_search", r#"{"title":"inception"}"#);

    #[test]
    fn test_put_get_round_trip_with_hit_accounting() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let now = Utc::now();

        put(
            &conn,
            KEY.0,
            KEY.1,
            KEY.2,
            "[]",
            Duration::seconds(60),
            now,
        )
        .unwrap();

        let first = get(&conn, KEY.0, KEY.1, KEY.2, now).unwrap().unwrap();
        assert_eq!(first.payload, "[]");
        assert_eq!(first.hit_count, 1);

        let second = get(&conn, KEY.0, KEY.1, KEY.2, now).unwrap().unwrap();
        assert_eq!(second.hit_count, 2);
    }

    #[test]
    fn test_expired_entry_is_a_miss_but_stays_stored() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let now = Utc::now();

        put(&conn, KEY.0, KEY.1, KEY.2, "[]", Duration::seconds(60), now).unwrap();

        let later = now + Duration::seconds(61);
        assert!(get(&conn, KEY.0, KEY.1, KEY.2, later).unwrap().is_none());

        // Miss, but the row is still there until swept.
        assert!(peek(&conn, KEY.0, KEY.1, KEY.2).unwrap().is_some());
        // A miss does not count as a hit.
        assert_eq!(peek(&conn, KEY.0, KEY.1, KEY.2).unwrap().unwrap().hit_count, 0);
    }

    #[test]
    fn test_boundary_exactly_at_expiry_is_a_hit() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let now = Utc::now();

        put(&conn, KEY.0, KEY.1, KEY.2, "[]", Duration::seconds(60), now).unwrap();

        let at_expiry = now + Duration::seconds(60);
        assert!(get(&conn, KEY.0, KEY.1, KEY.2, at_expiry).unwrap().is_some());
    }

    #[test]
    fn test_put_overwrites_and_resets_hits() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let now = Utc::now();

        put(&conn, KEY.0, KEY.1, KEY.2, "old", Duration::seconds(60), now).unwrap();
        get(&conn, KEY.0, KEY.1, KEY.2, now).unwrap();

        put(&conn, KEY.0, KEY.1, KEY.2, "new", Duration::seconds(60), now).unwrap();

        let entry = get(&conn, KEY.0, KEY.1, KEY.2, now).unwrap().unwrap();
        assert_eq!(entry.payload, "new");
        assert_eq!(entry.hit_count, 1);
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let now = Utc::now();

        put(&conn, "a", "movie_search", "{}", "[]", Duration::seconds(10), now).unwrap();
        put(&conn, "b", "movie_search", "{}", "[]", Duration::seconds(120), now).unwrap();

        let swept = sweep_expired(&conn, now + Duration::seconds(60)).unwrap();
        assert_eq!(swept, 1);
        assert_eq!(count_entries(&conn).unwrap(), 1);
        assert!(peek(&conn, "b", "movie_search", "{}").unwrap().is_some());
    }

    #[test]
    fn test_distinct_params_are_distinct_keys() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let now = Utc::now();

        put(&conn, "stub", "movie_search", r#"{"title":"heat"}"#, "a", Duration::seconds(60), now)
            .unwrap();
        put(&conn, "stub", "movie_search", r#"{"title":"dark"}"#, "b", Duration::seconds(60), now)
            .unwrap();

        assert_eq!(count_entries(&conn).unwrap(), 2);
    }
}
