//! Library database queries.

use chrono::{DateTime, Utc};
use reelkeep_common::{Error, LibraryId, MediaKind, Result};
use rusqlite::Connection;
use uuid::Uuid;

use crate::models::Library;

/// Create a new library.
pub fn create_library(
    conn: &Connection,
    name: &str,
    media_kind: MediaKind,
    paths: &[String],
) -> Result<Library> {
    let library = Library {
        id: LibraryId::new(),
        name: name.to_string(),
        media_kind,
        paths: paths.to_vec(),
        created_at: Utc::now(),
    };

    let paths_json =
        serde_json::to_string(&library.paths).map_err(|e| Error::internal(e.to_string()))?;

    conn.execute(
        "INSERT INTO libraries (id, name, media_kind, paths, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            library.id.to_string(),
            library.name,
            library.media_kind.to_string(),
            paths_json,
            library.created_at.to_rfc3339(),
        ],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(library)
}

fn parse_library_row(row: &rusqlite::Row) -> rusqlite::Result<Library> {
    let paths_json: String = row.get(3)?;

    Ok(Library {
        id: LibraryId::from(Uuid::parse_str(&row.get::<_, String>(0)?).unwrap()),
        name: row.get(1)?,
        media_kind: row.get::<_, String>(2)?.parse().unwrap(),
        paths: serde_json::from_str(&paths_json).unwrap_or_default(),
        created_at: DateTime::parse_from_rfc3339(&row.get::<_, String>(4)?)
            .unwrap()
            .with_timezone(&Utc),
    })
}

/// Get a library by ID.
pub fn get_library(conn: &Connection, id: LibraryId) -> Result<Option<Library>> {
    match conn.query_row(
        "SELECT id, name, media_kind, paths, created_at FROM libraries WHERE id = ?1",
        [id.to_string()],
        parse_library_row,
    ) {
        Ok(library) => Ok(Some(library)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Get a library by name.
pub fn get_library_by_name(conn: &Connection, name: &str) -> Result<Option<Library>> {
    match conn.query_row(
        "SELECT id, name, media_kind, paths, created_at FROM libraries WHERE name = ?1",
        [name],
        parse_library_row,
    ) {
        Ok(library) => Ok(Some(library)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// List all libraries.
pub fn list_libraries(conn: &Connection) -> Result<Vec<Library>> {
    let mut stmt = conn
        .prepare("SELECT id, name, media_kind, paths, created_at FROM libraries ORDER BY name")
        .map_err(|e| Error::database(e.to_string()))?;

    let libraries = stmt
        .query_map([], parse_library_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(libraries)
}

/// Delete a library and (via cascade) its items.
pub fn delete_library(conn: &Connection, id: LibraryId) -> Result<bool> {
    let affected = conn
        .execute("DELETE FROM libraries WHERE id = ?1", [id.to_string()])
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::init_memory_pool;

    #[test]
    fn test_create_and_get_library() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let library = create_library(
            &conn,
            "Movies",
            MediaKind::Movie,
            &["/media/movies".to_string()],
        )
        .unwrap();

        let fetched = get_library(&conn, library.id).unwrap().unwrap();
        assert_eq!(fetched.name, "Movies");
        assert_eq!(fetched.media_kind, MediaKind::Movie);
        assert_eq!(fetched.paths, vec!["/media/movies"]);
    }

    #[test]
    fn test_get_library_by_name() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        create_library(&conn, "Shows", MediaKind::Tv, &[]).unwrap();

        assert!(get_library_by_name(&conn, "Shows").unwrap().is_some());
        assert!(get_library_by_name(&conn, "Music").unwrap().is_none());
    }

    #[test]
    fn test_list_and_delete() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let a = create_library(&conn, "A", MediaKind::Movie, &[]).unwrap();
        create_library(&conn, "B", MediaKind::Tv, &[]).unwrap();

        assert_eq!(list_libraries(&conn).unwrap().len(), 2);
        assert!(delete_library(&conn, a.id).unwrap());
        assert_eq!(list_libraries(&conn).unwrap().len(), 1);
        assert!(!delete_library(&conn, a.id).unwrap());
    }
}
