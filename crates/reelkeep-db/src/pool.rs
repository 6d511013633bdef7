//! Database connection pool management.
//!
//! Connection pooling for SQLite using r2d2. Pool initialization enables
//! foreign keys on every connection and brings the schema up to date through
//! the single migrate-or-create decision point in [`crate::migrations`].

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use reelkeep_common::{Error, Result};

use crate::migrations::{self, Migration};

/// Type alias for the database connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled database connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

fn build_pool(manager: SqliteConnectionManager, plan: Option<&[Migration]>) -> Result<DbPool> {
    let pool = Pool::builder()
        .max_size(4)
        .build(manager)
        .map_err(|e| Error::database(format!("Failed to create connection pool: {}", e)))?;

    let conn = pool
        .get()
        .map_err(|e| Error::database(format!("Failed to get connection for schema setup: {}", e)))?;

    migrations::initialize_schema(&conn, plan)
        .map_err(|e| Error::database(format!("Failed to initialize schema: {}", e)))?;

    Ok(pool)
}

/// Initialize a new database pool with the given file path.
///
/// Creates the SQLite file if it doesn't exist, enables foreign key
/// constraints on all connections, and applies the embedded migration plan.
///
/// # Example
///
/// ```no_run
/// use reelkeep_db::pool::init_pool;
///
/// let pool = init_pool("/var/lib/reelkeep/reelkeep.db").unwrap();
/// let conn = pool.get().unwrap();
/// ```
pub fn init_pool(db_path: &str) -> Result<DbPool> {
    let manager = SqliteConnectionManager::file(db_path).with_init(|conn| {
        // Enable foreign key constraints on each new connection
        conn.execute_batch("PRAGMA foreign_keys = ON;")
    });

    build_pool(manager, Some(migrations::MIGRATIONS))
}

/// Initialize an in-memory database pool for testing.
///
/// Fresh in-memory databases have no migration history by construction, so
/// this takes the direct create-tables path. The database is lost when the
/// pool is dropped.
///
/// # Example
///
/// ```
/// use reelkeep_db::pool::init_memory_pool;
///
/// let pool = init_memory_pool().unwrap();
/// let conn = pool.get().unwrap();
/// ```
pub fn init_memory_pool() -> Result<DbPool> {
    let manager = SqliteConnectionManager::memory().with_init(|conn| {
        // Enable foreign key constraints on each new connection
        conn.execute_batch("PRAGMA foreign_keys = ON;")
    });

    build_pool(manager, None)
}

/// Get a connection from the pool.
///
/// Convenience wrapper around `pool.get()` that converts the r2d2 error into
/// our common Error type.
pub fn get_conn(pool: &DbPool) -> Result<PooledConnection> {
    pool.get()
        .map_err(|e| Error::database(format!("Failed to get connection from pool: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_memory_pool() {
        let pool = init_memory_pool().unwrap();
        assert_eq!(pool.max_size(), 4);
    }

    #[test]
    fn test_get_conn() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        // Verify foreign keys are enabled
        let enabled: i32 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn test_schema_created_on_init() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='media_items'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_pool_reuses_connections() {
        let pool = init_memory_pool().unwrap();

        {
            let conn = get_conn(&pool).unwrap();
            conn.execute(
                "INSERT INTO libraries (id, name, media_kind, created_at) VALUES (?, ?, ?, ?)",
                rusqlite::params!["test-id", "Movies", "movie", "2026-01-01T00:00:00Z"],
            )
            .unwrap();
        }

        // Get a new connection and verify data is still there
        let conn = get_conn(&pool).unwrap();
        let name: String = conn
            .query_row(
                "SELECT name FROM libraries WHERE id = ?",
                ["test-id"],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(name, "Movies");
    }
}
