//! Direct schema creation from current entity definitions.
//!
//! A fresh environment with no migration history is an expected state, not an
//! error state: when no migration plan is available, the full schema is
//! created directly. Every statement in the embedded DDL is idempotent
//! (`CREATE ... IF NOT EXISTS`), so this can run against an existing database
//! without harm.

use rusqlite::Connection;

/// Full catalog DDL. Also serves as the initial migration.
pub const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Create all tables and indexes if they do not already exist.
pub fn create_all_tables(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}
