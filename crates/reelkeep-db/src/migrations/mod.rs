//! Database migrations module
//!
//! Handles SQLite schema migrations for reelkeep. Migrations are embedded in
//! the binary and executed in order. When no migration plan is available at
//! all, [`initialize_schema`] falls back to creating all tables directly from
//! the current entity definitions. That fallback is a first-class path for
//! fresh environments, selected at one explicit decision point rather than by
//! catching a broad failure class.

use rusqlite::{Connection, Result};
use thiserror::Error;

use crate::schema;

/// Migration error types.
#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// No migration plan is available. Callers fall back to direct schema
    /// creation; this is never fatal.
    #[error("No migration plan configured")]
    ConfigMissing,

    /// A migration conflicted with the existing schema or data. Fatal:
    /// falling back to direct creation here would risk silent data loss.
    #[error("Migration {0} failed: {1}")]
    Data(usize, String),
}

/// A single migration with its SQL content.
pub struct Migration {
    pub version: usize,
    pub name: &'static str,
    pub sql: &'static str,
}

/// All available migrations. The initial migration is the full idempotent
/// schema, so it can also run safely on a database created by the direct
/// fallback.
pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial",
    sql: schema::SCHEMA_SQL,
}];

/// How the schema was brought up to date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaSetup {
    /// Versioned migrations were applied (count of newly applied ones).
    Migrated(usize),
    /// No plan was available; tables were created directly.
    CreatedDirect,
}

/// Bring the schema up to date, using the migration plan when one exists.
///
/// This is the single decision point between the two schema strategies:
/// a present plan is applied as versioned migrations, an absent plan means
/// direct table creation. Data-integrity failures inside a migration surface
/// as [`MigrationError::Data`] and are never papered over by the fallback.
pub fn initialize_schema(
    conn: &Connection,
    plan: Option<&[Migration]>,
) -> Result<SchemaSetup, MigrationError> {
    match plan {
        Some(migrations) => run_migrations(conn, migrations).map(SchemaSetup::Migrated),
        None => {
            schema::create_all_tables(conn)?;
            Ok(SchemaSetup::CreatedDirect)
        }
    }
}

/// Initialize the migrations table if it doesn't exist.
fn init_migrations_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;
    Ok(())
}

/// Get the current schema version.
fn get_current_version(conn: &Connection) -> Result<usize> {
    match conn.query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
        row.get::<_, Option<usize>>(0)
    }) {
        Ok(Some(version)) => Ok(version),
        Ok(None) => Ok(0),
        Err(e) => Err(e),
    }
}

/// Apply a single migration.
fn apply_migration(conn: &Connection, migration: &Migration) -> Result<(), MigrationError> {
    conn.execute_batch(migration.sql)
        .map_err(|e| MigrationError::Data(migration.version, e.to_string()))?;

    conn.execute(
        "INSERT INTO schema_migrations (version, name) VALUES (?, ?)",
        rusqlite::params![migration.version, migration.name],
    )
    .map_err(|e| MigrationError::Data(migration.version, e.to_string()))?;

    Ok(())
}

/// Run all pending migrations from the given plan.
///
/// Creates the `schema_migrations` bookkeeping table if needed, determines
/// which migrations are pending, and applies each in its own transaction.
///
/// Returns the number of migrations applied.
pub fn run_migrations(conn: &Connection, plan: &[Migration]) -> Result<usize, MigrationError> {
    conn.execute("PRAGMA foreign_keys = ON", [])
        .map_err(MigrationError::Database)?;

    init_migrations_table(conn).map_err(MigrationError::Database)?;

    let current_version = get_current_version(conn).map_err(MigrationError::Database)?;

    let pending: Vec<_> = plan
        .iter()
        .filter(|m| m.version > current_version)
        .collect();

    if pending.is_empty() {
        return Ok(0);
    }

    let mut applied_count = 0;
    for migration in pending {
        let tx = conn
            .unchecked_transaction()
            .map_err(MigrationError::Database)?;

        apply_migration(&tx, migration)?;

        tx.commit()
            .map_err(|e| MigrationError::Data(migration.version, e.to_string()))?;

        applied_count += 1;
    }

    Ok(applied_count)
}

/// Get the current schema version without applying migrations.
pub fn current_version(conn: &Connection) -> Result<usize, MigrationError> {
    init_migrations_table(conn).map_err(MigrationError::Database)?;

    get_current_version(conn).map_err(MigrationError::Database)
}

/// Get the latest available migration version.
pub fn latest_version() -> usize {
    MIGRATIONS.last().map(|m| m.version).unwrap_or(0)
}
