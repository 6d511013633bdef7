//! Reelkeep-DB: Database schema, migrations, and query operations
//!
//! This crate provides database functionality for reelkeep using SQLite
//! with rusqlite and r2d2 connection pooling.
//!
//! # Modules
//!
//! - `migrations` - Versioned schema migrations and the direct-create fallback
//! - `schema` - Current entity DDL, shared by migration 1 and the fallback
//! - `pool` - Connection pool management
//! - `models` - Rust models matching the database schema
//! - `queries` - Database query operations
//!
//! # Example
//!
//! ```no_run
//! use reelkeep_db::pool::{init_pool, get_conn};
//! use reelkeep_db::queries::libraries;
//! use reelkeep_common::MediaKind;
//!
//! let pool = init_pool("/var/lib/reelkeep/reelkeep.db").unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! let library = libraries::create_library(&conn, "Movies", MediaKind::Movie, &[]).unwrap();
//! println!("Created library: {}", library.name);
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
pub mod schema;
