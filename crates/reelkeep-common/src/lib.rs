//! Shared types for reelkeep.
//!
//! This crate holds the pieces every other reelkeep crate needs: the common
//! error type, typed UUID identifiers, core enums for media kinds and match
//! states, and path/extension helpers used by the scanner.

pub mod error;
pub mod ids;
pub mod paths;
pub mod types;

pub use error::{Error, Result};
pub use ids::{ItemId, LibraryId};
pub use paths::is_video_file;
pub use types::{MatchStatus, MediaKind};
