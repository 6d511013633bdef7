//! Output types for the filename grammar parser.

use reelkeep_common::MediaKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Structured description of one discovered video file, derived entirely
/// from its path.
///
/// Created once per scanned file and never mutated afterwards; the match
/// layer wraps it and treats the path as the item's identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Path the metadata was parsed from.
    pub path: PathBuf,
    /// Cleaned title with release tags and the container extension stripped.
    pub title: String,
    /// Movie or TV, decided by the grammar (season/episode markers win over
    /// a bare year).
    pub kind: MediaKind,
    /// Release year, when a year token was found.
    pub year: Option<u16>,
    /// Season number (TV only).
    pub season: Option<u16>,
    /// Episode number (TV only).
    pub episode: Option<u16>,
    /// Raw filename tokens, retained for diagnostics.
    pub tokens: Vec<String>,
}

/// Errors produced by the parser.
///
/// Missing year/season/episode tokens are not errors; parsing fails only
/// when the path yields no usable name at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The path has no usable basename (empty stem).
    #[error("Path has no usable filename: {0}")]
    EmptyName(PathBuf),
}
