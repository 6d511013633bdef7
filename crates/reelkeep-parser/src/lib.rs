//! # reelkeep-parser
//!
//! Filename grammar parser for media release names.
//!
//! Given a file path, [`parse`] produces a [`VideoMetadata`] describing the
//! title, media kind, and any year / season / episode tokens found in the
//! name. Parsing is best-effort: a name with no recognizable tokens still
//! parses as a movie titled with the cleaned basename. The only failure mode
//! is a path with no usable basename at all.
//!
//! ```
//! use std::path::Path;
//! use reelkeep_common::MediaKind;
//! use reelkeep_parser::parse;
//!
//! let meta = parse(Path::new("Inception.2010.1080p.mkv")).unwrap();
//! assert_eq!(meta.title, "Inception");
//! assert_eq!(meta.kind, MediaKind::Movie);
//! assert_eq!(meta.year, Some(2010));
//! ```

pub mod lexer;
pub mod model;

pub use model::{ParseError, VideoMetadata};

use lexer::{tokenize, TokenKind};
use reelkeep_common::MediaKind;
use std::path::Path;

/// Parse a file path into structured video metadata.
///
/// The container extension is stripped via the file stem, the stem is
/// tokenized, and the title is taken as everything before the first
/// grammar marker: a season/episode token, a year token (unless the year
/// opens the name, in which case it is title material), or a known release
/// tag. A season/episode marker always wins the media-kind decision; a name
/// carrying both `S02E03` and a bare year is TV with the year reported.
///
/// # Errors
///
/// Returns [`ParseError::EmptyName`] when the path has no usable basename.
pub fn parse(path: &Path) -> Result<VideoMetadata, ParseError> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();

    let tokens = tokenize(stem);
    if tokens.is_empty() {
        return Err(ParseError::EmptyName(path.to_path_buf()));
    }

    let mut season = None;
    let mut episode = None;
    let mut year = None;
    let mut cut = tokens.len();

    for (idx, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::SeasonEpisode(s, e) => {
                if season.is_none() {
                    season = Some(s);
                    episode = Some(e);
                }
                cut = cut.min(idx);
            }
            // A year opening the name is the title ("2012"), not a year.
            TokenKind::Year(y) if idx > 0 => {
                if year.is_none() {
                    year = Some(y);
                }
                cut = cut.min(idx);
            }
            TokenKind::ReleaseTag => {
                cut = cut.min(idx);
            }
            TokenKind::Year(_) | TokenKind::Word => {}
        }
    }

    let title = tokens[..cut]
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    // Season/episode semantics win over a bare year.
    let kind = if season.is_some() {
        MediaKind::Tv
    } else {
        MediaKind::Movie
    };

    Ok(VideoMetadata {
        path: path.to_path_buf(),
        title,
        kind,
        year,
        season,
        episode,
        tokens: tokens.into_iter().map(|t| t.text).collect(),
    })
}
