//! Tokenizer and token classification for release names.
//!
//! Release names separate words with dots, underscores, hyphens, or spaces
//! and append quality tags after the title. The lexer splits a file stem
//! into raw tokens and classifies each one so the parser can decide where
//! the title ends.

use regex::Regex;
use std::sync::LazyLock;

static SEASON_EPISODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^S(\d{1,2})[\s._-]?E(\d{1,3})$").unwrap());

static YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(19|20)\d{2}$").unwrap());

/// Quality / source / codec vocabulary stripped from titles. Matched
/// case-insensitively against whole tokens (and against the prefix of a
/// `tag-GROUP` token).
const RELEASE_TAGS: &[&str] = &[
    // Resolutions
    "2160p", "1080p", "1080i", "720p", "576p", "480p", "4k", "uhd",
    // Sources
    "bluray", "blu-ray", "bdrip", "brrip", "remux", "webrip", "webdl", "web-dl", "web", "hdtv",
    "dvdrip", "dvd", "hdrip", "cam", "telesync",
    // Video codecs
    "x264", "x265", "h264", "h265", "hevc", "avc", "av1", "xvid", "divx",
    // Audio codecs / layouts
    "aac", "ac3", "eac3", "dts", "dts-hd", "truehd", "atmos", "flac", "mp3", "ddp5", "dd5",
    // HDR labels
    "hdr", "hdr10", "hdr10plus", "dv", "dovi", "sdr",
    // Common release flags
    "proper", "repack", "extended", "unrated", "remastered", "limited", "internal", "multi",
    "subbed", "dubbed", "complete",
];

/// How a single token participates in the grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Title material (or an unrecognized word).
    Word,
    /// Standalone 4-digit year in 1900..=2099.
    Year(u16),
    /// Season/episode marker, e.g. `S02E03` or `s2e3`.
    SeasonEpisode(u16, u16),
    /// Known quality/source/codec/flag tag (release group suffixes ride
    /// along on the same token).
    ReleaseTag,
}

/// A raw token with its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
}

/// Split a file stem into classified tokens.
///
/// Separators are dots, underscores, and whitespace. Surrounding brackets
/// and parentheses are trimmed from each token so `Title (2010)` yields a
/// year token. Hyphens are kept inside tokens (release groups are usually
/// glued to the previous tag with one, e.g. `x264-GROUP`).
pub fn tokenize(stem: &str) -> Vec<Token> {
    stem.split(['.', '_', ' ', '\t'])
        .map(|raw| raw.trim_matches(|c| matches!(c, '(' | ')' | '[' | ']')))
        .filter(|raw| !raw.is_empty() && *raw != "-")
        .map(|raw| Token {
            text: raw.to_string(),
            kind: classify(raw),
        })
        .collect()
}

fn classify(token: &str) -> TokenKind {
    if let Some(caps) = SEASON_EPISODE.captures(token) {
        // Capture groups are bounded digit runs, so parsing cannot fail.
        let season = caps[1].parse().unwrap_or(0);
        let episode = caps[2].parse().unwrap_or(0);
        return TokenKind::SeasonEpisode(season, episode);
    }

    if YEAR.is_match(token) {
        let year = token.parse().unwrap_or(0);
        return TokenKind::Year(year);
    }

    if is_release_tag(token) {
        return TokenKind::ReleaseTag;
    }

    TokenKind::Word
}

/// Whole-token tag check, also matching the prefix of `tag-GROUP` tokens.
fn is_release_tag(token: &str) -> bool {
    let lowered = token.to_lowercase();
    if RELEASE_TAGS.contains(&lowered.as_str()) {
        return true;
    }
    match lowered.split_once('-') {
        Some((prefix, _group)) => RELEASE_TAGS.contains(&prefix),
        None => false,
    }
}
