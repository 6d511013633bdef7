//! Core enums for media kinds and match states.
//!
//! All enums are serialized in lowercase (snake_case for multi-word variants)
//! so they can be stored as readable TEXT columns and emitted in events.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of media a discovered file represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// A single feature film.
    Movie,
    /// A TV episode (season/episode numbers carried alongside).
    Tv,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Movie => write!(f, "movie"),
            Self::Tv => write!(f, "tv"),
        }
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(Self::Movie),
            "tv" => Ok(Self::Tv),
            other => Err(format!("Unknown media kind: {other}")),
        }
    }
}

/// Reconciliation state of a discovered file against provider metadata.
///
/// Transitions: `Pending` moves to `Matched` (high-confidence candidate or
/// user confirmation), `NoMatch` (no candidate or user rejection), or
/// `NeedsReview` (low-confidence candidate). `NeedsReview` resolves to
/// `Matched` or `NoMatch` by user decision. `Matched` and `NoMatch` are
/// terminal unless the user explicitly resets the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Awaiting provider reconciliation.
    Pending,
    /// Reconciled against a provider candidate.
    Matched,
    /// No usable provider candidate; user rejection lands here too.
    NoMatch,
    /// A candidate exists but confidence is below the review threshold.
    NeedsReview,
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Matched => write!(f, "matched"),
            Self::NoMatch => write!(f, "no_match"),
            Self::NeedsReview => write!(f, "needs_review"),
        }
    }
}

impl FromStr for MatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "matched" => Ok(Self::Matched),
            "no_match" => Ok(Self::NoMatch),
            "needs_review" => Ok(Self::NeedsReview),
            other => Err(format!("Unknown match status: {other}")),
        }
    }
}
