//! Candidate scoring and match evaluation.
//!
//! Given parsed metadata and a set of provider candidates, produce a match
//! outcome: accept the best candidate, flag it for review, or record that
//! nothing plausible was found.

use reelkeep_common::MatchStatus;
use reelkeep_parser::VideoMetadata;

use crate::metadata::SearchResult;

/// The decision for one item after evaluating its candidates.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub status: MatchStatus,
    pub confidence: f64,
    /// The candidate the decision was based on, when there was one.
    pub best: Option<SearchResult>,
}

/// Score one candidate against the parsed metadata, in [0, 1].
///
/// Title similarity dominates, year agreement adjusts, and the provider's
/// own confidence breaks ties between equally plausible titles.
pub fn score_candidate(metadata: &VideoMetadata, candidate: &SearchResult) -> f64 {
    let title = title_similarity(&metadata.title, &candidate.title);

    let year = match (metadata.year, candidate.year) {
        (Some(a), Some(b)) if a == b => 1.0,
        // Off-by-one covers regional release-date disagreements.
        (Some(a), Some(b)) if a.abs_diff(b) == 1 => 0.7,
        (Some(_), Some(_)) => 0.0,
        // No year on either side is neutral, not a penalty.
        _ => 0.5,
    };

    let score = title * 0.6 + year * 0.25 + candidate.confidence.clamp(0.0, 1.0) * 0.15;
    score.clamp(0.0, 1.0)
}

/// Word-set overlap between two titles, case-insensitive.
fn title_similarity(a: &str, b: &str) -> f64 {
    let a_words: Vec<String> = normalize_words(a);
    let b_words: Vec<String> = normalize_words(b);
    if a_words.is_empty() || b_words.is_empty() {
        return 0.0;
    }

    let shared = a_words.iter().filter(|w| b_words.contains(w)).count();
    let total = a_words.len().max(b_words.len());
    shared as f64 / total as f64
}

fn normalize_words(s: &str) -> Vec<String> {
    s.split_whitespace()
        .map(|w| {
            w.chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect()
}

/// Evaluate candidates for one item.
///
/// No candidates yields `NoMatch` at zero confidence. Otherwise the best
/// scoring candidate is accepted when it clears `review_threshold` and
/// flagged `NeedsReview` when it does not.
pub fn evaluate(
    metadata: &VideoMetadata,
    candidates: &[SearchResult],
    review_threshold: f64,
) -> MatchOutcome {
    let best = candidates
        .iter()
        .map(|c| (score_candidate(metadata, c), c))
        .max_by(|(a, _), (b, _)| a.total_cmp(b));

    match best {
        None => MatchOutcome {
            status: MatchStatus::NoMatch,
            confidence: 0.0,
            best: None,
        },
        Some((score, candidate)) => {
            let status = if score >= review_threshold {
                MatchStatus::Matched
            } else {
                MatchStatus::NeedsReview
            };
            MatchOutcome {
                status,
                confidence: score,
                best: Some(candidate.clone()),
            }
        }
    }
}
