//! Built-in provider that answers from the query itself.
//!
//! Reelkeep ships no network clients; external providers are registered by
//! embedders through [`ProviderRegistry`](super::ProviderRegistry). This
//! provider backs the standalone binary: it proposes the queried title as
//! its own candidate, with confidence reflecting how much structure the
//! filename carried. A movie with a year or an episode with numbering is
//! trusted; a bare title is sent to review.

use async_trait::async_trait;

use super::{MetadataProvider, SearchResult};

pub struct FilenameProvider;

const STRUCTURED_CONFIDENCE: f64 = 0.85;
const BARE_TITLE_CONFIDENCE: f64 = 0.4;

#[async_trait]
impl MetadataProvider for FilenameProvider {
    fn name(&self) -> &'static str {
        "filename"
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn search_movie(
        &self,
        title: &str,
        year: Option<u16>,
    ) -> anyhow::Result<Vec<SearchResult>> {
        if title.is_empty() {
            return Ok(Vec::new());
        }
        let confidence = if year.is_some() {
            STRUCTURED_CONFIDENCE
        } else {
            BARE_TITLE_CONFIDENCE
        };
        Ok(vec![self.candidate(title, year, confidence)])
    }

    async fn search_tv(
        &self,
        title: &str,
        season: Option<u16>,
        episode: Option<u16>,
    ) -> anyhow::Result<Vec<SearchResult>> {
        if title.is_empty() {
            return Ok(Vec::new());
        }
        let confidence = if season.is_some() && episode.is_some() {
            STRUCTURED_CONFIDENCE
        } else {
            BARE_TITLE_CONFIDENCE
        };
        Ok(vec![self.candidate(title, None, confidence)])
    }
}

impl FilenameProvider {
    fn candidate(&self, title: &str, year: Option<u16>, confidence: f64) -> SearchResult {
        SearchResult {
            id: format!("filename:{}", title.to_lowercase().replace(' ', "-")),
            title: title.to_string(),
            year,
            overview: None,
            confidence,
            provider_name: "filename".to_string(),
        }
    }
}
