use std::collections::HashSet;

use super::html::{element_text, posting_href, resolve_title, selector};
use super::{ExtractSettings, ExtractionStrategy, ParsedPage};
use crate::error::ExtractionError;
use crate::types::Candidate;

/// Every posting anchor on the page; title from the anchor text or URL slug.
/// Yields links and titles only.
pub struct AnchorStrategy {
    settings: ExtractSettings,
}

impl AnchorStrategy {
    pub fn new(settings: ExtractSettings) -> Self {
        Self { settings }
    }
}

impl ExtractionStrategy for AnchorStrategy {
    fn name(&self) -> &'static str {
        "anchors"
    }

    fn extract(&self, page: &ParsedPage) -> Result<Vec<Candidate>, ExtractionError> {
        let anchors = selector("a[href]")?;
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();

        for anchor in page.document.select(&anchors) {
            let link = match posting_href(&anchor, &page.url, &self.settings) {
                Some(link) => link,
                None => continue,
            };
            if !seen.insert(link.clone()) {
                continue;
            }

            if let Some(title) = resolve_title(None, &element_text(&anchor), &link, &self.settings) {
                candidates.push(Candidate::new(title, link));
            }
        }

        Ok(candidates)
    }
}
