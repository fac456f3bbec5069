use std::collections::HashSet;

use scraper::{ElementRef, Selector};

use super::html::{
    element_text, field_by_labels, heading_title, posting_href, resolve_title, selector,
    CATEGORY_LABELS, CLOSING_LABELS, CONTRACT_LABELS, LOCATION_LABELS, TITLE_SELECTORS,
};
use super::{ExtractSettings, ExtractionStrategy, ParsedPage};
use crate::error::ExtractionError;
use crate::types::{optional, Candidate};

/// Labels whose presence marks a block as a posting's metadata block
const BLOCK_MARKERS: &[&str] = &["Location", "Staff grade"];

const BLOCK_GRADE_LABELS: &[&str] = &["Grade", "Staff grade"];

/// Innermost blocks that carry metadata labels and a posting anchor.
pub struct LabeledBlockStrategy {
    settings: ExtractSettings,
}

impl LabeledBlockStrategy {
    pub fn new(settings: ExtractSettings) -> Self {
        Self { settings }
    }

    fn first_posting_link(&self, block: &ElementRef, anchors: &Selector, page_url: &str) -> Option<(String, String)> {
        block.select(anchors).find_map(|anchor| {
            posting_href(&anchor, page_url, &self.settings).map(|link| (link, element_text(&anchor)))
        })
    }

    fn is_block(&self, block: &ElementRef, anchors: &Selector, page_url: &str) -> bool {
        let text = element_text(block);
        BLOCK_MARKERS.iter().any(|marker| text.contains(marker))
            && self.first_posting_link(block, anchors, page_url).is_some()
    }
}

impl ExtractionStrategy for LabeledBlockStrategy {
    fn name(&self) -> &'static str {
        "labeled_blocks"
    }

    fn extract(&self, page: &ParsedPage) -> Result<Vec<Candidate>, ExtractionError> {
        let divs = selector("div")?;
        let anchors = selector("a[href]")?;

        let mut seen = HashSet::new();
        let mut candidates = Vec::new();

        for block in page.document.select(&divs) {
            if !self.is_block(&block, &anchors, &page.url) {
                continue;
            }
            // Wrappers around several postings also qualify; keep the innermost
            if block
                .select(&divs)
                .any(|inner| inner.id() != block.id() && self.is_block(&inner, &anchors, &page.url))
            {
                continue;
            }

            let (link, anchor_text) = match self.first_posting_link(&block, &anchors, &page.url) {
                Some(found) => found,
                None => continue,
            };
            if !seen.insert(link.clone()) {
                continue;
            }

            let preferred = heading_title(&block, TITLE_SELECTORS, &self.settings)?;
            let title = match resolve_title(preferred, &anchor_text, &link, &self.settings) {
                Some(title) => title,
                None => continue,
            };

            let mut candidate = Candidate::new(title, link);
            candidate.location = optional(field_by_labels(&block, LOCATION_LABELS));
            candidate.grade = optional(field_by_labels(&block, BLOCK_GRADE_LABELS));
            candidate.contract_type = optional(field_by_labels(&block, &CONTRACT_LABELS[..2]));
            candidate.closing_date = optional(field_by_labels(&block, CLOSING_LABELS));
            candidate.category = optional(field_by_labels(&block, &CATEGORY_LABELS[..1]));
            candidates.push(candidate);
        }

        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::Page;

    #[test]
    fn test_innermost_blocks_only() {
        let page = ParsedPage::parse(&Page {
            url: "https://www.unfpa.org/jobs".to_string(),
            html: r#"
                <div id="listing">
                  <div class="entry">
                    <strong>Humanitarian Coordinator</strong>
                    <span>Location:</span><span>Cox's Bazar</span>
                    <span>Staff grade:</span><span>P-5</span>
                    <span>Category: Humanitarian</span>
                    <a href="/jobs/humanitarian-coordinator">Read more</a>
                  </div>
                  <div class="entry">
                    <span>Location: Home-based</span>
                    <a href="/jobs/graduate-fellowship">Graduate Fellowship</a>
                  </div>
                </div>
            "#
            .to_string(),
        });

        let candidates = LabeledBlockStrategy::new(ExtractSettings {
            listing_url: "https://www.unfpa.org/jobs".to_string(),
            min_title_len: 5,
        })
        .extract(&page)
        .unwrap();

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].title, "Humanitarian Coordinator");
        assert_eq!(candidates[0].location(), "Cox's Bazar");
        assert_eq!(candidates[0].grade(), "P-5");
        assert_eq!(candidates[0].category(), "Humanitarian");
        assert_eq!(candidates[1].title, "Graduate Fellowship");
        assert_eq!(candidates[1].location(), "Home-based");
        assert_eq!(candidates[1].grade(), "");
    }
}
