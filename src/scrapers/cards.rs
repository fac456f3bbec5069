use std::collections::HashSet;

use scraper::ElementRef;

use super::html::{
    element_text, field_by_labels, heading_title, posting_href, resolve_title, selector,
    CATEGORY_LABELS, CLOSING_LABELS, CONTRACT_LABELS, GRADE_LABELS, LOCATION_LABELS,
    TITLE_SELECTORS,
};
use super::{ExtractSettings, ExtractionStrategy, ParsedPage};
use crate::error::ExtractionError;
use crate::types::{optional, Candidate};

/// Class fragments that mark a listing card container
const CARD_CLASSES: &[&str] = &["views-row", "job", "card", "item", "row"];

/// Walks from each posting anchor up to its card and reads labelled fields.
pub struct CardStrategy {
    settings: ExtractSettings,
}

impl CardStrategy {
    pub fn new(settings: ExtractSettings) -> Self {
        Self { settings }
    }
}

/// Nearest card-like ancestor: a classed div, else a table row, else a list item
fn card_container<'a>(anchor: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    let ancestors: Vec<ElementRef<'a>> = anchor.ancestors().filter_map(ElementRef::wrap).collect();

    let classed_div = ancestors.iter().find(|el| {
        el.value().name() == "div"
            && el
                .value()
                .attr("class")
                .map(|class| CARD_CLASSES.iter().any(|c| class.contains(c)))
                .unwrap_or(false)
    });

    classed_div
        .or_else(|| ancestors.iter().find(|el| el.value().name() == "tr"))
        .or_else(|| ancestors.iter().find(|el| el.value().name() == "li"))
        .copied()
}

impl ExtractionStrategy for CardStrategy {
    fn name(&self) -> &'static str {
        "cards"
    }

    fn extract(&self, page: &ParsedPage) -> Result<Vec<Candidate>, ExtractionError> {
        let anchors = selector("a[href*='/jobs/']")?;
        let mut card_titles: Vec<&str> = TITLE_SELECTORS.to_vec();
        card_titles.push("a[href*='/jobs/']");

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

            let anchor_text = element_text(&anchor);
            let mut candidate = Candidate::new(String::new(), link.clone());

            let preferred = match card_container(&anchor) {
                Some(card) => {
                    candidate.location = optional(field_by_labels(&card, LOCATION_LABELS));
                    candidate.grade = optional(field_by_labels(&card, GRADE_LABELS));
                    candidate.contract_type = optional(field_by_labels(&card, CONTRACT_LABELS));
                    candidate.closing_date = optional(field_by_labels(&card, CLOSING_LABELS));
                    candidate.category = optional(field_by_labels(&card, CATEGORY_LABELS));
                    heading_title(&card, &card_titles, &self.settings)?
                }
                None => None,
            };

            if let Some(title) = resolve_title(preferred, &anchor_text, &link, &self.settings) {
                candidate.title = title;
                candidates.push(candidate);
            }
        }

        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::Page;

    fn settings() -> ExtractSettings {
        ExtractSettings {
            listing_url: "https://www.unfpa.org/jobs".to_string(),
            min_title_len: 5,
        }
    }

    #[test]
    fn test_card_fields_extracted() {
        let page = ParsedPage::parse(&Page {
            url: "https://www.unfpa.org/jobs".to_string(),
            html: r#"
                <div class="view-content">
                  <div class="views-row">
                    <h3>Programme Specialist</h3>
                    <div>Location: Dakar, Senegal</div>
                    <div>Grade: P-3</div>
                    <div>Contract type: Fixed-term appointment</div>
                    <div>Closing date: 30 November 2026</div>
                    <a href="/jobs/programme-specialist-dakar">View</a>
                  </div>
                  <div class="views-row">
                    <h3>Aide</h3>
                    <div>Location: Amman</div>
                    <div>Grade: G-3</div>
                    <a href="/jobs/driver-amman">View</a>
                  </div>
                </div>
            "#
            .to_string(),
        });

        let candidates = CardStrategy::new(settings()).extract(&page).unwrap();
        assert_eq!(candidates.len(), 2);

        let first = &candidates[0];
        assert_eq!(first.title, "Programme Specialist");
        assert_eq!(first.link, "https://www.unfpa.org/jobs/programme-specialist-dakar");
        assert_eq!(first.location(), "Dakar, Senegal");
        assert_eq!(first.grade(), "P-3");
        assert_eq!(first.contract_type(), "Fixed-term appointment");
        assert_eq!(first.closing_date(), "30 November 2026");
        assert_eq!(first.category(), "");

        // "Aide" is too short for a title and "View" is a button label
        assert_eq!(candidates[1].title, "Driver Amman");
        assert_eq!(candidates[1].grade(), "G-3");
    }

    #[test]
    fn test_table_row_container() {
        let page = ParsedPage::parse(&Page {
            url: "https://www.unfpa.org/jobs".to_string(),
            html: r#"<table><tr><td><a href="/jobs/data-analyst">Data Analyst</a></td>
                     <td>Location: Geneva</td></tr></table>"#
                .to_string(),
        });

        let candidates = CardStrategy::new(settings()).extract(&page).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].title, "Data Analyst");
        assert_eq!(candidates[0].location(), "Geneva");
    }
}
