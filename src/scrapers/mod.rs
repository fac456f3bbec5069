//! Page acquisition seam
//!
//! The pipeline only consumes a [`CandidateSource`]: per page, one outcome per
//! extraction strategy. How pages are obtained ([`PageFetcher`]) and how
//! candidates are read from them ([`ExtractionStrategy`]) are interchangeable.

mod anchors;
mod blocks;
mod cards;
mod html;
mod http;
mod snapshot;

use std::collections::VecDeque;
use std::path::Path;

use anyhow::Result;
use scraper::Html;
use tracing::debug;

use crate::error::{AcquisitionError, ExtractionError};
use crate::storage::load_candidate_pages;
use crate::types::{Candidate, CandidatePage, StrategyOutcome};

pub use anchors::AnchorStrategy;
pub use blocks::LabeledBlockStrategy;
pub use cards::CardStrategy;
pub use http::HttpPages;
pub use snapshot::SnapshotPages;

/// A fetched listing page
#[derive(Debug, Clone)]
pub struct Page {
    pub url: String,
    pub html: String,
}

/// A page parsed once and shared by every strategy
pub struct ParsedPage {
    pub url: String,
    pub document: Html,
}

impl ParsedPage {
    pub fn parse(page: &Page) -> Self {
        Self {
            url: page.url.clone(),
            document: Html::parse_document(&page.html),
        }
    }
}

/// Settings shared by the HTML strategies
#[derive(Debug, Clone)]
pub struct ExtractSettings {
    /// The listing page itself, never a posting
    pub listing_url: String,
    pub min_title_len: usize,
}

/// Produces zero or more raw candidates for a page
pub trait ExtractionStrategy {
    fn name(&self) -> &'static str;

    fn extract(&self, page: &ParsedPage) -> Result<Vec<Candidate>, ExtractionError>;
}

/// Supplies listing pages one at a time
pub trait PageFetcher {
    fn next_page(&mut self) -> Result<Option<Page>, AcquisitionError>;
}

/// Supplies the per-strategy candidate lists of each page
pub trait CandidateSource {
    /// `Ok(None)` when there are no more pages
    fn next_page(&mut self) -> Result<Option<Vec<StrategyOutcome>>, AcquisitionError>;
}

/// The card, anchor and labelled-block heuristics, in that order
pub fn default_strategies(settings: &ExtractSettings) -> Vec<Box<dyn ExtractionStrategy>> {
    vec![
        Box::new(CardStrategy::new(settings.clone())),
        Box::new(AnchorStrategy::new(settings.clone())),
        Box::new(LabeledBlockStrategy::new(settings.clone())),
    ]
}

/// Runs every strategy over each page a fetcher yields
pub struct StrategyPages<F> {
    fetcher: F,
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl<F: PageFetcher> StrategyPages<F> {
    pub fn new(fetcher: F, strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { fetcher, strategies }
    }
}

impl<F: PageFetcher> CandidateSource for StrategyPages<F> {
    fn next_page(&mut self) -> Result<Option<Vec<StrategyOutcome>>, AcquisitionError> {
        let page = match self.fetcher.next_page()? {
            Some(page) => page,
            None => return Ok(None),
        };
        debug!("Extracting candidates from {}", page.url);

        let parsed = ParsedPage::parse(&page);
        let outcomes = self
            .strategies
            .iter()
            .map(|strategy| StrategyOutcome {
                strategy: strategy.name().to_string(),
                result: strategy.extract(&parsed),
            })
            .collect();

        Ok(Some(outcomes))
    }
}

/// Replays pre-extracted candidate lists
pub struct JsonCandidatePages {
    pages: VecDeque<CandidatePage>,
}

impl JsonCandidatePages {
    pub fn new(pages: Vec<CandidatePage>) -> Self {
        Self {
            pages: pages.into(),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        Ok(Self::new(load_candidate_pages(path)?))
    }
}

impl CandidateSource for JsonCandidatePages {
    fn next_page(&mut self) -> Result<Option<Vec<StrategyOutcome>>, AcquisitionError> {
        let page = match self.pages.pop_front() {
            Some(page) => page,
            None => return Ok(None),
        };

        let outcomes = page
            .lists
            .into_iter()
            .enumerate()
            .map(|(i, list)| {
                let name = if list.strategy.is_empty() {
                    format!("list-{}", i + 1)
                } else {
                    list.strategy
                };
                StrategyOutcome::ok(name, list.candidates)
            })
            .collect();

        Ok(Some(outcomes))
    }
}
