use std::collections::HashSet;
use std::time::Duration;

use reqwest::blocking::Client;
use scraper::Html;
use tracing::{debug, info};

use super::html::{element_text, resolve_link, selector};
use super::{Page, PageFetcher};
use crate::error::AcquisitionError;

/// Pager controls seen on Drupal-style listings and common themes
const NEXT_SELECTORS: &[&str] = &[
    "li.pager-next a",
    "a.pager-next",
    ".pagination .next a",
    "a[rel='next']",
    ".pager__item--next a",
    "li.next a",
    "a[title='Go to next page']",
];

const NEXT_TEXTS: &[&str] = &["next", "next ›", "next »", "›", "»", ">>"];

/// Fetches the listing page and follows its pager links
pub struct HttpPages {
    client: Client,
    next_url: Option<String>,
    visited: HashSet<String>,
    max_pages: usize,
    fetched: usize,
}

impl HttpPages {
    pub fn new(
        listing_url: &str,
        max_pages: usize,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, AcquisitionError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|source| AcquisitionError::Request {
                url: listing_url.to_string(),
                source,
            })?;

        Ok(Self {
            client,
            next_url: Some(listing_url.to_string()),
            visited: HashSet::new(),
            max_pages,
            fetched: 0,
        })
    }

    fn fetch(&self, url: &str) -> Result<String, AcquisitionError> {
        let request_error = |source| AcquisitionError::Request {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().map_err(request_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(AcquisitionError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().map_err(request_error)
    }
}

impl PageFetcher for HttpPages {
    fn next_page(&mut self) -> Result<Option<Page>, AcquisitionError> {
        if self.fetched >= self.max_pages {
            info!("Reached page limit of {}", self.max_pages);
            return Ok(None);
        }
        let url = match self.next_url.take() {
            Some(url) => url,
            None => return Ok(None),
        };
        if !self.visited.insert(url.clone()) {
            debug!("Pager loops back to {}, stopping", url);
            return Ok(None);
        }

        info!("Fetching page {}: {}", self.fetched + 1, url);
        let html = self.fetch(&url)?;
        self.fetched += 1;

        self.next_url = next_page_link(&html, &url).filter(|next| !self.visited.contains(next));

        Ok(Some(Page { url, html }))
    }
}

/// Absolute URL of the "next page" control, if the page has one
pub fn next_page_link(html: &str, page_url: &str) -> Option<String> {
    let document = Html::parse_document(html);

    for css in NEXT_SELECTORS {
        let Ok(sel) = selector(css) else { continue };
        if let Some(href) = document
            .select(&sel)
            .find_map(|a| a.value().attr("href").and_then(|href| resolve_link(page_url, href)))
        {
            return Some(href);
        }
    }

    let anchors = selector("a[href]").ok()?;
    document.select(&anchors).find_map(|anchor| {
        let text = element_text(&anchor).to_lowercase();
        if NEXT_TEXTS.contains(&text.as_str()) {
            anchor.value().attr("href").and_then(|href| resolve_link(page_url, href))
        } else {
            None
        }
    })
}
