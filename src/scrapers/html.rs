//! Shared helpers for the HTML extraction strategies

use reqwest::Url;
use scraper::{ElementRef, Selector};

use super::ExtractSettings;
use crate::error::ExtractionError;

pub const TITLE_SELECTORS: &[&str] = &["h2", "h3", "h4", ".title", "strong"];

pub fn selector(css: &str) -> Result<Selector, ExtractionError> {
    Selector::parse(css).map_err(|_| ExtractionError::Selector(css.to_string()))
}

/// Visible text of an element with whitespace collapsed
pub fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolve an href against the page URL
pub fn resolve_link(page_url: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with("javascript:") || href.starts_with("mailto:") {
        return None;
    }

    match Url::parse(page_url) {
        Ok(base) => base.join(href).ok().map(|url| url.to_string()),
        Err(_) => Some(href.to_string()),
    }
}

/// A link to an individual posting, not the listing or a filter/pager link
pub fn is_posting_link(link: &str, settings: &ExtractSettings) -> bool {
    if !link.contains("/jobs/") {
        return false;
    }
    if link.trim_end_matches('/') == settings.listing_url.trim_end_matches('/') {
        return false;
    }
    match link.split_once('?') {
        Some((path, _)) => path.contains("/jobs/"),
        None => true,
    }
}

/// Resolved posting link of an anchor, if it is one
pub fn posting_href(anchor: &ElementRef, page_url: &str, settings: &ExtractSettings) -> Option<String> {
    let href = anchor.value().attr("href")?;
    let link = resolve_link(page_url, href)?;
    if is_posting_link(&link, settings) {
        Some(link)
    } else {
        None
    }
}

/// Title from the last path segment: "programme-analyst" -> "Programme Analyst"
pub fn title_from_slug(link: &str) -> String {
    let path = link.split(&['?', '#'][..]).next().unwrap_or("");
    let slug = path.trim_end_matches('/').rsplit('/').next().unwrap_or("");

    slug.split(&['-', '_'][..])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Usable as a title: long enough and not a bare "View" button label
pub fn is_usable_title(text: &str, settings: &ExtractSettings) -> bool {
    text.chars().count() >= settings.min_title_len && !text.eq_ignore_ascii_case("view")
}

/// First usable heading-like text inside a container
pub fn heading_title(
    container: &ElementRef,
    selectors: &[&str],
    settings: &ExtractSettings,
) -> Result<Option<String>, ExtractionError> {
    for css in selectors {
        let sel = selector(css)?;
        for element in container.select(&sel) {
            let text = element_text(&element);
            if is_usable_title(&text, settings) {
                return Ok(Some(text));
            }
        }
    }
    Ok(None)
}

/// Title with fallbacks: preferred text, anchor text, URL slug
pub fn resolve_title(preferred: Option<String>, anchor_text: &str, link: &str, settings: &ExtractSettings) -> Option<String> {
    let title = preferred
        .filter(|t| is_usable_title(t, settings))
        .or_else(|| Some(anchor_text.to_string()).filter(|t| is_usable_title(t, settings)))
        .unwrap_or_else(|| title_from_slug(link));

    if is_usable_title(&title, settings) {
        Some(title)
    } else {
        None
    }
}

/// Value following a label such as "Location:" inside a container
///
/// The value is either the rest of the text node holding the label or,
/// when that is empty, the next text node.
pub fn field_by_label(container: &ElementRef, label: &str) -> String {
    let texts: Vec<&str> = container
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();

    for (i, text) in texts.iter().enumerate() {
        if let Some(pos) = text.find(label) {
            let rest = clean_value(&text[pos + label.len()..]);
            if !rest.is_empty() {
                return rest;
            }
            if let Some(next) = texts.get(i + 1) {
                return clean_value(next);
            }
        }
    }
    String::new()
}

/// First non-empty value among alternative labels
pub fn field_by_labels(container: &ElementRef, labels: &[&str]) -> String {
    labels
        .iter()
        .map(|label| field_by_label(container, label))
        .find(|value| !value.is_empty())
        .unwrap_or_default()
}

fn clean_value(raw: &str) -> String {
    raw.trim()
        .trim_start_matches(':')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub const LOCATION_LABELS: &[&str] = &["Location", "Duty Station"];
pub const GRADE_LABELS: &[&str] = &["Grade", "Staff grade", "Level"];
pub const CONTRACT_LABELS: &[&str] = &["Contract type", "Contract", "Type"];
pub const CLOSING_LABELS: &[&str] = &["Closing date", "Closing", "Deadline"];
pub const CATEGORY_LABELS: &[&str] = &["Category", "Job category"];
