//! Feed Validation Module
//!
//! Provides functions to:
//! - Check item links are present and unique
//! - Check guids are 16 digits and derived from the item link
//! - Check pubDate values parse as RFC 2822

use std::collections::HashSet;

use anyhow::Result;
use chrono::DateTime;

use crate::guid::{generate_id, is_valid_id};
use crate::storage::parse_feed_items;
use crate::types::FeedItem;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FeedReport {
    pub items: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl FeedReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate a feed document as stored, repeated items included
pub fn validate_feed(content: &str) -> Result<FeedReport> {
    Ok(check_items(&parse_feed_items(content)?))
}

pub fn check_items(items: &[FeedItem]) -> FeedReport {
    let mut report = FeedReport {
        items: items.len(),
        ..FeedReport::default()
    };
    let mut links = HashSet::new();

    for (i, item) in items.iter().enumerate() {
        if item.link.is_empty() {
            report.errors.push(format!("Item {} ('{}') has no link", i + 1, item.title));
            continue;
        }
        if !links.insert(item.link.as_str()) {
            report.errors.push(format!("Duplicate item link: {}", item.link));
        }

        let expected = generate_id(&item.link);
        if !is_valid_id(&item.guid) {
            report
                .errors
                .push(format!("Item '{}' has malformed guid: '{}'", item.link, item.guid));
        } else if item.guid != expected {
            report.errors.push(format!(
                "Item '{}' guid {} does not match its link (expected {})",
                item.link, item.guid, expected
            ));
        }

        if DateTime::parse_from_rfc2822(&item.pub_date).is_err() {
            report.errors.push(format!(
                "Item '{}' has unparsable pubDate: '{}'",
                item.link, item.pub_date
            ));
        }

        if item.title.is_empty() {
            report.warnings.push(format!("Item '{}' has empty title", item.link));
        }
        if item.description.is_empty() {
            report.warnings.push(format!("Item '{}' has empty description", item.link));
        }
    }

    report
}
