//! Feed Reconciliation
//!
//! Merges newly classified postings into the persisted feed. Existing items
//! are kept verbatim and in order; postings with an unseen link become new
//! items appended in classification order. Nothing is ever removed or
//! regenerated, even when a posting would now classify differently.

use chrono::{DateTime, Utc};
use std::collections::HashSet;

use crate::config::ChannelConfig;
use crate::guid::generate_id;
use crate::normalize::canonical_link;
use crate::types::{Candidate, FeedItem, FeedState};

#[derive(Debug)]
pub struct Reconciliation {
    pub state: FeedState,
    pub existing: usize,
    pub added: usize,
}

/// RFC 2822 timestamp used for item and channel pubDate
pub fn format_pub_date(now: DateTime<Utc>) -> String {
    now.to_rfc2822()
}

/// Human-readable summary of a posting for the item description
pub fn build_description(candidate: &Candidate, organisation: &str) -> String {
    let location = match candidate.location() {
        "" => "Unknown",
        location => location,
    };

    let mut desc = format!(
        "{} has a vacancy for the position of {}. Location: {}.",
        organisation, candidate.title, location
    );

    if !candidate.grade().is_empty() {
        desc.push_str(&format!(" Grade: {}.", candidate.grade()));
    }
    if !candidate.contract_type().is_empty() {
        desc.push_str(&format!(" Contract type: {}.", candidate.contract_type()));
    }
    if !candidate.closing_date().is_empty() {
        desc.push_str(&format!(" Closing date: {}.", candidate.closing_date()));
    }

    desc
}

/// Materialize a new feed item for a posting seen for the first time
pub fn new_item(candidate: &Candidate, pub_date: &str, channel: &ChannelConfig) -> FeedItem {
    FeedItem {
        title: candidate.title.clone(),
        link: candidate.link.clone(),
        description: build_description(candidate, &channel.organisation),
        guid: generate_id(&candidate.link),
        pub_date: pub_date.to_string(),
    }
}

/// Merge newly classified postings into the existing feed
///
/// All new items share the same pubDate (`now`). Existing items keep their
/// guid and pubDate; an item loaded without either gets the value it would
/// have been created with.
pub fn reconcile(
    existing: &FeedState,
    newly_classified: &[Candidate],
    now: DateTime<Utc>,
    channel: &ChannelConfig,
) -> Reconciliation {
    let pub_date = format_pub_date(now);
    let mut seen: HashSet<String> = HashSet::new();
    let mut items: Vec<FeedItem> = Vec::with_capacity(existing.len() + newly_classified.len());

    let mut stored: HashSet<&str> = HashSet::new();

    for item in &existing.items {
        if !stored.insert(item.link.as_str()) {
            continue;
        }
        // Legacy spellings of a link still block the canonical posting
        seen.insert(canonical_link(&item.link));
        let mut item = item.clone();
        if item.guid.trim().is_empty() {
            item.guid = generate_id(&item.link);
        }
        if item.pub_date.trim().is_empty() {
            item.pub_date = pub_date.clone();
        }
        items.push(item);
    }
    let existing_count = items.len();

    for candidate in newly_classified {
        if candidate.link.trim().is_empty() || !seen.insert(canonical_link(&candidate.link)) {
            continue;
        }
        items.push(new_item(candidate, &pub_date, channel));
    }

    let added = items.len() - existing_count;
    Reconciliation {
        state: FeedState { items },
        existing: existing_count,
        added,
    }
}
