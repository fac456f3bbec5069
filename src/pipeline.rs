//! Run Pipeline
//!
//! Provides functions to:
//! - Pull candidate lists page by page from a [`CandidateSource`]
//! - Merge, classify and accumulate included postings up to the cap
//! - Reconcile the harvest with the persisted feed and write it back

use std::collections::HashSet;
use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::ChannelConfig;
use crate::feed::reconcile;
use crate::filter::Classifier;
use crate::merge::merge_with_stats;
use crate::scrapers::CandidateSource;
use crate::storage::{load_feed, save_feed};
use crate::types::{Harvest, PageCandidates, RunSummary};

/// Collect included postings until the source runs dry, a page yields
/// nothing, or the cap is reached
pub fn harvest<S: CandidateSource + ?Sized>(source: &mut S, classifier: &Classifier) -> Harvest {
    let cap = classifier.policy().max_included;
    let mut result = Harvest::default();
    let mut included_links: HashSet<String> = HashSet::new();

    while result.included.len() < cap {
        let outcomes = match source.next_page() {
            Ok(Some(outcomes)) => outcomes,
            Ok(None) => break,
            Err(e) => {
                warn!("Page acquisition failed, keeping {} postings: {}", result.included.len(), e);
                result.aborted = Some(e.to_string());
                break;
            }
        };
        result.pages += 1;

        let page = PageCandidates {
            page: result.pages,
            outcomes,
        };
        log_outcomes(&page);

        let (merged, stats) =
            merge_with_stats(page.outcomes.into_iter().map(|outcome| outcome.into_candidates()));
        debug!(
            "Page {}: {} candidates merged into {} ({} replaced, {} without link)",
            page.page, stats.total_input, stats.unique_output, stats.replaced, stats.dropped_without_link
        );
        if merged.is_empty() {
            info!("Page {} has no postings, stopping", page.page);
            break;
        }

        let mut page_included = 0;
        for candidate in merged {
            if result.included.len() >= cap {
                break;
            }
            if included_links.contains(&candidate.link) {
                continue;
            }

            let decision = classifier.classify_candidate(&candidate);
            if decision.include {
                info!("+ INCLUDED {} [{}] ({})", candidate.title, candidate.grade(), decision.rule);
                included_links.insert(candidate.link.clone());
                result.included.push(candidate);
                page_included += 1;
            } else {
                debug!("- excluded {} [{}] ({})", candidate.title, candidate.grade(), decision.rule);
            }
        }
        info!("Page {}: {} included ({} total)", page.page, page_included, result.included.len());
    }

    if result.included.len() >= cap {
        info!("Reached cap of {} included postings", cap);
    }

    result
}

fn log_outcomes(page: &PageCandidates) {
    for outcome in &page.outcomes {
        match &outcome.result {
            Ok(candidates) => debug!(
                "Page {}: strategy {} found {} candidates",
                page.page,
                outcome.strategy,
                candidates.len()
            ),
            Err(e) => warn!("Page {}: strategy {} failed: {}", page.page, outcome.strategy, e),
        }
    }
}

/// Harvest, reconcile with the feed at `feed_path`, and save it
pub fn run<S: CandidateSource + ?Sized>(
    source: &mut S,
    classifier: &Classifier,
    feed_path: &Path,
    channel: &ChannelConfig,
    now: DateTime<Utc>,
) -> Result<RunSummary> {
    let harvest = harvest(source, classifier);

    let existing = load_feed(feed_path);
    let reconciliation = reconcile(&existing, &harvest.included, now, channel);
    save_feed(feed_path, &reconciliation.state, channel, now)?;

    info!(
        "Feed {:?}: {} existing, {} added, {} total",
        feed_path,
        reconciliation.existing,
        reconciliation.added,
        reconciliation.state.len()
    );

    Ok(RunSummary {
        pages: harvest.pages,
        included: harvest.included.len(),
        existing: reconciliation.existing,
        added: reconciliation.added,
        total: reconciliation.state.len(),
        aborted: harvest.aborted,
    })
}
