//! Candidate Merge Module
//!
//! Combines the candidate lists produced by several extraction strategies for
//! the same page into one list with a single record per canonical link.
//!
//! When the same link is seen more than once the record with the higher
//! completeness score wins; on a tie the record seen first is kept. Output
//! order is the order in which each link first appeared.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::normalize::canonical_link;
use crate::types::Candidate;

/// Merge statistics for one page
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MergeStats {
    pub total_input: usize,
    pub unique_output: usize,
    pub replaced: usize,
    pub dropped_without_link: usize,
}

/// Order two records for the same link by completeness
pub fn compare_completeness(new: &Candidate, existing: &Candidate) -> Ordering {
    new.completeness().cmp(&existing.completeness())
}

/// True when `new` should replace `existing`; ties keep `existing`
pub fn is_more_complete(new: &Candidate, existing: &Candidate) -> bool {
    compare_completeness(new, existing) == Ordering::Greater
}

/// Merge candidate lists, keyed by canonical link
pub fn merge<I>(candidate_lists: I) -> Vec<Candidate>
where
    I: IntoIterator<Item = Vec<Candidate>>,
{
    merge_with_stats(candidate_lists).0
}

/// Merge candidate lists and return statistics
pub fn merge_with_stats<I>(candidate_lists: I) -> (Vec<Candidate>, MergeStats)
where
    I: IntoIterator<Item = Vec<Candidate>>,
{
    let mut merged: Vec<Candidate> = Vec::new();
    let mut index_by_link: HashMap<String, usize> = HashMap::new();
    let mut stats = MergeStats::default();

    for candidate in candidate_lists.into_iter().flatten() {
        stats.total_input += 1;

        let link = canonical_link(&candidate.link);
        if link.is_empty() {
            stats.dropped_without_link += 1;
            continue;
        }

        let candidate = Candidate { link: link.clone(), ..candidate };

        match index_by_link.get(&link) {
            Some(&index) => {
                if is_more_complete(&candidate, &merged[index]) {
                    merged[index] = candidate;
                    stats.replaced += 1;
                }
            }
            None => {
                index_by_link.insert(link, merged.len());
                merged.push(candidate);
            }
        }
    }

    stats.unique_output = merged.len();
    (merged, stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(title: &str, link: &str) -> Candidate {
        Candidate::new(title, link)
    }

    #[test]
    fn test_more_complete_record_wins() {
        let sparse = candidate("Programme Specialist", "https://example.org/jobs/a");
        let mut full = candidate("Programme Specialist", "https://example.org/jobs/a");
        full.grade = Some("P-3".to_string());
        full.location = Some("Dakar".to_string());

        let merged = merge(vec![vec![sparse], vec![full.clone()]]);
        assert_eq!(merged, vec![full]);
    }

    #[test]
    fn test_tie_keeps_first_seen() {
        let mut first = candidate("Analyst", "https://example.org/jobs/a");
        first.grade = Some("P-2".to_string());
        let mut second = candidate("Analyst (duplicate)", "https://example.org/jobs/a");
        second.location = Some("Geneva".to_string());

        let (merged, stats) = merge_with_stats(vec![vec![first.clone()], vec![second]]);
        assert_eq!(merged, vec![first]);
        assert_eq!(stats.replaced, 0);
    }

    #[test]
    fn test_less_complete_later_record_ignored() {
        let mut full = candidate("Analyst", "https://example.org/jobs/a");
        full.grade = Some("P-2".to_string());
        let sparse = candidate("Analyst", "https://example.org/jobs/a");

        let merged = merge(vec![vec![full.clone(), sparse]]);
        assert_eq!(merged, vec![full]);
    }

    #[test]
    fn test_order_of_first_appearance() {
        let a = candidate("Alpha role", "https://example.org/jobs/a");
        let b = candidate("Bravo role", "https://example.org/jobs/b");
        let mut a_full = a.clone();
        a_full.category = Some("Programme".to_string());
        let c = candidate("Charlie role", "https://example.org/jobs/c");

        let merged = merge(vec![vec![a, b], vec![c, a_full]]);
        let links: Vec<&str> = merged.iter().map(|c| c.link.as_str()).collect();
        assert_eq!(
            links,
            vec![
                "https://example.org/jobs/a",
                "https://example.org/jobs/b",
                "https://example.org/jobs/c"
            ]
        );
        assert_eq!(merged[0].category(), "Programme");
    }

    #[test]
    fn test_links_are_canonicalized_before_keying() {
        let a = candidate("Alpha role", "https://EXAMPLE.org/jobs/a/");
        let mut b = candidate("Alpha role", "https://example.org/jobs/a#apply");
        b.grade = Some("P-4".to_string());

        let (merged, stats) = merge_with_stats(vec![vec![a], vec![b]]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].link, "https://example.org/jobs/a");
        assert_eq!(merged[0].grade(), "P-4");
        assert_eq!(stats.replaced, 1);
    }

    #[test]
    fn test_blank_links_dropped() {
        let (merged, stats) = merge_with_stats(vec![vec![candidate("No link here", "  ")]]);
        assert!(merged.is_empty());
        assert_eq!(stats.dropped_without_link, 1);
        assert_eq!(stats.total_input, 1);
    }

    #[test]
    fn test_empty_input() {
        assert!(merge(Vec::<Vec<Candidate>>::new()).is_empty());
        assert!(merge(vec![vec![], vec![]]).is_empty());
    }

    #[test]
    fn test_completeness_comparator() {
        let sparse = candidate("", "https://example.org/jobs/a");
        let titled = candidate("Analyst", "https://example.org/jobs/a");
        assert_eq!(compare_completeness(&titled, &sparse), Ordering::Greater);
        assert_eq!(compare_completeness(&sparse, &sparse), Ordering::Equal);
        assert!(!is_more_complete(&sparse, &titled));
    }
}
