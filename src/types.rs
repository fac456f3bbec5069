use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;

/// A raw, possibly incomplete posting produced by one extraction strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Candidate {
    #[serde(default)]
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub contract_type: Option<String>,
    #[serde(default)]
    pub closing_date: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl Candidate {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            ..Self::default()
        }
    }

    pub fn location(&self) -> &str {
        field(&self.location)
    }

    pub fn grade(&self) -> &str {
        field(&self.grade)
    }

    pub fn contract_type(&self) -> &str {
        field(&self.contract_type)
    }

    pub fn closing_date(&self) -> &str {
        field(&self.closing_date)
    }

    pub fn category(&self) -> &str {
        field(&self.category)
    }

    /// Number of non-empty fields; every field weighs the same.
    pub fn completeness(&self) -> usize {
        [
            self.title.as_str(),
            self.link.as_str(),
            self.location(),
            self.grade(),
            self.contract_type(),
            self.closing_date(),
            self.category(),
        ]
        .iter()
        .filter(|value| !value.trim().is_empty())
        .count()
    }
}

fn field(value: &Option<String>) -> &str {
    value.as_deref().map(str::trim).unwrap_or("")
}

/// Turn an extracted string into an optional field, blank meaning absent.
pub fn optional(value: impl Into<String>) -> Option<String> {
    let value = value.into();
    if value.trim().is_empty() {
        None
    } else {
        Some(value.trim().to_string())
    }
}

/// One published entry of the syndication feed. Never mutated once written.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub description: String,
    pub guid: String,
    #[serde(rename = "pubDate")]
    pub pub_date: String,
}

/// Ordered, link-unique collection of feed items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedState {
    pub items: Vec<FeedItem>,
}

impl FeedState {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains_link(&self, link: &str) -> bool {
        self.items.iter().any(|item| item.link == link)
    }

    pub fn get(&self, link: &str) -> Option<&FeedItem> {
        self.items.iter().find(|item| item.link == link)
    }
}

/// Which classification rule produced a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionRule {
    Consultant,
    ExcludedGrade,
    IncludedGrade,
    InternshipField,
    InternshipTitle,
    Default,
}

impl std::fmt::Display for DecisionRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DecisionRule::Consultant => "consultant",
            DecisionRule::ExcludedGrade => "excluded grade",
            DecisionRule::IncludedGrade => "included grade",
            DecisionRule::InternshipField => "internship field",
            DecisionRule::InternshipTitle => "internship title",
            DecisionRule::Default => "default",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub include: bool,
    pub rule: DecisionRule,
}

/// Result of running one extraction strategy over one page.
#[derive(Debug)]
pub struct StrategyOutcome {
    pub strategy: String,
    pub result: Result<Vec<Candidate>, ExtractionError>,
}

impl StrategyOutcome {
    pub fn ok(strategy: impl Into<String>, candidates: Vec<Candidate>) -> Self {
        Self {
            strategy: strategy.into(),
            result: Ok(candidates),
        }
    }

    pub fn failed(strategy: impl Into<String>, error: ExtractionError) -> Self {
        Self {
            strategy: strategy.into(),
            result: Err(error),
        }
    }

    /// Candidates of a successful run, empty for a failed one.
    pub fn into_candidates(self) -> Vec<Candidate> {
        self.result.unwrap_or_default()
    }
}

/// All strategy outcomes for a single page.
#[derive(Debug)]
pub struct PageCandidates {
    pub page: usize,
    pub outcomes: Vec<StrategyOutcome>,
}

/// Pre-extracted candidates for one page, as stored in a candidates file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CandidatePage {
    #[serde(default)]
    pub lists: Vec<CandidateList>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CandidateList {
    #[serde(default)]
    pub strategy: String,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// Postings included during one run, in classification order.
#[derive(Debug, Default)]
pub struct Harvest {
    pub included: Vec<Candidate>,
    pub pages: usize,
    pub aborted: Option<String>,
}

#[derive(Debug)]
pub struct RunSummary {
    pub pages: usize,
    pub included: usize,
    pub existing: usize,
    pub added: usize,
    pub total: usize,
    pub aborted: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completeness_counts_non_empty_fields() {
        let mut candidate = Candidate::new("Programme Analyst", "https://example.org/jobs/a");
        assert_eq!(candidate.completeness(), 2);

        candidate.grade = Some("P-3".to_string());
        candidate.location = Some("   ".to_string());
        assert_eq!(candidate.completeness(), 3);
    }

    #[test]
    fn test_optional_blank_is_none() {
        assert_eq!(optional("  "), None);
        assert_eq!(optional(" Nairobi "), Some("Nairobi".to_string()));
    }

    #[test]
    fn test_failed_outcome_yields_no_candidates() {
        let outcome = StrategyOutcome::failed("cards", ExtractionError::Selector("div[".to_string()));
        assert!(outcome.into_candidates().is_empty());
    }
}
