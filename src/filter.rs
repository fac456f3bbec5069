//! Eligibility Classifier
//!
//! Decides whether a posting belongs in the published feed. Rules are
//! evaluated in priority order and the first match wins:
//!
//! 1. Consultant keyword anywhere -> exclude
//! 2. Excluded grade family (G, SB, LSC + digits) or national officer grade -> exclude
//! 3. Professional/director grade -> include
//! 4. Internship/fellowship in grade, contract type or category -> include
//! 5. Internship/fellowship in title -> include
//! 6. Otherwise -> exclude

use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;

use crate::config::FilterPolicy;
use crate::normalize::{expand_grade_codes, grade_code_regex, normalize};
use crate::types::{Candidate, Decision, DecisionRule};

/// Classifier compiled from a [`FilterPolicy`]
#[derive(Debug, Clone)]
pub struct Classifier {
    policy: FilterPolicy,
    grade_code: Regex,
    excluded_family: Option<Regex>,
}

impl Classifier {
    pub fn new(policy: FilterPolicy) -> Result<Self> {
        let grade_code = grade_code_regex(&policy.grade_families)
            .context("Failed to compile grade code pattern")?;

        let excluded_family = if policy.excluded_grade_families.is_empty() {
            None
        } else {
            let families = policy
                .excluded_grade_families
                .iter()
                .map(|f| regex::escape(&normalize(f)))
                .collect::<Vec<_>>()
                .join("|");
            let pattern = Regex::new(&format!(r"\b({})-\d+\b", families))
                .context("Failed to compile excluded grade pattern")?;
            Some(pattern)
        };

        Ok(Self {
            policy,
            grade_code,
            excluded_family,
        })
    }

    pub fn policy(&self) -> &FilterPolicy {
        &self.policy
    }

    /// Include/exclude verdict for the four classification fields
    pub fn classify(&self, title: &str, grade: &str, contract_type: &str, category: &str) -> bool {
        self.decide(title, grade, contract_type, category).include
    }

    pub fn classify_candidate(&self, candidate: &Candidate) -> Decision {
        self.decide(
            &candidate.title,
            candidate.grade(),
            candidate.contract_type(),
            candidate.category(),
        )
    }

    /// Verdict together with the rule that produced it
    pub fn decide(&self, title: &str, grade: &str, contract_type: &str, category: &str) -> Decision {
        let all_fields = format!("{} {} {} {}", title, grade, contract_type, category);
        if contains_any(&normalize(&all_fields), &self.policy.consultant_keywords) {
            return exclude(DecisionRule::Consultant);
        }

        let grade_norm = expand_grade_codes(&normalize(grade), &self.grade_code);

        if self.is_excluded_grade(&grade_norm) {
            return exclude(DecisionRule::ExcludedGrade);
        }

        if contains_any(&grade_norm, &self.policy.included_grades) {
            return include(DecisionRule::IncludedGrade);
        }

        let structured = [grade, contract_type, category];
        if structured
            .iter()
            .any(|field| contains_any(&normalize(field), &self.policy.intern_keywords))
        {
            return include(DecisionRule::InternshipField);
        }

        if contains_any(&normalize(title), &self.policy.intern_keywords) {
            return include(DecisionRule::InternshipTitle);
        }

        exclude(DecisionRule::Default)
    }

    fn is_excluded_grade(&self, grade_norm: &str) -> bool {
        if let Some(ref pattern) = self.excluded_family {
            if pattern.is_match(grade_norm) {
                return true;
            }
        }
        // National officer spellings match as plain substrings
        contains_any(grade_norm, &self.policy.excluded_literal_grades)
    }
}

static DEFAULT_CLASSIFIER: LazyLock<Classifier> = LazyLock::new(|| {
    Classifier::new(FilterPolicy::default()).expect("default filter policy compiles")
});

/// Classifier for the built-in policy, compiled once
pub fn default_classifier() -> &'static Classifier {
    &DEFAULT_CLASSIFIER
}

impl Default for Classifier {
    fn default() -> Self {
        default_classifier().clone()
    }
}

/// Classify with the default policy
pub fn should_include(title: &str, grade: &str, contract_type: &str, category: &str) -> bool {
    default_classifier().classify(title, grade, contract_type, category)
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles
        .iter()
        .map(|needle| normalize(needle))
        .any(|needle| !needle.is_empty() && haystack.contains(&needle))
}

fn include(rule: DecisionRule) -> Decision {
    Decision { include: true, rule }
}

fn exclude(rule: DecisionRule) -> Decision {
    Decision { include: false, rule }
}
