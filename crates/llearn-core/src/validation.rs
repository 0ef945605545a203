//! Validation engine: runs every rule of an exercise and aggregates.

use serde::{Deserialize, Serialize};

use crate::model::Rule;
use crate::rules::evaluate_rule;

/// The result of one rule against one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleResult {
    pub rule: Rule,
    pub passed: bool,
}

/// The aggregated outcome of checking one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    /// True iff every rule passed. Vacuously true with no rules.
    pub overall_passed: bool,
    /// One result per rule, in authoring order.
    pub results: Vec<RuleResult>,
}

impl ValidationOutcome {
    /// Number of rules that passed.
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    /// Results for rules that did not pass, in authoring order.
    pub fn unmet(&self) -> impl Iterator<Item = &RuleResult> {
        self.results.iter().filter(|r| !r.passed)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Check `text` against every rule.
///
/// All rules run even after a failure, so the learner sees every unmet
/// requirement at once.
pub fn validate(text: &str, rules: &[Rule]) -> ValidationOutcome {
    let results: Vec<RuleResult> = rules
        .iter()
        .map(|rule| RuleResult {
            rule: rule.clone(),
            passed: evaluate_rule(text, rule),
        })
        .collect();

    let overall_passed = results.iter().all(|r| r.passed);

    ValidationOutcome {
        overall_passed,
        results,
    }
}
