//! Core data model types for llearn.
//!
//! Rules are the declarative checks run against a learner's submission.
//! Modules, lessons, and exercises are static content; they are loaded once
//! and never mutated while a learner works through them.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ContentError, RuleError};
use crate::rules::compile_pattern;

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// The kind of check a rule performs.
///
/// Kinds outside the known set are kept as [`RuleKind::Unknown`] so that
/// content written for a newer release still loads; such rules never pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuleKind {
    /// Case-insensitive substring test.
    Contains,
    /// Negation of [`RuleKind::Contains`].
    NotContains,
    /// Minimum length in characters of the trimmed text.
    MinLength,
    /// Case-sensitive literal substring test, for structural markers.
    HasSection,
    /// Case-insensitive pattern match anywhere in the text.
    Regex,
    /// Any kind name this version does not understand.
    Unknown(String),
}

impl RuleKind {
    pub fn as_str(&self) -> &str {
        match self {
            RuleKind::Contains => "contains",
            RuleKind::NotContains => "not-contains",
            RuleKind::MinLength => "min-length",
            RuleKind::HasSection => "has-section",
            RuleKind::Regex => "regex",
            RuleKind::Unknown(name) => name,
        }
    }

    /// Whether this kind takes a numeric parameter.
    pub fn is_numeric(&self) -> bool {
        matches!(self, RuleKind::MinLength)
    }
}

impl From<&str> for RuleKind {
    fn from(s: &str) -> Self {
        match s {
            "contains" => RuleKind::Contains,
            "not-contains" => RuleKind::NotContains,
            "min-length" => RuleKind::MinLength,
            "has-section" => RuleKind::HasSection,
            "regex" => RuleKind::Regex,
            other => RuleKind::Unknown(other.to_string()),
        }
    }
}

impl From<String> for RuleKind {
    fn from(s: String) -> Self {
        RuleKind::from(s.as_str())
    }
}

impl From<RuleKind> for String {
    fn from(kind: RuleKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rule parameter: a number for `min-length`, text for everything else.
///
/// Numbers may be negative or fractional; `min-length` compares against
/// them as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    Number(f64),
    Text(String),
}

impl RuleValue {
    /// The parameter as text. Numbers render in decimal.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            RuleValue::Text(s) => Cow::Borrowed(s),
            RuleValue::Number(n) => Cow::Owned(n.to_string()),
        }
    }

    /// The parameter as a number, if it is one or is numeric text.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            RuleValue::Number(n) => Some(*n),
            RuleValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl From<&str> for RuleValue {
    fn from(s: &str) -> Self {
        RuleValue::Text(s.to_string())
    }
}

impl From<String> for RuleValue {
    fn from(s: String) -> Self {
        RuleValue::Text(s)
    }
}

impl From<f64> for RuleValue {
    fn from(n: f64) -> Self {
        RuleValue::Number(n)
    }
}

impl From<u32> for RuleValue {
    fn from(n: u32) -> Self {
        RuleValue::Number(f64::from(n))
    }
}

/// A single declarative check against learner-submitted text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// What kind of check this is.
    #[serde(alias = "type")]
    pub kind: RuleKind,
    /// The kind-specific parameter.
    #[serde(alias = "value")]
    pub parameter: RuleValue,
    /// Feedback shown to the learner next to the rule's result.
    pub message: String,
}

impl Rule {
    pub fn new(
        kind: RuleKind,
        parameter: impl Into<RuleValue>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    pub fn contains(needle: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(RuleKind::Contains, needle.into(), message)
    }

    pub fn not_contains(needle: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(RuleKind::NotContains, needle.into(), message)
    }

    pub fn min_length(chars: u32, message: impl Into<String>) -> Self {
        Self::new(RuleKind::MinLength, chars, message)
    }

    pub fn has_section(marker: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(RuleKind::HasSection, marker.into(), message)
    }

    pub fn regex(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(RuleKind::Regex, pattern.into(), message)
    }

    /// Check that the rule is well-formed.
    ///
    /// This is an authoring-time check; evaluation never calls it and treats
    /// a malformed rule as unmet instead.
    pub fn check(&self) -> Result<(), RuleError> {
        match (&self.kind, &self.parameter) {
            (RuleKind::Unknown(name), _) => Err(RuleError::UnknownKind(name.clone())),
            (RuleKind::MinLength, RuleValue::Text(_)) => Err(RuleError::ParameterMismatch {
                kind: "min-length",
                expected: "numeric",
            }),
            (RuleKind::MinLength, RuleValue::Number(_)) => Ok(()),
            (kind, RuleValue::Number(_)) => Err(RuleError::ParameterMismatch {
                kind: static_kind_name(kind),
                expected: "string",
            }),
            (RuleKind::Regex, RuleValue::Text(pattern)) => compile_pattern(pattern)
                .map(|_| ())
                .map_err(|source| RuleError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                }),
            (_, RuleValue::Text(_)) => Ok(()),
        }
    }
}

fn static_kind_name(kind: &RuleKind) -> &'static str {
    match kind {
        RuleKind::Contains => "contains",
        RuleKind::NotContains => "not-contains",
        RuleKind::MinLength => "min-length",
        RuleKind::HasSection => "has-section",
        RuleKind::Regex => "regex",
        RuleKind::Unknown(_) => "unknown",
    }
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

/// A unit of practice: instructions, starter text, rules, hints, and a
/// sample solution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Exercise {
    /// Instructions shown above the editor. May use `*em*` and `**strong**`.
    pub instructions: String,
    /// Text the editor starts with.
    #[serde(default)]
    pub starter_text: String,
    /// Hints, revealed one at a time.
    #[serde(default)]
    pub hints: Vec<String>,
    /// Rules checked on every submission, in display order.
    #[serde(default)]
    pub rules: Vec<Rule>,
    /// Sample solution, revealed after enough attempts.
    #[serde(default)]
    pub sample_solution: String,
}

/// A highlighted fragment of an example prompt or response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotation {
    pub text: String,
    pub note: String,
}

/// One prompt/response exchange used to illustrate a lesson.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptExample {
    #[serde(default)]
    pub system_prompt: Option<String>,
    pub user_message: String,
    #[serde(default)]
    pub assistant_response: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

/// A before/after example for a lesson.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LessonExample {
    pub scenario: String,
    #[serde(default)]
    pub bad: Option<PromptExample>,
    pub good: PromptExample,
}

/// Explanatory text for a lesson.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LessonContent {
    pub explanation: String,
    #[serde(default)]
    pub why_it_matters: String,
    #[serde(default)]
    pub key_principles: Vec<String>,
}

/// A lesson owns one exercise and tracks its own completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Position within the module, starting at 1.
    pub order: u32,
    #[serde(default)]
    pub content: LessonContent,
    #[serde(default)]
    pub example: Option<LessonExample>,
    pub exercise: Exercise,
}

/// An ordered collection of lessons on a shared topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    /// Position among modules.
    #[serde(default)]
    pub order: u32,
    /// Announced but not yet published.
    #[serde(default)]
    pub coming_soon: bool,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

/// Identifies a lesson by module slug and lesson slug.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LessonKey {
    pub module: String,
    pub lesson: String,
}

impl LessonKey {
    pub fn new(module: impl Into<String>, lesson: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            lesson: lesson.into(),
        }
    }
}

impl fmt::Display for LessonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.module, self.lesson)
    }
}

impl FromStr for LessonKey {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('/') {
            Some((module, lesson))
                if !module.is_empty() && !lesson.is_empty() && !lesson.contains('/') =>
            {
                Ok(LessonKey::new(module, lesson))
            }
            _ => Err(ContentError::InvalidLessonKey(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_kind_names_round_trip() {
        for name in ["contains", "not-contains", "min-length", "has-section", "regex"] {
            let kind = RuleKind::from(name);
            assert!(!matches!(kind, RuleKind::Unknown(_)), "{name} should be known");
            assert_eq!(kind.to_string(), name);
        }
        assert_eq!(
            RuleKind::from("starts-with"),
            RuleKind::Unknown("starts-with".into())
        );
    }

    #[test]
    fn rule_accepts_authoring_aliases() {
        let rule: Rule = serde_json::from_str(
            r#"{"type": "min-length", "value": 100, "message": "Add more detail."}"#,
        )
        .unwrap();
        assert_eq!(rule.kind, RuleKind::MinLength);
        assert_eq!(rule.parameter, RuleValue::Number(100.0));

        let rule: Rule = serde_json::from_str(
            r#"{"kind": "contains", "parameter": "audience", "message": "Name the audience."}"#,
        )
        .unwrap();
        assert_eq!(rule.kind, RuleKind::Contains);
        assert_eq!(rule.parameter, RuleValue::Text("audience".into()));
    }

    #[test]
    fn unknown_kind_survives_deserialization() {
        let rule: Rule =
            serde_json::from_str(r#"{"kind": "word-count", "parameter": 5, "message": "m"}"#)
                .unwrap();
        assert_eq!(rule.kind, RuleKind::Unknown("word-count".into()));
        let json = serde_json::to_string(&rule).unwrap();
        assert!(json.contains(r#""kind":"word-count""#));
    }

    #[test]
    fn rule_value_coercions() {
        assert_eq!(RuleValue::Number(42.0).as_text(), "42");
        assert_eq!(RuleValue::Number(12.5).as_text(), "12.5");
        assert_eq!(RuleValue::Text(" 12 ".into()).as_number(), Some(12.0));
        assert_eq!(RuleValue::Text("lots".into()).as_number(), None);
    }

    #[test]
    fn negative_and_fractional_lengths_deserialize() {
        for (raw, expected) in [("-1", -1.0), ("12.5", 12.5), ("0", 0.0)] {
            let rule: Rule = serde_json::from_str(&format!(
                r#"{{"kind": "min-length", "parameter": {raw}, "message": "m"}}"#
            ))
            .unwrap();
            assert_eq!(rule.parameter, RuleValue::Number(expected));
            assert!(rule.check().is_ok());
        }
    }

    #[test]
    fn check_flags_authoring_mistakes() {
        assert!(Rule::min_length(10, "m").check().is_ok());
        assert!(Rule::regex("audience|reader", "m").check().is_ok());

        let mismatched = Rule::new(RuleKind::MinLength, "ten", "m");
        assert!(matches!(
            mismatched.check(),
            Err(RuleError::ParameterMismatch { kind: "min-length", .. })
        ));

        let numeric_contains = Rule::new(RuleKind::Contains, 5u32, "m");
        assert!(matches!(
            numeric_contains.check(),
            Err(RuleError::ParameterMismatch { expected: "string", .. })
        ));

        assert!(matches!(
            Rule::regex("(unclosed", "m").check(),
            Err(RuleError::InvalidPattern { .. })
        ));
        assert!(matches!(
            Rule::new(RuleKind::from("bogus"), "x", "m").check(),
            Err(RuleError::UnknownKind(_))
        ));
    }

    #[test]
    fn lesson_key_parse() {
        let key: LessonKey = "prompt-engineering/clear-instructions".parse().unwrap();
        assert_eq!(key.module, "prompt-engineering");
        assert_eq!(key.lesson, "clear-instructions");
        assert_eq!(key.to_string(), "prompt-engineering/clear-instructions");

        assert!("no-slash".parse::<LessonKey>().is_err());
        assert!("/lesson".parse::<LessonKey>().is_err());
        assert!("a/b/c".parse::<LessonKey>().is_err());
    }
}
