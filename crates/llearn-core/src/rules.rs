//! Rule evaluation.
//!
//! [`evaluate_rule`] is a pure function of the submission text and a rule.
//! It never fails: a rule that cannot be evaluated (unknown kind, malformed
//! pattern, non-numeric length) counts as unmet.

use regex::{Regex, RegexBuilder};

use crate::model::{Rule, RuleKind};

/// Compile a rule pattern the way the evaluator does: case-insensitive.
pub fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// Evaluate one rule against learner text.
///
/// Leading and trailing whitespace is trimmed before any check runs.
pub fn evaluate_rule(text: &str, rule: &Rule) -> bool {
    let text = text.trim();

    match &rule.kind {
        RuleKind::Contains => contains_ignore_case(text, &rule.parameter.as_text()),
        RuleKind::NotContains => !contains_ignore_case(text, &rule.parameter.as_text()),
        RuleKind::MinLength => match rule.parameter.as_number() {
            Some(min) => utf16_len(text) as f64 >= min,
            None => {
                tracing::debug!(
                    "min-length parameter '{}' is not a number, treating as unmet",
                    rule.parameter.as_text()
                );
                false
            }
        },
        RuleKind::HasSection => text.contains(rule.parameter.as_text().as_ref()),
        RuleKind::Regex => {
            let pattern = rule.parameter.as_text();
            match compile_pattern(&pattern) {
                Ok(re) => re.is_match(text),
                Err(e) => {
                    tracing::debug!("malformed pattern '{pattern}', treating as unmet: {e}");
                    false
                }
            }
        }
        RuleKind::Unknown(kind) => {
            tracing::debug!("unknown rule kind '{kind}', treating as unmet");
            false
        }
    }
}

/// Length in UTF-16 code units, the unit lesson lengths are authored in.
/// Characters outside the Basic Multilingual Plane count twice.
fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RuleValue;

    #[test]
    fn contains_is_case_insensitive() {
        let rule = Rule::contains("World", "mention the world");
        assert!(evaluate_rule("hello world", &rule));
        assert!(evaluate_rule("HELLO WORLD", &rule));
        assert!(!evaluate_rule("hello there", &rule));
    }

    #[test]
    fn not_contains_negates_contains() {
        let texts = ["", "hello world", "Hello World", "nothing here", "  world  "];
        for needle in ["world", "WORLD", "", "zzz"] {
            let has = Rule::contains(needle, "m");
            let lacks = Rule::not_contains(needle, "m");
            for text in texts {
                assert_eq!(
                    evaluate_rule(text, &lacks),
                    !evaluate_rule(text, &has),
                    "needle={needle:?} text={text:?}"
                );
            }
        }
    }

    #[test]
    fn min_length_counts_trimmed_characters() {
        let rule = Rule::min_length(10, "too short");
        assert!(!evaluate_rule("short", &rule));
        assert!(!evaluate_rule("   short      ", &rule));
        assert!(evaluate_rule("exactly 10", &rule));
        // Characters in the Basic Multilingual Plane count once each.
        assert!(evaluate_rule("éééééééééé", &rule));
        assert!(!evaluate_rule("ééééééééé", &rule));
    }

    #[test]
    fn min_length_counts_utf16_units() {
        let rule = Rule::min_length(10, "m");
        // Each emoji is a surrogate pair.
        assert!(evaluate_rule("😀😀😀😀😀", &rule));
        assert!(!evaluate_rule("😀😀😀😀", &rule));
        assert!(evaluate_rule("😀😀😀😀ab", &rule));
    }

    #[test]
    fn min_length_compares_fractional_and_negative_bounds() {
        let fractional = Rule::new(RuleKind::MinLength, 4.5, "m");
        assert!(!evaluate_rule("abcd", &fractional));
        assert!(evaluate_rule("abcde", &fractional));

        let negative = Rule::new(RuleKind::MinLength, -1.0, "m");
        assert!(evaluate_rule("", &negative));
        assert!(evaluate_rule("   ", &negative));
    }

    #[test]
    fn min_length_is_monotonic_under_extension() {
        let rule = Rule::min_length(8, "m");
        let mut text = String::from("abcdefgh");
        assert!(evaluate_rule(&text, &rule));
        for c in "ijklmnop".chars() {
            text.push(c);
            assert!(evaluate_rule(&text, &rule));
        }
    }

    #[test]
    fn min_length_with_text_parameter() {
        let numeric = Rule::new(RuleKind::MinLength, "5", "m");
        assert!(evaluate_rule("hello", &numeric));

        let garbage = Rule::new(RuleKind::MinLength, "five", "m");
        assert!(!evaluate_rule("hello world", &garbage));
    }

    #[test]
    fn has_section_is_case_sensitive() {
        let rule = Rule::has_section("<review>", "wrap the review");
        assert!(evaluate_rule("Look at this:\n<review>great</review>", &rule));
        assert!(!evaluate_rule("Look at this:\n<REVIEW>great</REVIEW>", &rule));

        let contains = Rule::contains("<review>", "m");
        assert!(evaluate_rule("<REVIEW>great</REVIEW>", &contains));
    }

    #[test]
    fn regex_is_case_insensitive_and_unanchored() {
        let rule = Rule::regex("audience|reader|stakeholder", "name the audience");
        assert!(evaluate_rule("Write this for EXECUTIVE Stakeholders.", &rule));
        assert!(!evaluate_rule("Write something.", &rule));

        let digits = Rule::regex(r"\b\d+\b", "add a number");
        assert!(evaluate_rule("keep it under 200 words", &digits));
        assert!(!evaluate_rule("keep it short", &digits));
    }

    #[test]
    fn malformed_regex_is_unmet() {
        let rule = Rule::regex("(unclosed|group", "m");
        assert!(!evaluate_rule("unclosed group", &rule));

        // Look-around is outside the supported dialect.
        let lookahead = Rule::regex("foo(?=bar)", "m");
        assert!(!evaluate_rule("foobar", &lookahead));
    }

    #[test]
    fn unknown_kind_is_unmet() {
        let rule = Rule::new(RuleKind::from("word-count"), 1u32, "m");
        assert!(!evaluate_rule("any text at all", &rule));
    }

    #[test]
    fn numeric_parameter_on_text_kind_uses_decimal_form() {
        let rule = Rule {
            kind: RuleKind::Contains,
            parameter: RuleValue::Number(200.0),
            message: "m".into(),
        };
        assert!(evaluate_rule("under 200 words", &rule));
    }

    #[test]
    fn evaluation_is_deterministic() {
        let rules = [
            Rule::contains("foo", "m"),
            Rule::regex("fo+", "m"),
            Rule::min_length(3, "m"),
            Rule::regex("[", "m"),
        ];
        for rule in &rules {
            let first = evaluate_rule(" foo bar ", rule);
            for _ in 0..5 {
                assert_eq!(evaluate_rule(" foo bar ", rule), first);
            }
        }
    }
}
