//! Pattern rules for header field extraction.
//!
//! A rule is data: the field it fills, whether it keeps the first match or
//! every match, the compiled expression, and the capture group holding the
//! value. [`patterns::STANDARD_LIBRARY`] holds the default table.

pub mod patterns;

pub use patterns::STANDARD_LIBRARY;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{InvexError, Result};
use crate::models::HeaderField;

/// How many matches a rule collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Only the leftmost match.
    First,
    /// Every non-overlapping match, in document order.
    All,
}

/// Outcome of applying a single rule. Values are the raw capture text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleMatch {
    NoMatch,
    First(String),
    All(Vec<String>),
}

impl RuleMatch {
    pub fn is_match(&self) -> bool {
        !matches!(self, RuleMatch::NoMatch)
    }
}

/// A named extraction rule.
#[derive(Debug, Clone)]
pub struct PatternRule {
    pub field: HeaderField,
    pub mode: MatchMode,
    pub regex: Regex,
    /// Capture group holding the value.
    pub group: usize,
}

impl PatternRule {
    /// Compile a rule. Fails when the pattern is invalid or has no
    /// capture group `group`.
    pub fn new(field: HeaderField, mode: MatchMode, pattern: &str, group: usize) -> Result<Self> {
        let regex = Regex::new(pattern)?;
        if group >= regex.captures_len() {
            return Err(InvexError::Config(format!(
                "rule for {} reads group {} but the pattern has {} groups",
                field,
                group,
                regex.captures_len() - 1
            )));
        }
        Ok(Self {
            field,
            mode,
            regex,
            group,
        })
    }

    /// Apply the rule to `text`. Matches whose designated group did not
    /// participate are skipped.
    pub fn apply(&self, text: &str) -> RuleMatch {
        match self.mode {
            MatchMode::First => self
                .regex
                .captures(text)
                .and_then(|caps| caps.get(self.group))
                .map(|m| RuleMatch::First(m.as_str().to_string()))
                .unwrap_or(RuleMatch::NoMatch),
            MatchMode::All => {
                let values: Vec<String> = self
                    .regex
                    .captures_iter(text)
                    .filter_map(|caps| caps.get(self.group).map(|m| m.as_str().to_string()))
                    .collect();
                if values.is_empty() {
                    RuleMatch::NoMatch
                } else {
                    RuleMatch::All(values)
                }
            }
        }
    }
}

/// An ordered set of rules, at most one per field.
#[derive(Debug, Clone)]
pub struct PatternLibrary {
    rules: Vec<PatternRule>,
}

impl PatternLibrary {
    pub fn new(rules: Vec<PatternRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    /// The rule filling `field`, if any.
    pub fn rule(&self, field: HeaderField) -> Option<&PatternRule> {
        self.rules.iter().find(|r| r.field == field)
    }

    /// Replace the rule for a field, or add it.
    pub fn with_rule(mut self, rule: PatternRule) -> Self {
        match self.rules.iter_mut().find(|r| r.field == rule.field) {
            Some(existing) => *existing = rule,
            None => self.rules.push(rule),
        }
        self
    }
}

impl Default for PatternLibrary {
    fn default() -> Self {
        STANDARD_LIBRARY.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_rejects_missing_group() {
        let rule = PatternRule::new(HeaderField::Abn, MatchMode::First, r"ABN (\d+)", 2);
        match rule {
            Err(InvexError::Config(message)) => {
                assert_eq!(message, "rule for abn reads group 2 but the pattern has 1 groups")
            }
            other => panic!("expected a config error, got {other:?}"),
        }
    }

    #[test]
    fn test_rule_rejects_invalid_regex() {
        let rule = PatternRule::new(HeaderField::Abn, MatchMode::First, r"ABN (\d+", 1);
        assert!(matches!(rule, Err(InvexError::Pattern(_))));
    }

    #[test]
    fn test_first_and_all_modes() {
        let first =
            PatternRule::new(HeaderField::PoNumber, MatchMode::First, r"#(\d+)", 1).unwrap();
        let all = PatternRule::new(HeaderField::PoNumber, MatchMode::All, r"#(\d+)", 1).unwrap();
        let text = "#12 then #34";

        assert_eq!(first.apply(text), RuleMatch::First("12".to_string()));
        assert_eq!(all.apply(text), RuleMatch::All(vec!["12".to_string(), "34".to_string()]));
        assert_eq!(first.apply("none"), RuleMatch::NoMatch);
        assert!(!all.apply("none").is_match());
    }

    #[test]
    fn test_with_rule_replaces_field() {
        let custom = PatternRule::new(HeaderField::Abn, MatchMode::First, r"BN=(\w+)", 1).unwrap();
        let library = PatternLibrary::default().with_rule(custom);

        assert_eq!(library.rules().len(), 9);
        assert_eq!(
            library.rule(HeaderField::Abn).unwrap().apply("BN=XYZ"),
            RuleMatch::First("XYZ".to_string())
        );
    }
}
