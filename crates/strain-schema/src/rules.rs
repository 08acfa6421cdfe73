//! # Cross-Field Rules
//!
//! Document-level predicates that no single field's schema can express.
//! They run after the per-field stage and report through the same
//! [`Violation`] type, tagged [`ViolationKind::CrossField`].

use strain_core::{StrainDocument, StrainKeys};

use crate::validate::{Violation, ViolationKind};

/// "If `trigger` is present, at least one of `any_of` must be present too."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossFieldRule {
    /// Key whose presence activates the rule.
    pub trigger: String,
    /// Keys of which at least one must accompany the trigger.
    pub any_of: Vec<String>,
}

impl CrossFieldRule {
    /// Build a conditional-presence rule.
    pub fn requires_any_of(trigger: impl Into<String>, any_of: &[&str]) -> Self {
        Self {
            trigger: trigger.into(),
            any_of: any_of.iter().map(|k| (*k).to_string()).collect(),
        }
    }

    /// Evaluate against a document. `None` means the rule holds.
    pub fn check(&self, doc: &StrainDocument) -> Option<Violation> {
        if !doc.contains(&self.trigger) {
            return None;
        }
        if self.any_of.iter().any(|k| doc.contains(k)) {
            return None;
        }
        Some(Violation {
            kind: ViolationKind::CrossField,
            field: self.trigger.clone(),
            message: format!(
                "{} is set, so at least one of [{}] must also be set",
                self.trigger,
                self.any_of.join(", ")
            ),
        })
    }
}

/// An ordered set of cross-field rules.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<CrossFieldRule>,
}

impl RuleSet {
    /// An empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The rules every strain must satisfy.
    ///
    /// Themes without a name source cannot be activated: either the list of
    /// theme names or a single default theme must accompany them.
    pub fn default_rules(keys: &StrainKeys) -> Self {
        Self::new().with(CrossFieldRule::requires_any_of(
            keys.themes.clone(),
            &[keys.themes_name.as_str(), keys.default_theme.as_str()],
        ))
    }

    /// Add a rule.
    pub fn with(mut self, rule: CrossFieldRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the set has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Every violated rule, in rule order.
    pub fn evaluate(&self, doc: &StrainDocument) -> Vec<Violation> {
        self.rules.iter().filter_map(|r| r.check(doc)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(yaml: &str) -> StrainDocument {
        StrainDocument::parse(yaml, "test").unwrap()
    }

    #[test]
    fn themes_without_name_source_violates() {
        let rules = RuleSet::default_rules(&StrainKeys::default());
        let violations = rules.evaluate(&doc(
            "PICASSO_THEMES:\n  - name: bragi\n    repo: https://example.com/bragi\n    version: v1\n",
        ));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationKind::CrossField);
        assert_eq!(violations[0].field, "PICASSO_THEMES");
        assert!(violations[0].message.contains("PICASSO_THEMES_NAME"));
        assert!(violations[0].message.contains("PICASSO_DEFAULT_SITE_THEME"));
    }

    #[test]
    fn either_name_source_satisfies() {
        let rules = RuleSet::default_rules(&StrainKeys::default());
        assert!(rules
            .evaluate(&doc("PICASSO_THEMES: []\nPICASSO_THEMES_NAME: [bragi]\n"))
            .is_empty());
        assert!(rules
            .evaluate(&doc("PICASSO_THEMES: []\nPICASSO_DEFAULT_SITE_THEME: bragi\n"))
            .is_empty());
    }

    #[test]
    fn rule_is_inert_without_trigger() {
        let rules = RuleSet::default_rules(&StrainKeys::default());
        assert!(rules.evaluate(&doc("TUTOR_VERSION: v1.0.0\n")).is_empty());
    }

    #[test]
    fn null_value_counts_as_present() {
        let rule = CrossFieldRule::requires_any_of("A", &["B"]);
        assert!(rule.check(&doc("A: ~\n")).is_some());
        assert!(rule.check(&doc("A: 1\nB: ~\n")).is_none());
    }

    #[test]
    fn rules_report_in_order() {
        let rules = RuleSet::new()
            .with(CrossFieldRule::requires_any_of("A", &["X"]))
            .with(CrossFieldRule::requires_any_of("B", &["Y"]));
        let violations = rules.evaluate(&doc("A: 1\nB: 2\n"));
        let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, ["A", "B"]);
        assert_eq!(rules.len(), 2);
    }
}
