use std::collections::HashSet;

// ===== RULE TYPES =====
// A rule is either a concrete definition (class + message) or a reference to
// a rule or whole rule set defined elsewhere (`ref`). Both share the same
// identity model: the rule name.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleProperty {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rule {
    /// Identity within a rule set
    pub name: String,
    /// `ref` attribute for rule and rule set references
    pub reference: Option<String>,
    pub class: Option<String>,
    pub message: Option<String>,
    pub language: Option<String>,
    pub since: Option<String>,
    pub description: Option<String>,
    pub priority: Option<u8>,
    pub properties: Vec<RuleProperty>,
    /// Rules excluded from a whole rule set reference
    pub excludes: Vec<String>,
}

impl Rule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// True when the entry pulls in an entire rule set rather than one rule
    pub fn is_rule_set_reference(&self) -> bool {
        self.reference
            .as_deref()
            .map(|r| r.ends_with(".xml"))
            .unwrap_or(false)
    }
}

// ===== RULE SET =====

/// A named collection of rules plus the compiled path filters the analysis
/// engine applies before running them.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    pub name: String,
    pub description: Option<String>,
    rules: Vec<Rule>,
    names: HashSet<String>,
    pub exclude_patterns: Vec<String>,
    pub include_patterns: Vec<String>,
}

impl RuleSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Add a rule unless one with the same name is already present.
    /// Returns whether the rule was added.
    pub fn add_rule(&mut self, rule: Rule) -> bool {
        if self.names.contains(&rule.name) {
            return false;
        }
        self.names.insert(rule.name.clone());
        self.rules.push(rule);
        true
    }

    /// Union with another rule set. Earlier rules win on name collisions;
    /// the other set's name, description and patterns are not carried over.
    pub fn add_rule_set(&mut self, other: RuleSet) {
        for rule in other.rules {
            self.add_rule(rule);
        }
    }

    pub fn add_exclude_pattern(&mut self, pattern: impl Into<String>) {
        self.exclude_patterns.push(pattern.into());
    }

    pub fn add_include_pattern(&mut self, pattern: impl Into<String>) {
        self.include_patterns.push(pattern.into());
    }

    /// Only keep the named rule. Used for single-rule references.
    pub fn retain_rule(&mut self, name: &str) {
        self.rules.retain(|r| r.name == name);
        self.names.retain(|n| n == name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_with_message(name: &str, message: &str) -> Rule {
        Rule {
            message: Some(message.to_string()),
            ..Rule::new(name)
        }
    }

    #[test]
    fn test_merge_keeps_first_definition() {
        let mut first = RuleSet::new("first");
        first.add_rule(rule_with_message("A", "a"));
        first.add_rule(rule_with_message("B", "first b"));

        let mut second = RuleSet::new("second");
        second.add_rule(rule_with_message("B", "second b"));
        second.add_rule(rule_with_message("C", "c"));

        let mut merged = RuleSet::new("merged");
        merged.add_rule_set(first);
        merged.add_rule_set(second);

        let names: Vec<&str> = merged.rules().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(merged.rule("B").unwrap().message.as_deref(), Some("first b"));
        assert_eq!(merged.name, "merged");
    }

    #[test]
    fn test_add_rule_reports_duplicates() {
        let mut set = RuleSet::new("s");
        assert!(set.add_rule(Rule::new("X")));
        assert!(!set.add_rule(Rule::new("X")));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_retain_rule() {
        let mut set = RuleSet::new("s");
        set.add_rule(Rule::new("X"));
        set.add_rule(Rule::new("Y"));
        set.retain_rule("Y");
        assert_eq!(set.len(), 1);
        assert!(set.add_rule(Rule::new("X")));
    }

    #[test]
    fn test_rule_set_reference_detection() {
        let whole = Rule {
            reference: Some("rulesets/java/basic.xml".to_string()),
            ..Rule::new("rulesets/java/basic.xml")
        };
        let single = Rule {
            reference: Some("rulesets/java/basic.xml/EmptyCatchBlock".to_string()),
            ..Rule::new("EmptyCatchBlock")
        };
        assert!(whole.is_rule_set_reference());
        assert!(!single.is_rule_set_reference());
        assert!(!Rule::new("Plain").is_rule_set_reference());
    }
}
