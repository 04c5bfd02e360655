// Rule set reference ids
//
// A declared rule set location is one of:
// - a URL (http, https, file), used verbatim
// - `<path>.xml/<RuleName>`, naming a single rule inside a rule set file
// - a short name `<lang>-<name>` for a bundled rule set
// - any other path, used verbatim

const URL_PREFIXES: [&str; 3] = ["http://", "https://", "file:"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSetReferenceId {
    reference: String,
    file_name: String,
    rule_name: Option<String>,
}

impl RuleSetReferenceId {
    pub fn parse(reference: &str) -> Self {
        let reference = reference.trim();
        let (file_name, rule_name) = split_reference(reference);
        Self {
            reference: reference.to_string(),
            file_name,
            rule_name,
        }
    }

    /// The string as declared
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// The logical rule set file name handed to the resource resolver
    pub fn rule_set_file_name(&self) -> &str {
        &self.file_name
    }

    /// Single rule selected by the reference, if any
    pub fn rule_name(&self) -> Option<&str> {
        self.rule_name.as_deref()
    }

    pub fn is_remote(&self) -> bool {
        self.file_name.starts_with("http://") || self.file_name.starts_with("https://")
    }
}

impl std::fmt::Display for RuleSetReferenceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.reference)
    }
}

fn split_reference(reference: &str) -> (String, Option<String>) {
    if URL_PREFIXES.iter().any(|p| reference.starts_with(p)) {
        return (reference.to_string(), None);
    }

    if let Some(index) = reference.rfind(".xml/") {
        let (file, rule) = reference.split_at(index + ".xml".len());
        let rule = &rule[1..];
        if !rule.is_empty() && !rule.contains('/') {
            return (file.to_string(), Some(rule.to_string()));
        }
    }

    if let Some(file) = expand_short_name(reference) {
        return (file, None);
    }

    (reference.to_string(), None)
}

/// `java-basic` → `rulesets/java/basic.xml`
fn expand_short_name(reference: &str) -> Option<String> {
    if reference.contains('/') || reference.contains('\\') || reference.ends_with(".xml") {
        return None;
    }
    let (language, name) = reference.split_once('-')?;
    if language.is_empty() || name.is_empty() {
        return None;
    }
    Some(format!("rulesets/{language}/{name}.xml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_path() {
        let id = RuleSetReferenceId::parse("config/pmd/ruleset.xml");
        assert_eq!(id.rule_set_file_name(), "config/pmd/ruleset.xml");
        assert_eq!(id.rule_name(), None);
    }

    #[test]
    fn test_single_rule_reference() {
        let id = RuleSetReferenceId::parse("rulesets/java/basic.xml/EmptyCatchBlock");
        assert_eq!(id.rule_set_file_name(), "rulesets/java/basic.xml");
        assert_eq!(id.rule_name(), Some("EmptyCatchBlock"));
        assert_eq!(id.reference(), "rulesets/java/basic.xml/EmptyCatchBlock");
    }

    #[test]
    fn test_short_name() {
        let id = RuleSetReferenceId::parse("java-unusedcode");
        assert_eq!(id.rule_set_file_name(), "rulesets/java/unusedcode.xml");
    }

    #[test]
    fn test_url_is_verbatim() {
        let id = RuleSetReferenceId::parse("https://example.org/pmd/rules.xml");
        assert_eq!(id.rule_set_file_name(), "https://example.org/pmd/rules.xml");
        assert!(id.is_remote());

        let file = RuleSetReferenceId::parse("file:/tmp/rules.xml");
        assert!(!file.is_remote());
        assert_eq!(file.rule_set_file_name(), "file:/tmp/rules.xml");
    }

    #[test]
    fn test_hyphenated_file_is_not_short_name() {
        let id = RuleSetReferenceId::parse("my-rules.xml");
        assert_eq!(id.rule_set_file_name(), "my-rules.xml");
    }
}
