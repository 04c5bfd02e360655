use crate::error::{ConfigureError, ContentError, Result};
use crate::reference::RuleSetReferenceId;
use crate::resolvers::{ContentOpener, ResourceResolver};
use crate::rulesets::parser::parse_rule_set;
use crate::types::RuleSet;
use tracing::{debug, info, warn};

/// Resolve every declared rule set reference and merge the results into one
/// rule set called `name`.
///
/// An unresolvable reference fails the whole call and nothing is returned.
/// A reference that resolves but whose content cannot be loaded is logged
/// and skipped. Rules merge in reference order; the first definition of a
/// rule name wins.
pub fn resolve_rule_sets(
    name: &str,
    references: &[String],
    resolver: &dyn ResourceResolver,
    open: &ContentOpener<'_>,
) -> Result<RuleSet> {
    let mut merged = RuleSet::new(name);

    for reference in references {
        let id = RuleSetReferenceId::parse(reference);
        let location = resolver
            .resolve_location(id.rule_set_file_name())
            .ok_or_else(|| ConfigureError::ReferenceResolution {
                reference: reference.clone(),
            })?;
        debug!(reference = %id, location = %location, "resolved rule set");

        let source = || open(&location, &id);
        match load_rule_set(&id, source, resolver) {
            Ok(rule_set) => {
                info!(reference = %id, rules = rule_set.len(), "loaded rule set");
                merged.add_rule_set(rule_set);
            }
            Err(source) => {
                let error = ConfigureError::ReferenceContent {
                    reference: reference.clone(),
                    source,
                };
                warn!(reference = %id, error = %error, "no rule set found, skipping");
            }
        }
    }

    Ok(merged)
}

/// Load one rule set through `source`, narrowing it to a single rule when the
/// reference names one.
///
/// Sub-references (`<rule ref="...">`) that `resolver` cannot locate are kept
/// and logged; the analysis engine may still find them on its own classpath.
pub fn load_rule_set<F>(
    id: &RuleSetReferenceId,
    source: F,
    resolver: &dyn ResourceResolver,
) -> std::result::Result<RuleSet, ContentError>
where
    F: FnOnce() -> std::result::Result<Vec<u8>, ContentError>,
{
    let bytes = source()?;
    let mut rule_set = parse_rule_set(&bytes)?;

    if let Some(rule) = id.rule_name() {
        if rule_set.rule(rule).is_none() {
            return Err(ContentError::RuleNotFound {
                rule: rule.to_string(),
                file: id.rule_set_file_name().to_string(),
            });
        }
        rule_set.retain_rule(rule);
    }

    for rule in rule_set.rules() {
        let Some(reference) = rule.reference.as_deref() else {
            continue;
        };
        let sub = RuleSetReferenceId::parse(reference);
        if resolver.resolve_location(sub.rule_set_file_name()).is_none() {
            warn!(
                reference = %id,
                sub_reference = %sub,
                "referenced rule set not found, keeping reference as declared"
            );
        }
    }

    Ok(rule_set)
}
