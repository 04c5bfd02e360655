//! PMD rule set XML reader
//!
//! Accepts the PMD 2.0.0 rule set format. Only what the configurator carries
//! forward is kept: the set's name and description plus, per rule, its
//! attributes, description, priority, properties and excludes. Examples and
//! rule set level path patterns are skipped.

use crate::error::ContentError;
use crate::types::{Rule, RuleProperty, RuleSet};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Parse rule set bytes. Pure function; no state survives between calls.
pub fn parse_rule_set(bytes: &[u8]) -> Result<RuleSet, ContentError> {
    let text = String::from_utf8(bytes.to_vec())?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

    let mut reader = Reader::from_str(text);
    reader.trim_text(true);

    let mut parser = RuleSetParser::default();
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = local_name(&e);
                parser.start(&name, &e)?;
                parser.path.push(name);
            }
            Event::Empty(e) => {
                let name = local_name(&e);
                parser.start(&name, &e)?;
                parser.end(&name);
            }
            Event::End(_) => {
                if let Some(name) = parser.path.pop() {
                    parser.end(&name);
                }
            }
            Event::Text(t) => {
                let text = t.unescape()?;
                parser.text(&text)?;
            }
            Event::CData(c) => {
                let text = String::from_utf8_lossy(&c).into_owned();
                parser.text(&text)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    parser
        .rule_set
        .ok_or_else(|| ContentError::Invalid("missing <ruleset> root element".to_string()))
}

#[derive(Default)]
struct RuleSetParser {
    path: Vec<String>,
    rule_set: Option<RuleSet>,
    rule: Option<Rule>,
    property: Option<RuleProperty>,
}

impl RuleSetParser {
    fn start(&mut self, name: &str, e: &BytesStart) -> Result<(), ContentError> {
        match name {
            "ruleset" => {
                let set_name = attribute(e, "name")?.unwrap_or_default();
                self.rule_set = Some(RuleSet::new(set_name));
            }
            "rule" if self.rule_set.is_some() => {
                self.rule = Some(rule_from_attributes(e)?);
            }
            "property" if self.rule.is_some() => {
                let name = attribute(e, "name")?.ok_or_else(|| {
                    ContentError::Invalid("<property> without name attribute".to_string())
                })?;
                self.property = Some(RuleProperty {
                    name,
                    value: attribute(e, "value")?.unwrap_or_default(),
                });
            }
            "exclude" => {
                if let (Some(rule), Some(excluded)) = (self.rule.as_mut(), attribute(e, "name")?) {
                    rule.excludes.push(excluded);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn end(&mut self, name: &str) {
        match name {
            "rule" => {
                if let (Some(rule), Some(rule_set)) = (self.rule.take(), self.rule_set.as_mut()) {
                    let rule_name = rule.name.clone();
                    if !rule_set.add_rule(rule) {
                        tracing::debug!(rule = %rule_name, "duplicate rule in rule set, keeping first");
                    }
                }
            }
            "property" => {
                if let (Some(property), Some(rule)) = (self.property.take(), self.rule.as_mut()) {
                    rule.properties.push(property);
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) -> Result<(), ContentError> {
        let text = text.trim();
        let Some(current) = self.path.last().map(String::as_str) else {
            return Ok(());
        };
        let parent = self
            .path
            .len()
            .checked_sub(2)
            .and_then(|i| self.path.get(i))
            .map(String::as_str);

        match (current, parent) {
            ("description", Some("ruleset")) => {
                if let Some(rule_set) = self.rule_set.as_mut() {
                    rule_set.description = Some(text.to_string());
                }
            }
            ("description", Some("rule")) => {
                if let Some(rule) = self.rule.as_mut() {
                    rule.description = Some(text.to_string());
                }
            }
            ("priority", Some("rule")) => {
                if let Some(rule) = self.rule.as_mut() {
                    let priority = text.parse::<u8>().map_err(|_| {
                        ContentError::Invalid(format!("invalid priority '{text}' for rule {}", rule.name))
                    })?;
                    rule.priority = Some(priority);
                }
            }
            ("value", Some("property")) => {
                if let Some(property) = self.property.as_mut() {
                    property.value = text.to_string();
                }
            }
            ("exclude", Some("rule")) => {
                if let Some(rule) = self.rule.as_mut() {
                    rule.excludes.push(text.to_string());
                }
            }
            _ => {}
        }
        Ok(())
    }
}

fn rule_from_attributes(e: &BytesStart) -> Result<Rule, ContentError> {
    let reference = attribute(e, "ref")?;
    let name = match (attribute(e, "name")?, reference.as_deref()) {
        (Some(name), _) => name,
        (None, Some(r)) if r.ends_with(".xml") => r.to_string(),
        (None, Some(r)) => r.rsplit('/').next().unwrap_or(r).to_string(),
        (None, None) => {
            return Err(ContentError::Invalid(
                "<rule> needs a name or ref attribute".to_string(),
            ))
        }
    };

    Ok(Rule {
        name,
        reference,
        class: attribute(e, "class")?,
        message: attribute(e, "message")?,
        language: attribute(e, "language")?,
        since: attribute(e, "since")?,
        ..Rule::default()
    })
}

fn local_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn attribute(e: &BytesStart, key: &str) -> Result<Option<String>, ContentError> {
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.local_name().as_ref() == key.as_bytes() {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}
