// Rule set serialization
//
// The writer boundary is two-step: a RuleSetWriter renders the rule set into
// bytes, then the exclude fix-up rewrites element-text excludes into the
// attribute form the analysis engine reads, before anything reaches disk.

use crate::error::{ConfigureError, Result};
use crate::types::{Rule, RuleSet};
use quick_xml::events::{BytesDecl, BytesText, Event};
use quick_xml::Writer;
use regex::Regex;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::LazyLock;

pub const PMD_NAMESPACE: &str = "http://pmd.sourceforge.net/ruleset/2.0.0";
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
const SCHEMA_LOCATION: &str =
    "http://pmd.sourceforge.net/ruleset/2.0.0 http://pmd.sourceforge.net/ruleset_2_0_0.xsd";

static EXCLUDE_ELEMENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<exclude>(.*)</exclude>").unwrap());

/// Writer trait - renders a rule set into its textual form
pub trait RuleSetWriter {
    fn write(&self, rule_set: &RuleSet, out: &mut dyn Write) -> anyhow::Result<()>;

    /// Writer name for logging
    fn name(&self) -> &str;
}

/// Writes PMD 2.0.0 rule set XML with four-space indentation.
///
/// Excludes of whole rule set references come out as element text
/// (`<exclude>Name</exclude>`); [`fix_exclude_elements`] turns them into the
/// `name` attribute form.
#[derive(Debug, Default, Clone, Copy)]
pub struct XmlRuleSetWriter;

impl RuleSetWriter for XmlRuleSetWriter {
    fn write(&self, rule_set: &RuleSet, out: &mut dyn Write) -> anyhow::Result<()> {
        let mut writer = Writer::new_with_indent(&mut *out, b' ', 4);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        writer
            .create_element("ruleset")
            .with_attributes([
                ("xmlns", PMD_NAMESPACE),
                ("xmlns:xsi", XSI_NAMESPACE),
                ("xsi:schemaLocation", SCHEMA_LOCATION),
                ("name", rule_set.name.as_str()),
            ])
            .write_inner_content(|w| -> quick_xml::Result<()> {
                w.create_element("description")
                    .write_text_content(BytesText::new(
                        rule_set.description.as_deref().unwrap_or_default(),
                    ))?;
                for pattern in &rule_set.exclude_patterns {
                    w.create_element("exclude-pattern")
                        .write_text_content(BytesText::new(pattern))?;
                }
                for pattern in &rule_set.include_patterns {
                    w.create_element("include-pattern")
                        .write_text_content(BytesText::new(pattern))?;
                }
                for rule in rule_set.rules() {
                    write_rule(w, rule)?;
                }
                Ok(())
            })?;

        out.write_all(b"\n")?;
        Ok(())
    }

    fn name(&self) -> &str {
        "pmd-xml"
    }
}

fn write_rule<W: Write>(w: &mut Writer<W>, rule: &Rule) -> quick_xml::Result<()> {
    let mut element = w.create_element("rule");
    match rule.reference.as_deref() {
        Some(reference) => element = element.with_attribute(("ref", reference)),
        None => element = element.with_attribute(("name", rule.name.as_str())),
    }
    let optional = [
        ("language", &rule.language),
        ("since", &rule.since),
        ("message", &rule.message),
        ("class", &rule.class),
    ];
    for (key, value) in optional {
        if let Some(value) = value {
            element = element.with_attribute((key, value.as_str()));
        }
    }

    let has_children = rule.description.is_some()
        || rule.priority.is_some()
        || !rule.properties.is_empty()
        || !rule.excludes.is_empty();
    if !has_children {
        element.write_empty()?;
        return Ok(());
    }

    element.write_inner_content(|w| -> quick_xml::Result<()> {
        for excluded in &rule.excludes {
            w.create_element("exclude")
                .write_text_content(BytesText::new(excluded))?;
        }
        if let Some(description) = &rule.description {
            w.create_element("description")
                .write_text_content(BytesText::new(description))?;
        }
        if let Some(priority) = rule.priority {
            w.create_element("priority")
                .write_text_content(BytesText::new(&priority.to_string()))?;
        }
        if !rule.properties.is_empty() {
            w.create_element("properties")
                .write_inner_content(|w| -> quick_xml::Result<()> {
                    for property in &rule.properties {
                        w.create_element("property")
                            .with_attributes([
                                ("name", property.name.as_str()),
                                ("value", property.value.as_str()),
                            ])
                            .write_empty()?;
                    }
                    Ok(())
                })?;
        }
        Ok(())
    })?;
    Ok(())
}

/// Rewrite `<exclude>X</exclude>` into `<exclude name="X"/>` across the
/// whole document. Matching is per line and greedy.
pub fn fix_exclude_elements(xml: &str) -> String {
    EXCLUDE_ELEMENT_REGEX
        .replace_all(xml, r#"<exclude name="${1}"/>"#)
        .into_owned()
}

/// Render the rule set with `writer`, apply the exclude fix-up and write the
/// result to `path`. The output file is created before rendering, so a
/// failing writer leaves an empty file behind.
pub fn write_rule_set_file(
    path: &Path,
    rule_set: &RuleSet,
    writer: &dyn RuleSetWriter,
) -> Result<()> {
    let serialization_error = |reason: String| ConfigureError::Serialization {
        path: path.to_path_buf(),
        reason,
    };

    let file = File::create(path).map_err(|e| serialization_error(e.to_string()))?;
    let mut out = BufWriter::new(file);

    let mut raw = Vec::new();
    writer
        .write(rule_set, &mut raw)
        .map_err(|e| serialization_error(format!("{} writer: {e:#}", writer.name())))?;
    let raw = String::from_utf8(raw).map_err(|e| serialization_error(e.to_string()))?;

    out.write_all(fix_exclude_elements(&raw).as_bytes())
        .and_then(|_| out.flush())
        .map_err(|e| serialization_error(e.to_string()))?;
    Ok(())
}
