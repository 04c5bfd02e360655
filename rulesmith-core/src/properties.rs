use crate::error::{ConfigureError, Result};
use quick_xml::events::{BytesDecl, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::fs;
use std::path::{Path, PathBuf};

/// Per-project analysis settings owned by the host
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectProperties {
    pub analysis_enabled: bool,
    /// Absolute path of the generated rule set file
    pub rule_set_file: Option<PathBuf>,
    pub rule_set_stored_in_project: bool,
}

/// Storage abstraction for project properties
pub trait ProjectPropertiesStore {
    fn load(&self, project_root: &Path) -> Result<ProjectProperties>;
    fn store(&self, project_root: &Path, properties: &ProjectProperties) -> Result<()>;
}

/// Keeps properties in the project's settings file as a small XML document:
///
/// ```xml
/// <pmd>
///     <analysisEnabled>true</analysisEnabled>
///     <useProjectRuleSet>true</useProjectRuleSet>
///     <ruleSetFile>/work/app/.pmdruleset.xml</ruleSetFile>
/// </pmd>
/// ```
///
/// A missing file loads as the defaults.
#[derive(Debug, Clone)]
pub struct SettingsFileStore {
    file_name: String,
}

impl SettingsFileStore {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    pub fn settings_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.file_name)
    }
}

fn properties_error(path: &Path, reason: impl std::fmt::Display) -> ConfigureError {
    ConfigureError::PersistenceProperty(format!("{}: {reason}", path.display()))
}

impl ProjectPropertiesStore for SettingsFileStore {
    fn load(&self, project_root: &Path) -> Result<ProjectProperties> {
        let path = self.settings_path(project_root);
        if !path.exists() {
            return Ok(ProjectProperties::default());
        }
        let content = fs::read_to_string(&path).map_err(|e| properties_error(&path, e))?;
        parse_properties(&content).map_err(|e| properties_error(&path, e))
    }

    fn store(&self, project_root: &Path, properties: &ProjectProperties) -> Result<()> {
        let path = self.settings_path(project_root);
        let xml = render_properties(properties).map_err(|e| properties_error(&path, e))?;
        fs::write(&path, xml).map_err(|e| properties_error(&path, e))?;
        Ok(())
    }
}

fn parse_properties(content: &str) -> quick_xml::Result<ProjectProperties> {
    let mut reader = Reader::from_str(content);
    reader.trim_text(true);

    let mut properties = ProjectProperties::default();
    let mut current: Option<String> = None;
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                current = Some(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
            }
            Event::End(_) => current = None,
            Event::Text(t) => {
                let text = t.unescape()?;
                let text = text.trim();
                match current.as_deref() {
                    Some("analysisEnabled") => properties.analysis_enabled = text == "true",
                    Some("useProjectRuleSet") => {
                        properties.rule_set_stored_in_project = text == "true"
                    }
                    Some("ruleSetFile") if !text.is_empty() => {
                        properties.rule_set_file = Some(PathBuf::from(text))
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(properties)
}

fn render_properties(properties: &ProjectProperties) -> quick_xml::Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.create_element("pmd").write_inner_content(|w| -> quick_xml::Result<()> {
        w.create_element("analysisEnabled")
            .write_text_content(BytesText::new(bool_text(properties.analysis_enabled)))?;
        w.create_element("useProjectRuleSet")
            .write_text_content(BytesText::new(bool_text(properties.rule_set_stored_in_project)))?;
        if let Some(file) = &properties.rule_set_file {
            w.create_element("ruleSetFile")
                .write_text_content(BytesText::new(&file.to_string_lossy()))?;
        }
        Ok(())
    })?;
    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}

fn bool_text(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
