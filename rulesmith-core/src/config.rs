use crate::error::ConfigureError;
use crate::patterns::PatternInputs;
use crate::project::{JAVA_NATURE, PMD_NATURE};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const MAVEN_PLUGIN_GROUPID: &str = "org.apache.maven.plugins";
pub const MAVEN_PLUGIN_ARTIFACTID: &str = "maven-pmd-plugin";
/// Goal the configurator binds to
pub const MAVEN_PLUGIN_GOAL: &str = "check";

pub const DEFAULT_RULE_SET_FILE: &str = ".pmdruleset.xml";
pub const DEFAULT_SETTINGS_FILE: &str = ".pmd";

// Default value functions for serde
fn default_group_id() -> String {
    MAVEN_PLUGIN_GROUPID.to_string()
}

fn default_artifact_id() -> String {
    MAVEN_PLUGIN_ARTIFACTID.to_string()
}

fn default_goals() -> Vec<String> {
    vec![MAVEN_PLUGIN_GOAL.to_string()]
}

fn default_execution_id() -> String {
    "default".to_string()
}

/// The plugin's own defaults when no rule sets are configured
fn default_rulesets() -> Vec<String> {
    vec![
        "java-basic".to_string(),
        "java-unusedcode".to_string(),
        "java-imports".to_string(),
    ]
}

fn default_rule_set_name() -> String {
    "Project PMD RuleSet".to_string()
}

fn default_rule_set_description() -> String {
    "Rule set generated from the build plugin configuration".to_string()
}

fn default_rule_set_file() -> String {
    DEFAULT_RULE_SET_FILE.to_string()
}

fn default_settings_file() -> String {
    DEFAULT_SETTINGS_FILE.to_string()
}

fn default_analysis_nature() -> String {
    PMD_NATURE.to_string()
}

fn default_java_nature() -> String {
    JAVA_NATURE.to_string()
}

// ===== BUILD PLUGIN CONFIGURATION =====
// Snapshot of the analysis plugin as declared in the build. Read once per pass.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfiguration {
    #[serde(default = "default_group_id")]
    pub group_id: String,
    #[serde(default = "default_artifact_id")]
    pub artifact_id: String,
    #[serde(default)]
    pub executions: Vec<ExecutionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    #[serde(default = "default_execution_id")]
    pub id: String,
    #[serde(default = "default_goals")]
    pub goals: Vec<String>,
    /// Rule set references: paths, classpath resources, URLs or short names
    #[serde(default = "default_rulesets")]
    pub rulesets: Vec<String>,
    /// Source roots the include patterns apply under
    #[serde(default)]
    pub include_roots: Vec<String>,
    /// Include pattern fragments
    #[serde(default)]
    pub includes: Vec<String>,
    /// Roots excluded outright
    #[serde(default)]
    pub exclude_roots: Vec<String>,
    /// Exclude pattern fragments
    #[serde(default)]
    pub excludes: Vec<String>,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            id: default_execution_id(),
            goals: default_goals(),
            rulesets: default_rulesets(),
            include_roots: Vec::new(),
            includes: Vec::new(),
            exclude_roots: Vec::new(),
            excludes: Vec::new(),
        }
    }
}

impl ExecutionConfig {
    pub fn pattern_inputs(&self) -> PatternInputs<'_> {
        PatternInputs {
            include_roots: &self.include_roots,
            include_patterns: &self.includes,
            exclude_roots: &self.exclude_roots,
            exclude_patterns: &self.excludes,
        }
    }
}

impl PluginConfiguration {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read plugin configuration {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Invalid plugin configuration {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// The single execution bound to the configurator's goal.
    ///
    /// Fails when the configuration belongs to another plugin or when zero or
    /// several executions carry the goal.
    pub fn single_execution(&self) -> std::result::Result<&ExecutionConfig, ConfigureError> {
        if self.group_id != MAVEN_PLUGIN_GROUPID || self.artifact_id != MAVEN_PLUGIN_ARTIFACTID {
            return Err(ConfigureError::UnexpectedPlugin {
                expected: format!("{MAVEN_PLUGIN_GROUPID}:{MAVEN_PLUGIN_ARTIFACTID}"),
                found: format!("{}:{}", self.group_id, self.artifact_id),
            });
        }

        let matching: Vec<&ExecutionConfig> = self
            .executions
            .iter()
            .filter(|e| e.goals.iter().any(|g| g == MAVEN_PLUGIN_GOAL))
            .collect();
        match matching.as_slice() {
            [execution] => Ok(*execution),
            _ => Err(ConfigureError::WrongExecutionCount {
                found: matching.len(),
            }),
        }
    }
}

// ===== CONFIGURATOR SETTINGS =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfiguratorSettings {
    /// Display name of the merged rule set, independent of its sources
    #[serde(default = "default_rule_set_name")]
    pub rule_set_name: String,
    #[serde(default = "default_rule_set_description")]
    pub rule_set_description: String,
    /// Project-relative rule set file
    #[serde(default = "default_rule_set_file")]
    pub rule_set_file: String,
    /// Project-relative analysis settings file
    #[serde(default = "default_settings_file")]
    pub settings_file: String,
    /// Directories searched after the project directory (classpath analogue)
    #[serde(default)]
    pub search_paths: Vec<PathBuf>,
    #[serde(default = "default_analysis_nature")]
    pub analysis_nature: String,
    #[serde(default = "default_java_nature")]
    pub java_nature: String,
}

impl Default for ConfiguratorSettings {
    fn default() -> Self {
        Self {
            rule_set_name: default_rule_set_name(),
            rule_set_description: default_rule_set_description(),
            rule_set_file: default_rule_set_file(),
            settings_file: default_settings_file(),
            search_paths: Vec::new(),
            analysis_nature: default_analysis_nature(),
            java_nature: default_java_nature(),
        }
    }
}

impl ConfiguratorSettings {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings {}", path.display()))?;
        let settings: ConfiguratorSettings = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings with fallback to default
    pub fn load_with_fallback(path: Option<&Path>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|e| {
                warn!(path = %p.display(), error = %e, "failed to load settings, using defaults");
                Self::default()
            }),
            None => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLUGIN_YAML: &str = r#"
group_id: org.apache.maven.plugins
artifact_id: maven-pmd-plugin
executions:
  - id: pmd-check
    goals: [check]
    rulesets:
      - config/pmd/rules.xml
      - java-braces
    include_roots: [src/main/java/]
    includes: [".*Service.java"]
    exclude_roots: [target/generated-sources/]
  - id: cpd
    goals: [cpd-check]
"#;

    #[test]
    fn test_plugin_yaml_parses() {
        let config = PluginConfiguration::from_yaml(PLUGIN_YAML).unwrap();
        assert_eq!(config.executions.len(), 2);

        let execution = config.single_execution().unwrap();
        assert_eq!(execution.id, "pmd-check");
        assert_eq!(execution.rulesets, vec!["config/pmd/rules.xml", "java-braces"]);
        assert!(execution.excludes.is_empty());

        let inputs = execution.pattern_inputs();
        assert_eq!(inputs.include_roots, &["src/main/java/".to_string()]);
        assert_eq!(inputs.include_patterns, &[".*Service.java".to_string()]);
    }

    #[test]
    fn test_execution_defaults() {
        let config = PluginConfiguration::from_yaml("executions:\n  - {}\n").unwrap();
        let execution = config.single_execution().unwrap();
        assert_eq!(execution.goals, vec!["check"]);
        assert_eq!(execution.rulesets, default_rulesets());
        assert_eq!(config.artifact_id, MAVEN_PLUGIN_ARTIFACTID);
    }

    #[test]
    fn test_wrong_execution_count() {
        let none = PluginConfiguration::from_yaml("executions: []\n").unwrap();
        assert!(matches!(
            none.single_execution(),
            Err(ConfigureError::WrongExecutionCount { found: 0 })
        ));

        let two = PluginConfiguration::from_yaml("executions:\n  - id: a\n  - id: b\n").unwrap();
        let err = two.single_execution().unwrap_err();
        assert_eq!(err.to_string(), "Wrong number of executions. Expected 1. Found 2");
    }

    #[test]
    fn test_unexpected_plugin() {
        let config =
            PluginConfiguration::from_yaml("artifact_id: maven-checkstyle-plugin\nexecutions: [{}]\n")
                .unwrap();
        assert!(matches!(
            config.single_execution(),
            Err(ConfigureError::UnexpectedPlugin { .. })
        ));
    }

    #[test]
    fn test_settings_fallback() {
        let settings = ConfiguratorSettings::load_with_fallback(Some(Path::new("/no/such.yaml")));
        assert_eq!(settings.rule_set_file, DEFAULT_RULE_SET_FILE);
        assert_eq!(settings.settings_file, DEFAULT_SETTINGS_FILE);
        assert_eq!(settings.analysis_nature, PMD_NATURE);
    }

    #[test]
    fn test_settings_partial_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        fs::write(&path, "rule_set_name: Team Rules\nsearch_paths: [/opt/pmd]\n").unwrap();

        let settings = ConfiguratorSettings::load_from_file(&path).unwrap();
        assert_eq!(settings.rule_set_name, "Team Rules");
        assert_eq!(settings.search_paths, vec![PathBuf::from("/opt/pmd")]);
        assert_eq!(settings.rule_set_file, DEFAULT_RULE_SET_FILE);
    }
}
