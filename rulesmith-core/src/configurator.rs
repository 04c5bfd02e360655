//! Project configurator
//!
//! Runs one configuration pass for a project:
//!
//! ```text
//! Idle → ResolvingRuleSets → CompilingPatterns → Persisting → Applied
//!              │                                     │    └──→ Degraded (rule set file write failed)
//!              └──→ SkippedDueToError                └──→ RolledBack (properties not stored)
//! ```
//!
//! A pass is synchronous and keeps no state once it returns. The host must not
//! run two passes for the same project at once; the files written here are
//! last-writer-wins.

use crate::config::{ConfiguratorSettings, ExecutionConfig};
use crate::error::{ConfigureError, Result};
use crate::patterns::compile_patterns;
use crate::project::ProjectHost;
use crate::properties::{ProjectPropertiesStore, SettingsFileStore};
use crate::resolvers::{open_location, ContentOpener, ResourceResolver, SearchPathResolver};
use crate::rulesets::{resolve_rule_sets, write_rule_set_file, RuleSetWriter, XmlRuleSetWriter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassState {
    Idle,
    ResolvingRuleSets,
    CompilingPatterns,
    Persisting,
    Applied,
    Degraded,
    SkippedDueToError,
    RolledBack,
}

/// How a configuration pass ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// Rule set file written and properties recorded
    Applied { rule_set_file: PathBuf },
    /// Properties recorded but the rule set file may be incomplete
    Degraded { rule_set_file: PathBuf, error: String },
    /// A rule set reference could not be resolved; nothing was changed
    SkippedDueToError { reason: String },
    /// Properties could not be stored; the project was unconfigured
    RolledBack { reason: String },
}

impl PassOutcome {
    pub fn state(&self) -> PassState {
        match self {
            PassOutcome::Applied { .. } => PassState::Applied,
            PassOutcome::Degraded { .. } => PassState::Degraded,
            PassOutcome::SkippedDueToError { .. } => PassState::SkippedDueToError,
            PassOutcome::RolledBack { .. } => PassState::RolledBack,
        }
    }
}

fn transition(state: &mut PassState, next: PassState) {
    debug!(from = ?*state, to = ?next, "configuration pass");
    *state = next;
}

pub struct ProjectConfigurator {
    settings: ConfiguratorSettings,
    writer: Box<dyn RuleSetWriter>,
    properties: Box<dyn ProjectPropertiesStore>,
    opener: Box<ContentOpener<'static>>,
}

impl ProjectConfigurator {
    /// Configurator with the XML writer, the settings-file store and the
    /// local file opener
    pub fn new(settings: ConfiguratorSettings) -> Self {
        let properties = Box::new(SettingsFileStore::new(settings.settings_file.clone()));
        Self::new_with_dependencies(
            settings,
            Box::new(XmlRuleSetWriter),
            properties,
            Box::new(open_location),
        )
    }

    /// Create a configurator with full dependency injection
    pub fn new_with_dependencies(
        settings: ConfiguratorSettings,
        writer: Box<dyn RuleSetWriter>,
        properties: Box<dyn ProjectPropertiesStore>,
        opener: Box<ContentOpener<'static>>,
    ) -> Self {
        Self {
            settings,
            writer,
            properties,
            opener,
        }
    }

    /// Replace the content opener, e.g. with one that fetches remote rule sets
    pub fn with_opener(mut self, opener: Box<ContentOpener<'static>>) -> Self {
        self.opener = opener;
        self
    }

    pub fn settings(&self) -> &ConfiguratorSettings {
        &self.settings
    }

    /// Resolver over the project directory and the configured search paths
    pub fn resolver_for(&self, project_root: &Path) -> SearchPathResolver {
        SearchPathResolver::new(project_root).with_search_paths(self.settings.search_paths.clone())
    }

    pub fn configure(
        &self,
        project: &mut dyn ProjectHost,
        execution: &ExecutionConfig,
    ) -> Result<PassOutcome> {
        let resolver = self.resolver_for(project.root());
        self.configure_with_resolver(project, execution, &resolver)
    }

    pub fn configure_with_resolver(
        &self,
        project: &mut dyn ProjectHost,
        execution: &ExecutionConfig,
        resolver: &dyn ResourceResolver,
    ) -> Result<PassOutcome> {
        let mut state = PassState::Idle;
        info!(project = %project.root().display(), execution = %execution.id, "configuring analysis");

        transition(&mut state, PassState::ResolvingRuleSets);
        let resolved = resolve_rule_sets(
            &self.settings.rule_set_name,
            &execution.rulesets,
            resolver,
            self.opener.as_ref(),
        );
        let mut rule_set = match resolved {
            Ok(rule_set) => rule_set,
            Err(e @ ConfigureError::ReferenceResolution { .. }) => {
                warn!(error = %e, "rule set resolution failed");
                transition(&mut state, PassState::SkippedDueToError);
                return Ok(PassOutcome::SkippedDueToError {
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        };
        rule_set.description = Some(self.settings.rule_set_description.clone());

        transition(&mut state, PassState::CompilingPatterns);
        compile_patterns(&execution.pattern_inputs()).apply_to(&mut rule_set);

        transition(&mut state, PassState::Persisting);
        let rule_set_file = project.root().join(&self.settings.rule_set_file);
        let rule_set_file = std::path::absolute(&rule_set_file).unwrap_or(rule_set_file);

        let write_error = match write_rule_set_file(&rule_set_file, &rule_set, self.writer.as_ref()) {
            Ok(()) => None,
            Err(e) => {
                error!(error = %e, "rule set file may be incomplete");
                Some(e.to_string())
            }
        };

        if let Err(e) = self.record_properties(project.root(), &rule_set_file) {
            warn!(error = %e, "storing project properties failed, removing configuration");
            self.unconfigure(project)?;
            transition(&mut state, PassState::RolledBack);
            return Ok(PassOutcome::RolledBack {
                reason: e.to_string(),
            });
        }

        if project.has_nature(&self.settings.java_nature) {
            if let Err(e) = project.add_nature(&self.settings.analysis_nature) {
                error!(error = %e, "failed to add analysis nature");
                return Err(e);
            }
        }

        let outcome = match write_error {
            None => PassOutcome::Applied { rule_set_file },
            Some(error) => PassOutcome::Degraded {
                rule_set_file,
                error,
            },
        };
        transition(&mut state, outcome.state());
        info!(
            rules = rule_set.len(),
            excludes = rule_set.exclude_patterns.len(),
            includes = rule_set.include_patterns.len(),
            "configuration pass finished"
        );
        Ok(outcome)
    }

    fn record_properties(&self, project_root: &Path, rule_set_file: &Path) -> Result<()> {
        let mut properties = self.properties.load(project_root)?;
        properties.analysis_enabled = true;
        properties.rule_set_file = Some(rule_set_file.to_path_buf());
        properties.rule_set_stored_in_project = true;
        self.properties.store(project_root, &properties)
    }

    /// Disable analysis and remove the generated files. Safe to call on a
    /// project that was never configured.
    pub fn unconfigure(&self, project: &mut dyn ProjectHost) -> Result<()> {
        let root = project.root().to_path_buf();

        match self.properties.load(&root) {
            Ok(mut properties) => {
                properties.analysis_enabled = false;
                properties.rule_set_stored_in_project = false;
                if let Err(e) = self.properties.store(&root, &properties) {
                    warn!(error = %e, "failed to store disabled project properties");
                }
            }
            Err(e) => warn!(error = %e, "failed to load project properties"),
        }

        project.remove_nature(&self.settings.analysis_nature)?;
        remove_if_exists(&root.join(&self.settings.rule_set_file))?;
        remove_if_exists(&root.join(&self.settings.settings_file))?;

        info!(project = %root.display(), "analysis configuration removed");
        Ok(())
    }
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
