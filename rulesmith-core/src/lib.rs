// Rulesmith Core Library
//
// Translates a build plugin's static-analysis configuration into a resolved,
// persisted PMD rule set with compiled include/exclude path filters.
// Main interface is ProjectConfigurator.

pub mod config;
pub mod configurator;
pub mod error;
pub mod patterns;
pub mod project;
pub mod properties;
pub mod reference;
pub mod resolvers;
pub mod rulesets;
pub mod types;

// Re-export main types and functions for easy use
pub use config::{ConfiguratorSettings, ExecutionConfig, PluginConfiguration};
pub use configurator::{PassOutcome, PassState, ProjectConfigurator};
pub use error::{ConfigureError, ContentError};
pub use patterns::{compile_patterns, CompiledPatterns, PatternInputs};
pub use project::{LocalProject, ProjectHost};
pub use properties::{ProjectProperties, ProjectPropertiesStore, SettingsFileStore};
pub use reference::RuleSetReferenceId;
pub use resolvers::{ResolvedLocation, ResourceResolver, SearchPathResolver};
pub use rulesets::{RuleSetWriter, XmlRuleSetWriter};
pub use types::*;
