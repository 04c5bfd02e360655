//! Error taxonomy for a configuration pass.
//!
//! [`ConfigureError::ReferenceResolution`] aborts a pass before anything is
//! written. A [`ContentError`] only ever skips the one reference it belongs to.

use std::path::PathBuf;

/// Errors surfaced by the configurator and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum ConfigureError {
    /// A declared rule set could not be mapped to any location.
    #[error("Failed to resolve RuleSet from location [{reference}], skipping analysis configuration")]
    ReferenceResolution { reference: String },

    /// Content of a resolved rule set could not be read or parsed.
    #[error("rule set [{reference}] could not be loaded: {source}")]
    ReferenceContent {
        reference: String,
        #[source]
        source: ContentError,
    },

    /// Project properties could not be loaded or stored.
    #[error("project properties error: {0}")]
    PersistenceProperty(String),

    /// The rule set writer or the rule set file write failed.
    #[error("failed to write rule set file {}: {reason}", path.display())]
    Serialization { path: PathBuf, reason: String },

    /// The build plugin declares more or fewer than one matching execution.
    #[error("Wrong number of executions. Expected 1. Found {found}")]
    WrongExecutionCount { found: usize },

    /// The configuration belongs to a different build plugin.
    #[error("unexpected plugin {found}, expected {expected}")]
    UnexpectedPlugin { expected: String, found: String },

    /// The host refused a nature change.
    #[error("failed to update project nature {nature}: {reason}")]
    Nature { nature: String, reason: String },

    /// Filesystem I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for configurator operations.
pub type Result<T> = std::result::Result<T, ConfigureError>;

/// Per-reference content failures. Always recoverable.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// The location could not be opened.
    #[error("no rule set found at {location}: {reason}")]
    NotFound { location: String, reason: String },

    /// The location kind is not supported by this opener.
    #[error("unsupported rule set location {0}")]
    Unsupported(String),

    /// The bytes are not UTF-8.
    #[error("rule set is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    /// The XML is malformed.
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The document parsed but is not a rule set.
    #[error("invalid rule set: {0}")]
    Invalid(String),

    /// The reference named a single rule that the rule set does not contain.
    #[error("rule {rule} not found in {file}")]
    RuleNotFound { rule: String, file: String },
}
