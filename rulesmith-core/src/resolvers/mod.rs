//! Resource Resolvers
//!
//! Turn a logical rule set file name into a location whose bytes can be read.
//! The configurator only depends on the [`ResourceResolver`] trait; the host
//! decides where rule sets live (project tree, plugin classpath, network).
//!
//! ```text
//! RuleSetReferenceId
//!     ↓ rule_set_file_name()
//! [ResourceResolver]
//!     ↓
//! ResolvedLocation  (or None: unresolved, fatal for the pass)
//!     ↓
//! [content opener]
//!     ↓
//! rule set bytes     (or ContentError: skip this reference)
//! ```

pub mod content;
pub mod search_path;

pub use content::{open_location, ContentOpener};
pub use search_path::SearchPathResolver;

use std::path::PathBuf;

/// Where a rule set's bytes can be read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedLocation {
    File(PathBuf),
    Url(String),
}

impl std::fmt::Display for ResolvedLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolvedLocation::File(path) => write!(f, "{}", path.display()),
            ResolvedLocation::Url(url) => f.write_str(url),
        }
    }
}

/// Resolver trait - maps a rule set file name to a readable location
pub trait ResourceResolver {
    /// `None` is a definitive "not found"
    fn resolve_location(&self, file_name: &str) -> Option<ResolvedLocation>;
}

impl<F> ResourceResolver for F
where
    F: Fn(&str) -> Option<ResolvedLocation>,
{
    fn resolve_location(&self, file_name: &str) -> Option<ResolvedLocation> {
        self(file_name)
    }
}
