// All configuration logic is in rulesmith-core
// This CLI acts as a thin wrapper around the core library

// CLI-specific modules
pub mod remote;

// Re-export core types for convenience
pub use rulesmith_core::*;

// Re-export CLI utilities
pub use remote::RemoteRuleSets;
