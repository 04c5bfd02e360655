// Rule set handling - delegates to semantic sub-modules
// - loader.rs: resolves declared references and merges their rule sets
// - parser.rs: PMD rule set XML reader
// - writer.rs: rule set serialization and the exclude fix-up

pub mod loader;
pub mod parser;
pub mod writer;

pub use loader::{load_rule_set, resolve_rule_sets};
pub use parser::parse_rule_set;
pub use writer::{fix_exclude_elements, write_rule_set_file, RuleSetWriter, XmlRuleSetWriter};
