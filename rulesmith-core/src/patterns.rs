//! Include/exclude path filter compilation
//!
//! Turns the build plugin's roots and patterns into the regular expressions the
//! analysis engine matches source paths against. Every filter has the shape
//! `.*<root><pattern>`; a `.*.*` produced by the concatenation collapses to `.*`.
//!
//! Precedence follows the build plugin: once any include pattern is declared,
//! exclude patterns are ignored and every include root is excluded at the root
//! level, leaving the include patterns to re-admit files. Without include
//! patterns, each exclude pattern is applied under every include root.
//!
//! Output order is part of the contract. Rule set files produced from the same
//! configuration must be byte-identical across runs.

use crate::types::RuleSet;
use std::collections::HashSet;

const ANY: &str = ".*";
const DOUBLE_ANY: &str = ".*.*";

/// Borrowed view of the configuration the compiler reads
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternInputs<'a> {
    pub include_roots: &'a [String],
    pub include_patterns: &'a [String],
    pub exclude_roots: &'a [String],
    pub exclude_patterns: &'a [String],
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledPatterns {
    pub excludes: Vec<String>,
    pub includes: Vec<String>,
}

impl CompiledPatterns {
    /// Append the filters to a rule set, excludes first.
    pub fn apply_to(self, rule_set: &mut RuleSet) {
        for pattern in self.excludes {
            rule_set.add_exclude_pattern(pattern);
        }
        for pattern in self.includes {
            rule_set.add_include_pattern(pattern);
        }
    }
}

/// Duplicate-free set of roots that remembers first insertion order
#[derive(Debug, Default)]
struct RootSet<'a> {
    seen: HashSet<&'a str>,
    ordered: Vec<&'a str>,
}

impl<'a> RootSet<'a> {
    fn extend(&mut self, roots: &'a [String]) {
        for root in roots {
            if self.seen.insert(root.as_str()) {
                self.ordered.push(root.as_str());
            }
        }
    }
}

/// `.*` + root + pattern, with one left-to-right pass replacing `.*.*` by `.*`
pub fn compose_pattern(root: &str, pattern: &str) -> String {
    format!("{ANY}{root}{pattern}").replace(DOUBLE_ANY, ANY)
}

/// Roots excluded outright: the declared exclude roots, plus every include
/// root when include patterns are present.
pub fn exclude_root_set(inputs: &PatternInputs<'_>) -> Vec<String> {
    build_root_set(inputs)
        .ordered
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn build_root_set<'a>(inputs: &PatternInputs<'a>) -> RootSet<'a> {
    let mut roots = RootSet::default();
    roots.extend(inputs.exclude_roots);
    if !inputs.include_patterns.is_empty() {
        roots.extend(inputs.include_roots);
    }
    roots
}

pub fn compile_patterns(inputs: &PatternInputs<'_>) -> CompiledPatterns {
    let includes_specified = !inputs.include_patterns.is_empty();
    let mut excludes = Vec::new();

    if !includes_specified {
        for root in inputs.include_roots {
            for pattern in inputs.exclude_patterns {
                excludes.push(compose_pattern(root, pattern));
            }
        }
    }

    // Bare roots are not collapsed
    for root in build_root_set(inputs).ordered {
        excludes.push(format!("{ANY}{root}"));
    }

    let mut includes = Vec::with_capacity(inputs.include_roots.len() * inputs.include_patterns.len());
    for root in inputs.include_roots {
        for pattern in inputs.include_patterns {
            includes.push(compose_pattern(root, pattern));
        }
    }

    CompiledPatterns { excludes, includes }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_include_pattern_scenario() {
        let include_roots = strings(&["src/main/java/"]);
        let include_patterns = strings(&["Foo.*"]);
        let compiled = compile_patterns(&PatternInputs {
            include_roots: &include_roots,
            include_patterns: &include_patterns,
            ..PatternInputs::default()
        });

        assert_eq!(compiled.includes, vec![".*src/main/java/Foo.*"]);
        assert_eq!(compiled.excludes, vec![".*src/main/java/"]);
    }

    #[test]
    fn test_exclude_root_only_scenario() {
        let exclude_roots = strings(&["generated/"]);
        let compiled = compile_patterns(&PatternInputs {
            exclude_roots: &exclude_roots,
            ..PatternInputs::default()
        });

        assert_eq!(compiled.excludes, vec![".*generated/"]);
        assert!(compiled.includes.is_empty());
    }

    #[test]
    fn test_includes_fold_roots_into_exclude_set() {
        let include_roots = strings(&["a/", "b/", "c/"]);
        let include_patterns = strings(&["X.*"]);
        let exclude_roots = strings(&["b/", "gen/"]);
        let inputs = PatternInputs {
            include_roots: &include_roots,
            include_patterns: &include_patterns,
            exclude_roots: &exclude_roots,
            exclude_patterns: &[],
        };

        let roots = exclude_root_set(&inputs);
        for root in &include_roots {
            assert!(roots.contains(root), "{root} missing from {roots:?}");
        }
        assert_eq!(roots, vec!["b/", "gen/", "a/", "c/"]);
    }

    #[test]
    fn test_exclude_patterns_ignored_when_includes_present() {
        let include_roots = strings(&["src/"]);
        let include_patterns = strings(&["Keep.*"]);
        let exclude_patterns = strings(&["Drop.*"]);
        let compiled = compile_patterns(&PatternInputs {
            include_roots: &include_roots,
            include_patterns: &include_patterns,
            exclude_roots: &[],
            exclude_patterns: &exclude_patterns,
        });

        assert_eq!(compiled.excludes, vec![".*src/"]);
        assert_eq!(compiled.includes, vec![".*src/Keep.*"]);
    }

    #[test]
    fn test_exclude_counts_without_includes() {
        let include_roots = strings(&["a/", "b/"]);
        let exclude_roots = strings(&["gen/", "gen/", "tmp/"]);
        let exclude_patterns = strings(&["X", "Y", "X"]);
        let compiled = compile_patterns(&PatternInputs {
            include_roots: &include_roots,
            include_patterns: &[],
            exclude_roots: &exclude_roots,
            exclude_patterns: &exclude_patterns,
        });

        // 2 roots x 3 patterns, duplicates kept, then 2 distinct bare roots
        assert_eq!(compiled.excludes.len(), 2 * 3 + 2);
        assert_eq!(
            compiled.excludes,
            vec![
                ".*a/X", ".*a/Y", ".*a/X", ".*b/X", ".*b/Y", ".*b/X", ".*gen/", ".*tmp/",
            ]
        );
        assert!(compiled.includes.is_empty());
    }

    #[test]
    fn test_cartesian_product_without_dedup() {
        let include_roots = strings(&["a/", "b/", "a/"]);
        let include_patterns = strings(&["P", "Q"]);
        let compiled = compile_patterns(&PatternInputs {
            include_roots: &include_roots,
            include_patterns: &include_patterns,
            ..PatternInputs::default()
        });

        assert_eq!(compiled.includes.len(), include_roots.len() * include_patterns.len());
        assert_eq!(
            compiled.includes,
            vec![".*a/P", ".*a/Q", ".*b/P", ".*b/Q", ".*a/P", ".*a/Q"]
        );
        // the root set is deduplicated
        assert_eq!(compiled.excludes, vec![".*a/", ".*b/"]);
    }

    #[test]
    fn test_include_patterns_without_roots() {
        let include_patterns = strings(&["Foo.*"]);
        let compiled = compile_patterns(&PatternInputs {
            include_patterns: &include_patterns,
            ..PatternInputs::default()
        });
        assert!(compiled.includes.is_empty());
        assert!(compiled.excludes.is_empty());
    }

    #[test]
    fn test_double_wildcard_collapses() {
        assert_eq!(compose_pattern(".*", "foo"), ".*foo");
        assert_eq!(compose_pattern("src/", ".*Test.java"), ".*src/.*Test.java");
        assert_eq!(compose_pattern("", ".*gen.*"), ".*gen.*");
    }

    #[test]
    fn test_collapse_is_single_pass() {
        // ".*" + ".*" + ".*x": the first pair collapses, the remainder is not rescanned
        assert_eq!(compose_pattern(".*", ".*x"), ".*.*x");
    }

    #[test]
    fn test_bare_root_not_collapsed() {
        let exclude_roots = strings(&[".*gen/"]);
        let compiled = compile_patterns(&PatternInputs {
            exclude_roots: &exclude_roots,
            ..PatternInputs::default()
        });
        assert_eq!(compiled.excludes, vec![".*.*gen/"]);
    }

    #[test]
    fn test_apply_to_rule_set() {
        let include_roots = strings(&["src/"]);
        let include_patterns = strings(&["A"]);
        let compiled = compile_patterns(&PatternInputs {
            include_roots: &include_roots,
            include_patterns: &include_patterns,
            ..PatternInputs::default()
        });

        let mut rule_set = RuleSet::new("r");
        compiled.apply_to(&mut rule_set);
        assert_eq!(rule_set.exclude_patterns, vec![".*src/"]);
        assert_eq!(rule_set.include_patterns, vec![".*src/A"]);
    }
}
