use super::{ResolvedLocation, ResourceResolver};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolves rule set names against the project directory and a list of
/// search directories standing in for the build plugin's classpath.
///
/// Lookup order:
/// 1. `http(s)://` names resolve to [`ResolvedLocation::Url`] unchecked
/// 2. `file:` URLs and absolute paths that exist
/// 3. the project directory, with a leading `/` stripped
/// 4. each search path, likewise
#[derive(Debug, Clone)]
pub struct SearchPathResolver {
    base_dir: PathBuf,
    search_paths: Vec<PathBuf>,
}

impl SearchPathResolver {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            search_paths: Vec::new(),
        }
    }

    pub fn with_search_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.search_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    fn existing_file(path: PathBuf) -> Option<ResolvedLocation> {
        if path.is_file() {
            Some(ResolvedLocation::File(path))
        } else {
            None
        }
    }
}

impl ResourceResolver for SearchPathResolver {
    fn resolve_location(&self, file_name: &str) -> Option<ResolvedLocation> {
        if file_name.starts_with("http://") || file_name.starts_with("https://") {
            return Some(ResolvedLocation::Url(file_name.to_string()));
        }

        if let Some(path) = file_name.strip_prefix("file:") {
            let path = path.strip_prefix("//").unwrap_or(path);
            return Self::existing_file(PathBuf::from(path));
        }

        let candidate = Path::new(file_name);
        if candidate.is_absolute() {
            if let Some(found) = Self::existing_file(candidate.to_path_buf()) {
                return Some(found);
            }
        }

        // classpath-style names like `/rulesets/java/basic.xml`
        let relative = file_name.trim_start_matches('/');
        if let Some(found) = Self::existing_file(self.base_dir.join(relative)) {
            return Some(found);
        }

        let found = self
            .search_paths
            .iter()
            .find_map(|dir| Self::existing_file(dir.join(relative)));

        if found.is_none() {
            debug!(file_name, "rule set not found on any search path");
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_project_dir_wins_over_search_path() {
        let project = tempfile::tempdir().unwrap();
        let classpath = tempfile::tempdir().unwrap();
        fs::write(project.path().join("rules.xml"), "<ruleset/>").unwrap();
        fs::write(classpath.path().join("rules.xml"), "<ruleset/>").unwrap();

        let resolver =
            SearchPathResolver::new(project.path()).with_search_paths([classpath.path()]);
        assert_eq!(
            resolver.resolve_location("rules.xml"),
            Some(ResolvedLocation::File(project.path().join("rules.xml")))
        );
    }

    #[test]
    fn test_search_path_strips_leading_slash() {
        let project = tempfile::tempdir().unwrap();
        let classpath = tempfile::tempdir().unwrap();
        fs::create_dir_all(classpath.path().join("rulesets/java")).unwrap();
        fs::write(classpath.path().join("rulesets/java/basic.xml"), "<ruleset/>").unwrap();

        let resolver =
            SearchPathResolver::new(project.path()).with_search_paths([classpath.path()]);
        assert_eq!(
            resolver.resolve_location("/rulesets/java/basic.xml"),
            Some(ResolvedLocation::File(
                classpath.path().join("rulesets/java/basic.xml")
            ))
        );
    }

    #[test]
    fn test_existing_absolute_path_wins() {
        let project = tempfile::tempdir().unwrap();
        let elsewhere = tempfile::tempdir().unwrap();
        let absolute = elsewhere.path().join("rules.xml");
        fs::write(&absolute, "<ruleset/>").unwrap();

        let resolver = SearchPathResolver::new(project.path());
        assert_eq!(
            resolver.resolve_location(absolute.to_str().unwrap()),
            Some(ResolvedLocation::File(absolute.clone()))
        );
    }

    #[test]
    fn test_classpath_name_found_in_project_dir() {
        let project = tempfile::tempdir().unwrap();
        fs::create_dir_all(project.path().join("rulesets/java")).unwrap();
        fs::write(project.path().join("rulesets/java/basic.xml"), "<ruleset/>").unwrap();

        let resolver = SearchPathResolver::new(project.path());
        assert_eq!(
            resolver.resolve_location("/rulesets/java/basic.xml"),
            Some(ResolvedLocation::File(project.path().join("rulesets/java/basic.xml")))
        );
    }

    #[test]
    fn test_missing_is_none() {
        let project = tempfile::tempdir().unwrap();
        let resolver = SearchPathResolver::new(project.path());
        assert_eq!(resolver.resolve_location("nope.xml"), None);
        assert_eq!(resolver.resolve_location("file:/definitely/not/here.xml"), None);
    }

    #[test]
    fn test_urls_resolve_without_lookup() {
        let resolver = SearchPathResolver::new("/nonexistent");
        assert_eq!(
            resolver.resolve_location("https://example.org/rules.xml"),
            Some(ResolvedLocation::Url("https://example.org/rules.xml".to_string()))
        );
    }
}
