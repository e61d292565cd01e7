//! Ignore patterns for pruning subtrees during traversal.

use std::path::Path;

use glob::Pattern;

use crate::error::PanamaError;
use crate::Result;

/// Glob rules that exclude a directory (and everything below it).
#[derive(Debug, Clone, Default)]
pub struct IgnoreFilter {
    /// Patterns matched against the full directory path
    pub patterns: Vec<Pattern>,
}

impl IgnoreFilter {
    /// Create an empty filter (nothing ignored).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a raw glob pattern, matched against the full path.
    pub fn pattern(mut self, pattern: &str) -> Result<Self> {
        let pat = Pattern::new(pattern).map_err(|e| PanamaError::InvalidGlob {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        self.patterns.push(pat);
        Ok(self)
    }

    /// Ignore every directory with this name, anywhere under the root.
    pub fn dir_name(self, name: &str) -> Result<Self> {
        self.pattern(&format!("**/{name}"))
    }

    /// Add multiple directory names.
    pub fn dir_names<S: AsRef<str>>(mut self, names: &[S]) -> Result<Self> {
        for name in names {
            self = self.dir_name(name.as_ref())?;
        }
        Ok(self)
    }

    /// First pattern matching `path`, if any.
    pub fn matching(&self, path: &Path) -> Option<&Pattern> {
        let path_str = path.to_string_lossy();
        self.patterns.iter().find(|p| p.matches(&path_str))
    }

    pub fn is_ignored(&self, path: &Path) -> bool {
        self.matching(path).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_ignores_nothing() {
        let filter = IgnoreFilter::new();
        assert!(filter.is_empty());
        assert!(!filter.is_ignored(Path::new("/r/node_modules")));
    }

    #[test]
    fn test_dir_name_matches_anywhere_under_root() {
        let filter = IgnoreFilter::new().dir_name("node_modules").unwrap();

        assert!(filter.is_ignored(Path::new("/r/node_modules")));
        assert!(filter.is_ignored(Path::new("/r/app/web/node_modules")));
        assert!(!filter.is_ignored(Path::new("/r/app")));
        assert!(!filter.is_ignored(Path::new("/r/node_modules_backup")));
    }

    #[test]
    fn test_dir_names_with_dot_prefix() {
        let filter = IgnoreFilter::new()
            .dir_names(&[".git", ".terraform", "target"])
            .unwrap();

        assert!(filter.is_ignored(Path::new("/r/a/.git")));
        assert!(filter.is_ignored(Path::new("/r/infra/.terraform")));
        assert!(filter.is_ignored(Path::new("/r/crate/target")));
        assert!(!filter.is_ignored(Path::new("/r/crate/src")));
    }

    #[test]
    fn test_matching_returns_first_pattern() {
        let filter = IgnoreFilter::new()
            .pattern("**/build")
            .unwrap()
            .pattern("**/b*")
            .unwrap();

        let pattern = filter.matching(Path::new("/r/build")).unwrap();
        assert_eq!(pattern.as_str(), "**/build");
    }

    #[test]
    fn test_invalid_pattern() {
        let result = IgnoreFilter::new().dir_name("[broken");

        assert!(result.is_err());
        if let Err(PanamaError::InvalidGlob { pattern, .. }) = result {
            assert_eq!(pattern, "**/[broken");
        } else {
            panic!("Expected InvalidGlob error");
        }
    }
}
