//! The workspace record and depth calculation.

use std::path::{Component, Path, PathBuf};

use serde::Serialize;

/// A discovered project root.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Workspace {
    /// Absolute path of the workspace directory
    pub path: PathBuf,
    /// Final path component, for display
    pub name: String,
    /// Free-text annotation, e.g. `Type: rust`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Relevance, only set when ranking by score
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Levels below the base path (0 = the base path itself)
    pub depth: usize,
    /// Whether a `.git` directory was found
    pub has_git: bool,
    /// Whether a manifest or custom marker was found
    #[serde(rename = "has_package")]
    pub has_package_file: bool,
}

impl Workspace {
    /// Create a workspace record for `path` at `depth`.
    pub fn new(path: impl Into<PathBuf>, depth: usize) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());

        Self {
            path,
            name,
            description: None,
            score: None,
            depth,
            has_git: false,
            has_package_file: false,
        }
    }

    /// Label for selection lists: the absolute path plus signal markers.
    pub fn label(&self) -> String {
        self.with_markers(self.path.to_string_lossy().into_owned())
    }

    /// Label relative to `base`, plus signal markers.
    pub fn label_with_base(&self, base: &Path) -> String {
        self.with_markers(self.relative_path(base))
    }

    /// Path relative to `base`, or the absolute path if it is not below `base`.
    pub fn relative_path(&self, base: &Path) -> String {
        match self.path.strip_prefix(base) {
            Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
            Ok(rel) => rel.to_string_lossy().into_owned(),
            Err(_) => self.path.to_string_lossy().into_owned(),
        }
    }

    fn with_markers(&self, mut label: String) -> String {
        if self.has_git {
            label.push_str(" [git]");
        }
        if self.has_package_file {
            label.push_str(" [pkg]");
        }
        label
    }
}

/// Lexically normalize a path: drop `.` components and fold `..` where possible.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Number of directory levels `target` lies below `base`.
///
/// Returns 0 when `target` equals `base`, and also when `target` is not
/// under `base` at all. The second case is a fallback, not a distance.
pub fn calculate_depth(base: impl AsRef<Path>, target: impl AsRef<Path>) -> usize {
    let base = normalize(base.as_ref());
    let target = normalize(target.as_ref());

    match target.strip_prefix(&base) {
        Ok(rel) => rel.components().count(),
        Err(_) => 0,
    }
}

/// Whether `target` is `base` or lies below it, compared lexically.
pub fn is_within(base: impl AsRef<Path>, target: impl AsRef<Path>) -> bool {
    normalize(target.as_ref()).starts_with(normalize(base.as_ref()))
}
