//! Workspace detection: decide whether a single directory is a project root.
//!
//! A directory is a workspace when it has a `.git` directory, contains one of
//! the built-in manifest files, or matches one of the caller's custom
//! patterns. Only the directory itself is inspected, never its subtree.

use std::cell::OnceCell;
use std::fmt;
use std::fs;
use std::path::Path;

use glob::Pattern;
use tracing::trace;

use crate::error::PanamaError;
use crate::Result;

/// Project ecosystem inferred from the manifest file that matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ecosystem {
    Node,
    Deno,
    Go,
    Rust,
    Python,
    Terraform,
    Ruby,
    Java,
    Php,
    Elixir,
    Dotnet,
    Make,
    Just,
}

impl Ecosystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            Ecosystem::Node => "node",
            Ecosystem::Deno => "deno",
            Ecosystem::Go => "go",
            Ecosystem::Rust => "rust",
            Ecosystem::Python => "python",
            Ecosystem::Terraform => "terraform",
            Ecosystem::Ruby => "ruby",
            Ecosystem::Java => "java",
            Ecosystem::Php => "php",
            Ecosystem::Elixir => "elixir",
            Ecosystem::Dotnet => "dotnet",
            Ecosystem::Make => "make",
            Ecosystem::Just => "just",
        }
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primary manifests, checked in this order for classification.
const MANIFESTS: &[(&str, Ecosystem)] = &[
    ("package.json", Ecosystem::Node),
    ("deno.json", Ecosystem::Deno),
    ("go.mod", Ecosystem::Go),
    ("Cargo.toml", Ecosystem::Rust),
    ("pyproject.toml", Ecosystem::Python),
    ("setup.py", Ecosystem::Python),
    ("terraform.tf", Ecosystem::Terraform),
    ("main.tf", Ecosystem::Terraform),
    ("Gemfile", Ecosystem::Ruby),
    ("pom.xml", Ecosystem::Java),
    ("build.gradle", Ecosystem::Java),
    ("build.gradle.kts", Ecosystem::Java),
    ("composer.json", Ecosystem::Php),
    ("mix.exs", Ecosystem::Elixir),
    ("*.sln", Ecosystem::Dotnet),
    ("*.csproj", Ecosystem::Dotnet),
];

/// Generic build files, only consulted when no primary manifest matched.
const SECONDARY_MARKERS: &[(&str, Ecosystem)] = &[
    ("Makefile", Ecosystem::Make),
    ("justfile", Ecosystem::Just),
    ("Justfile", Ecosystem::Just),
];

/// Name of the VCS metadata directory.
const GIT_DIR: &str = ".git";

fn has_glob_chars(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// A filename or a single-level glob.
#[derive(Debug, Clone)]
enum Marker {
    Literal(String),
    Glob(Pattern),
}

impl Marker {
    fn parse(pattern: &str) -> Result<Self> {
        if has_glob_chars(pattern) {
            let pat = Pattern::new(pattern).map_err(|e| PanamaError::InvalidGlob {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?;
            Ok(Marker::Glob(pat))
        } else {
            Ok(Marker::Literal(pattern.to_string()))
        }
    }

    fn matches_in(&self, dir: &DirListing<'_>) -> bool {
        match self {
            Marker::Literal(name) => dir.path.join(name).exists(),
            Marker::Glob(pattern) => dir.names().iter().any(|name| pattern.matches(name)),
        }
    }
}

/// File names of one directory, read at most once per detection.
struct DirListing<'a> {
    path: &'a Path,
    names: OnceCell<Vec<String>>,
}

impl<'a> DirListing<'a> {
    fn new(path: &'a Path) -> Self {
        Self {
            path,
            names: OnceCell::new(),
        }
    }

    /// Empty when the directory cannot be read.
    fn names(&self) -> &[String] {
        self.names.get_or_init(|| {
            fs::read_dir(self.path)
                .map(|entries| {
                    entries
                        .flatten()
                        .map(|e| e.file_name().to_string_lossy().into_owned())
                        .collect()
                })
                .unwrap_or_default()
        })
    }
}

/// Built-in markers compiled in classification order.
fn builtin_markers() -> Vec<(Marker, Ecosystem)> {
    MANIFESTS
        .iter()
        .chain(SECONDARY_MARKERS)
        .filter_map(|(pattern, eco)| Marker::parse(pattern).ok().map(|m| (m, *eco)))
        .collect()
}

/// Which signals fired for a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Detection {
    pub has_git: bool,
    pub has_package_file: bool,
    pub ecosystem: Option<Ecosystem>,
}

impl Detection {
    pub fn is_workspace(&self) -> bool {
        self.has_git || self.has_package_file
    }

    /// Description recorded on the workspace, e.g. `Type: go`.
    pub fn description(&self) -> Option<String> {
        self.ecosystem.map(|eco| format!("Type: {eco}"))
    }
}

/// Workspace predicate with optional custom patterns.
///
/// Custom patterns are additive: the `.git` check and built-in manifests
/// always apply. All markers are compiled once, at construction.
#[derive(Debug, Clone)]
pub struct Detector {
    builtin: Vec<(Marker, Ecosystem)>,
    custom: Vec<Marker>,
}

impl Default for Detector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector {
    /// Detector with only the built-in checks.
    pub fn new() -> Self {
        Self {
            builtin: builtin_markers(),
            custom: Vec::new(),
        }
    }

    /// Add a custom pattern: a literal filename or a glob like `*.tf`.
    pub fn pattern(mut self, pattern: &str) -> Result<Self> {
        self.custom.push(Marker::parse(pattern)?);
        Ok(self)
    }

    /// Add multiple custom patterns.
    pub fn patterns<S: AsRef<str>>(mut self, patterns: &[S]) -> Result<Self> {
        for pattern in patterns {
            self = self.pattern(pattern.as_ref())?;
        }
        Ok(self)
    }

    /// Inspect `dir`. A missing or unreadable directory yields no signals.
    pub fn detect(&self, dir: &Path) -> Detection {
        let listing = DirListing::new(dir);
        let has_git = has_git_dir(dir);
        let ecosystem = self.classify_listing(&listing);
        let has_package_file =
            ecosystem.is_some() || self.custom.iter().any(|m| m.matches_in(&listing));

        let detection = Detection {
            has_git,
            has_package_file,
            ecosystem,
        };
        trace!(dir = %dir.display(), ?detection, "detect");
        detection
    }

    pub fn is_workspace(&self, dir: &Path) -> bool {
        self.detect(dir).is_workspace()
    }

    /// Classify `dir` by the first built-in marker it contains.
    pub fn classify(&self, dir: &Path) -> Option<Ecosystem> {
        self.classify_listing(&DirListing::new(dir))
    }

    fn classify_listing(&self, listing: &DirListing<'_>) -> Option<Ecosystem> {
        self.builtin
            .iter()
            .find(|(marker, _)| marker.matches_in(listing))
            .map(|(_, eco)| *eco)
    }
}

/// Whether `dir` contains a `.git` directory.
pub fn has_git_dir(dir: &Path) -> bool {
    dir.join(GIT_DIR).is_dir()
}

/// Whether `dir` contains any built-in manifest or generic build file.
pub fn has_package_file(dir: &Path) -> bool {
    classify(dir).is_some()
}

/// Classify `dir` by the first built-in manifest it contains.
///
/// Primary manifests are tried in declaration order, then the generic
/// build files.
pub fn classify(dir: &Path) -> Option<Ecosystem> {
    Detector::new().classify(dir)
}

/// Check a directory with the built-in rules only.
pub fn is_workspace(dir: &Path) -> bool {
    Detector::new().is_workspace(dir)
}
