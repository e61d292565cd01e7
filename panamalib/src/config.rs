//! Configuration file loading and validation.
//!
//! Config files are named `.panama.{yaml,yml,toml,json}`. Without an
//! explicit path, the nearest one found walking up from the root directory
//! is used. Missing keys fall back to [`Config::default`].

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::detector::Detector;
use crate::error::PanamaError;
use crate::filter::IgnoreFilter;
use crate::output::Format;
use crate::Result;

/// Config file names, in lookup priority within one directory.
pub const CONFIG_FILE_NAMES: &[&str] = &[
    ".panama.yaml",
    ".panama.yml",
    ".panama.toml",
    ".panama.json",
];

/// File written by `init`.
pub const DEFAULT_CONFIG_FILE: &str = ".panama.yaml";

/// Selection front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ui {
    /// Interactive fuzzy finder
    #[default]
    Fuzzyfinder,
    /// Numbered prompt on stdio
    Stdio,
}

/// Ordering key for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Relevance score, highest first
    #[default]
    Score,
    /// Absolute path, ascending
    Path,
}

/// Ranking weights.
///
/// Only `depth_penalty` is consumed; the access-history weights are
/// reserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    pub recent_access_weight: f64,
    pub frequency_weight: f64,
    pub depth_penalty: f64,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            recent_access_weight: 0.5,
            frequency_weight: 0.3,
            depth_penalty: 0.1,
        }
    }
}

/// Settings that control collection, ranking and output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ui: Ui,
    pub max_depth: usize,
    pub format: Format,
    pub silent: bool,
    pub no_cache: bool,
    /// Explicit sub-paths to search instead of the root directory
    pub workspaces: Vec<String>,
    /// Directory names pruned wherever they appear
    pub ignore_dirs: Vec<String>,
    /// Extra detection patterns (filenames or globs)
    pub patterns: Vec<String>,
    pub follow_symlinks: bool,
    pub sort: SortBy,
    pub score: ScoreConfig,
}

/// Directory names ignored by default.
pub fn default_ignore_dirs() -> Vec<String> {
    [
        "node_modules",
        ".git",
        "vendor",
        "target",
        "dist",
        "build",
        ".next",
        ".nuxt",
        ".cache",
        "__pycache__",
        ".terraform",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ui: Ui::default(),
            max_depth: 3,
            format: Format::Path,
            silent: false,
            no_cache: false,
            workspaces: Vec::new(),
            ignore_dirs: default_ignore_dirs(),
            patterns: Vec::new(),
            follow_symlinks: false,
            sort: SortBy::default(),
            score: ScoreConfig::default(),
        }
    }
}

impl Config {
    /// Parse a config file, choosing the format by extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| PanamaError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let parse_err = |message: String| PanamaError::ConfigParse {
            path: path.to_path_buf(),
            message,
        };

        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => {
                // An empty YAML document means "all defaults"
                if content.trim().is_empty() {
                    return Ok(Self::default());
                }
                serde_yaml::from_str(&content).map_err(|e| parse_err(e.to_string()))
            }
            Some("toml") => toml::from_str(&content).map_err(|e| parse_err(e.to_string())),
            Some("json") => serde_json::from_str(&content).map_err(|e| parse_err(e.to_string())),
            _ => Err(PanamaError::UnsupportedConfigFormat(path.to_path_buf())),
        }
    }

    /// Reject settings that cannot drive a collection run.
    pub fn validate(&self) -> Result<()> {
        if self.max_depth < 1 {
            return Err(PanamaError::InvalidConfig(
                "max_depth must be at least 1".to_string(),
            ));
        }
        self.ignore_filter()?;
        self.detector()?;
        Ok(())
    }

    /// Ignore filter built from `ignore_dirs`.
    pub fn ignore_filter(&self) -> Result<IgnoreFilter> {
        IgnoreFilter::new().dir_names(&self.ignore_dirs)
    }

    /// Detector with the configured custom patterns.
    pub fn detector(&self) -> Result<Detector> {
        Detector::new().patterns(&self.patterns)
    }

    /// Write a starter config file into `dir`.
    ///
    /// Fails with [`PanamaError::ConfigExists`] unless `force` is set.
    pub fn init_file(dir: impl AsRef<Path>, force: bool) -> Result<PathBuf> {
        let path = dir.as_ref().join(DEFAULT_CONFIG_FILE);
        if path.exists() && !force {
            return Err(PanamaError::ConfigExists(path));
        }

        let starter = StarterConfig::default();
        let yaml = serde_yaml::to_string(&starter).map_err(|e| PanamaError::ConfigParse {
            path: path.clone(),
            message: e.to_string(),
        })?;
        fs::write(&path, yaml)?;
        Ok(path)
    }
}

/// The subset of settings written by `init`.
#[derive(Debug, Serialize)]
struct StarterConfig {
    max_depth: usize,
    format: Format,
    ignore_dirs: Vec<String>,
}

impl Default for StarterConfig {
    fn default() -> Self {
        let config = Config::default();
        Self {
            max_depth: config.max_depth,
            format: config.format,
            ignore_dirs: config.ignore_dirs,
        }
    }
}

/// A config together with the file it came from.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub config: Config,
    /// `None` when defaults are in effect
    pub source: Option<PathBuf>,
}

impl LoadedConfig {
    /// Directory holding the config file, if one was loaded.
    pub fn config_dir(&self) -> Option<&Path> {
        self.source.as_deref().and_then(Path::parent)
    }
}

/// Find the nearest config file at or above `start`.
pub fn find_config_file(start: impl AsRef<Path>) -> Option<PathBuf> {
    start.as_ref().ancestors().find_map(config_file_in)
}

/// Config file directly inside `dir`, if any.
pub fn config_file_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
}

/// Load the explicit config path, or the nearest one above `root_dir`.
pub fn load(config_path: Option<&Path>, root_dir: &Path) -> Result<LoadedConfig> {
    let source = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => find_config_file(root_dir),
    };

    let config = match &source {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            Config::from_file(path)?
        }
        None => {
            debug!("no config file found, using defaults");
            Config::default()
        }
    };

    Ok(LoadedConfig { config, source })
}
