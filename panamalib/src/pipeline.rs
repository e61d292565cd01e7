//! High-level collection API.
//!
//! Resolves the effective depth and search roots from the config, walks
//! them, and orders the result with the configured ranking policy.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::Config;
use crate::ranking::Ranking;
use crate::traversal::{collect, collect_from_root, TraversalConfig, VisitedSet};
use crate::workspace::Workspace;
use crate::Result;

/// Per-call overrides for a collection run.
#[derive(Debug, Clone, Default)]
pub struct CollectOptions {
    /// Query used for score bonuses
    pub query: Option<String>,
    /// Overrides `Config::max_depth` when positive
    pub max_depth: Option<usize>,
    /// Accepted for CLI compatibility; nothing is cached between runs
    pub no_cache: bool,
}

impl CollectOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the search query.
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Override the max depth. Zero keeps the configured default.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn no_cache(mut self, no_cache: bool) -> Self {
        self.no_cache = no_cache;
        self
    }

    /// Depth in effect for `config`.
    pub fn effective_max_depth(&self, config: &Config) -> usize {
        match self.max_depth {
            Some(depth) if depth > 0 => depth,
            _ => config.max_depth,
        }
    }
}

/// Search roots for `config`: the explicit `workspaces` resolved against
/// `root_dir`, or `root_dir` alone.
pub fn search_roots(root_dir: &Path, config: &Config) -> Vec<PathBuf> {
    if config.workspaces.is_empty() {
        return vec![root_dir.to_path_buf()];
    }
    config
        .workspaces
        .iter()
        .map(|ws| {
            let path = Path::new(ws);
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                root_dir.join(path)
            }
        })
        .collect()
}

/// Collect and order the workspaces under `root_dir`.
///
/// An empty result is not an error. With explicit `workspaces`, roots that
/// cannot be walked are skipped; without them, an unreadable `root_dir` is
/// returned as an error.
///
/// # Example
///
/// ```rust,ignore
/// use panamalib::{collect_workspaces, CollectOptions, Config};
///
/// let config = Config::default();
/// let found = collect_workspaces("/home/me/src", &config, &CollectOptions::new().query("api"))?;
/// ```
pub fn collect_workspaces(
    root_dir: impl AsRef<Path>,
    config: &Config,
    options: &CollectOptions,
) -> Result<Vec<Workspace>> {
    let root_dir = root_dir.as_ref();
    let max_depth = options.effective_max_depth(config);
    let ignore = config.ignore_filter()?;
    let detector = config.detector()?;

    if options.no_cache {
        debug!("no_cache set; there is no cache to bypass");
    }

    let traversal = TraversalConfig {
        base: root_dir,
        max_depth,
        ignore: &ignore,
        detector: &detector,
        follow_links: config.follow_symlinks,
    };

    let mut workspaces = if config.workspaces.is_empty() {
        let mut visited = VisitedSet::new();
        let mut found = Vec::new();
        collect_from_root(root_dir, &traversal, &mut visited, &mut found)?;
        found
    } else {
        collect(&search_roots(root_dir, config), &traversal)
    };

    debug!(count = workspaces.len(), max_depth, "collected workspaces");

    let ranking = Ranking::new(config.sort, &config.score, options.query.as_deref());
    ranking.apply(&mut workspaces);

    Ok(workspaces)
}
