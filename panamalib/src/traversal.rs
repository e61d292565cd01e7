//! Depth-bounded directory walk that collects workspace roots.
//!
//! The walk is pre-order. At every directory it checks, in order: already
//! visited, deeper than the max depth, ignored, and finally the detector.
//! A detected workspace is not descended into unless it is the search root.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace, warn};
use walkdir::WalkDir;

use crate::detector::Detector;
use crate::error::PanamaError;
use crate::filter::IgnoreFilter;
use crate::workspace::{calculate_depth, is_within, Workspace};
use crate::Result;

/// Parameters shared by every root walked in one collection run.
#[derive(Debug, Clone)]
pub struct TraversalConfig<'a> {
    /// Path depth is measured from
    pub base: &'a Path,
    /// Deepest level (relative to `base`) that is inspected
    pub max_depth: usize,
    pub ignore: &'a IgnoreFilter,
    pub detector: &'a Detector,
    /// Follow symlinked directories
    pub follow_links: bool,
}

/// Directories already examined in one run.
///
/// Keys are canonical paths so symlink cycles and overlapping roots
/// resolve to the same entry. Owned by a single collection call.
#[derive(Debug, Default)]
pub struct VisitedSet {
    seen: HashSet<PathBuf>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path`; returns false if it was already present.
    pub fn insert(&mut self, path: &Path) -> bool {
        let key = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        self.seen.insert(key)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Check that `root` can be walked at all.
fn check_root(root: &Path) -> Result<()> {
    let metadata = fs::metadata(root).map_err(|source| PanamaError::RootUnreadable {
        path: root.to_path_buf(),
        source,
    })?;
    if !metadata.is_dir() {
        return Err(PanamaError::NotADirectory(root.to_path_buf()));
    }
    fs::read_dir(root).map_err(|source| PanamaError::RootUnreadable {
        path: root.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Walk one search root, appending workspaces to `out`.
///
/// Depth is measured from `config.base` when `root` lies under it, and
/// from `root` otherwise. Fails only when `root` itself cannot be read.
/// Errors on entries below the root are logged and skipped.
pub fn collect_from_root(
    root: &Path,
    config: &TraversalConfig<'_>,
    visited: &mut VisitedSet,
    out: &mut Vec<Workspace>,
) -> Result<()> {
    check_root(root)?;

    let base = if is_within(config.base, root) {
        config.base
    } else {
        debug!(root = %root.display(), "root outside base; depth measured from root");
        root
    };

    let mut walker = WalkDir::new(root)
        .follow_links(config.follow_links)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                debug!(%err, "skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        let is_search_root = entry.depth() == 0;

        if !visited.insert(path) {
            trace!(path = %path.display(), "already visited");
            if !is_search_root {
                walker.skip_current_dir();
            } else {
                break;
            }
            continue;
        }

        let depth = calculate_depth(base, path);
        if depth > config.max_depth {
            trace!(path = %path.display(), depth, "beyond max depth");
            if is_search_root {
                break;
            }
            walker.skip_current_dir();
            continue;
        }

        if let Some(pattern) = config.ignore.matching(path) {
            debug!(path = %path.display(), pattern = pattern.as_str(), "ignored");
            if is_search_root {
                break;
            }
            walker.skip_current_dir();
            continue;
        }

        let detection = config.detector.detect(path);
        let found = detection.is_workspace();
        if found {
            let mut workspace = Workspace::new(path, depth);
            workspace.description = detection.description();
            workspace.has_git = detection.has_git;
            workspace.has_package_file = detection.has_package_file;
            debug!(path = %path.display(), depth, "found workspace");
            out.push(workspace);
        }

        // Nothing below the max depth can qualify; workspaces are not
        // searched for nested workspaces except at the search root.
        if !is_search_root && (found || depth == config.max_depth) {
            walker.skip_current_dir();
        } else if is_search_root && depth == config.max_depth {
            break;
        }
    }

    Ok(())
}

/// Walk several roots with one shared visited set.
///
/// A root that cannot be walked is logged and skipped.
pub fn collect(roots: &[PathBuf], config: &TraversalConfig<'_>) -> Vec<Workspace> {
    let mut visited = VisitedSet::new();
    let mut workspaces = Vec::new();

    for root in roots {
        if let Err(err) = collect_from_root(root, config, &mut visited, &mut workspaces) {
            warn!(root = %root.display(), %err, "skipping search root");
        }
    }

    workspaces
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn paths(workspaces: &[Workspace]) -> Vec<PathBuf> {
        workspaces.iter().map(|w| w.path.clone()).collect()
    }

    fn walk(root: &Path, max_depth: usize, ignore: &IgnoreFilter) -> Vec<Workspace> {
        let detector = Detector::new();
        let config = TraversalConfig {
            base: root,
            max_depth,
            ignore,
            detector: &detector,
            follow_links: false,
        };
        let mut visited = VisitedSet::new();
        let mut out = Vec::new();
        collect_from_root(root, &config, &mut visited, &mut out).unwrap();
        out
    }

    /// /r/a has .git, /r/a/b has package.json, /r/c is empty.
    fn scenario_tree() -> tempfile::TempDir {
        let temp = tempdir().unwrap();
        let r = temp.path();
        fs::create_dir_all(r.join("a/.git")).unwrap();
        fs::create_dir_all(r.join("a/b")).unwrap();
        fs::write(r.join("a/b/package.json"), "{}").unwrap();
        fs::create_dir_all(r.join("c")).unwrap();
        temp
    }

    #[test]
    fn test_workspace_subtree_is_not_searched() {
        let temp = scenario_tree();
        let found = walk(temp.path(), 3, &IgnoreFilter::new());

        assert_eq!(paths(&found), vec![temp.path().join("a")]);
        assert_eq!(found[0].depth, 1);
        assert!(found[0].has_git);
        assert!(!found[0].has_package_file);
    }

    #[test]
    fn test_ignored_directory_prunes_subtree() {
        let temp = scenario_tree();
        let ignore = IgnoreFilter::new().dir_name("a").unwrap();
        let found = walk(temp.path(), 3, &ignore);

        assert!(found.is_empty());
    }

    #[test]
    fn test_max_depth_bounds_results() {
        let temp = tempdir().unwrap();
        let r = temp.path();
        fs::create_dir_all(r.join("x/y/shallow")).unwrap();
        fs::write(r.join("x/y/shallow/go.mod"), "module s").unwrap();
        fs::create_dir_all(r.join("x/y/z/deep")).unwrap();
        fs::write(r.join("x/y/z/deep/go.mod"), "module d").unwrap();

        let found = walk(r, 3, &IgnoreFilter::new());
        assert_eq!(paths(&found), vec![r.join("x/y/shallow")]);

        let found = walk(r, 2, &IgnoreFilter::new());
        assert!(found.is_empty());

        let found = walk(r, 4, &IgnoreFilter::new());
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|w| w.depth <= 4));
    }

    #[test]
    fn test_search_root_workspace_is_entered() {
        let temp = tempdir().unwrap();
        let r = temp.path();
        fs::create_dir_all(r.join(".git")).unwrap();
        fs::create_dir_all(r.join("packages/web")).unwrap();
        fs::write(r.join("packages/web/package.json"), "{}").unwrap();

        let ignore = IgnoreFilter::new().dir_name(".git").unwrap();
        let found = walk(r, 3, &ignore);

        assert_eq!(paths(&found), vec![r.to_path_buf(), r.join("packages/web")]);
        assert_eq!(found[0].depth, 0);
        assert_eq!(found[1].description.as_deref(), Some("Type: node"));
    }

    #[test]
    fn test_max_depth_zero_still_tests_root() {
        let temp = tempdir().unwrap();
        let r = temp.path();
        fs::write(r.join("Cargo.toml"), "[package]").unwrap();
        fs::create_dir_all(r.join("sub")).unwrap();
        fs::write(r.join("sub/go.mod"), "module s").unwrap();

        let found = walk(r, 0, &IgnoreFilter::new());
        assert_eq!(paths(&found), vec![r.to_path_buf()]);
    }

    #[test]
    fn test_files_are_never_recorded() {
        let temp = tempdir().unwrap();
        let r = temp.path();
        fs::create_dir_all(r.join("proj")).unwrap();
        fs::write(r.join("proj/go.mod"), "module p").unwrap();
        fs::write(r.join("notes.txt"), "").unwrap();

        let found = walk(r, 3, &IgnoreFilter::new());
        assert_eq!(paths(&found), vec![r.join("proj")]);
    }

    #[test]
    fn test_overlapping_roots_yield_one_record() {
        let temp = tempdir().unwrap();
        let r = temp.path();
        fs::create_dir_all(r.join("apps/api")).unwrap();
        fs::write(r.join("apps/api/go.mod"), "module api").unwrap();

        let detector = Detector::new();
        let ignore = IgnoreFilter::new();
        let config = TraversalConfig {
            base: r,
            max_depth: 3,
            ignore: &ignore,
            detector: &detector,
            follow_links: false,
        };

        let roots = vec![r.join("apps"), r.join("apps/api"), r.join("apps")];
        let found = collect(&roots, &config);
        assert_eq!(paths(&found), vec![r.join("apps/api")]);
        assert_eq!(found[0].depth, 2);
    }

    #[test]
    fn test_root_outside_base_keeps_depth_bound() {
        let base = tempdir().unwrap();
        let outside = tempdir().unwrap();
        let o = outside.path();
        fs::create_dir_all(o.join("near")).unwrap();
        fs::write(o.join("near/go.mod"), "module n").unwrap();
        fs::create_dir_all(o.join("a/b/c/d/e/proj")).unwrap();
        fs::write(o.join("a/b/c/d/e/proj/go.mod"), "module p").unwrap();

        let detector = Detector::new();
        let ignore = IgnoreFilter::new();
        let config = TraversalConfig {
            base: base.path(),
            max_depth: 2,
            ignore: &ignore,
            detector: &detector,
            follow_links: false,
        };

        let found = collect(&[o.to_path_buf()], &config);
        assert_eq!(paths(&found), vec![o.join("near")]);
        assert_eq!(found[0].depth, 1);
    }

    #[test]
    fn test_missing_root_is_skipped_by_collect() {
        let temp = tempdir().unwrap();
        let r = temp.path();
        fs::create_dir_all(r.join("real/.git")).unwrap();

        let detector = Detector::new();
        let ignore = IgnoreFilter::new().dir_name(".git").unwrap();
        let config = TraversalConfig {
            base: r,
            max_depth: 3,
            ignore: &ignore,
            detector: &detector,
            follow_links: false,
        };

        let roots = vec![r.join("missing"), r.join("real")];
        let found = collect(&roots, &config);
        assert_eq!(paths(&found), vec![r.join("real")]);
    }

    #[test]
    fn test_missing_root_is_an_error_when_walked_directly() {
        let temp = tempdir().unwrap();
        let detector = Detector::new();
        let ignore = IgnoreFilter::new();
        let config = TraversalConfig {
            base: temp.path(),
            max_depth: 3,
            ignore: &ignore,
            detector: &detector,
            follow_links: false,
        };
        let mut visited = VisitedSet::new();
        let mut out = Vec::new();

        let result = collect_from_root(
            &temp.path().join("missing"),
            &config,
            &mut visited,
            &mut out,
        );
        assert!(matches!(result, Err(PanamaError::RootUnreadable { .. })));

        let file = temp.path().join("file.txt");
        fs::write(&file, "").unwrap();
        let result = collect_from_root(&file, &config, &mut visited, &mut out);
        assert!(matches!(result, Err(PanamaError::NotADirectory(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_cycle_terminates() {
        let temp = tempdir().unwrap();
        let r = temp.path();
        fs::create_dir_all(r.join("loop/proj")).unwrap();
        fs::write(r.join("loop/proj/go.mod"), "module p").unwrap();
        std::os::unix::fs::symlink(r.join("loop"), r.join("loop/back")).unwrap();

        let detector = Detector::new();
        let ignore = IgnoreFilter::new();
        let config = TraversalConfig {
            base: r,
            max_depth: 10,
            ignore: &ignore,
            detector: &detector,
            follow_links: true,
        };

        let found = collect(&[r.to_path_buf()], &config);
        assert_eq!(paths(&found), vec![r.join("loop/proj")]);
    }

    #[test]
    fn test_visited_set_deduplicates() {
        let temp = tempdir().unwrap();
        let mut visited = VisitedSet::new();
        assert!(visited.is_empty());
        assert!(visited.insert(temp.path()));
        assert!(!visited.insert(&temp.path().join(".")));
        assert_eq!(visited.len(), 1);
    }
}
