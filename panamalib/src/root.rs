//! Locate the enclosing project root of a directory.

use std::path::{Path, PathBuf};

use crate::config::config_file_in;
use crate::detector::has_git_dir;

/// Nearest directory at or above `start` holding a panama config file
/// or a `.git` directory.
///
/// Within one directory a config file wins over `.git`; the nearest
/// directory with either wins overall.
pub fn find_root(start: impl AsRef<Path>) -> Option<PathBuf> {
    start
        .as_ref()
        .ancestors()
        .find(|dir| config_file_in(dir).is_some() || has_git_dir(dir))
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_config_in_parent() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join(".panama.yaml"), "max_depth: 5\n").unwrap();
        let sub = temp.path().join("subdir");
        fs::create_dir_all(&sub).unwrap();

        assert_eq!(find_root(&sub), Some(temp.path().to_path_buf()));
        assert_eq!(find_root(temp.path()), Some(temp.path().to_path_buf()));
    }

    #[test]
    fn test_git_dir_fallback() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join(".git")).unwrap();
        let sub = temp.path().join("a/b");
        fs::create_dir_all(&sub).unwrap();

        assert_eq!(find_root(&sub), Some(temp.path().to_path_buf()));
    }

    #[test]
    fn test_nearest_marker_wins() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join(".panama.yaml"), "").unwrap();
        let repo = temp.path().join("repo");
        fs::create_dir_all(repo.join(".git")).unwrap();
        fs::create_dir_all(repo.join("src")).unwrap();

        assert_eq!(find_root(repo.join("src")), Some(repo));
    }
}
