//! # panamalib
//!
//! Workspace discovery for the `panama` CLI: find project roots below a
//! directory and order them for selection.
//!
//! ## Overview
//!
//! A *workspace* is a directory that is a Git repository root or holds a
//! recognized manifest (`package.json`, `go.mod`, `Cargo.toml`, ...). The
//! collection pipeline:
//!
//! - **Detection**: decide whether one directory is a workspace and guess its ecosystem
//! - **Traversal**: walk search roots with depth and ignore-pattern pruning,
//!   never descending into a detected workspace
//! - **Ranking**: order results by relevance score or by path
//!
//! Nothing persists between runs.
//!
//! ## Example
//!
//! ```rust
//! use panamalib::{collect_workspaces, CollectOptions, Config};
//! use std::fs;
//! use tempfile::tempdir;
//!
//! let dir = tempdir().unwrap();
//! fs::create_dir_all(dir.path().join("api/.git")).unwrap();
//! fs::create_dir_all(dir.path().join("web")).unwrap();
//! fs::write(dir.path().join("web/package.json"), "{}").unwrap();
//!
//! let found = collect_workspaces(dir.path(), &Config::default(), &CollectOptions::new()).unwrap();
//! assert_eq!(found.len(), 2);
//!
//! let found = collect_workspaces(
//!     dir.path(),
//!     &Config::default(),
//!     &CollectOptions::new().query("web"),
//! )
//! .unwrap();
//! assert_eq!(found[0].name, "web");
//! ```

pub mod config;
pub mod detector;
pub mod error;
pub mod filter;
pub mod output;
pub mod pipeline;
pub mod ranking;
pub mod root;
pub mod traversal;
pub mod workspace;

pub use config::{load, Config, LoadedConfig, ScoreConfig, SortBy, Ui};
pub use detector::{classify, is_workspace, Detection, Detector, Ecosystem};
pub use error::PanamaError;
pub use filter::IgnoreFilter;
pub use output::{print_path, print_workspaces, Format};
pub use pipeline::{collect_workspaces, search_roots, CollectOptions};
pub use ranking::Ranking;
pub use root::find_root;
pub use workspace::{calculate_depth, is_within, Workspace};

/// Result type for panamalib operations
pub type Result<T> = std::result::Result<T, PanamaError>;
