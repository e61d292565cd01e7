//! Error types for panamalib

use std::path::PathBuf;
use thiserror::Error;

use crate::output::Format;

/// Errors that can occur while configuring or collecting workspaces
#[derive(Error, Debug)]
pub enum PanamaError {
    /// Invalid glob pattern (ignore dir or custom detection pattern)
    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },

    /// Configuration failed validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to read a configuration file
    #[error("failed to read config '{path}': {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Configuration file could not be deserialized
    #[error("failed to parse config '{path}': {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// Config file extension is not yaml/yml/toml/json
    #[error("unsupported config file format: {0}")]
    UnsupportedConfigFormat(PathBuf),

    /// Refused to overwrite an existing config file
    #[error("configuration file {0} already exists (use --force to overwrite)")]
    ConfigExists(PathBuf),

    /// Search root cannot be read at all
    #[error("cannot read search root '{path}': {source}")]
    RootUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Search root exists but is not a directory
    #[error("search root is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Unknown output format token
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// Format cannot render a list of workspaces
    #[error("format {0} is not supported for listing workspaces")]
    UnsupportedListFormat(Format),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
