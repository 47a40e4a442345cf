//! Error types shared by the scan and organize phases.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while configuring, scanning or organizing a folder.
#[derive(Debug, Error)]
pub enum SortError {
    /// The folder to scan does not exist (or is not a directory).
    #[error("Folder not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Listing the folder or reading a file's metadata failed.
    #[error("Failed to scan {}: {source}", path.display())]
    Scan {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Creating a category folder failed.
    #[error("Failed to create directory {}: {source}", path.display())]
    CreateFolder {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Moving a file into its category folder failed.
    #[error("Failed to move {} to {}: {source}", from.display(), to.display())]
    Move {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    /// A category table handed to the override hook was rejected.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// An explicitly requested configuration file does not exist.
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    /// The configuration file is not valid TOML or has the wrong shape.
    #[error("Invalid configuration file: {0}")]
    ConfigInvalid(String),

    /// An ignore pattern could not be compiled.
    #[error("Invalid ignore pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// IO error while reading a configuration file.
    #[error("IO error reading configuration: {0}")]
    Io(String),
}

/// Result type for folder sorting operations.
pub type SortResult<T> = Result<T, SortError>;
