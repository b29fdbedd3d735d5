//! Error types for wasmforge-core

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in core operations
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read manifest '{}': {source}", .path.display())]
    ManifestRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse manifest '{}': {source}", .path.display())]
    ManifestParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Manifest '{}' is not a workspace (no [workspace] table)", .0.display())]
    NotAWorkspace(PathBuf),

    #[error("Manifest '{}' contains a [workspace] table but declares no members", .0.display())]
    NoMembers(PathBuf),

    #[error("Invalid member pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: glob::PatternError,
    },

    #[error("Failed to spawn '{tool}': {source}")]
    Spawn {
        tool: String,
        source: std::io::Error,
    },

    #[error("'{tool}' exited with status {code:?} in {}", .dir.display())]
    ToolFailed {
        tool: String,
        code: Option<i32>,
        dir: PathBuf,
    },

    #[error("Artifact collection failed for '{}': {message}", .path.display())]
    Collect { path: PathBuf, message: String },
}
