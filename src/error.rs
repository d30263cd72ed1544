//! Error types for the configuration core.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Crate-wide error type
#[derive(Debug, Error)]
pub enum DeckError {
    /// The shared store was already initialized with a different root.
    ///
    /// This signals a programming defect in the host, not a runtime
    /// condition worth recovering from.
    #[error("config store already initialized at {}; refusing to rebind to {}", .existing.display(), .requested.display())]
    RootConflict {
        existing: PathBuf,
        requested: PathBuf,
    },

    /// The user home directory could not be resolved.
    #[error("could not determine the user home directory")]
    NoHomeDir,

    /// Record identifiers become filenames; anything outside the safe set is rejected.
    #[error("invalid record name '{0}': only letters, digits, hyphens, and underscores are allowed")]
    InvalidName(String),

    /// A record with the same identifier already exists on disk.
    #[error("record already exists at {}", .0.display())]
    AlreadyExists(PathBuf),

    /// A joined path resolved outside the configuration directory.
    #[error("path {} escapes the configuration directory", .0.display())]
    PathEscape(PathBuf),

    /// Save target is a directory.
    #[error("cannot save to a directory: {}", .0.display())]
    NotAFile(PathBuf),

    /// Watcher setup or event delivery failure.
    #[error("watcher error: {0}")]
    Watch(String),

    /// A worker thread did not exit within the stop timeout.
    #[error("watcher did not stop within {0:?}")]
    WatchStopTimeout(Duration),

    /// Global subscriber installation failed (usually: already installed).
    #[error("logging setup failed: {0}")]
    Logging(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
