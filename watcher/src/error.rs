//! Error types for the path watcher set.

use thiserror::Error;

/// Result type alias for watcher operations.
pub type Result<T> = std::result::Result<T, WatchError>;

/// Errors that can occur while registering or running watches.
#[derive(Error, Debug)]
pub enum WatchError {
    /// Registration path does not exist or is not a directory.
    #[error("invalid path: {0} does not exist or is not a directory")]
    InvalidPath(String),

    /// Directory is already registered.
    #[error("already watching: {0}")]
    AlreadyWatching(String),

    /// The OS watch facility failed to initialize for a path.
    #[error("watch resource failure on {path}: {source}")]
    WatchResource {
        /// The directory whose watch could not be established.
        path: String,
        /// Underlying notify error.
        source: notify::Error,
    },

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
