//! Error types for the monitoring core.

use thiserror::Error;

/// Result type alias for monitor operations.
pub type Result<T> = std::result::Result<T, MonitorError>;

/// Errors that can occur in the monitoring core.
#[derive(Error, Debug)]
pub enum MonitorError {
    /// A decision was submitted while no acknowledgment session is open.
    #[error("no active acknowledgment session")]
    NoActiveSession,

    /// Watcher registration or startup failed.
    #[error(transparent)]
    Watch(#[from] vigil_watcher::WatchError),
}
