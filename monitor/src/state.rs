//! Shared run state for one monitoring session.

use std::path::PathBuf;

use tokio::sync::{RwLock, watch};

/// State shared across one monitoring run.
///
/// The continue flag and the registered path set are the only shared
/// mutable state in the core. Both are owned by the acknowledgment
/// controller and mutated only inside its critical section; everything
/// else reads them through these accessors.
pub struct MonitoringRunState {
    /// Whether monitoring should keep going. Defaults to true.
    continue_tx: watch::Sender<bool>,

    /// Directories being watched this run.
    registered: RwLock<Vec<PathBuf>>,
}

impl MonitoringRunState {
    /// Create run state with the continue flag raised.
    pub fn new() -> Self {
        let (continue_tx, _) = watch::channel(true);

        Self {
            continue_tx,
            registered: RwLock::new(Vec::new()),
        }
    }

    /// Current value of the continue flag.
    pub fn should_continue(&self) -> bool {
        *self.continue_tx.borrow()
    }

    /// Overwrite the continue flag.
    pub(crate) fn set_continue(&self, value: bool) {
        self.continue_tx.send_replace(value);
    }

    /// Subscribe to continue-flag changes.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.continue_tx.subscribe()
    }

    /// Record the directories registered for this run.
    pub(crate) async fn set_registered_paths(&self, paths: Vec<PathBuf>) {
        *self.registered.write().await = paths;
    }

    /// Directories registered for this run.
    pub async fn registered_paths(&self) -> Vec<PathBuf> {
        self.registered.read().await.clone()
    }
}

impl Default for MonitoringRunState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_flag_defaults_true() {
        let state = MonitoringRunState::new();
        assert!(state.should_continue());
    }

    #[tokio::test]
    async fn test_flag_changes_wake_subscribers() {
        let state = MonitoringRunState::new();
        let mut rx = state.subscribe();

        state.set_continue(false);
        rx.changed().await.unwrap();
        assert!(!*rx.borrow());
        assert!(!state.should_continue());
    }
}
