//! Per-directory watch handles and event fan-in.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::error::{Result, WatchError};
use crate::event::{ChangeEvent, ChangeKind};

/// A runtime failure of one directory's watch.
///
/// Fatal for that path only; the remaining watches keep running.
#[derive(Debug, Clone)]
pub struct WatchFault {
    /// The directory whose watch failed.
    pub path: PathBuf,

    /// What went wrong.
    pub detail: String,
}

/// Owns one non-recursive watcher per registered directory and funnels
/// every detected create/delete/rename into a single ingestion channel.
///
/// Events from different directories are forwarded in the order they
/// arrive at the channel; no stronger cross-path ordering is promised.
pub struct PathWatcherSet {
    /// Registered directories, in registration order.
    registered: Vec<PathBuf>,

    /// Live watch handles, one per directory.
    handles: HashMap<PathBuf, RecommendedWatcher>,

    /// Ingestion point for change events.
    event_tx: mpsc::Sender<ChangeEvent>,

    /// Per-path runtime fault reports.
    fault_tx: mpsc::Sender<WatchFault>,

    /// Whether watch handles are currently held.
    running: bool,
}

impl PathWatcherSet {
    /// Create a watcher set that dispatches into the given channels.
    pub fn new(event_tx: mpsc::Sender<ChangeEvent>, fault_tx: mpsc::Sender<WatchFault>) -> Self {
        Self {
            registered: Vec::new(),
            handles: HashMap::new(),
            event_tx,
            fault_tx,
            running: false,
        }
    }

    /// Register a directory for watching.
    ///
    /// Fails with [`WatchError::InvalidPath`] when the path does not exist
    /// or is not a directory, and with [`WatchError::AlreadyWatching`] on a
    /// duplicate registration. Existing contents are never scanned; only
    /// future changes are observed. When the set is already running the
    /// watch handle is acquired immediately, otherwise at [`start`].
    ///
    /// [`start`]: PathWatcherSet::start
    pub fn register(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if !path.is_dir() {
            return Err(WatchError::InvalidPath(path.display().to_string()));
        }

        if self.registered.iter().any(|p| p == path) {
            return Err(WatchError::AlreadyWatching(path.display().to_string()));
        }

        info!("registering directory: {}", path.display());
        self.registered.push(path.to_path_buf());

        if self.running {
            self.attach(path)?;
        }

        Ok(())
    }

    /// Acquire watch handles for every registered directory.
    ///
    /// On a partial failure all handles acquired so far are released
    /// before the error is returned.
    pub fn start(&mut self) -> Result<()> {
        if self.running {
            return Ok(());
        }

        for path in self.registered.clone() {
            if let Err(err) = self.attach(&path) {
                self.stop();
                return Err(err);
            }
        }

        self.running = true;
        info!("watching {} directories", self.registered.len());
        Ok(())
    }

    /// Release all watch handles. Idempotent: a second call is a no-op.
    pub fn stop(&mut self) {
        if self.handles.is_empty() && !self.running {
            return;
        }

        for (path, mut watcher) in self.handles.drain() {
            let _ = watcher.unwatch(&path);
            debug!("released watch: {}", path.display());
        }

        self.running = false;
        info!("watcher set stopped");
    }

    /// Whether watch handles are currently held.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Registered directories, in registration order.
    pub fn registered(&self) -> &[PathBuf] {
        &self.registered
    }

    /// Create and attach the watch handle for one directory.
    fn attach(&mut self, path: &Path) -> Result<()> {
        let event_tx = self.event_tx.clone();
        let fault_tx = self.fault_tx.clone();
        let root = path.to_path_buf();

        let mut watcher = notify::recommended_watcher(
            move |res: std::result::Result<notify::Event, notify::Error>| match res {
                Ok(event) => forward(&event_tx, &event),
                Err(err) => {
                    warn!("watch fault on {}: {err}", root.display());
                    let fault = WatchFault {
                        path: root.clone(),
                        detail: err.to_string(),
                    };
                    if fault_tx.blocking_send(fault).is_err() {
                        error!("fault receiver dropped");
                    }
                }
            },
        )
        .map_err(|source| WatchError::WatchResource {
            path: path.display().to_string(),
            source,
        })?;

        watcher
            .watch(path, RecursiveMode::NonRecursive)
            .map_err(|source| WatchError::WatchResource {
                path: path.display().to_string(),
                source,
            })?;

        debug!("started watching: {}", path.display());
        self.handles.insert(path.to_path_buf(), watcher);
        Ok(())
    }
}

/// Normalize a raw notify event and push the result into the ingestion
/// channel. Runs on notify's callback thread, hence the blocking sends.
fn forward(event_tx: &mpsc::Sender<ChangeEvent>, event: &notify::Event) {
    let Some(kind) = ChangeKind::from_notify(&event.kind) else {
        return;
    };

    // A rename reports both halves in one event; the last path is the
    // surviving name. Creates and deletes get one event per path.
    let paths: Vec<&PathBuf> = match kind {
        ChangeKind::Renamed => event.paths.last().into_iter().collect(),
        _ => event.paths.iter().collect(),
    };

    for path in paths {
        let change = ChangeEvent::new(kind, path);
        debug!("detected {} on {}", change.kind, change.path.display());
        if event_tx.blocking_send(change).is_err() {
            error!("event receiver dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn watcher_set() -> (
        PathWatcherSet,
        mpsc::Receiver<ChangeEvent>,
        mpsc::Receiver<WatchFault>,
    ) {
        let (event_tx, event_rx) = mpsc::channel(64);
        let (fault_tx, fault_rx) = mpsc::channel(8);
        (PathWatcherSet::new(event_tx, fault_tx), event_rx, fault_rx)
    }

    #[tokio::test]
    async fn test_register_directory() {
        let temp = TempDir::new().unwrap();
        let (mut set, _events, _faults) = watcher_set();

        set.register(temp.path()).unwrap();
        assert_eq!(set.registered(), [temp.path().to_path_buf()]);
        assert!(!set.is_running());
    }

    #[tokio::test]
    async fn test_register_nonexistent_path() {
        let (mut set, _events, _faults) = watcher_set();

        let result = set.register("/does/not/exist");
        assert!(matches!(result, Err(WatchError::InvalidPath(_))));
        assert!(set.registered().is_empty());
    }

    #[tokio::test]
    async fn test_register_file_is_invalid() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("plain.txt");
        std::fs::write(&file, b"x").unwrap();

        let (mut set, _events, _faults) = watcher_set();
        let result = set.register(&file);
        assert!(matches!(result, Err(WatchError::InvalidPath(_))));
    }

    #[tokio::test]
    async fn test_register_duplicate() {
        let temp = TempDir::new().unwrap();
        let (mut set, _events, _faults) = watcher_set();

        set.register(temp.path()).unwrap();
        let result = set.register(temp.path());
        assert!(matches!(result, Err(WatchError::AlreadyWatching(_))));
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let (mut set, _events, _faults) = watcher_set();

        set.register(temp.path()).unwrap();
        set.start().unwrap();
        assert!(set.is_running());

        set.stop();
        assert!(!set.is_running());
        // Second stop releases nothing and never errors.
        set.stop();
        assert!(!set.is_running());
    }

    #[tokio::test]
    async fn test_create_yields_one_event() {
        let temp = TempDir::new().unwrap();
        let (mut set, mut events, _faults) = watcher_set();

        set.register(temp.path()).unwrap();
        set.start().unwrap();

        let target = temp.path().join("fresh.txt");
        std::fs::write(&target, b"hello").unwrap();

        let change = tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("no event within timeout")
            .expect("channel closed");

        assert_eq!(change.kind, ChangeKind::Created);
        assert_eq!(change.name, "fresh.txt");
        assert_eq!(change.path, target);

        set.stop();
    }

    #[tokio::test]
    async fn test_rename_yields_single_event() {
        let temp = TempDir::new().unwrap();
        let old = temp.path().join("before.txt");
        std::fs::write(&old, b"x").unwrap();

        let (mut set, mut events, _faults) = watcher_set();
        set.register(temp.path()).unwrap();
        set.start().unwrap();

        let new = temp.path().join("after.txt");
        std::fs::rename(&old, &new).unwrap();

        let change = tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("no event within timeout")
            .expect("channel closed");

        assert_eq!(change.kind, ChangeKind::Renamed);
        assert_eq!(change.name, "after.txt");

        // The From half of the rename must not surface as a second event.
        let extra = tokio::time::timeout(Duration::from_millis(500), events.recv()).await;
        assert!(extra.is_err());

        set.stop();
    }
}
