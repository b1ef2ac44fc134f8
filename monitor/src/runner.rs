//! Top-level monitoring lifecycle.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};
use vigil_watcher::PathWatcherSet;

use crate::controller::AcknowledgmentController;
use crate::escalation::EscalationConfig;
use crate::error::Result;
use crate::notice::MonitorNotice;

/// Owns one monitoring run: registers paths, starts the watcher set,
/// forwards its output into the acknowledgment controller, and stops
/// everything once a Stop decision lands.
///
/// A controller is single-use; the run ends permanently when the
/// continue flag drops. Create a fresh one for another run.
pub struct MonitorController {
    ack: Arc<AcknowledgmentController>,
}

impl MonitorController {
    /// Create a monitor and the notice stream its core emits into.
    pub fn new(escalation: EscalationConfig) -> (Self, mpsc::Receiver<MonitorNotice>) {
        let (ack, notices) = AcknowledgmentController::new(escalation);

        (
            Self {
                ack: Arc::new(ack),
            },
            notices,
        )
    }

    /// Handle for the acknowledgment collaborator: decisions and the
    /// focus-return signal go through this.
    pub fn acknowledger(&self) -> Arc<AcknowledgmentController> {
        self.ack.clone()
    }

    /// Watch the given directories until a Stop decision is made.
    ///
    /// Registration is fail-fast: any invalid path aborts the whole run
    /// before watching begins. Blocks the calling task until the continue
    /// flag drops and no session is pending; the watcher set is released
    /// exactly once on every exit path.
    pub async fn run(&self, paths: Vec<PathBuf>) -> Result<()> {
        let (event_tx, mut event_rx) = mpsc::channel(1024);
        let (fault_tx, mut fault_rx) = mpsc::channel(64);

        let mut watchers = PathWatcherSet::new(event_tx, fault_tx);
        for path in &paths {
            if let Err(err) = watchers.register(path) {
                watchers.stop();
                return Err(err.into());
            }
        }

        self.ack.state().set_registered_paths(paths).await;

        if let Err(err) = watchers.start() {
            watchers.stop();
            return Err(err.into());
        }

        // Fan watcher output into the controller. Watchers keep detecting
        // and queuing while a session is open; only session state is
        // serialized.
        let ack = self.ack.clone();
        let ingest = tokio::spawn(async move {
            loop {
                tokio::select! {
                    event = event_rx.recv() => match event {
                        Some(event) => ack.submit(event).await,
                        None => break,
                    },
                    fault = fault_rx.recv() => match fault {
                        Some(fault) => {
                            warn!(
                                "watch degraded on {}: {}",
                                fault.path.display(),
                                fault.detail
                            );
                            ack.report_degraded(fault).await;
                        }
                        None => break,
                    },
                }
            }
        });

        info!("monitoring started");

        // A Stop decision closes its session before lowering the flag, so
        // once the flag reads false no session is pending.
        let mut continue_rx = self.ack.state().subscribe();
        while *continue_rx.borrow_and_update() {
            if continue_rx.changed().await.is_err() {
                break;
            }
        }

        watchers.stop();
        ingest.abort();
        info!("monitoring session ended");

        Ok(())
    }
}
