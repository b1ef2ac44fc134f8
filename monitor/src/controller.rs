//! Serialized acknowledgment sessions over incoming change events.

use std::collections::VecDeque;

use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};
use vigil_watcher::{ChangeEvent, WatchFault};

use crate::error::{MonitorError, Result};
use crate::escalation::{EscalationConfig, EscalationTimer};
use crate::notice::MonitorNotice;
use crate::session::{AcknowledgmentSession, Decision};
use crate::state::MonitoringRunState;

/// Serializes change events into one-at-a-time acknowledgment sessions.
///
/// All session state lives behind a single mutex; `submit`, `decide` and
/// the focus-return signal never interleave. Events arriving while a
/// session is open are queued FIFO and dispatched as sessions close, as
/// long as the continue flag holds. The continue flag is updated strictly
/// before the next queued event can be dispatched.
pub struct AcknowledgmentController {
    inner: Mutex<ControllerInner>,
    state: MonitoringRunState,
    notice_tx: mpsc::Sender<MonitorNotice>,
}

struct ControllerInner {
    current: Option<AcknowledgmentSession>,
    queue: VecDeque<ChangeEvent>,
    timer: EscalationTimer,
}

impl AcknowledgmentController {
    /// Create a controller and the notice stream it emits into.
    pub fn new(escalation: EscalationConfig) -> (Self, mpsc::Receiver<MonitorNotice>) {
        let (notice_tx, notice_rx) = mpsc::channel(256);

        let controller = Self {
            inner: Mutex::new(ControllerInner {
                current: None,
                queue: VecDeque::new(),
                timer: EscalationTimer::new(escalation, notice_tx.clone()),
            }),
            state: MonitoringRunState::new(),
            notice_tx,
        };

        (controller, notice_rx)
    }

    /// Ingest a change event.
    ///
    /// Opens a session when idle, queues when one is already open, and
    /// drops the event when the run has been stopped.
    pub async fn submit(&self, event: ChangeEvent) {
        let mut inner = self.inner.lock().await;

        if !self.state.should_continue() {
            debug!("run stopped; dropping {} on {}", event.kind, event.path.display());
            return;
        }

        if inner.current.is_some() {
            debug!("session open; queuing {} on {}", event.kind, event.path.display());
            inner.queue.push_back(event);
            return;
        }

        self.open_session(&mut inner, event).await;
    }

    /// Resolve the open session with the operator's decision.
    ///
    /// Fails with [`MonitorError::NoActiveSession`] when no session is
    /// open; the continue flag is left untouched in that case.
    pub async fn decide(&self, decision: Decision) -> Result<()> {
        let mut inner = self.inner.lock().await;

        let Some(mut session) = inner.current.take() else {
            return Err(MonitorError::NoActiveSession);
        };

        session.acknowledge(decision);
        inner.timer.stop();

        // Flag update happens before the controller becomes eligible to
        // open the next session.
        self.state.set_continue(decision == Decision::Continue);

        info!(
            "session for {} acknowledged: {decision:?}",
            session.event.path.display()
        );
        self.emit(MonitorNotice::SessionClosed { decision }).await;

        match decision {
            Decision::Continue => {
                if let Some(next) = inner.queue.pop_front() {
                    self.open_session(&mut inner, next).await;
                }
            }
            Decision::Stop => {
                if !inner.queue.is_empty() {
                    info!(
                        "stop decided; {} queued events will not be dispatched",
                        inner.queue.len()
                    );
                }
            }
        }

        Ok(())
    }

    /// Signal that the operator's attention returned to the pending
    /// session. Raises the attention-escalation notice; a no-op when no
    /// session is open.
    pub async fn attention_returned(&self) {
        let inner = self.inner.lock().await;

        let Some(session) = inner.current.as_ref() else {
            debug!("attention returned with no open session");
            return;
        };

        self.emit(MonitorNotice::Escalation {
            event: session.event.clone(),
            elapsed: session.elapsed(),
        })
        .await;
    }

    /// Report a per-path watch failure to the collaborator.
    pub async fn report_degraded(&self, fault: WatchFault) {
        self.emit(MonitorNotice::WatchDegraded {
            path: fault.path,
            detail: fault.detail,
        })
        .await;
    }

    /// Whether no session is currently open.
    pub async fn is_idle(&self) -> bool {
        self.inner.lock().await.current.is_none()
    }

    /// Number of events waiting behind the open session.
    pub async fn queued(&self) -> usize {
        self.inner.lock().await.queue.len()
    }

    /// Shared run state.
    pub fn state(&self) -> &MonitoringRunState {
        &self.state
    }

    async fn open_session(&self, inner: &mut ControllerInner, event: ChangeEvent) {
        let session = AcknowledgmentSession::open(event);
        inner.timer.start(session.event.detected_at);

        info!(
            "session opened: {} on {}",
            session.event.kind,
            session.event.path.display()
        );
        self.emit(MonitorNotice::SessionOpened {
            event: session.event.clone(),
            message: session.event.message(),
            opened_at: session.opened_at,
        })
        .await;

        inner.current = Some(session);
    }

    async fn emit(&self, notice: MonitorNotice) {
        if self.notice_tx.send(notice).await.is_err() {
            warn!("notice receiver dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use vigil_watcher::ChangeKind;

    fn controller() -> (AcknowledgmentController, mpsc::Receiver<MonitorNotice>) {
        // Slow ticks keep Elapsed notices out of these assertions.
        let config = EscalationConfig::default().with_tick(Duration::from_secs(3600));
        AcknowledgmentController::new(config)
    }

    fn change(path: &str) -> ChangeEvent {
        ChangeEvent::new(ChangeKind::Created, path)
    }

    async fn next_notice(rx: &mut mpsc::Receiver<MonitorNotice>) -> MonitorNotice {
        tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("no notice within timeout")
            .expect("channel closed")
    }

    #[tokio::test]
    async fn test_submit_opens_session() {
        let (ctrl, mut notices) = controller();

        ctrl.submit(change("/a/x")).await;
        assert!(!ctrl.is_idle().await);

        match next_notice(&mut notices).await {
            MonitorNotice::SessionOpened { event, message, .. } => {
                assert_eq!(event.name, "x");
                assert_eq!(message, "Entry x Created!");
            }
            other => panic!("unexpected notice: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_events_queue_fifo_while_session_open() {
        let (ctrl, mut notices) = controller();

        ctrl.submit(change("/a/x")).await;
        ctrl.submit(change("/b/y")).await;
        ctrl.submit(change("/b/z")).await;
        assert_eq!(ctrl.queued().await, 2);

        // Only the first event has surfaced.
        assert!(matches!(
            next_notice(&mut notices).await,
            MonitorNotice::SessionOpened { event, .. } if event.name == "x"
        ));
        assert!(notices.try_recv().is_err());

        ctrl.decide(Decision::Continue).await.unwrap();
        assert!(matches!(
            next_notice(&mut notices).await,
            MonitorNotice::SessionClosed { decision: Decision::Continue }
        ));
        assert!(matches!(
            next_notice(&mut notices).await,
            MonitorNotice::SessionOpened { event, .. } if event.name == "y"
        ));

        ctrl.decide(Decision::Continue).await.unwrap();
        assert!(matches!(
            next_notice(&mut notices).await,
            MonitorNotice::SessionClosed { .. }
        ));
        assert!(matches!(
            next_notice(&mut notices).await,
            MonitorNotice::SessionOpened { event, .. } if event.name == "z"
        ));
    }

    #[tokio::test]
    async fn test_continue_updates_flag_and_returns_idle() {
        let (ctrl, _notices) = controller();

        ctrl.submit(change("/a/x")).await;
        ctrl.decide(Decision::Continue).await.unwrap();

        assert!(ctrl.state().should_continue());
        assert!(ctrl.is_idle().await);
    }

    #[tokio::test]
    async fn test_stop_drops_queue_and_lowers_flag() {
        let (ctrl, mut notices) = controller();

        ctrl.submit(change("/a/x")).await;
        ctrl.submit(change("/b/y")).await;

        ctrl.decide(Decision::Stop).await.unwrap();
        assert!(!ctrl.state().should_continue());
        assert!(ctrl.is_idle().await);

        // /b/y is never opened as a session.
        assert!(matches!(
            next_notice(&mut notices).await,
            MonitorNotice::SessionOpened { event, .. } if event.name == "x"
        ));
        assert!(matches!(
            next_notice(&mut notices).await,
            MonitorNotice::SessionClosed { decision: Decision::Stop }
        ));
        assert!(notices.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_decide_without_session_fails() {
        let (ctrl, _notices) = controller();

        let result = ctrl.decide(Decision::Stop).await;
        assert!(matches!(result, Err(MonitorError::NoActiveSession)));
        // Flag untouched.
        assert!(ctrl.state().should_continue());
    }

    #[tokio::test]
    async fn test_submit_after_stop_is_dropped() {
        let (ctrl, _notices) = controller();

        ctrl.submit(change("/a/x")).await;
        ctrl.decide(Decision::Stop).await.unwrap();

        ctrl.submit(change("/b/y")).await;
        assert!(ctrl.is_idle().await);
        assert_eq!(ctrl.queued().await, 0);
    }

    #[tokio::test]
    async fn test_attention_returned_escalates_pending_session() {
        let (ctrl, mut notices) = controller();

        ctrl.submit(change("/a/x")).await;
        let _ = next_notice(&mut notices).await;

        ctrl.attention_returned().await;
        assert!(matches!(
            next_notice(&mut notices).await,
            MonitorNotice::Escalation { event, .. } if event.name == "x"
        ));
    }

    #[tokio::test]
    async fn test_attention_returned_without_session_is_noop() {
        let (ctrl, mut notices) = controller();

        ctrl.attention_returned().await;
        assert!(notices.try_recv().is_err());
    }
}
