//! Acknowledgment sessions pairing one change with one decision.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vigil_watcher::ChangeEvent;

/// The operator's answer to a pending change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Keep monitoring after this change.
    Continue,

    /// Stop monitoring; the run ends once the session closes.
    Stop,
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Waiting for the operator.
    Pending,

    /// A decision has been recorded.
    Acknowledged,
}

/// One change event awaiting exactly one Continue/Stop decision.
///
/// Transitions `Pending -> Acknowledged` exactly once and is never
/// reused; at most one session is open at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcknowledgmentSession {
    /// The change this session concerns.
    pub event: ChangeEvent,

    /// Current lifecycle state.
    pub state: SessionState,

    /// The recorded decision. Valid only once acknowledged.
    pub decision: Option<Decision>,

    /// When the session was opened.
    pub opened_at: DateTime<Utc>,
}

impl AcknowledgmentSession {
    /// Open a session for a change event.
    pub fn open(event: ChangeEvent) -> Self {
        Self {
            event,
            state: SessionState::Pending,
            decision: None,
            opened_at: Utc::now(),
        }
    }

    /// Record the decision and close the session.
    pub fn acknowledge(&mut self, decision: Decision) {
        self.state = SessionState::Acknowledged;
        self.decision = Some(decision);
    }

    /// Whether the session is still waiting for a decision.
    pub fn is_pending(&self) -> bool {
        self.state == SessionState::Pending
    }

    /// Time since the change was detected.
    pub fn elapsed(&self) -> std::time::Duration {
        Utc::now()
            .signed_duration_since(self.event.detected_at)
            .to_std()
            .unwrap_or_default()
    }
}
