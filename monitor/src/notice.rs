//! Notices emitted by the core for an external collaborator to render.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vigil_watcher::ChangeEvent;

use crate::session::Decision;

/// What the monitoring core tells the outside world.
///
/// Rendering is a collaborator concern; the core only emits these over a
/// channel and consumes decisions in return.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MonitorNotice {
    /// A change entered an acknowledgment session and awaits a decision.
    SessionOpened {
        /// The detected change.
        event: ChangeEvent,

        /// Operator-facing message, e.g. `Folder releases Deleted!`.
        message: String,

        /// When the session was opened.
        opened_at: DateTime<Utc>,
    },

    /// Periodic elapsed-time telemetry while a session is open.
    Elapsed {
        /// Time since the change was detected.
        elapsed: Duration,

        /// Whether the unanswered threshold has been crossed.
        overdue: bool,
    },

    /// Attention-escalation request, raised when the operator's focus
    /// returns to a still-pending session.
    Escalation {
        /// The change still awaiting a decision.
        event: ChangeEvent,

        /// Time the session has gone unanswered.
        elapsed: Duration,
    },

    /// The open session was resolved.
    SessionClosed {
        /// The recorded decision.
        decision: Decision,
    },

    /// One directory's watch was lost at runtime. Other directories
    /// continue unaffected.
    WatchDegraded {
        /// The affected directory.
        path: PathBuf,

        /// What went wrong.
        detail: String,
    },
}
