//! # Vigil Monitor
//!
//! Acknowledgment-gated monitoring over the vigil path watcher. Every
//! detected change opens an acknowledgment session that must be resolved
//! with a Continue/Stop decision before the next change is surfaced;
//! while a session is open an escalation timer reports how long the
//! change has gone unanswered.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      MonitorController                         │
//! ├────────────────────────────────────────────────────────────────┤
//! │  PathWatcherSet ──► AcknowledgmentController ──► notices       │
//! │                          │          ▲                          │
//! │                          ▼          │ decide / focus-return    │
//! │                   EscalationTimer   └── collaborator           │
//! └────────────────────────────────────────────────────────────────┘
//! ```

pub mod controller;
pub mod error;
pub mod escalation;
pub mod notice;
pub mod runner;
pub mod session;
pub mod state;

pub use controller::AcknowledgmentController;
pub use error::{MonitorError, Result};
pub use escalation::{EscalationConfig, EscalationTimer};
pub use notice::MonitorNotice;
pub use runner::MonitorController;
pub use session::{AcknowledgmentSession, Decision, SessionState};
pub use state::MonitoringRunState;
