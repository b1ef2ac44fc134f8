//! Elapsed-time ticking for open sessions.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::notice::MonitorNotice;

/// Settings for the escalation timer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EscalationConfig {
    /// Telemetry cadence.
    pub tick: Duration,

    /// How long a session may go unanswered before ticks are marked
    /// overdue.
    pub unanswered_after: Duration,
}

impl EscalationConfig {
    /// Set the tick cadence.
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Set the unanswered threshold.
    pub fn with_unanswered_after(mut self, threshold: Duration) -> Self {
        self.unanswered_after = threshold;
        self
    }
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(1),
            unanswered_after: Duration::from_secs(120),
        }
    }
}

/// Periodic tick source for the open session.
///
/// Each tick emits an [`MonitorNotice::Elapsed`] with the time since the
/// change was detected and whether the unanswered threshold has been
/// crossed. The timer only supplies data; the attention-escalation side
/// effect is raised separately by the controller's focus-return signal
/// and never by elapsed time alone. The timer never resolves a session.
pub struct EscalationTimer {
    config: EscalationConfig,
    notice_tx: mpsc::Sender<MonitorNotice>,
    cancel: Option<CancellationToken>,
}

impl EscalationTimer {
    /// Create a timer emitting into the given notice channel.
    pub fn new(config: EscalationConfig, notice_tx: mpsc::Sender<MonitorNotice>) -> Self {
        Self {
            config,
            notice_tx,
            cancel: None,
        }
    }

    /// Begin ticking against a reference time. Any previous run is
    /// cancelled first.
    pub fn start(&mut self, reference: DateTime<Utc>) {
        self.stop();

        let cancel = CancellationToken::new();
        self.cancel = Some(cancel.clone());

        let tick = self.config.tick;
        let threshold = self.config.unanswered_after;
        let notice_tx = self.notice_tx.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            // The first interval tick completes immediately; skip it so
            // ticks land a full period after the session opens.
            interval.tick().await;

            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => {
                        let elapsed = Utc::now()
                            .signed_duration_since(reference)
                            .to_std()
                            .unwrap_or_default();
                        let notice = MonitorNotice::Elapsed {
                            elapsed,
                            overdue: elapsed >= threshold,
                        };
                        if notice_tx.send(notice).await.is_err() {
                            break;
                        }
                    }
                }
            }

            debug!("escalation timer halted");
        });
    }

    /// Halt ticking. Guaranteed to win against a pending tick; idempotent.
    pub fn stop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
    }
}

impl Drop for EscalationTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ticks_carry_elapsed_and_overdue() {
        let (tx, mut rx) = mpsc::channel(16);
        let config = EscalationConfig::default()
            .with_tick(Duration::from_millis(20))
            .with_unanswered_after(Duration::from_millis(1));
        let mut timer = EscalationTimer::new(config, tx);

        timer.start(Utc::now());

        let notice = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("no tick within timeout")
            .expect("channel closed");

        match notice {
            MonitorNotice::Elapsed { elapsed, overdue } => {
                assert!(elapsed >= Duration::from_millis(1));
                assert!(overdue);
            }
            other => panic!("unexpected notice: {other:?}"),
        }

        timer.stop();
    }

    #[tokio::test]
    async fn test_stop_halts_ticking() {
        let (tx, mut rx) = mpsc::channel(16);
        let config = EscalationConfig::default().with_tick(Duration::from_millis(10));
        let mut timer = EscalationTimer::new(config, tx);

        timer.start(Utc::now());
        timer.stop();

        // Drain anything already in flight, then expect silence.
        tokio::time::sleep(Duration::from_millis(30)).await;
        while rx.try_recv().is_ok() {}
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(rx.try_recv().is_err());
    }
}
