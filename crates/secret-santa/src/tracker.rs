//! The single transaction status slot.
//!
//! Workflows write it, the presentation layer watches it. Each update bumps a
//! token, and a delayed clear only hides the status if the token it was
//! scheduled for is still current.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use secret_santa_core::{TransactionStatus, TxPhase};

/// How long each phase stays visible before it is cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusDelays {
    pub success: Duration,
    pub error: Duration,
    /// `None` never clears a pending status on a timer.
    pub pending: Option<Duration>,
}

impl StatusDelays {
    fn for_phase(&self, phase: TxPhase) -> Option<Duration> {
        match phase {
            TxPhase::Pending => self.pending,
            TxPhase::Success => Some(self.success),
            TxPhase::Error => Some(self.error),
        }
    }
}

impl Default for StatusDelays {
    fn default() -> Self {
        Self {
            success: Duration::from_millis(2_000),
            error: Duration::from_millis(3_000),
            pending: Some(Duration::from_millis(3_000)),
        }
    }
}

/// Owner of the status slot.
pub struct TransactionStatusTracker {
    slot: Arc<watch::Sender<TransactionStatus>>,
    delays: StatusDelays,
}

impl TransactionStatusTracker {
    pub fn new(delays: StatusDelays) -> Self {
        let (slot, _) = watch::channel(TransactionStatus::idle());
        Self {
            slot: Arc::new(slot),
            delays,
        }
    }

    /// Replace the status and schedule its clear. Returns the new token.
    pub fn set(&self, phase: TxPhase, message: impl Into<String>) -> u64 {
        let message = message.into();
        let mut token = 0;
        self.slot.send_modify(|status| {
            token = status.token + 1;
            *status = TransactionStatus {
                visible: true,
                phase,
                message,
                token,
            };
        });

        tracing::debug!(?phase, token, "status updated");

        if let Some(delay) = self.delays.for_phase(phase) {
            self.schedule_clear(token, delay);
        }
        token
    }

    pub fn pending(&self, message: impl Into<String>) -> u64 {
        self.set(TxPhase::Pending, message)
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.set(TxPhase::Success, message)
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.set(TxPhase::Error, message)
    }

    /// Hide the status now, whatever it is.
    pub fn clear(&self) {
        self.slot.send_if_modified(hide);
    }

    /// Copy of the current status.
    pub fn current(&self) -> TransactionStatus {
        self.slot.borrow().clone()
    }

    /// Watch the status slot.
    pub fn subscribe(&self) -> watch::Receiver<TransactionStatus> {
        self.slot.subscribe()
    }

    pub fn delays(&self) -> StatusDelays {
        self.delays
    }

    fn schedule_clear(&self, token: u64, delay: Duration) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::debug!(token, "no runtime, status will not auto-clear");
            return;
        };

        let slot = Arc::clone(&self.slot);
        runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let cleared = slot.send_if_modified(|status| status.token == token && hide(status));
            if cleared {
                tracing::trace!(token, "status auto-cleared");
            }
        });
    }
}

impl Default for TransactionStatusTracker {
    fn default() -> Self {
        Self::new(StatusDelays::default())
    }
}

/// Reset a visible status to the hidden idle form, keeping its token.
fn hide(status: &mut TransactionStatus) -> bool {
    if !status.visible {
        return false;
    }
    *status = TransactionStatus {
        token: status.token,
        ..TransactionStatus::idle()
    };
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_starts_idle() {
        let tracker = TransactionStatusTracker::default();
        assert_eq!(tracker.current(), TransactionStatus::idle());
    }

    #[test]
    fn test_set_without_runtime_does_not_panic() {
        let tracker = TransactionStatusTracker::default();
        let token = tracker.error("Failed to load data");
        assert_eq!(token, 1);
        assert!(tracker.current().is_error());
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_clears_after_delay() {
        let tracker = TransactionStatusTracker::default();
        tracker.success("Gift value revealed!");

        sleep(ms(1_900)).await;
        assert!(tracker.current().is_success());

        sleep(ms(200)).await;
        let status = tracker.current();
        assert!(!status.visible);
        assert!(status.message.is_empty());
        assert_eq!(status.token, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_timer_does_not_clear_newer_status() {
        let tracker = TransactionStatusTracker::default();
        tracker.success("Secret Santa created successfully!");

        sleep(ms(1_000)).await;
        tracker.error("Reveal failed: boom");

        // The success timer fires at 2s and must leave the error alone.
        sleep(ms(1_500)).await;
        let status = tracker.current();
        assert!(status.is_error());
        assert_eq!(status.message, "Reveal failed: boom");

        // The error's own timer fires at 4s.
        sleep(ms(1_600)).await;
        assert!(!tracker.current().visible);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_without_delay_stays() {
        let tracker = TransactionStatusTracker::new(StatusDelays {
            pending: None,
            ..StatusDelays::default()
        });
        tracker.pending("Waiting for transaction confirmation...");

        sleep(ms(60_000)).await;
        assert!(tracker.current().is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_clears_with_delay() {
        let tracker = TransactionStatusTracker::default();
        tracker.pending("Verifying gift value...");

        sleep(ms(3_100)).await;
        assert!(!tracker.current().visible);
    }

    #[tokio::test]
    async fn test_subscribers_see_updates() {
        let tracker = TransactionStatusTracker::default();
        let mut rx = tracker.subscribe();

        tracker.pending("Creating Secret Santa with FHE encryption...");
        rx.changed().await.unwrap();
        assert_eq!(
            rx.borrow_and_update().message,
            "Creating Secret Santa with FHE encryption..."
        );

        tracker.clear();
        rx.changed().await.unwrap();
        assert!(!rx.borrow().visible);
    }

    #[test]
    fn test_tokens_increase() {
        let tracker = TransactionStatusTracker::default();
        let a = tracker.pending("a");
        let b = tracker.success("b");
        let c = tracker.error("c");
        assert!(a < b && b < c);
        assert_eq!(tracker.current().token, c);
    }
}
