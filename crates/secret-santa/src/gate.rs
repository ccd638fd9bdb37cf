//! One-time initialization of the encryption service.
//!
//! ```text
//!            start               succeeded
//!   Idle ───────────▶ Initializing(n) ───────────▶ Ready(n)
//!                        │      ▲
//!                 failed │      │ start (explicit new call)
//!                        ▼      │
//!                     Failed(n) ─┘  → Initializing(n + 1)
//! ```
//!
//! Callers that arrive while attempt `n` is running wait for it and share its
//! outcome, even if a later attempt has already started by the time they
//! wake up. A failed attempt is retried only when someone calls again.

use tokio::sync::watch;

use secret_santa_fhe::EncryptionService;

use crate::error::InitError;

/// Where the gate is in its lifecycle. Attempts are numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    Idle,
    Initializing(u64),
    Ready(u64),
    Failed(u64, InitError),
}

/// Inputs to the gate state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateEvent {
    Start,
    Succeeded,
    Failed(InitError),
}

impl GateState {
    /// Transition table. `None` means the event is ignored in this state.
    pub fn on(&self, event: &GateEvent) -> Option<GateState> {
        match (self, event) {
            (GateState::Idle, GateEvent::Start) => Some(GateState::Initializing(1)),
            (GateState::Failed(n, _), GateEvent::Start) => Some(GateState::Initializing(n + 1)),
            (GateState::Initializing(n), GateEvent::Succeeded) => Some(GateState::Ready(*n)),
            (GateState::Initializing(n), GateEvent::Failed(e)) => {
                Some(GateState::Failed(*n, e.clone()))
            }
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, GateState::Ready(_))
    }
}

/// What the gate publishes: the state plus the most recent failure, which
/// outlives the `Failed` state once a retry starts.
#[derive(Debug)]
struct Slot {
    state: GateState,
    last_failure: Option<InitError>,
}

impl Slot {
    /// Outcome for a caller that joined `attempt`, once it is known.
    ///
    /// Attempts run one after another and only failures are followed by a
    /// new one, so any state past `attempt` means `attempt` failed.
    fn outcome_for(&self, attempt: u64) -> Option<Result<(), InitError>> {
        match &self.state {
            GateState::Ready(n) if *n == attempt => Some(Ok(())),
            GateState::Failed(n, e) if *n == attempt => Some(Err(e.clone())),
            GateState::Ready(n) | GateState::Initializing(n) | GateState::Failed(n, _)
                if *n > attempt =>
            {
                Some(Err(self
                    .last_failure
                    .clone()
                    .unwrap_or(InitError::Cancelled)))
            }
            _ => None,
        }
    }
}

enum Begin {
    Started,
    Joined(u64),
    AlreadyReady,
}

/// Session-wide initialization gate.
pub struct InitializationGate {
    slot: watch::Sender<Slot>,
}

impl InitializationGate {
    pub fn new() -> Self {
        let (slot, _) = watch::channel(Slot {
            state: GateState::Idle,
            last_failure: None,
        });
        Self { slot }
    }

    pub fn state(&self) -> GateState {
        self.slot.borrow().state.clone()
    }

    /// Make sure `service` is initialized, starting at most one attempt.
    pub async fn ensure_initialized<E>(&self, service: &E) -> Result<(), InitError>
    where
        E: EncryptionService + ?Sized,
    {
        let mut rx = self.slot.subscribe();

        let joined = match self.begin() {
            Begin::Started => return self.run_attempt(service).await,
            Begin::AlreadyReady => return Ok(()),
            Begin::Joined(attempt) => attempt,
        };
        tracing::debug!(attempt = joined, "waiting for running initialization");

        loop {
            if let Some(outcome) = rx.borrow_and_update().outcome_for(joined) {
                return outcome;
            }
            if rx.changed().await.is_err() {
                return Err(InitError::Cancelled);
            }
        }
    }

    /// Start an attempt, or report the one already running.
    fn begin(&self) -> Begin {
        let mut begin = Begin::AlreadyReady;
        self.slot.send_if_modified(|slot| match slot.state.on(&GateEvent::Start) {
            Some(next) => {
                slot.state = next;
                begin = Begin::Started;
                true
            }
            None => {
                if let GateState::Initializing(n) = slot.state {
                    begin = Begin::Joined(n);
                }
                false
            }
        });
        begin
    }

    async fn run_attempt<E>(&self, service: &E) -> Result<(), InitError>
    where
        E: EncryptionService + ?Sized,
    {
        let mut attempt = Attempt { gate: self, done: false };

        let result = if service.is_initialized() {
            tracing::debug!("encryption service already initialized");
            Ok(())
        } else {
            tracing::info!("initializing encryption service");
            service
                .initialize()
                .await
                .map_err(|e| InitError::Failed(e.to_string()))
        };

        attempt.done = true;
        match &result {
            Ok(()) => {
                self.apply(&GateEvent::Succeeded);
                tracing::info!("encryption service ready");
            }
            Err(e) => {
                self.apply(&GateEvent::Failed(e.clone()));
                tracing::warn!(error = %e, "encryption service initialization failed");
            }
        }
        result
    }

    /// Apply an event. Returns whether the state changed.
    fn apply(&self, event: &GateEvent) -> bool {
        self.slot.send_if_modified(|slot| match slot.state.on(event) {
            Some(next) => {
                if let GateState::Failed(_, e) = &next {
                    slot.last_failure = Some(e.clone());
                }
                slot.state = next;
                true
            }
            None => false,
        })
    }
}

impl Default for InitializationGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Fails the in-flight attempt if its future is dropped, so waiters wake up.
struct Attempt<'a> {
    gate: &'a InitializationGate,
    done: bool,
}

impl Drop for Attempt<'_> {
    fn drop(&mut self) {
        if !self.done {
            self.gate.apply(&GateEvent::Failed(InitError::Cancelled));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use secret_santa_fhe::MemoryFhe;

    #[test]
    fn test_transition_table() {
        let failed = GateState::Failed(2, InitError::Failed("x".into()));

        assert_eq!(GateState::Idle.on(&GateEvent::Start), Some(GateState::Initializing(1)));
        assert_eq!(failed.on(&GateEvent::Start), Some(GateState::Initializing(3)));
        assert_eq!(
            GateState::Initializing(1).on(&GateEvent::Succeeded),
            Some(GateState::Ready(1))
        );
        assert_eq!(
            GateState::Initializing(4).on(&GateEvent::Failed(InitError::Cancelled)),
            Some(GateState::Failed(4, InitError::Cancelled))
        );

        assert_eq!(GateState::Initializing(1).on(&GateEvent::Start), None);
        assert_eq!(GateState::Ready(1).on(&GateEvent::Start), None);
        assert_eq!(GateState::Idle.on(&GateEvent::Succeeded), None);
        assert_eq!(failed.on(&GateEvent::Succeeded), None);
    }

    #[test]
    fn test_outcome_for_joined_attempt() {
        let failure = InitError::Failed("x".into());
        let slot = |state| Slot {
            state,
            last_failure: Some(failure.clone()),
        };

        assert_eq!(slot(GateState::Initializing(1)).outcome_for(1), None);
        assert_eq!(slot(GateState::Ready(1)).outcome_for(1), Some(Ok(())));
        assert_eq!(
            slot(GateState::Failed(1, failure.clone())).outcome_for(1),
            Some(Err(failure.clone()))
        );
        // A later attempt means the joined one failed.
        assert_eq!(
            slot(GateState::Initializing(2)).outcome_for(1),
            Some(Err(failure.clone()))
        );
        assert_eq!(
            slot(GateState::Ready(3)).outcome_for(1),
            Some(Err(failure.clone()))
        );
    }

    #[tokio::test]
    async fn test_initializes_once() {
        let fhe = MemoryFhe::new();
        let gate = InitializationGate::new();

        gate.ensure_initialized(&fhe).await.unwrap();
        gate.ensure_initialized(&fhe).await.unwrap();

        assert!(gate.state().is_ready());
        assert_eq!(fhe.counters().initialize, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_share_one_attempt() {
        let fhe = MemoryFhe::new();
        fhe.set_init_delay(Duration::from_millis(500));
        let gate = InitializationGate::new();

        let (a, b, c) = tokio::join!(
            gate.ensure_initialized(&fhe),
            gate.ensure_initialized(&fhe),
            gate.ensure_initialized(&fhe),
        );

        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        assert_eq!(fhe.counters().initialize, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiters_share_failure() {
        let fhe = MemoryFhe::new();
        fhe.set_init_delay(Duration::from_millis(500));
        fhe.fail_initializations(1);
        let gate = InitializationGate::new();

        let (a, b) = tokio::join!(gate.ensure_initialized(&fhe), gate.ensure_initialized(&fhe));

        assert!(matches!(a, Err(InitError::Failed(_))));
        assert_eq!(a, b);
        assert_eq!(fhe.counters().initialize, 1);
    }

    #[tokio::test]
    async fn test_failure_is_retried_only_on_new_call() {
        let fhe = MemoryFhe::new();
        fhe.fail_initializations(1);
        let gate = InitializationGate::new();

        assert!(gate.ensure_initialized(&fhe).await.is_err());
        assert!(matches!(gate.state(), GateState::Failed(1, _)));
        assert_eq!(fhe.counters().initialize, 1);

        gate.ensure_initialized(&fhe).await.unwrap();
        assert_eq!(gate.state(), GateState::Ready(2));
        assert_eq!(fhe.counters().initialize, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiter_keeps_failure_of_its_attempt_after_retry() {
        let fhe = MemoryFhe::new();
        fhe.set_init_delay(Duration::from_millis(500));
        fhe.fail_initializations(1);
        let gate = InitializationGate::new();

        // The first caller retries as soon as its attempt fails, before the
        // waiter gets to look at the failed state.
        let retrying = async {
            let first = gate.ensure_initialized(&fhe).await;
            let second = gate.ensure_initialized(&fhe).await;
            (first, second)
        };
        let ((first, second), waiter) = tokio::join!(retrying, gate.ensure_initialized(&fhe));

        assert!(matches!(first, Err(InitError::Failed(_))));
        assert!(second.is_ok());
        assert_eq!(waiter, first);
        assert_eq!(fhe.counters().initialize, 2);
        assert_eq!(gate.state(), GateState::Ready(2));
    }

    #[tokio::test]
    async fn test_skips_service_that_is_already_up() {
        let fhe = MemoryFhe::new();
        fhe.initialize().await.unwrap();
        let gate = InitializationGate::new();

        gate.ensure_initialized(&fhe).await.unwrap();
        assert_eq!(fhe.counters().initialize, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_attempt_releases_waiters() {
        let fhe = MemoryFhe::new();
        fhe.set_init_delay(Duration::from_secs(10));
        let gate = InitializationGate::new();

        let first = tokio::time::timeout(Duration::from_millis(100), gate.ensure_initialized(&fhe));
        assert!(first.await.is_err());
        assert_eq!(gate.state(), GateState::Failed(1, InitError::Cancelled));

        fhe.set_init_delay(Duration::from_millis(1));
        gate.ensure_initialized(&fhe).await.unwrap();
    }
}
