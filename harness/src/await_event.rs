//! Await a contract's completion event as a single bounded outcome.
//!
//! The sequence is fixed:
//!
//! 1. register a one-shot listener on the emitter ([`EventAwait::new`]),
//! 2. run the `capture` closure (pre-trigger state),
//! 3. run the trigger action,
//! 4. wait for the event, bounded by the configured timeout,
//! 5. run validation; the outcome resolves only if validation passes.
//!
//! Registering before triggering means an event fired synchronously by the
//! trigger is still observed. A timeout or a failed trigger drops the
//! listener, which deregisters it from the emitter. The wait holds no
//! handle to the emitter itself: if the trigger drops the last one, the
//! wait fails with [`HarnessError::ListenerClosed`].

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use vrf_mock::emitter::ListenerClosed;
use vrf_mock::{EventEmitter, Listener, ObservedEvent};

/// Default bound on waiting for a completion event.
pub const DEFAULT_EVENT_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Error)]
pub enum HarnessError {
    /// The event did not fire within the bounded wait.
    #[error("timed out after {waited:?} waiting for {event}")]
    EventTimeout { event: String, waited: Duration },
    #[error(transparent)]
    ListenerClosed(#[from] ListenerClosed),
    /// The trigger action itself failed.
    #[error("trigger for {event} failed")]
    Trigger {
        event: String,
        #[source]
        source: anyhow::Error,
    },
    /// The event fired but the post-event checks rejected it.
    #[error("{event} failed validation")]
    Validation {
        event: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Everything observed by a resolved wait.
#[derive(Debug)]
pub struct Outcome<T, S = (), R = ()> {
    pub event: ObservedEvent,
    /// State captured before the trigger ran.
    pub captured: S,
    /// Whatever the trigger returned.
    pub trigger_output: T,
    /// Whatever validation returned.
    pub validated: R,
    /// Time from listener registration to event receipt.
    pub elapsed: Duration,
}

/// A pending wait for one named event on one emitter.
pub struct EventAwait {
    listener: Listener,
    event_name: String,
    timeout: Duration,
    registered_at: Instant,
}

impl EventAwait {
    /// Register the listener. The registration is live once this returns.
    pub fn new(emitter: &EventEmitter, event_name: &str) -> Self {
        let listener = emitter.once(event_name);
        debug!(
            emitter = %emitter.address(),
            event = %event_name,
            "Listener registered"
        );
        Self {
            listener,
            event_name: event_name.to_string(),
            timeout: DEFAULT_EVENT_TIMEOUT,
            registered_at: Instant::now(),
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run `trigger` and resolve with the next matching event.
    pub async fn run<T, F, Fut>(self, trigger: F) -> Result<Outcome<T>, HarnessError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        self.run_and_validate(|| (), trigger, |_, _, _| Ok(())).await
    }

    /// Capture state, run `trigger`, wait for the event and validate it.
    ///
    /// `capture` runs after the listener is registered and before `trigger`.
    /// `validate` sees the event, the captured state and the trigger output;
    /// an `Err` from it rejects the whole wait with
    /// [`HarnessError::Validation`].
    pub async fn run_and_validate<S, T, R, C, F, Fut, V>(
        self,
        capture: C,
        trigger: F,
        validate: V,
    ) -> Result<Outcome<T, S, R>, HarnessError>
    where
        C: FnOnce() -> S,
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
        V: FnOnce(&ObservedEvent, &S, &T) -> anyhow::Result<R>,
    {
        let mut listener = self.listener;
        let captured = capture();

        let waited = tokio::time::timeout(self.timeout, async {
            let output = trigger().await.map_err(|source| HarnessError::Trigger {
                event: self.event_name.clone(),
                source,
            })?;
            debug!(event = %self.event_name, "Trigger completed, waiting for event");
            let event = listener.recv().await?;
            Ok::<_, HarnessError>((output, event))
        })
        .await;

        let (trigger_output, event) = match waited {
            Ok(result) => result?,
            Err(_) => {
                drop(listener);
                warn!(event = %self.event_name, timeout = ?self.timeout, "Event never fired");
                return Err(HarnessError::EventTimeout {
                    event: self.event_name,
                    waited: self.timeout,
                });
            }
        };
        let elapsed = self.registered_at.elapsed();

        let validated = validate(&event, &captured, &trigger_output).map_err(|source| {
            warn!(event = %self.event_name, error = %source, "Event failed validation");
            HarnessError::Validation {
                event: self.event_name.clone(),
                source,
            }
        })?;

        info!(
            event = %self.event_name,
            sequence = event.sequence,
            elapsed = ?elapsed,
            "Event observed"
        );

        Ok(Outcome {
            event,
            captured,
            trigger_output,
            validated,
            elapsed,
        })
    }
}
