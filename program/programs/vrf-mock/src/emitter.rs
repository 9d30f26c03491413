//! Per-contract event emission with one-shot and streaming listeners.
//!
//! Every contract owns an [`EventEmitter`]. Observers either register a
//! one-shot [`Listener`] for the next occurrence of a named event, or open a
//! persistent stream with [`EventEmitter::subscribe`]. Emission is
//! synchronous: by the time `emit` returns, every registered listener holds
//! the event, so a listener registered before the triggering call can never
//! miss it.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::events::ContractEvent;
use crate::types::Address;

/// An event as seen by an observer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedEvent {
    /// Event name, e.g. `WinnerPicked`.
    pub name: String,
    /// Address of the contract that emitted it.
    pub emitter: Address,
    /// Position in the emitter's log, starting at 0.
    pub sequence: u64,
    /// Event fields.
    pub args: serde_json::Value,
}

#[derive(Debug, Error)]
pub enum EventDecodeError {
    #[error("expected event {expected}, got {actual}")]
    NameMismatch {
        expected: &'static str,
        actual: String,
    },
    #[error("malformed {name} payload")]
    Payload {
        name: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ObservedEvent {
    pub fn is<E: ContractEvent>(&self) -> bool {
        self.name == E::NAME
    }

    /// Decode the arguments back into the typed event.
    pub fn decode<E: ContractEvent>(&self) -> Result<E, EventDecodeError> {
        if !self.is::<E>() {
            return Err(EventDecodeError::NameMismatch {
                expected: E::NAME,
                actual: self.name.clone(),
            });
        }
        serde_json::from_value(self.args.clone()).map_err(|source| EventDecodeError::Payload {
            name: E::NAME,
            source,
        })
    }
}

/// Every handle to the emitter was dropped before the event fired.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("listener for {0} closed before the event fired")]
pub struct ListenerClosed(pub String);

/// Events kept in an emitter's history by default. Older entries are dropped
/// first; sequence numbers keep counting.
pub const DEFAULT_HISTORY_LIMIT: usize = 10_000;

struct Registry {
    next_listener_id: u64,
    next_sequence: u64,
    once: HashMap<String, Vec<(u64, oneshot::Sender<ObservedEvent>)>>,
    streams: HashMap<String, Vec<mpsc::UnboundedSender<ObservedEvent>>>,
    history: VecDeque<ObservedEvent>,
    history_limit: usize,
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Cloneable handle to a contract's event log and listener registry.
#[derive(Clone)]
pub struct EventEmitter {
    address: Address,
    registry: Arc<Mutex<Registry>>,
}

impl EventEmitter {
    pub fn new(address: Address) -> Self {
        Self::with_history_limit(address, DEFAULT_HISTORY_LIMIT)
    }

    /// Emitter that keeps at most `history_limit` past events.
    pub fn with_history_limit(address: Address, history_limit: usize) -> Self {
        let registry = Registry {
            next_listener_id: 0,
            next_sequence: 0,
            once: HashMap::new(),
            streams: HashMap::new(),
            history: VecDeque::new(),
            history_limit,
        };
        Self {
            address,
            registry: Arc::new(Mutex::new(registry)),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Record `event` and deliver it to every listener registered for its name.
    pub fn emit<E: ContractEvent>(&self, event: &E) {
        let args = serde_json::to_value(event).unwrap_or_else(|e| {
            warn!(event = E::NAME, error = %e, "Failed to serialize event arguments");
            serde_json::Value::Null
        });

        let mut registry = lock(&self.registry);
        let observed = ObservedEvent {
            name: E::NAME.to_string(),
            emitter: self.address,
            sequence: registry.next_sequence,
            args,
        };
        registry.next_sequence += 1;
        if registry.history_limit > 0 {
            if registry.history.len() == registry.history_limit {
                registry.history.pop_front();
            }
            registry.history.push_back(observed.clone());
        }

        let mut delivered = 0usize;
        if let Some(listeners) = registry.once.remove(E::NAME) {
            for (_, tx) in listeners {
                if tx.send(observed.clone()).is_ok() {
                    delivered += 1;
                }
            }
        }
        if let Some(streams) = registry.streams.get_mut(E::NAME) {
            streams.retain(|tx| tx.send(observed.clone()).is_ok());
            delivered += streams.len();
        }

        debug!(
            emitter = %self.address,
            event = E::NAME,
            sequence = observed.sequence,
            delivered,
            "Event emitted"
        );
    }

    /// Register a one-shot listener for the next `event_name` emission.
    ///
    /// The registration is live as soon as this returns. Dropping the
    /// returned [`Listener`] deregisters it.
    pub fn once(&self, event_name: &str) -> Listener {
        let (tx, rx) = oneshot::channel();
        let mut registry = lock(&self.registry);
        let id = registry.next_listener_id;
        registry.next_listener_id += 1;
        registry
            .once
            .entry(event_name.to_string())
            .or_default()
            .push((id, tx));

        Listener {
            id,
            name: event_name.to_string(),
            registry: Arc::downgrade(&self.registry),
            rx,
        }
    }

    /// Open a stream receiving every future `event_name` emission.
    ///
    /// The stream is dropped from the registry on the first emission after
    /// the receiver goes away.
    pub fn subscribe(&self, event_name: &str) -> mpsc::UnboundedReceiver<ObservedEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        lock(&self.registry)
            .streams
            .entry(event_name.to_string())
            .or_default()
            .push(tx);
        rx
    }

    /// Number of one-shot listeners currently waiting on `event_name`.
    pub fn listener_count(&self, event_name: &str) -> usize {
        lock(&self.registry)
            .once
            .get(event_name)
            .map_or(0, Vec::len)
    }

    /// Retained past events, oldest first.
    pub fn history(&self) -> Vec<ObservedEvent> {
        lock(&self.registry).history.iter().cloned().collect()
    }

    /// Retained events named `event_name`, oldest first.
    pub fn history_of(&self, event_name: &str) -> Vec<ObservedEvent> {
        lock(&self.registry)
            .history
            .iter()
            .filter(|event| event.name == event_name)
            .cloned()
            .collect()
    }
}

/// A one-shot registration for a single named event.
///
/// Holds only a weak reference to the registry, so dropping every
/// [`EventEmitter`] handle closes the listener.
pub struct Listener {
    id: u64,
    name: String,
    registry: Weak<Mutex<Registry>>,
    rx: oneshot::Receiver<ObservedEvent>,
}

impl Listener {
    pub fn event_name(&self) -> &str {
        &self.name
    }

    /// Wait for the event.
    pub async fn recv(&mut self) -> Result<ObservedEvent, ListenerClosed> {
        (&mut self.rx)
            .await
            .map_err(|_| ListenerClosed(self.name.clone()))
    }

    /// Take the event if it has already fired.
    pub fn try_recv(&mut self) -> Option<ObservedEvent> {
        self.rx.try_recv().ok()
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut registry = lock(&registry);
        let now_empty = match registry.once.get_mut(&self.name) {
            Some(listeners) => {
                listeners.retain(|(id, _)| *id != self.id);
                listeners.is_empty()
            }
            None => false,
        };
        if now_empty {
            registry.once.remove(&self.name);
        }
    }
}
