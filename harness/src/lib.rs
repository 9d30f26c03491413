//! Local harness for the VRF request/fulfill protocol.
//!
//! Wires the coordinator mock to consumers and observes the workflow
//! through events:
//!
//! - **Deploy**: [`deploy`] provisions the mock on development networks.
//! - **Oracle**: [`oracle`] runs [`listener`] + [`fulfiller`], the off-chain node that
//!   answers `RandomWordsRequested` events.
//! - **Await**: [`await_event`] turns a completion event into a single
//!   awaitable, bounded outcome.
//! - **Scenario**: [`scenario`] plays a raffle round through all of the above.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use vrf_mock::{VrfConsumer, VrfCoordinatorMock};

pub mod await_event;
pub mod config;
pub mod consumers;
pub mod deploy;
pub mod fulfiller;
pub mod listener;
pub mod metrics;
pub mod oracle;
pub mod scenario;

/// The coordinator behind its single logical owner.
pub type SharedCoordinator = Arc<Mutex<VrfCoordinatorMock>>;

/// A consumer contract reachable by the fulfiller.
///
/// Lock order is consumer first, then coordinator, everywhere.
pub type SharedConsumer = Arc<Mutex<dyn VrfConsumer + Send>>;

/// Lock a mutex, recovering the data if a previous holder panicked.
pub fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
