//! Simulated oracle node: listener and fulfiller wired together.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;
use vrf_mock::ContractEvent;
use vrf_mock::events::RandomWordsRequested;

use crate::consumers::ConsumerDirectory;
use crate::metrics::Metrics;
use crate::{SharedCoordinator, fulfiller, listener, lock};

/// Capacity of the listener -> fulfiller queue.
const REQUEST_QUEUE: usize = 256;

/// Running oracle tasks. Dropping the handle stops them.
pub struct OracleHandle {
    metrics: Arc<Metrics>,
    listener: JoinHandle<()>,
    fulfiller: JoinHandle<()>,
}

impl OracleHandle {
    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }
}

impl Drop for OracleHandle {
    fn drop(&mut self) {
        self.listener.abort();
        self.fulfiller.abort();
    }
}

/// Start answering requests on `coordinator` for the consumers in `consumers`.
///
/// Subscribes to new requests before queueing the ones already pending, so
/// nothing made in between is lost.
pub async fn start_oracle(
    coordinator: SharedCoordinator,
    consumers: ConsumerDirectory,
    delay: Duration,
) -> OracleHandle {
    let metrics = Arc::new(Metrics::new());
    let (tx, rx) = mpsc::channel(REQUEST_QUEUE);

    let stream = lock(&coordinator)
        .events()
        .subscribe(RandomWordsRequested::NAME);

    let fulfiller = tokio::spawn(fulfiller::run_fulfiller(
        coordinator.clone(),
        consumers.clone(),
        rx,
        delay,
        metrics.clone(),
    ));

    // Requests made before the stream existed.
    listener::catch_up_pending_requests(&coordinator, &tx).await;

    let listener = tokio::spawn(listener::listen_for_requests(stream, tx));

    info!(consumers = consumers.len(), delay = ?delay, "Oracle started");

    OracleHandle {
        metrics,
        listener,
        fulfiller,
    }
}
