//! Fulfillment engine: consumes request events and settles them on the
//! coordinator, delivering the words to the requesting consumer.
//!
//! Requests are handled one at a time in arrival order. Each one:
//! 1. (Optional) waits the configured delay, standing in for block
//!    confirmations and off-chain proof generation.
//! 2. Looks up the consumer contract by address.
//! 3. Calls `fulfill_random_words` on the coordinator, which runs the
//!    consumer callback in the same step.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{error, info, instrument, warn};
use vrf_mock::events::RandomWordsRequested;
use vrf_mock::{Address, RandomWord, VrfError};

use crate::consumers::ConsumerDirectory;
use crate::metrics::Metrics;
use crate::{SharedCoordinator, lock};

#[derive(Debug, Error)]
pub enum FulfillError {
    #[error("no consumer contract registered at {0}")]
    UnknownConsumer(Address),
    #[error(transparent)]
    Coordinator(#[from] VrfError),
}

impl FulfillError {
    /// Errors meaning the request is already settled or gone; another
    /// attempt would fail the same way.
    fn is_non_retryable(&self) -> bool {
        matches!(
            self,
            FulfillError::Coordinator(
                VrfError::AlreadyFulfilled { .. } | VrfError::UnknownRequest { .. }
            )
        )
    }
}

/// Main fulfiller loop. Returns when the request channel closes.
pub async fn run_fulfiller(
    coordinator: SharedCoordinator,
    consumers: ConsumerDirectory,
    mut rx: mpsc::Receiver<RandomWordsRequested>,
    delay: Duration,
    metrics: Arc<Metrics>,
) {
    while let Some(event) = rx.recv().await {
        metrics.record_request();
        let start = Instant::now();

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        info!(
            request_id = event.request_id,
            consumer = %event.consumer,
            num_words = event.num_words,
            "Fulfilling randomness request"
        );

        match fulfill_request(&coordinator, &consumers, &event) {
            Ok(words) => {
                let latency_ms = start.elapsed().as_millis() as u64;
                metrics.record_fulfillment(latency_ms);
                info!(
                    request_id = event.request_id,
                    words = words.len(),
                    latency_ms,
                    "Fulfilled successfully"
                );
            }
            Err(e) => handle_fulfillment_error(event.request_id, e, &metrics),
        }
    }

    info!("Fulfiller channel closed, shutting down");
}

fn handle_fulfillment_error(request_id: u64, error: FulfillError, metrics: &Metrics) {
    if error.is_non_retryable() {
        metrics.record_skip();
        warn!(
            request_id,
            reason = %error,
            "Skipping request (non-retryable)"
        );
    } else {
        metrics.record_failure();
        error!(
            request_id,
            error = %error,
            "Failed to fulfill"
        );
    }
}

/// Settle one request. Locks the consumer, then the coordinator.
#[instrument(skip_all, fields(request_id = event.request_id))]
pub fn fulfill_request(
    coordinator: &SharedCoordinator,
    consumers: &ConsumerDirectory,
    event: &RandomWordsRequested,
) -> Result<Vec<RandomWord>, FulfillError> {
    let consumer = consumers
        .get(&event.consumer)
        .ok_or(FulfillError::UnknownConsumer(event.consumer))?;

    let mut consumer = lock(&consumer);
    let mut coordinator = lock(coordinator);
    let words = coordinator.fulfill_random_words(event.request_id, &mut *consumer)?;
    Ok(words)
}
