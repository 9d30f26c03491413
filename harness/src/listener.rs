//! Request listener for the simulated oracle node.
//!
//! Two complementary strategies ensure no requests are missed:
//!
//! 1. **Catch-up scan** ([`catch_up_pending_requests`]): on startup, walks
//!    the coordinator's pending requests that were made before the oracle
//!    subscribed.
//!
//! 2. **Live stream** ([`listen_for_requests`]): forwards every
//!    `RandomWordsRequested` event the coordinator emits after that.
//!
//! Subscribe to the stream *before* scanning; a request made in between is
//! then seen twice, and the fulfiller skips the duplicate.

use tokio::sync::mpsc;
use tracing::{error, info, warn};
use vrf_mock::ObservedEvent;
use vrf_mock::events::RandomWordsRequested;

use crate::{SharedCoordinator, lock};

/// Queue every pending request the coordinator already holds.
pub async fn catch_up_pending_requests(
    coordinator: &SharedCoordinator,
    tx: &mpsc::Sender<RandomWordsRequested>,
) {
    info!("Scanning for pending requests");

    // Snapshot under the lock, send after releasing it.
    let pending: Vec<RandomWordsRequested> = lock(coordinator)
        .pending_requests()
        .map(|request| RandomWordsRequested {
            request_id: request.request_id,
            subscription_id: request.subscription_id,
            consumer: request.consumer,
            num_words: request.num_words,
            callback_gas_limit: request.callback_gas_limit,
            fee: request.fee,
        })
        .collect();

    info!(count = pending.len(), "Found pending requests");
    for event in pending {
        info!(
            request_id = event.request_id,
            consumer = %event.consumer,
            "Queued pending request"
        );
        if tx.send(event).await.is_err() {
            error!("Channel closed while catching up pending requests");
            return;
        }
    }
}

/// Forward decoded `RandomWordsRequested` events to the fulfiller until
/// either side closes.
pub async fn listen_for_requests(
    mut events: mpsc::UnboundedReceiver<ObservedEvent>,
    tx: mpsc::Sender<RandomWordsRequested>,
) {
    while let Some(observed) = events.recv().await {
        let event = match observed.decode::<RandomWordsRequested>() {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, sequence = observed.sequence, "Failed to decode request event");
                continue;
            }
        };

        info!(
            request_id = event.request_id,
            consumer = %event.consumer,
            num_words = event.num_words,
            "Received RandomWordsRequested event"
        );

        if tx.send(event).await.is_err() {
            error!("Channel closed, stopping listener");
            return;
        }
    }

    info!("Coordinator event stream ended, stopping listener");
}
