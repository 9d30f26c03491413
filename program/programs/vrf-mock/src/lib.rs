use std::collections::BTreeMap;

pub mod consumer;
pub mod emitter;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod randomness;
pub mod state;
pub mod types;

pub use consumer::{ConsumerError, VrfConsumer};
pub use emitter::{EventEmitter, Listener, ObservedEvent};
pub use errors::VrfError;
pub use events::ContractEvent;
pub use state::{FeeSchedule, RandomnessRequest, Subscription};
pub use types::{Address, Amount, RandomWord};

/// Maximum number of random words a consumer may request at once.
pub const MAX_NUM_WORDS: u32 = 500;

/// Maximum number of consumers registered on one subscription.
pub const MAX_CONSUMERS: usize = 100;

/// In-process stand-in for a VRF coordinator.
///
/// Owns all subscription and request bookkeeping; there is no shared or
/// global state. Callers that need concurrent access serialize through a
/// single owner (typically `Arc<Mutex<VrfCoordinatorMock>>`).
///
/// ## Request lifecycle
///
/// 1. **Subscribe**: `create_subscription`, `fund_subscription`,
///    `add_consumer`.
/// 2. **Request**: a registered consumer calls `request_random_words`; the
///    fee is deducted and a pending request is recorded. No randomness yet.
/// 3. **Fulfill**: a separate `fulfill_random_words` call produces the
///    words and invokes the consumer callback in the same step.
pub struct VrfCoordinatorMock {
    pub(crate) address: Address,
    pub(crate) fees: FeeSchedule,
    pub(crate) seed_secret: Vec<u8>,
    pub(crate) subscriptions: BTreeMap<u64, Subscription>,
    pub(crate) requests: BTreeMap<u64, RandomnessRequest>,
    pub(crate) next_subscription_id: u64,
    pub(crate) next_request_id: u64,
    pub(crate) events: EventEmitter,
}

impl VrfCoordinatorMock {
    /// Deploy a coordinator at the default `"VRFCoordinatorV2Mock"` address.
    pub fn new(fees: FeeSchedule, seed_secret: impl Into<Vec<u8>>) -> Self {
        Self::with_address(Address::from_label("VRFCoordinatorV2Mock"), fees, seed_secret)
    }

    pub fn with_address(
        address: Address,
        fees: FeeSchedule,
        seed_secret: impl Into<Vec<u8>>,
    ) -> Self {
        tracing::info!(
            coordinator = %address,
            base_fee = %fees.base_fee,
            gas_price_link = fees.gas_price_link,
            "Coordinator mock deployed"
        );
        Self {
            address,
            fees,
            seed_secret: seed_secret.into(),
            subscriptions: BTreeMap::new(),
            requests: BTreeMap::new(),
            next_subscription_id: 1,
            next_request_id: 1,
            events: EventEmitter::new(address),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn fees(&self) -> &FeeSchedule {
        &self.fees
    }

    /// The coordinator's event log and listener registry.
    pub fn events(&self) -> &EventEmitter {
        &self.events
    }

    pub fn subscription(&self, subscription_id: u64) -> Result<&Subscription, VrfError> {
        self.subscriptions
            .get(&subscription_id)
            .ok_or(VrfError::UnknownSubscription { subscription_id })
    }

    pub fn request(&self, request_id: u64) -> Result<&RandomnessRequest, VrfError> {
        self.requests
            .get(&request_id)
            .ok_or(VrfError::UnknownRequest { request_id })
    }

    /// Requests that have not been fulfilled yet, oldest first.
    pub fn pending_requests(&self) -> impl Iterator<Item = &RandomnessRequest> {
        self.requests.values().filter(|r| r.is_pending())
    }

    /// Whether any request charged to `subscription_id` is still unfulfilled.
    pub fn pending_request_exists(&self, subscription_id: u64) -> Result<bool, VrfError> {
        self.subscription(subscription_id)?;
        Ok(self
            .pending_requests()
            .any(|r| r.subscription_id == subscription_id))
    }
}
