use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::types::{Address, Amount};

/// An event a contract can emit through an [`EventEmitter`](crate::emitter::EventEmitter).
///
/// `NAME` is the string listeners register for.
pub trait ContractEvent: Serialize + DeserializeOwned {
    const NAME: &'static str;
}

/// Emitted when a new subscription is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionCreated {
    pub subscription_id: u64,
}

impl ContractEvent for SubscriptionCreated {
    const NAME: &'static str = "SubscriptionCreated";
}

/// Emitted when a subscription balance is topped up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionFunded {
    pub subscription_id: u64,
    pub old_balance: Amount,
    pub new_balance: Amount,
}

impl ContractEvent for SubscriptionFunded {
    const NAME: &'static str = "SubscriptionFunded";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerAdded {
    pub subscription_id: u64,
    pub consumer: Address,
}

impl ContractEvent for ConsumerAdded {
    const NAME: &'static str = "ConsumerAdded";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerRemoved {
    pub subscription_id: u64,
    pub consumer: Address,
}

impl ContractEvent for ConsumerRemoved {
    const NAME: &'static str = "ConsumerRemoved";
}

/// Emitted when a consumer's request is accepted and its fee charged.
///
/// The auto-fulfiller subscribes to this event the way an oracle node
/// watches the chain for new requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomWordsRequested {
    pub request_id: u64,
    pub subscription_id: u64,
    pub consumer: Address,
    pub num_words: u32,
    pub callback_gas_limit: u32,
    pub fee: Amount,
}

impl ContractEvent for RandomWordsRequested {
    const NAME: &'static str = "RandomWordsRequested";
}

/// Emitted after the consumer callback completed successfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomWordsFulfilled {
    pub request_id: u64,
    pub consumer: Address,
    pub output_seed: [u8; 32],
}

impl ContractEvent for RandomWordsFulfilled {
    const NAME: &'static str = "RandomWordsFulfilled";
}
