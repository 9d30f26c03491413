use thiserror::Error;

use crate::consumer::ConsumerError;
use crate::types::{Address, Amount};

/// Error codes for the coordinator mock.
///
/// Every variant indicates misuse by the caller. None of them are retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VrfError {
    /// No subscription was ever created with this id.
    #[error("unknown subscription {subscription_id}")]
    UnknownSubscription { subscription_id: u64 },
    /// A balance or fee computation would overflow.
    #[error("amount overflow")]
    AmountOverflow,
    /// The subscription balance does not cover the request fee.
    #[error("subscription {subscription_id} unfunded: balance {balance}, fee {fee}")]
    Unfunded {
        subscription_id: u64,
        balance: Amount,
        fee: Amount,
    },
    /// No request was ever issued with this id.
    #[error("unknown request {request_id}")]
    UnknownRequest { request_id: u64 },
    /// The request has already been fulfilled once.
    #[error("request {request_id} already fulfilled")]
    AlreadyFulfilled { request_id: u64 },
    /// The consumer is not registered on the subscription.
    #[error("consumer {consumer} is not registered on subscription {subscription_id}")]
    InvalidConsumer {
        subscription_id: u64,
        consumer: Address,
    },
    /// Zero words, or more than the coordinator allows per request.
    #[error("num_words {requested} outside 1..={max}")]
    InvalidNumWords { requested: u32, max: u32 },
    /// The subscription already holds the maximum number of consumers.
    #[error("subscription {subscription_id} has too many consumers")]
    TooManyConsumers { subscription_id: u64 },
    /// The consumer handed to fulfillment is not the one that requested.
    #[error("request {request_id} belongs to {expected}, got {actual}")]
    ConsumerMismatch {
        request_id: u64,
        expected: Address,
        actual: Address,
    },
    /// The consumer callback failed; the fulfillment was rolled back.
    #[error("callback for request {request_id} failed")]
    CallbackFailed {
        request_id: u64,
        #[source]
        source: ConsumerError,
    },
    /// A subscription or request counter would overflow u64 (practically unreachable).
    #[error("counter overflow")]
    CounterOverflow,
}
