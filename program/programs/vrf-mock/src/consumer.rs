//! The boundary a consumer contract exposes to the coordinator.

use thiserror::Error;

use crate::types::{Address, RandomWord};

/// Failures raised by a consumer while handling its callback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsumerError {
    /// The callback was invoked by someone other than the trusted coordinator.
    #[error("only coordinator {want} can fulfill, called by {have}")]
    OnlyCoordinatorCanFulfill { have: Address, want: Address },
    /// The callback would use more gas than the request allowed.
    #[error("callback needs {needed} gas, limit is {limit}")]
    OutOfGas { needed: u64, limit: u32 },
    /// The consumer's own logic rejected the fulfillment.
    #[error("consumer reverted: {0}")]
    Reverted(String),
}

/// A contract that requests randomness and receives it through a callback.
///
/// Implementors provide [`fulfill_random_words`](VrfConsumer::fulfill_random_words);
/// the coordinator always goes through
/// [`raw_fulfill_random_words`](VrfConsumer::raw_fulfill_random_words), which
/// enforces the caller and gas checks first.
pub trait VrfConsumer {
    /// Address the consumer is deployed at.
    fn address(&self) -> Address;

    /// The only coordinator trusted to deliver randomness.
    fn coordinator(&self) -> Address;

    /// Handle delivered randomness.
    fn fulfill_random_words(
        &mut self,
        request_id: u64,
        random_words: &[RandomWord],
    ) -> Result<(), ConsumerError>;

    /// Simulated gas the callback consumes for `num_words` words.
    fn callback_gas_usage(&self, _num_words: usize) -> u64 {
        0
    }

    /// Entry point used by the coordinator.
    fn raw_fulfill_random_words(
        &mut self,
        caller: Address,
        request_id: u64,
        callback_gas_limit: u32,
        random_words: &[RandomWord],
    ) -> Result<(), ConsumerError> {
        let want = self.coordinator();
        if caller != want {
            return Err(ConsumerError::OnlyCoordinatorCanFulfill { have: caller, want });
        }

        let needed = self.callback_gas_usage(random_words.len());
        if needed > u64::from(callback_gas_limit) {
            return Err(ConsumerError::OutOfGas {
                needed,
                limit: callback_gas_limit,
            });
        }

        self.fulfill_random_words(request_id, random_words)
    }
}
