use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::{Address, Amount, RandomWord};

/// Pricing applied to every randomness request. Fixed at deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Flat cost charged per request.
    pub base_fee: Amount,
    /// Base units charged per unit of callback gas limit.
    pub gas_price_link: u128,
}

impl FeeSchedule {
    pub fn new(base_fee: Amount, gas_price_link: u128) -> Self {
        Self {
            base_fee,
            gas_price_link,
        }
    }

    /// `base_fee + gas_price_link * callback_gas_limit`, or `None` on overflow.
    pub fn fee_for(&self, callback_gas_limit: u32) -> Option<Amount> {
        Amount::from_base_units(self.gas_price_link)
            .checked_mul(u128::from(callback_gas_limit))
            .and_then(|gas_cost| self.base_fee.checked_add(gas_cost))
    }
}

/// A prepaid balance that authorizes randomness requests.
///
/// Fees are deducted from `balance` at request time. Only consumers in
/// `consumers` may request against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Unique subscription identifier, starting at 1.
    pub id: u64,
    /// Current balance available for fees.
    pub balance: Amount,
    /// Consumers allowed to charge this subscription.
    pub consumers: BTreeSet<Address>,
    /// Total number of requests charged to this subscription.
    pub req_count: u64,
}

impl Subscription {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            balance: Amount::ZERO,
            consumers: BTreeSet::new(),
            req_count: 0,
        }
    }

    pub fn is_consumer(&self, consumer: &Address) -> bool {
        self.consumers.contains(consumer)
    }
}

/// Individual randomness request, one per `request_random_words` call.
///
/// Lifecycle: Pending (`fulfilled == false`) -> Fulfilled. Requests are kept
/// after fulfillment so a second attempt can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomnessRequest {
    /// Unique identifier, strictly increasing from 1.
    pub request_id: u64,
    /// The subscription that paid for this request.
    pub subscription_id: u64,
    /// The consumer that will receive the callback.
    pub consumer: Address,
    /// Number of random words requested.
    pub num_words: u32,
    /// Gas limit the consumer callback must fit in.
    pub callback_gas_limit: u32,
    /// Fee deducted from the subscription.
    pub fee: Amount,
    /// Whether the request has been fulfilled.
    pub fulfilled: bool,
    /// Words delivered on fulfillment; empty while pending.
    pub random_words: Vec<RandomWord>,
}

impl RandomnessRequest {
    pub fn is_pending(&self) -> bool {
        !self.fulfilled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_scales_with_gas_limit() {
        let fees = FeeSchedule::new("0.25".parse().unwrap(), 1_000_000_000);
        let fee = fees.fee_for(100_000).unwrap();
        assert_eq!(fee.base_units(), 250_000_000_000_000_000 + 100_000_000_000_000);
        assert_eq!(fees.fee_for(0), Some(fees.base_fee));
    }

    #[test]
    fn fee_overflow_is_reported() {
        let fees = FeeSchedule::new(Amount::from_base_units(1), u128::MAX);
        assert_eq!(fees.fee_for(2), None);
    }
}
