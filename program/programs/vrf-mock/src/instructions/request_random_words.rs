use tracing::{debug, info};

use crate::errors::VrfError;
use crate::events::RandomWordsRequested;
use crate::state::RandomnessRequest;
use crate::types::Address;
use crate::{VrfCoordinatorMock, MAX_NUM_WORDS};

impl VrfCoordinatorMock {
    /// Request `num_words` random words on behalf of `consumer`.
    ///
    /// Charges `base_fee + gas_price_link * callback_gas_limit` to the
    /// subscription and records a pending request. Randomness is only
    /// produced by a later [`fulfill_random_words`](Self::fulfill_random_words).
    pub fn request_random_words(
        &mut self,
        consumer: Address,
        subscription_id: u64,
        num_words: u32,
        callback_gas_limit: u32,
    ) -> Result<u64, VrfError> {
        let subscription = self
            .subscriptions
            .get_mut(&subscription_id)
            .ok_or(VrfError::UnknownSubscription { subscription_id })?;

        if !subscription.is_consumer(&consumer) {
            return Err(VrfError::InvalidConsumer {
                subscription_id,
                consumer,
            });
        }

        if num_words == 0 || num_words > MAX_NUM_WORDS {
            return Err(VrfError::InvalidNumWords {
                requested: num_words,
                max: MAX_NUM_WORDS,
            });
        }

        let fee = self
            .fees
            .fee_for(callback_gas_limit)
            .ok_or(VrfError::AmountOverflow)?;

        let unfunded = VrfError::Unfunded {
            subscription_id,
            balance: subscription.balance,
            fee,
        };
        let new_balance = subscription.balance.checked_sub(fee).ok_or(unfunded)?;

        let request_id = self.next_request_id;
        self.next_request_id = request_id
            .checked_add(1)
            .ok_or(VrfError::CounterOverflow)?;

        subscription.balance = new_balance;
        subscription.req_count += 1;

        self.requests.insert(
            request_id,
            RandomnessRequest {
                request_id,
                subscription_id,
                consumer,
                num_words,
                callback_gas_limit,
                fee,
                fulfilled: false,
                random_words: Vec::new(),
            },
        );

        self.events.emit(&RandomWordsRequested {
            request_id,
            subscription_id,
            consumer,
            num_words,
            callback_gas_limit,
            fee,
        });
        debug!(subscription_id, %new_balance, "Fee deducted");
        info!(
            request_id,
            subscription_id,
            %consumer,
            num_words,
            callback_gas_limit,
            %fee,
            "Random words requested"
        );

        Ok(request_id)
    }
}

#[cfg(test)]
mod tests {
    use crate::events::{ContractEvent, RandomWordsRequested};
    use crate::{Address, Amount, FeeSchedule, VrfCoordinatorMock, VrfError, MAX_NUM_WORDS};

    const GAS_LIMIT: u32 = 100_000;

    fn coordinator() -> VrfCoordinatorMock {
        VrfCoordinatorMock::new(
            FeeSchedule::new("0.25".parse().unwrap(), 1_000_000_000),
            "seed",
        )
    }

    fn funded(coordinator: &mut VrfCoordinatorMock, amount: Amount) -> (u64, Address) {
        let id = coordinator.create_subscription();
        let raffle = Address::from_label("raffle");
        coordinator.add_consumer(id, raffle).unwrap();
        coordinator.fund_subscription(id, amount).unwrap();
        (id, raffle)
    }

    #[test]
    fn request_ids_are_monotonic_and_fee_is_deducted() {
        let mut coordinator = coordinator();
        let (id, raffle) = funded(&mut coordinator, Amount::ONE);
        let fee = coordinator.fees().fee_for(GAS_LIMIT).unwrap();

        let first = coordinator.request_random_words(raffle, id, 1, GAS_LIMIT).unwrap();
        let second = coordinator.request_random_words(raffle, id, 2, GAS_LIMIT).unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 2);
        let sub = coordinator.subscription(id).unwrap();
        assert_eq!(sub.req_count, 2);
        assert_eq!(
            sub.balance,
            Amount::ONE.checked_sub(fee.checked_mul(2).unwrap()).unwrap()
        );

        let request = coordinator.request(first).unwrap();
        assert!(request.is_pending());
        assert!(request.random_words.is_empty());
        assert_eq!(request.fee, fee);
        assert!(coordinator.pending_request_exists(id).unwrap());
        assert_eq!(coordinator.events().history_of(RandomWordsRequested::NAME).len(), 2);
    }

    #[test]
    fn succeeds_exactly_when_balance_covers_fee() {
        let fee = coordinator().fees().fee_for(GAS_LIMIT).unwrap();
        let just_short = Amount::from_base_units(fee.base_units() - 1);

        for (balance, should_succeed) in [(fee, true), (just_short, false), (Amount::ONE, true)] {
            let mut coordinator = coordinator();
            let (id, raffle) = funded(&mut coordinator, balance);

            let result = coordinator.request_random_words(raffle, id, 1, GAS_LIMIT);
            if should_succeed {
                assert!(result.is_ok(), "balance {balance} should cover fee {fee}");
            } else {
                assert_eq!(
                    result,
                    Err(VrfError::Unfunded {
                        subscription_id: id,
                        balance,
                        fee
                    })
                );
                assert_eq!(coordinator.subscription(id).unwrap().balance, balance);
                assert!(coordinator.request(1).is_err());
            }
        }
    }

    #[test]
    fn unknown_subscription_is_rejected() {
        let mut coordinator = coordinator();
        assert_eq!(
            coordinator.request_random_words(Address::from_label("raffle"), 99, 1, GAS_LIMIT),
            Err(VrfError::UnknownSubscription { subscription_id: 99 })
        );
    }

    #[test]
    fn unregistered_consumer_is_rejected() {
        let mut coordinator = coordinator();
        let (id, _) = funded(&mut coordinator, Amount::ONE);
        let stranger = Address::from_label("stranger");

        assert_eq!(
            coordinator.request_random_words(stranger, id, 1, GAS_LIMIT),
            Err(VrfError::InvalidConsumer {
                subscription_id: id,
                consumer: stranger
            })
        );
    }

    #[test]
    fn num_words_bounds() {
        let mut coordinator = coordinator();
        let (id, raffle) = funded(&mut coordinator, Amount::ONE);

        for bad in [0, MAX_NUM_WORDS + 1] {
            assert_eq!(
                coordinator.request_random_words(raffle, id, bad, GAS_LIMIT),
                Err(VrfError::InvalidNumWords {
                    requested: bad,
                    max: MAX_NUM_WORDS
                })
            );
        }
        assert!(coordinator
            .request_random_words(raffle, id, MAX_NUM_WORDS, GAS_LIMIT)
            .is_ok());
    }
}
