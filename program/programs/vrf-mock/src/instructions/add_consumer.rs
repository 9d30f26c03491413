use tracing::info;

use crate::errors::VrfError;
use crate::events::ConsumerAdded;
use crate::types::Address;
use crate::{VrfCoordinatorMock, MAX_CONSUMERS};

impl VrfCoordinatorMock {
    /// Authorize `consumer` to request against a subscription.
    ///
    /// Adding a consumer that is already registered is a no-op.
    pub fn add_consumer(
        &mut self,
        subscription_id: u64,
        consumer: Address,
    ) -> Result<(), VrfError> {
        let subscription = self
            .subscriptions
            .get_mut(&subscription_id)
            .ok_or(VrfError::UnknownSubscription { subscription_id })?;

        if subscription.is_consumer(&consumer) {
            return Ok(());
        }
        if subscription.consumers.len() >= MAX_CONSUMERS {
            return Err(VrfError::TooManyConsumers { subscription_id });
        }

        subscription.consumers.insert(consumer);

        self.events.emit(&ConsumerAdded {
            subscription_id,
            consumer,
        });
        info!(subscription_id, %consumer, "Consumer added");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::events::{ConsumerAdded, ContractEvent};
    use crate::{Address, Amount, FeeSchedule, VrfCoordinatorMock, VrfError, MAX_CONSUMERS};

    fn coordinator() -> VrfCoordinatorMock {
        VrfCoordinatorMock::new(FeeSchedule::new(Amount::ZERO, 0), "seed")
    }

    #[test]
    fn adding_twice_emits_once() {
        let mut coordinator = coordinator();
        let id = coordinator.create_subscription();
        let raffle = Address::from_label("raffle");

        coordinator.add_consumer(id, raffle).unwrap();
        coordinator.add_consumer(id, raffle).unwrap();

        assert!(coordinator.subscription(id).unwrap().is_consumer(&raffle));
        assert_eq!(coordinator.events().history_of(ConsumerAdded::NAME).len(), 1);
    }

    #[test]
    fn consumer_limit_is_enforced() {
        let mut coordinator = coordinator();
        let id = coordinator.create_subscription();
        for i in 0..MAX_CONSUMERS {
            coordinator
                .add_consumer(id, Address::from_label(&format!("consumer-{i}")))
                .unwrap();
        }

        assert_eq!(
            coordinator.add_consumer(id, Address::from_label("one-too-many")),
            Err(VrfError::TooManyConsumers { subscription_id: id })
        );
    }

    #[test]
    fn unknown_subscription_is_rejected() {
        let mut coordinator = coordinator();
        assert_eq!(
            coordinator.add_consumer(7, Address::from_label("raffle")),
            Err(VrfError::UnknownSubscription { subscription_id: 7 })
        );
    }
}
