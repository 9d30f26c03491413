use tracing::info;

use crate::errors::VrfError;
use crate::events::ConsumerRemoved;
use crate::types::Address;
use crate::VrfCoordinatorMock;

impl VrfCoordinatorMock {
    /// Revoke a consumer's authorization. Pending requests are unaffected.
    pub fn remove_consumer(
        &mut self,
        subscription_id: u64,
        consumer: Address,
    ) -> Result<(), VrfError> {
        let subscription = self
            .subscriptions
            .get_mut(&subscription_id)
            .ok_or(VrfError::UnknownSubscription { subscription_id })?;

        if !subscription.consumers.remove(&consumer) {
            return Err(VrfError::InvalidConsumer {
                subscription_id,
                consumer,
            });
        }

        self.events.emit(&ConsumerRemoved {
            subscription_id,
            consumer,
        });
        info!(subscription_id, %consumer, "Consumer removed");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Address, Amount, FeeSchedule, VrfCoordinatorMock, VrfError};

    #[test]
    fn removed_consumer_can_no_longer_request() {
        let mut coordinator = VrfCoordinatorMock::new(FeeSchedule::new(Amount::ZERO, 0), "seed");
        let id = coordinator.create_subscription();
        let raffle = Address::from_label("raffle");
        coordinator.add_consumer(id, raffle).unwrap();

        coordinator.remove_consumer(id, raffle).unwrap();

        assert_eq!(
            coordinator.request_random_words(raffle, id, 1, 100_000),
            Err(VrfError::InvalidConsumer {
                subscription_id: id,
                consumer: raffle
            })
        );
        assert_eq!(
            coordinator.remove_consumer(id, raffle),
            Err(VrfError::InvalidConsumer {
                subscription_id: id,
                consumer: raffle
            })
        );
    }
}
