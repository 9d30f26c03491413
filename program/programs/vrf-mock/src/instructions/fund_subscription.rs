use tracing::info;

use crate::errors::VrfError;
use crate::events::SubscriptionFunded;
use crate::types::Amount;
use crate::VrfCoordinatorMock;

impl VrfCoordinatorMock {
    /// Top up a subscription balance.
    ///
    /// Fails with [`VrfError::AmountOverflow`] instead of saturating.
    pub fn fund_subscription(
        &mut self,
        subscription_id: u64,
        amount: Amount,
    ) -> Result<(), VrfError> {
        let subscription = self
            .subscriptions
            .get_mut(&subscription_id)
            .ok_or(VrfError::UnknownSubscription { subscription_id })?;

        let old_balance = subscription.balance;
        subscription.balance = old_balance
            .checked_add(amount)
            .ok_or(VrfError::AmountOverflow)?;
        let new_balance = subscription.balance;

        self.events.emit(&SubscriptionFunded {
            subscription_id,
            old_balance,
            new_balance,
        });
        info!(subscription_id, %old_balance, %new_balance, "Subscription funded");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Amount, FeeSchedule, VrfCoordinatorMock, VrfError};

    fn coordinator() -> VrfCoordinatorMock {
        VrfCoordinatorMock::new(FeeSchedule::new(Amount::ZERO, 0), "seed")
    }

    #[test]
    fn funding_accumulates() {
        let mut coordinator = coordinator();
        let id = coordinator.create_subscription();

        coordinator.fund_subscription(id, Amount::ONE).unwrap();
        coordinator.fund_subscription(id, Amount::ONE).unwrap();

        assert_eq!(
            coordinator.subscription(id).unwrap().balance,
            Amount::ONE.checked_mul(2).unwrap()
        );
    }

    #[test]
    fn funding_unknown_subscription_fails() {
        let mut coordinator = coordinator();
        assert_eq!(
            coordinator.fund_subscription(99, Amount::ONE),
            Err(VrfError::UnknownSubscription { subscription_id: 99 })
        );
    }

    #[test]
    fn funding_overflow_fails_and_keeps_balance() {
        let mut coordinator = coordinator();
        let id = coordinator.create_subscription();
        coordinator
            .fund_subscription(id, Amount::from_base_units(u128::MAX))
            .unwrap();

        assert_eq!(
            coordinator.fund_subscription(id, Amount::from_base_units(1)),
            Err(VrfError::AmountOverflow)
        );
        assert_eq!(
            coordinator.subscription(id).unwrap().balance,
            Amount::from_base_units(u128::MAX)
        );
    }
}
