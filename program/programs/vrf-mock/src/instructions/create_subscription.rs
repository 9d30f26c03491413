use tracing::info;

use crate::events::SubscriptionCreated;
use crate::state::Subscription;
use crate::VrfCoordinatorMock;

impl VrfCoordinatorMock {
    /// Create a new zero-balance subscription and return its id.
    pub fn create_subscription(&mut self) -> u64 {
        let subscription_id = self.next_subscription_id;
        // u64 ids cannot be exhausted within a run.
        self.next_subscription_id += 1;

        self.subscriptions
            .insert(subscription_id, Subscription::new(subscription_id));

        self.events.emit(&SubscriptionCreated { subscription_id });
        info!(subscription_id, "Subscription created");

        subscription_id
    }
}
