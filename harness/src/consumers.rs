//! Directory of consumer contracts the fulfiller can call back into.
//!
//! A request event only carries the consumer's address; the fulfiller looks
//! the contract up here before invoking the coordinator.

use std::collections::HashMap;

use vrf_mock::Address;

use crate::{SharedConsumer, lock};

#[derive(Clone, Default)]
pub struct ConsumerDirectory {
    consumers: HashMap<Address, SharedConsumer>,
}

impl ConsumerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a consumer under the address it reports.
    pub fn register(&mut self, consumer: SharedConsumer) -> Address {
        let address = lock(&consumer).address();
        self.consumers.insert(address, consumer);
        address
    }

    pub fn get(&self, address: &Address) -> Option<SharedConsumer> {
        self.consumers.get(address).cloned()
    }

    pub fn len(&self) -> usize {
        self.consumers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumers.is_empty()
    }
}
