//! Coordinator operations, one file per entry point.
//!
//! Each module adds methods to [`VrfCoordinatorMock`](crate::VrfCoordinatorMock).

pub mod add_consumer;
pub mod create_subscription;
pub mod fulfill_random_words;
pub mod fund_subscription;
pub mod remove_consumer;
pub mod request_random_words;
