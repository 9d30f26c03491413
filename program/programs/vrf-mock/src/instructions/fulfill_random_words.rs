use tracing::{info, instrument, warn};

use crate::consumer::VrfConsumer;
use crate::errors::VrfError;
use crate::events::RandomWordsFulfilled;
use crate::randomness::{compute_randomness, expand_randomness};
use crate::types::RandomWord;
use crate::VrfCoordinatorMock;

impl VrfCoordinatorMock {
    /// Fulfill a pending request and deliver the words to its consumer.
    ///
    /// Generation, the fulfilled flag and the consumer callback form one
    /// step: if the callback fails, the request is put back to pending and
    /// the failure is returned as [`VrfError::CallbackFailed`].
    #[instrument(skip_all, fields(request_id = request_id))]
    pub fn fulfill_random_words(
        &mut self,
        request_id: u64,
        consumer: &mut dyn VrfConsumer,
    ) -> Result<Vec<RandomWord>, VrfError> {
        let request = self
            .requests
            .get_mut(&request_id)
            .ok_or(VrfError::UnknownRequest { request_id })?;

        if request.fulfilled {
            return Err(VrfError::AlreadyFulfilled { request_id });
        }

        let actual = consumer.address();
        if actual != request.consumer {
            return Err(VrfError::ConsumerMismatch {
                request_id,
                expected: request.consumer,
                actual,
            });
        }

        let output_seed = compute_randomness(
            &self.seed_secret,
            request_id,
            &request.consumer,
            request.subscription_id,
        );
        let random_words = expand_randomness(&output_seed, request.num_words);

        request.fulfilled = true;
        request.random_words = random_words.clone();

        if let Err(source) = consumer.raw_fulfill_random_words(
            self.address,
            request_id,
            request.callback_gas_limit,
            &random_words,
        ) {
            request.fulfilled = false;
            request.random_words.clear();
            warn!(
                request_id,
                consumer = %actual,
                error = %source,
                "Consumer callback failed, fulfillment rolled back"
            );
            return Err(VrfError::CallbackFailed { request_id, source });
        }

        self.events.emit(&RandomWordsFulfilled {
            request_id,
            consumer: actual,
            output_seed,
        });
        info!(
            request_id,
            consumer = %actual,
            num_words = random_words.len(),
            "Random words fulfilled"
        );

        Ok(random_words)
    }
}
