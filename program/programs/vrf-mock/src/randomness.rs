//! Randomness generation for mock fulfillment.
//!
//! Uses HMAC-SHA256 keyed by the coordinator's seed secret to produce a
//! 32-byte base output per request, then expands it into as many words as
//! the request asked for. The same secret and request always yield the same
//! words, which keeps failing test runs reproducible.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::types::{Address, RandomWord};

type HmacSha256 = Hmac<Sha256>;

/// Compute the 32-byte base output for a randomness request.
///
/// ```text
/// output = HMAC-SHA256(secret, request_id_le || consumer || subscription_id_le)
/// ```
pub fn compute_randomness(
    secret: &[u8],
    request_id: u64,
    consumer: &Address,
    subscription_id: u64,
) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts keys of any size");

    mac.update(&request_id.to_le_bytes());
    mac.update(consumer.as_bytes());
    mac.update(&subscription_id.to_le_bytes());

    let bytes = mac.finalize().into_bytes();

    let mut output = [0u8; 32];
    output.copy_from_slice(&bytes);
    output
}

/// Expand base randomness into multiple words: `word[i] = SHA256(randomness || i_le_bytes)`.
pub fn expand_randomness(base_randomness: &[u8; 32], num_words: u32) -> Vec<RandomWord> {
    (0..num_words)
        .map(|i| {
            let mut hasher = Sha256::new();
            hasher.update(base_randomness);
            hasher.update(i.to_le_bytes());
            let mut word = [0u8; 32];
            word.copy_from_slice(&hasher.finalize());
            RandomWord(word)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_for_same_inputs() {
        let consumer = Address::from_label("raffle");

        let r1 = compute_randomness(b"test-secret", 1, &consumer, 1);
        let r2 = compute_randomness(b"test-secret", 1, &consumer, 1);
        assert_eq!(r1, r2);
    }

    #[test]
    fn different_for_different_ids() {
        let consumer = Address::from_label("raffle");

        let r1 = compute_randomness(b"test-secret", 1, &consumer, 1);
        let r2 = compute_randomness(b"test-secret", 2, &consumer, 1);
        assert_ne!(r1, r2);
    }

    #[test]
    fn different_for_different_secrets() {
        let consumer = Address::from_label("raffle");

        let r1 = compute_randomness(b"secret-a", 1, &consumer, 1);
        let r2 = compute_randomness(b"secret-b", 1, &consumer, 1);
        assert_ne!(r1, r2);
    }

    #[test]
    fn expands_to_distinct_words() {
        let words = expand_randomness(&[7u8; 32], 3);
        assert_eq!(words.len(), 3);
        assert_ne!(words[0], words[1]);
        assert_ne!(words[1], words[2]);
        assert!(expand_randomness(&[7u8; 32], 0).is_empty());
    }
}
