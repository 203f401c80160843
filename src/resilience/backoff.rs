//! Retry delay with jitter.

use std::time::Duration;

use rand::Rng;

/// Calculate the delay before the next retry attempt.
///
/// The delay is a fixed base plus uniform jitter, so simultaneous retries
/// against the same backend spread out instead of arriving in lockstep.
pub fn retry_delay(base_ms: u64, max_jitter_ms: u64) -> Duration {
    let jitter = if max_jitter_ms > 0 {
        rand::thread_rng().gen_range(0..=max_jitter_ms)
    } else {
        0
    };
    Duration::from_millis(base_ms + jitter)
}
