//! Sliding-window request counter, keyed by client address.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Window size in seconds.
const WINDOW_SIZE: u64 = 60;
/// Maximum allowed requests within the window.
const MAX_REQUESTS: u64 = 5;

/// Per-client sliding window counters.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    counters: HashMap<String, Vec<Instant>>,
    window_size: u64,
    max_requests: u64,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(WINDOW_SIZE, MAX_REQUESTS)
    }
}

impl RateLimiter {
    pub fn new(window_size: u64, max_requests: u64) -> Self {
        RateLimiter {
            counters: HashMap::new(),
            window_size,
            max_requests,
        }
    }

    /// Record a request for `client` and tell whether it fits the window.
    pub fn check_rate(&mut self, client: &str) -> bool {
        let now = Instant::now();
        let window_start = now - Duration::from_secs(self.window_size);

        // Drop requests that left the sliding window.
        if let Some(counter) = self.counters.get_mut(client) {
            counter.retain(|&timestamp| timestamp > window_start);
        }

        if let Some(counter) = self.counters.get(client) {
            if counter.len() as u64 >= self.max_requests {
                return false;
            }
        }

        self.counters
            .entry(client.to_string())
            .or_default()
            .push(now);

        true
    }
}
