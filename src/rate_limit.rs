use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Failed admin logins allowed per client IP within [`LOGIN_WINDOW`].
pub const LOGIN_MAX_ATTEMPTS: u64 = 5;
pub const LOGIN_WINDOW: Duration = Duration::from_secs(15 * 60);

/// In-memory sliding-window limiter keyed by an arbitrary string
/// (`"login:<ip>"`).
#[derive(Default)]
pub struct RateLimiter {
    entries: Mutex<HashMap<String, Vec<Instant>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        RateLimiter::default()
    }

    /// Record an attempt and return true if it is still under the limit.
    pub fn check_and_record(&self, key: &str, max_attempts: u64, window: Duration) -> bool {
        let mut map = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();

        // Drop keys whose attempts have all aged out.
        map.retain(|_, attempts| {
            attempts.retain(|t| now.duration_since(*t) < window);
            !attempts.is_empty()
        });

        let attempts = map.entry(key.to_string()).or_default();
        if (attempts.len() as u64) < max_attempts {
            attempts.push(now);
            true
        } else {
            false
        }
    }

    /// Forget a key, e.g. after a successful login.
    pub fn reset(&self, key: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}
