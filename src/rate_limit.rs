//! Per-user minimum-interval gate.
//!
//! One window per user: the first event in a window passes and everything
//! else inside that window is dropped. Bursts are not smoothed.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

#[derive(Default)]
pub struct RateLimiter {
    /// user id -> epoch ms of the last accepted event
    last_accepted: DashMap<String, i64>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record and admit the event unless the previous accepted event for
    /// `user_id` is less than `min_interval_ms` old. Rejections leave the
    /// recorded time untouched.
    pub fn allow(&self, user_id: &str, now: i64, min_interval_ms: i64) -> bool {
        match self.last_accepted.entry(user_id.to_string()) {
            Entry::Occupied(mut entry) => {
                if now - *entry.get() < min_interval_ms {
                    return false;
                }
                entry.insert(now);
                true
            }
            Entry::Vacant(entry) => {
                entry.insert(now);
                true
            }
        }
    }

    /// Forget users whose last accepted event is at least `max_age_ms` old.
    /// With `max_age_ms >= min_interval_ms` this never changes a decision.
    pub fn forget_older_than(&self, now: i64, max_age_ms: i64) -> usize {
        let before = self.last_accepted.len();
        self.last_accepted.retain(|_, last| now - *last < max_age_ms);
        before - self.last_accepted.len()
    }

    pub fn len(&self) -> usize {
        self.last_accepted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_accepted.is_empty()
    }
}
