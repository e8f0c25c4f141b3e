use std::time::{Duration, SystemTime};

/// Age-based freshness: an entry is fresh while its age stays under the TTL.
#[derive(Debug, Clone, Copy)]
pub struct FreshnessPolicy {
    ttl: Duration,
}

impl FreshnessPolicy {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn is_fresh(&self, stored_at: SystemTime) -> bool {
        match SystemTime::now().duration_since(stored_at) {
            Ok(age) => age < self.ttl,
            // Entry timestamped in the future (clock moved backwards):
            // its age is effectively zero.
            Err(_) => true,
        }
    }
}
