//! Token bucket limiting how often an adapter calls its upstream.
//!
//! Unlike the concurrency semaphore, an empty bucket is not waited on: the
//! adapter declines with `RateLimited` so the aggregator can move on to the
//! next provider.

use std::sync::{Mutex, MutexGuard};

use log::warn;
use tokio::time::Instant;

/// Largest burst allowed regardless of the advertised rate.
const MAX_BURST: u32 = 10;

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_update: Instant,
}

/// Per-adapter token bucket refilled at `requests_per_minute / 60` tokens per second.
#[derive(Debug)]
pub(crate) struct Throttle {
    bucket: Mutex<Bucket>,
    /// Tokens per second
    rate: f64,
    capacity: f64,
}

impl Throttle {
    pub(crate) fn new(requests_per_minute: u32) -> Self {
        let requests_per_minute = requests_per_minute.max(1);
        let capacity = f64::from(requests_per_minute.min(MAX_BURST));
        Self {
            bucket: Mutex::new(Bucket {
                tokens: capacity,
                last_update: Instant::now(),
            }),
            rate: f64::from(requests_per_minute) / 60.0,
            capacity,
        }
    }

    /// Take one token if available.
    pub(crate) fn try_acquire(&self) -> bool {
        let mut bucket = self.lock();
        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last_update).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.rate).min(self.capacity);
        bucket.last_update = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    fn lock(&self) -> MutexGuard<'_, Bucket> {
        self.bucket.lock().unwrap_or_else(|poisoned| {
            warn!("Throttle mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}
