//! Per-user trigger limiter.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::{Clock, DefaultClock};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use uuid::Uuid;

/// Admits at most one trigger per user per window. Rejected attempts are not
/// queued.
#[derive(Clone)]
pub struct TriggerRateLimiter {
    limiter: Option<Arc<DefaultKeyedRateLimiter<Uuid>>>,
    clock: DefaultClock,
    window: Duration,
}

impl std::fmt::Debug for TriggerRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriggerRateLimiter")
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}

impl TriggerRateLimiter {
    /// A zero window disables limiting.
    pub fn new(window: Duration) -> Self {
        let limiter = Quota::with_period(window)
            .map(|quota| Arc::new(RateLimiter::keyed(quota.allow_burst(NonZeroU32::MIN))));
        Self {
            limiter,
            clock: DefaultClock::default(),
            window,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Consume the user's slot, or return how long until the next one.
    pub fn check(&self, user_id: &Uuid) -> Result<(), Duration> {
        let Some(limiter) = &self.limiter else {
            return Ok(());
        };
        limiter
            .check_key(user_id)
            .map_err(|not_until| not_until.wait_time_from(self.clock.now()))
    }

    /// Drop state for users whose window has elapsed.
    pub fn retain_recent(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.retain_recent();
        }
    }
}
