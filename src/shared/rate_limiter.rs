use governor::{
    clock::{Clock, DefaultClock},
    state::direct::NotKeyed,
    state::InMemoryState,
    Quota, RateLimiter as GovernorRateLimiter,
};
use std::collections::HashMap;
use std::{num::NonZeroU32, sync::Arc, time::Duration};
use tokio::sync::RwLock;

type DirectLimiter = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Login attempt limiter keyed by username.
///
/// Every attempt consumes a cell; a successful login clears the key.
/// Default: 5 attempts per 15 minutes.
#[derive(Clone)]
pub struct LoginRateLimiter {
    limiters: Arc<RwLock<HashMap<String, Arc<DirectLimiter>>>>,
    max_attempts: u32,
    window_minutes: u64,
}

impl LoginRateLimiter {
    pub fn new() -> Self {
        Self::with_config(5, 15)
    }

    pub fn with_config(max_attempts: u32, window_minutes: u64) -> Self {
        Self {
            limiters: Arc::new(RwLock::new(HashMap::new())),
            max_attempts,
            window_minutes,
        }
    }

    fn quota(&self) -> Quota {
        let burst = NonZeroU32::new(self.max_attempts).unwrap_or(NonZeroU32::MIN);
        Quota::with_period(Duration::from_secs(self.window_minutes.max(1) * 60))
            .unwrap_or_else(|| Quota::per_minute(burst))
            .allow_burst(burst)
    }

    /// Records an attempt for `username`.
    ///
    /// Returns `Err(wait)` once the budget is spent.
    pub async fn check(&self, username: &str) -> Result<(), Duration> {
        let key = username.trim().to_lowercase();

        let limiter = {
            let mut limiters = self.limiters.write().await;
            limiters
                .entry(key)
                .or_insert_with(|| Arc::new(GovernorRateLimiter::direct(self.quota())))
                .clone()
        };

        limiter
            .check()
            .map_err(|negative| negative.wait_time_from(DefaultClock::default().now()))
    }

    pub async fn reset(&self, username: &str) {
        let key = username.trim().to_lowercase();
        self.limiters.write().await.remove(&key);
    }

    /// Drops limiters whose budget has fully refilled.
    pub async fn cleanup(&self) -> usize {
        let full = self.quota().burst_size();
        let mut limiters = self.limiters.write().await;
        let before = limiters.len();
        // A limiter that can take a full burst holds no state worth keeping
        limiters.retain(|_, limiter| limiter.check_n(full).map_or(true, |r| r.is_err()));
        before - limiters.len()
    }

    pub async fn tracked_keys(&self) -> usize {
        self.limiters.read().await.len()
    }
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
