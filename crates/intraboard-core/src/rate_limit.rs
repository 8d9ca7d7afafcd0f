//! Sliding-window rate limiter shared by every outbound API call
//!
//! Admission timestamps live in a `VecDeque` behind a `tokio::sync::Mutex`.
//! The mutex is fair, so waiters are admitted in FIFO order, and the guard is
//! held while sleeping so no later caller can overtake a waiting one.

use crate::config::RateLimitConfig;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

/// Admits at most `max_calls` calls within any trailing `period`
///
/// Share it through `Arc`; every clone of the handle throttles the same window.
#[derive(Debug)]
pub struct RateLimiter {
    max_calls: usize,
    period: Duration,
    window: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// `max_calls` is clamped to at least one call
    pub fn new(max_calls: usize, period: Duration) -> Self {
        let max_calls = max_calls.max(1);
        Self {
            max_calls,
            period,
            window: Mutex::new(VecDeque::with_capacity(max_calls)),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_calls, config.period)
    }

    pub fn max_calls(&self) -> usize {
        self.max_calls
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Wait for a free slot, then record it
    ///
    /// Returns immediately while the window has room. Otherwise sleeps until
    /// the oldest admission leaves the window. Dropping the future before it
    /// completes records nothing.
    pub async fn acquire(&self) {
        let mut window = self.window.lock().await;

        loop {
            let now = Instant::now();
            prune(&mut window, now, self.period);

            if window.len() < self.max_calls {
                window.push_back(now);
                return;
            }

            // Window is full, so it is non-empty
            let Some(&oldest) = window.front() else {
                continue;
            };
            let wake_at = oldest + self.period;
            tracing::debug!(
                wait_ms = wake_at.saturating_duration_since(now).as_millis() as u64,
                "Rate window full, waiting for a slot"
            );
            sleep_until(wake_at).await;
        }
    }

    /// Admissions still inside the trailing window
    pub async fn in_flight(&self) -> usize {
        let mut window = self.window.lock().await;
        prune(&mut window, Instant::now(), self.period);
        window.len()
    }
}

fn prune(window: &mut VecDeque<Instant>, now: Instant, period: Duration) {
    while let Some(&oldest) = window.front() {
        if now.saturating_duration_since(oldest) >= period {
            window.pop_front();
        } else {
            break;
        }
    }
}
