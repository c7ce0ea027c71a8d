//! Sliding-window rate limiting
//!
//! Bounds outgoing requests to N per rolling window (60 seconds by default).
//! Reaching the bound delays the caller rather than failing the request.

use std::collections::VecDeque;
use std::num::NonZeroU32;
use std::time::Duration;

use log::info;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Length of the rolling window
pub const WINDOW: Duration = Duration::from_secs(60);

/// Admission control over a trailing time window.
///
/// The admission log is locked for the whole check-wait-record sequence, so
/// concurrent callers on one client queue up instead of racing for the last
/// free slot.
pub struct SlidingWindowLimiter {
    max_requests: usize,
    window: Duration,
    admissions: Mutex<VecDeque<Instant>>,
}

impl SlidingWindowLimiter {
    /// `max_requests` admissions per 60 seconds.
    pub fn per_minute(max_requests: NonZeroU32) -> Self {
        Self::with_window(max_requests, WINDOW)
    }

    pub fn with_window(max_requests: NonZeroU32, window: Duration) -> Self {
        let max_requests = max_requests.get() as usize;
        Self {
            max_requests,
            window,
            admissions: Mutex::new(VecDeque::with_capacity(max_requests)),
        }
    }

    /// Wait until a request may go out, then record it. Returns the delay.
    ///
    /// When the window is full the caller sleeps once, until the oldest
    /// admission leaves the window, and is then admitted.
    pub async fn admit(&self) -> Duration {
        let mut admissions = self.admissions.lock().await;

        let now = Instant::now();
        prune(&mut admissions, now, self.window);

        let mut waited = Duration::ZERO;
        if admissions.len() >= self.max_requests
            && let Some(&oldest) = admissions.front()
        {
            let wait = self.window.saturating_sub(now.duration_since(oldest));
            info!(
                "Rate limit reached. Waiting {}s...",
                wait.as_secs_f64().ceil()
            );
            tokio::time::sleep(wait).await;
            waited = wait;
        }

        let admitted_at = Instant::now();
        prune(&mut admissions, admitted_at, self.window);
        admissions.push_back(admitted_at);

        waited
    }

    /// Admissions currently inside the window.
    pub async fn in_window(&self) -> usize {
        let mut admissions = self.admissions.lock().await;
        prune(&mut admissions, Instant::now(), self.window);
        admissions.len()
    }
}

/// Drop admissions at least one window old. The deque is in admission order.
fn prune(admissions: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&oldest) = admissions.front() {
        if now.duration_since(oldest) >= window {
            admissions.pop_front();
        } else {
            break;
        }
    }
}
