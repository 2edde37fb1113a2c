//! Time budgets for polling calls

use std::time::Duration;
use tokio::time::Instant;

/// Delay between two probe invocations
pub const POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Budget for operations expected to settle quickly (3 minutes)
pub const SHORT_TIMEOUT: Duration = Duration::from_secs(3 * 60);

/// Budget for slow operations such as builds and agent launches (10 minutes)
pub const LONG_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Total duration and poll interval for a single polling call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    timeout: Duration,
    interval: Duration,
}

impl Budget {
    /// Short preset: 180s total, polled every 3s
    pub const SHORT: Budget = Budget::new(SHORT_TIMEOUT);

    /// Long preset: 600s total, polled every 3s
    pub const LONG: Budget = Budget::new(LONG_TIMEOUT);

    /// Creates a budget with the default poll interval
    pub const fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            interval: POLL_INTERVAL,
        }
    }

    /// Replaces the poll interval
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Upper bound on probe invocations: `floor(timeout / interval) + 1`
    ///
    /// Returns `None` for a zero interval, which has no bound.
    pub fn max_attempts(&self) -> Option<u128> {
        self.timeout
            .as_nanos()
            .checked_div(self.interval.as_nanos())
            .map(|n| n + 1)
    }
}

impl Default for Budget {
    fn default() -> Self {
        Self::SHORT
    }
}

/// Deadline for one polling call
///
/// Created when the call starts and dropped when it returns.
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    started: Instant,
    timeout: Duration,
}

impl Timer {
    /// Starts a timer that expires after `timeout`
    pub fn start(timeout: Duration) -> Self {
        Self {
            started: Instant::now(),
            timeout,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn expired(&self) -> bool {
        self.elapsed() >= self.timeout
    }

    /// Time left before the deadline, zero once expired
    pub fn remaining(&self) -> Duration {
        self.timeout.saturating_sub(self.elapsed())
    }
}
