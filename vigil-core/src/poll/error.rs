//! Failure outcomes of a polling call

use std::time::Duration;
use thiserror::Error;

/// Why a polling call ended without success
#[derive(Debug, Error)]
pub enum PollError<E> {
    /// The probe failed with a kind outside the allow-list; the error is
    /// returned exactly as the probe produced it
    #[error(transparent)]
    Disallowed(E),

    /// The budget ran out and the probe never returned successfully
    #[error(
        "{probe} did not succeed after {} seconds ({attempts} attempts, last error: {})",
        .timeout.as_secs(),
        .last_error.as_deref().unwrap_or("none")
    )]
    TimedOut {
        probe: String,
        timeout: Duration,
        attempts: u32,
        last_error: Option<String>,
    },

    /// The budget ran out and the last observed value never matched
    #[error("{last} != {expected} after {} seconds", .timeout.as_secs())]
    Mismatch {
        last: String,
        expected: String,
        timeout: Duration,
    },

    /// The budget ran out and every invocation failed with an allowed error
    #[error("{probe} failed to evaluate after {} seconds", .timeout.as_secs())]
    NeverEvaluated {
        probe: String,
        timeout: Duration,
        attempts: u32,
    },
}

impl<E> PollError<E> {
    /// True for every budget-exhaustion variant
    pub fn is_timeout(&self) -> bool {
        !matches!(self, Self::Disallowed(_))
    }

    pub fn disallowed(&self) -> Option<&E> {
        match self {
            Self::Disallowed(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the probe's own error if it ended the poll
    pub fn into_disallowed(self) -> Option<E> {
        match self {
            Self::Disallowed(err) => Some(err),
            _ => None,
        }
    }
}
