//! Bounded polling engine
//!
//! Repeatedly invokes a probe against an eventually-consistent system until
//! it yields an acceptable result, fails with an error kind outside the
//! allow-list, or the time budget runs out.
//!
//! Every call owns its own [`Timer`] and loop state, so polls can run
//! concurrently from independent tasks. Collaborators such as HTTP clients
//! are captured by the probe closure.
//!
//! # Example
//!
//! ```no_run
//! use std::io;
//! use vigil_core::poll::{AllowList, Budget, Poll};
//!
//! # async fn example() -> Result<(), vigil_core::poll::PollError<io::Error>> {
//! let ready = Poll::new(Budget::SHORT)
//!     .allow(AllowList::only([io::ErrorKind::ConnectionRefused]))
//!     .label("service socket")
//!     .until_true(|| async { Ok::<_, io::Error>(true) })
//!     .await?;
//! # Ok(ready)
//! # }
//! ```

mod allow;
mod budget;
mod error;

pub use allow::{AllowList, ErrorKind};
pub use budget::{Budget, LONG_TIMEOUT, POLL_INTERVAL, SHORT_TIMEOUT, Timer};
pub use error::PollError;

use std::fmt::{Debug, Display};
use std::future::Future;
use tracing::{debug, warn};

/// How the loop ended when the probe did not fail fatally
enum Finish<T> {
    Accepted(T),
    Exhausted {
        attempts: u32,
        last_value: Option<T>,
        last_error: Option<String>,
    },
}

/// A configured polling call
///
/// Defaults to allowing no error kinds and labelling the probe `"probe"`.
#[derive(Debug, Clone)]
pub struct Poll<K> {
    budget: Budget,
    allowed: AllowList<K>,
    label: String,
}

impl<K> Poll<K>
where
    K: Copy + Eq + std::hash::Hash + Debug,
{
    pub fn new(budget: Budget) -> Self {
        Self {
            budget,
            allowed: AllowList::default(),
            label: "probe".to_string(),
        }
    }

    pub fn short() -> Self {
        Self::new(Budget::SHORT)
    }

    pub fn long() -> Self {
        Self::new(Budget::LONG)
    }

    /// Sets the error kinds treated as transient
    pub fn allow(mut self, allowed: AllowList<K>) -> Self {
        self.allowed = allowed;
        self
    }

    /// Names the probe in log events and timeout errors
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn budget(&self) -> Budget {
        self.budget
    }

    /// Polls until the probe returns `Ok`, yielding its value
    pub async fn until_success<T, E, F, Fut>(&self, probe: F) -> Result<T, PollError<E>>
    where
        E: ErrorKind<Kind = K> + Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match self.run(probe, |_| true).await? {
            Finish::Accepted(value) => Ok(value),
            Finish::Exhausted {
                attempts,
                last_error,
                ..
            } => Err(PollError::TimedOut {
                probe: self.label.clone(),
                timeout: self.budget.timeout(),
                attempts,
                last_error,
            }),
        }
    }

    /// Polls until the probe returns a value equal to `expected`
    pub async fn until_equals<T, E, F, Fut>(
        &self,
        probe: F,
        expected: T,
    ) -> Result<(), PollError<E>>
    where
        T: PartialEq + Debug,
        E: ErrorKind<Kind = K> + Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match self.run(probe, |value| *value == expected).await? {
            Finish::Accepted(_) => Ok(()),
            Finish::Exhausted {
                last_value: Some(last),
                ..
            } => Err(PollError::Mismatch {
                last: format!("{:?}", last),
                expected: format!("{:?}", expected),
                timeout: self.budget.timeout(),
            }),
            Finish::Exhausted {
                last_value: None,
                attempts,
                ..
            } => Err(PollError::NeverEvaluated {
                probe: self.label.clone(),
                timeout: self.budget.timeout(),
                attempts,
            }),
        }
    }

    /// Polls until the probe returns `true`
    pub async fn until_true<E, F, Fut>(&self, probe: F) -> Result<(), PollError<E>>
    where
        E: ErrorKind<Kind = K> + Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool, E>>,
    {
        self.until_equals(probe, true).await
    }

    async fn run<T, E, F, Fut, A>(
        &self,
        mut probe: F,
        accept: A,
    ) -> Result<Finish<T>, PollError<E>>
    where
        E: ErrorKind<Kind = K> + Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        A: Fn(&T) -> bool,
    {
        let timer = Timer::start(self.budget.timeout());
        let mut attempts = 0u32;
        let mut last_value = None;
        let mut last_error = None;

        while !timer.expired() {
            attempts += 1;

            match probe().await {
                Ok(value) if accept(&value) => {
                    if attempts > 1 {
                        debug!(
                            "{} succeeded after {} attempt(s) in {:?}",
                            self.label,
                            attempts,
                            timer.elapsed()
                        );
                    }
                    return Ok(Finish::Accepted(value));
                }
                Ok(value) => {
                    debug!("{} not ready yet (attempt {})", self.label, attempts);
                    last_value = Some(value);
                }
                Err(e) if self.allowed.permits(&e) => {
                    debug!(
                        "{} failed with allowed {:?} (attempt {}): {}",
                        self.label,
                        e.kind(),
                        attempts,
                        e
                    );
                    last_error = Some(e.to_string());
                }
                Err(e) => {
                    warn!(
                        "{} failed with disallowed {:?} on attempt {}: {}",
                        self.label,
                        e.kind(),
                        attempts,
                        e
                    );
                    return Err(PollError::Disallowed(e));
                }
            }

            // Never sleep past the deadline
            let remaining = timer.remaining();
            if remaining.is_zero() {
                break;
            }
            tokio::time::sleep(self.budget.interval().min(remaining)).await;
        }

        warn!(
            "{} gave up after {} attempt(s) in {:?}",
            self.label,
            attempts,
            timer.elapsed()
        );

        Ok(Finish::Exhausted {
            attempts,
            last_value,
            last_error,
        })
    }
}

/// Polls `probe` until it returns `Ok`, within `budget`
pub async fn poll_until_success<T, E, F, Fut>(
    probe: F,
    budget: Budget,
    allowed: AllowList<E::Kind>,
) -> Result<T, PollError<E>>
where
    E: ErrorKind + Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    Poll::new(budget).allow(allowed).until_success(probe).await
}

pub async fn poll_until_success_short<T, E, F, Fut>(
    probe: F,
    allowed: AllowList<E::Kind>,
) -> Result<T, PollError<E>>
where
    E: ErrorKind + Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    poll_until_success(probe, Budget::SHORT, allowed).await
}

pub async fn poll_until_success_long<T, E, F, Fut>(
    probe: F,
    allowed: AllowList<E::Kind>,
) -> Result<T, PollError<E>>
where
    E: ErrorKind + Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    poll_until_success(probe, Budget::LONG, allowed).await
}

/// Polls `probe` until it returns `expected`, within `budget`
pub async fn poll_until_equals<T, E, F, Fut>(
    probe: F,
    expected: T,
    budget: Budget,
    allowed: AllowList<E::Kind>,
) -> Result<(), PollError<E>>
where
    T: PartialEq + Debug,
    E: ErrorKind + Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    Poll::new(budget)
        .allow(allowed)
        .until_equals(probe, expected)
        .await
}

pub async fn poll_until_equals_short<T, E, F, Fut>(
    probe: F,
    expected: T,
    allowed: AllowList<E::Kind>,
) -> Result<(), PollError<E>>
where
    T: PartialEq + Debug,
    E: ErrorKind + Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    poll_until_equals(probe, expected, Budget::SHORT, allowed).await
}

pub async fn poll_until_equals_long<T, E, F, Fut>(
    probe: F,
    expected: T,
    allowed: AllowList<E::Kind>,
) -> Result<(), PollError<E>>
where
    T: PartialEq + Debug,
    E: ErrorKind + Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    poll_until_equals(probe, expected, Budget::LONG, allowed).await
}

/// Polls `probe` until it returns `true`, within `budget`
pub async fn poll_until_true<E, F, Fut>(
    probe: F,
    budget: Budget,
    allowed: AllowList<E::Kind>,
) -> Result<(), PollError<E>>
where
    E: ErrorKind + Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    poll_until_equals(probe, true, budget, allowed).await
}

pub async fn poll_until_true_short<E, F, Fut>(
    probe: F,
    allowed: AllowList<E::Kind>,
) -> Result<(), PollError<E>>
where
    E: ErrorKind + Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    poll_until_true(probe, Budget::SHORT, allowed).await
}

pub async fn poll_until_true_long<E, F, Fut>(
    probe: F,
    allowed: AllowList<E::Kind>,
) -> Result<(), PollError<E>>
where
    E: ErrorKind + Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    poll_until_true(probe, Budget::LONG, allowed).await
}
