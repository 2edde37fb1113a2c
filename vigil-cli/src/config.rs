//! Configuration module
//!
//! Connection settings come from the command line (with environment
//! fallbacks); polling budgets come from the environment.

use std::path::PathBuf;
use std::time::Duration;
use vigil_core::poll::{Budget, LONG_TIMEOUT, POLL_INTERVAL, SHORT_TIMEOUT};

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the Jenkins master
    pub jenkins_url: String,

    /// Jenkins API user, if the master requires authentication
    pub username: Option<String>,

    /// Jenkins API password or token
    pub password: Option<String>,

    /// User for SSH/SCP access to lab hosts
    pub ssh_user: String,

    /// Private key for SSH/SCP access
    pub ssh_identity: Option<PathBuf>,

    pub poll: PollConfig,
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.jenkins_url.starts_with("http://") && !self.jenkins_url.starts_with("https://") {
            anyhow::bail!("jenkins_url must start with http:// or https://");
        }

        if self.password.is_some() && self.username.is_none() {
            anyhow::bail!("a Jenkins password was given without a user");
        }

        self.poll.validate()
    }
}

/// Polling budgets used by the scenario steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Budget for steps expected to settle quickly
    pub short_timeout: Duration,

    /// Budget for builds and agent launches
    pub long_timeout: Duration,

    /// Delay between probe invocations
    pub interval: Duration,
}

impl PollConfig {
    /// Loads budgets from environment variables
    ///
    /// Expected environment variables (all optional, in seconds):
    /// - VIGIL_SHORT_TIMEOUT (default: 180)
    /// - VIGIL_LONG_TIMEOUT (default: 600)
    /// - VIGIL_POLL_INTERVAL (default: 3)
    pub fn from_env() -> Self {
        Self {
            short_timeout: secs_from_env("VIGIL_SHORT_TIMEOUT").unwrap_or(SHORT_TIMEOUT),
            long_timeout: secs_from_env("VIGIL_LONG_TIMEOUT").unwrap_or(LONG_TIMEOUT),
            interval: secs_from_env("VIGIL_POLL_INTERVAL").unwrap_or(POLL_INTERVAL),
        }
    }

    pub fn short(&self) -> Budget {
        Budget::new(self.short_timeout).with_interval(self.interval)
    }

    pub fn long(&self) -> Budget {
        Budget::new(self.long_timeout).with_interval(self.interval)
    }

    /// Validates the budgets
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.interval.is_zero() {
            anyhow::bail!("poll interval must be greater than 0");
        }

        if self.short_timeout.is_zero() || self.long_timeout.is_zero() {
            anyhow::bail!("poll timeouts must be greater than 0");
        }

        if self.short_timeout > self.long_timeout {
            anyhow::bail!("short timeout cannot exceed long timeout");
        }

        Ok(())
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            short_timeout: SHORT_TIMEOUT,
            long_timeout: LONG_TIMEOUT,
            interval: POLL_INTERVAL,
        }
    }
}

fn secs_from_env(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
}
