//! Host command handlers

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use vigil_client::{HostError, SshHost};
use vigil_core::poll::{AllowList, Budget, Poll, PollError};

use super::ssh_host;
use crate::config::Config;

/// Host subcommands
#[derive(Subcommand)]
pub enum HostCommands {
    /// Wait until every host accepts SSH logins
    Wait {
        /// Hostnames or addresses
        #[arg(required = true)]
        hosts: Vec<String>,
    },
}

/// Handle host commands
pub async fn handle_host_command(command: HostCommands, config: &Config) -> Result<()> {
    match command {
        HostCommands::Wait { hosts } => {
            for host in &hosts {
                wait_for_host(&ssh_host(config, host), config.poll.short())
                    .await
                    .with_context(|| format!("{} is not reachable", host))?;

                println!("  {} {} reachable", "✓".green(), host);
            }
            Ok(())
        }
    }
}

/// Poll until the host accepts SSH logins
///
/// Refused logins are reported as `false`, so no error kind is transient:
/// a missing ssh binary ends the wait at once.
async fn wait_for_host(ssh: &SshHost, budget: Budget) -> Result<(), PollError<HostError>> {
    Poll::new(budget)
        .allow(AllowList::none())
        .label(format!("ssh to {}", ssh.host()))
        .until_true(|| ssh.is_reachable())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};
    use vigil_client::HostErrorKind;
    use vigil_core::poll::ErrorKind;

    fn budget() -> Budget {
        Budget::new(Duration::from_secs(5)).with_interval(Duration::from_millis(50))
    }

    #[tokio::test]
    async fn test_missing_ssh_aborts_at_once() {
        let ssh = SshHost::new("10.0.0.7").with_programs("/nonexistent/ssh", "/nonexistent/scp");

        let started = Instant::now();
        let err = wait_for_host(&ssh, budget()).await.unwrap_err();

        assert_eq!(err.disallowed().map(|e| e.kind()), Some(HostErrorKind::Spawn));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_refused_logins_run_out_the_budget() {
        let ssh = SshHost::new("10.0.0.7").with_programs("false", "false");
        let budget =
            Budget::new(Duration::from_millis(200)).with_interval(Duration::from_millis(50));

        let err = wait_for_host(&ssh, budget).await.unwrap_err();

        assert!(matches!(err, PollError::Mismatch { .. }));
    }

    #[tokio::test]
    async fn test_reachable_host() {
        let ssh = SshHost::new("10.0.0.7").with_programs("true", "true");
        wait_for_host(&ssh, budget()).await.unwrap();
    }
}
