//! Artifact command handlers

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use std::path::{Path, PathBuf};
use vigil_client::{HostError, HostErrorKind, SshHost};
use vigil_core::domain::job::Job;
use vigil_core::poll::{AllowList, Budget, Poll, PollError};

use super::ssh_host;
use crate::config::Config;

/// Artifact subcommands
#[derive(Subcommand)]
pub enum ArtifactCommands {
    /// Copy a file from a job's last successful archive on the master
    Fetch {
        /// Job name
        job: String,

        /// Master host to copy from
        host: String,

        /// File name inside the archive
        file: String,

        /// Local destination path
        dest: PathBuf,
    },
}

/// Handle artifact commands
pub async fn handle_artifact_command(command: ArtifactCommands, config: &Config) -> Result<()> {
    match command {
        ArtifactCommands::Fetch {
            job,
            host,
            file,
            dest,
        } => {
            let remote = format!("{}{}", Job::new(job).latest_artifact_path(), file);
            let ssh = ssh_host(config, &host);

            fetch(&ssh, &remote, &dest, config.poll.short())
                .await
                .with_context(|| format!("Failed to fetch {} from {}", remote, host))?;

            println!("{} Fetched {} to {}", "✓".green(), remote, dest.display());
            Ok(())
        }
    }
}

/// Copy `remote` to `dest`, retrying failed transfers
///
/// The archive appears once the build has been recorded.
async fn fetch(
    ssh: &SshHost,
    remote: &str,
    dest: &Path,
    budget: Budget,
) -> Result<(), PollError<HostError>> {
    Poll::new(budget)
        .allow(AllowList::only([HostErrorKind::Transfer]))
        .label(format!("copy of {}", remote))
        .until_success(|| ssh.copy_from(remote, dest))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::time::Duration;

    const REMOTE: &str = "/var/lib/jenkins/jobs/dev_job/lastSuccessful/archive/dummy_artifact";

    /// Writes an scp stand-in that fails `failures` times, then copies
    fn fake_scp(dir: &Path, failures: u32) -> String {
        let script = dir.join("scp");
        let count = dir.join("count");
        std::fs::write(
            &script,
            format!(
                "#!/bin/sh\n\
                 n=$(cat {count} 2>/dev/null || echo 0)\n\
                 echo $((n + 1)) > {count}\n\
                 if [ \"$n\" -lt {failures} ]; then echo 'No such file' >&2; exit 1; fi\n\
                 for dest; do :; done\n\
                 printf artifact > \"$dest\"\n",
                count = count.display(),
            ),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        script.display().to_string()
    }

    fn attempts(dir: &Path) -> u32 {
        std::fs::read_to_string(dir.join("count"))
            .unwrap()
            .trim()
            .parse()
            .unwrap()
    }

    fn budget() -> Budget {
        Budget::new(Duration::from_secs(10)).with_interval(Duration::from_millis(50))
    }

    #[tokio::test]
    async fn test_fetch_retries_failed_transfers() {
        let dir = tempfile::tempdir().unwrap();
        let scp = fake_scp(dir.path(), 2);
        let ssh = SshHost::new("10.0.0.7").with_programs("true", scp);
        let dest = dir.path().join("dummy_artifact");

        fetch(&ssh, REMOTE, &dest, budget()).await.unwrap();

        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "artifact");
        assert_eq!(attempts(dir.path()), 3);
    }

    #[tokio::test]
    async fn test_fetch_gives_up_after_budget() {
        let dir = tempfile::tempdir().unwrap();
        let scp = fake_scp(dir.path(), u32::MAX);
        let ssh = SshHost::new("10.0.0.7").with_programs("true", scp);
        let budget =
            Budget::new(Duration::from_millis(300)).with_interval(Duration::from_millis(50));

        let err = fetch(&ssh, REMOTE, &dir.path().join("x"), budget)
            .await
            .unwrap_err();

        assert!(matches!(err, PollError::TimedOut { .. }));
        assert!(err.to_string().contains("No such file"));
    }

    #[tokio::test]
    async fn test_missing_scp_is_not_retried() {
        let dir = tempfile::tempdir().unwrap();
        let ssh = SshHost::new("10.0.0.7").with_programs("true", "/nonexistent/scp");

        let err = fetch(&ssh, REMOTE, &dir.path().join("x"), budget())
            .await
            .unwrap_err();

        assert!(matches!(err, PollError::Disallowed(HostError::Spawn { .. })));
    }
}
