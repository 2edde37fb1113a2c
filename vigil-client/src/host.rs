//! SSH host access
//!
//! Runs commands on and copies files from lab hosts by shelling out to the
//! OpenSSH client tools. Hosts are short-lived, so host key checking is off
//! and no known_hosts file is written.

use std::path::{Path, PathBuf};
use std::process::Output;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};
use vigil_core::poll::ErrorKind;

/// Errors from running OpenSSH tools against a host
#[derive(Debug, Error)]
pub enum HostError {
    /// The ssh/scp binary could not be started
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A remote command exited unsuccessfully
    #[error("Command on {host} exited with {status}: {stderr}")]
    Command {
        host: String,
        status: i32,
        stderr: String,
    },

    /// A file copy exited unsuccessfully
    #[error("Copying {source_path} exited with {status}: {stderr}")]
    Transfer {
        source_path: String,
        status: i32,
        stderr: String,
    },
}

/// Transient-failure classification of [`HostError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostErrorKind {
    Spawn,
    Command,
    Transfer,
}

impl ErrorKind for HostError {
    type Kind = HostErrorKind;

    fn kind(&self) -> HostErrorKind {
        match self {
            Self::Spawn { .. } => HostErrorKind::Spawn,
            Self::Command { .. } => HostErrorKind::Command,
            Self::Transfer { .. } => HostErrorKind::Transfer,
        }
    }
}

pub type HostResult<T> = std::result::Result<T, HostError>;

/// A host reachable over SSH
#[derive(Debug, Clone)]
pub struct SshHost {
    host: String,
    user: String,
    port: u16,
    identity: Option<PathBuf>,
    connect_timeout_secs: u32,
    ssh_program: String,
    scp_program: String,
}

impl SshHost {
    /// Creates a host reached as root on port 22
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            user: "root".to_string(),
            port: 22,
            identity: None,
            connect_timeout_secs: 10,
            ssh_program: "ssh".to_string(),
            scp_program: "scp".to_string(),
        }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_identity(mut self, identity: impl Into<PathBuf>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    /// Overrides the ssh and scp binaries
    pub fn with_programs(mut self, ssh: impl Into<String>, scp: impl Into<String>) -> Self {
        self.ssh_program = ssh.into();
        self.scp_program = scp.into();
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn destination(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }

    /// Options shared by ssh and scp
    fn common_args(&self) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            "StrictHostKeyChecking=no".to_string(),
            "-o".to_string(),
            "UserKnownHostsFile=/dev/null".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={}", self.connect_timeout_secs),
        ];
        if let Some(identity) = &self.identity {
            args.push("-i".to_string());
            args.push(identity.display().to_string());
        }
        args
    }

    async fn output(&self, program: &str, args: Vec<String>) -> HostResult<Output> {
        debug!("Running {} {}", program, args.join(" "));

        Command::new(program)
            .args(&args)
            .output()
            .await
            .map_err(|source| HostError::Spawn {
                program: program.to_string(),
                source,
            })
    }

    /// Run a command on the host and return its stdout
    pub async fn run(&self, command: &str) -> HostResult<String> {
        let mut args = self.common_args();
        args.extend([
            "-p".to_string(),
            self.port.to_string(),
            self.destination(),
            command.to_string(),
        ]);

        let output = self.output(&self.ssh_program, args).await?;
        if !output.status.success() {
            return Err(HostError::Command {
                host: self.host.clone(),
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Check whether the host accepts SSH logins
    pub async fn is_reachable(&self) -> HostResult<bool> {
        match self.run("true").await {
            Ok(_) => Ok(true),
            Err(HostError::Command { stderr, .. }) => {
                debug!("{} not reachable: {}", self.host, stderr);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Copy a file from the host to a local path
    pub async fn copy_from(&self, remote: &str, local: &Path) -> HostResult<()> {
        let source_path = format!("{}:{}", self.destination(), remote);

        let mut args = self.common_args();
        args.extend([
            "-P".to_string(),
            self.port.to_string(),
            source_path.clone(),
            local.display().to_string(),
        ]);

        let output = self.output(&self.scp_program, args).await?;
        if !output.status.success() {
            return Err(HostError::Transfer {
                source_path,
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        info!("Copied {} to {}", source_path, local.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_args_include_identity() {
        let host = SshHost::new("10.0.0.7").with_identity("/keys/id_rsa");
        let args = host.common_args();

        assert!(args.contains(&"StrictHostKeyChecking=no".to_string()));
        assert_eq!(args[args.len() - 2..], ["-i", "/keys/id_rsa"]);
        assert_eq!(host.destination(), "root@10.0.0.7");
    }

    #[tokio::test]
    async fn test_reachable_when_ssh_succeeds() {
        let host = SshHost::new("10.0.0.7").with_programs("true", "true");
        assert!(host.is_reachable().await.unwrap());
    }

    #[tokio::test]
    async fn test_unreachable_when_ssh_fails() {
        let host = SshHost::new("10.0.0.7").with_programs("false", "false");
        assert!(!host.is_reachable().await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_copy_is_transfer_error() {
        let host = SshHost::new("10.0.0.7").with_programs("false", "false");
        let err = host
            .copy_from("/var/lib/jenkins/jobs/dev_job/x", Path::new("/tmp/x"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), HostErrorKind::Transfer);
        assert!(err.to_string().contains("root@10.0.0.7:/var/lib/jenkins/jobs/dev_job/x"));
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let host = SshHost::new("10.0.0.7").with_programs("vigil-no-such-ssh", "vigil-no-such-scp");
        let err = host.is_reachable().await.unwrap_err();

        assert_eq!(err.kind(), HostErrorKind::Spawn);
    }
}
