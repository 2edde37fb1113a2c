//! Commands module
//!
//! Defines all CLI commands and their handlers. Each command is one step
//! of the Jenkins system-test scenario.

mod artifact;
mod host;
mod job;
mod node;
mod plugin;
mod system;

pub use artifact::ArtifactCommands;
pub use host::HostCommands;
pub use job::JobCommands;
pub use node::NodeCommands;
pub use plugin::PluginCommands;

use anyhow::Result;
use clap::Subcommand;
use vigil_client::{JenkinsClient, SshHost};

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Wait until the Jenkins master answers API calls
    Wait,
    /// Print the Jenkins version
    Version,
    /// Restart the master and wait until it is back
    Restart,
    /// Plugin checks
    Plugins {
        #[command(subcommand)]
        command: PluginCommands,
    },
    /// Agent registration
    Node {
        #[command(subcommand)]
        command: NodeCommands,
    },
    /// Job management
    Job {
        #[command(subcommand)]
        command: JobCommands,
    },
    /// Lab host access
    Host {
        #[command(subcommand)]
        command: HostCommands,
    },
    /// Build artifact retrieval
    Artifact {
        #[command(subcommand)]
        command: ArtifactCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Wait => system::wait(config).await,
        Commands::Version => system::version(config).await,
        Commands::Restart => system::restart(config).await,
        Commands::Plugins { command } => plugin::handle_plugin_command(command, config).await,
        Commands::Node { command } => node::handle_node_command(command, config).await,
        Commands::Job { command } => job::handle_job_command(command, config).await,
        Commands::Host { command } => host::handle_host_command(command, config).await,
        Commands::Artifact { command } => {
            artifact::handle_artifact_command(command, config).await
        }
    }
}

/// Build a Jenkins client from the configuration
fn jenkins_client(config: &Config) -> JenkinsClient {
    let client = JenkinsClient::new(&config.jenkins_url);
    match (&config.username, &config.password) {
        (Some(user), password) => {
            client.with_auth(user, password.clone().unwrap_or_default())
        }
        (None, _) => client,
    }
}

/// Build SSH access to a lab host from the configuration
fn ssh_host(config: &Config, host: &str) -> SshHost {
    let ssh = SshHost::new(host).with_user(&config.ssh_user);
    match &config.ssh_identity {
        Some(identity) => ssh.with_identity(identity),
        None => ssh,
    }
}
