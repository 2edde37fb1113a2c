//! Vigil CLI
//!
//! Drives a live Jenkins deployment through the steps of the system-test
//! labs: waiting for the master, verifying plugins, registering agents,
//! creating and triggering jobs, and collecting artifacts.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::{Config, PollConfig};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "vigil")]
#[command(about = "Jenkins system-test harness", long_about = None)]
struct Cli {
    /// Jenkins master URL
    #[arg(long, env = "VIGIL_JENKINS_URL", default_value = "http://localhost:8080")]
    jenkins_url: String,

    /// Jenkins API user
    #[arg(long, env = "VIGIL_JENKINS_USER")]
    user: Option<String>,

    /// Jenkins API password or token
    #[arg(long, env = "VIGIL_JENKINS_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// User for SSH/SCP access to lab hosts
    #[arg(long, env = "VIGIL_SSH_USER", default_value = "root")]
    ssh_user: String,

    /// Private key for SSH/SCP access
    #[arg(long, env = "VIGIL_SSH_IDENTITY")]
    ssh_identity: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vigil=info,vigil_client=info,vigil_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config {
        jenkins_url: cli.jenkins_url,
        username: cli.user,
        password: cli.password,
        ssh_user: cli.ssh_user,
        ssh_identity: cli.ssh_identity,
        poll: PollConfig::from_env(),
    };
    config.validate()?;

    handle_command(cli.command, &config).await
}
