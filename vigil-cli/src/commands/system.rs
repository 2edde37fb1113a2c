//! Master-level command handlers

use anyhow::{Context, Result};
use colored::*;
use tracing::info;

use super::jenkins_client;
use crate::config::Config;

/// Wait until the master answers API calls
pub async fn wait(config: &Config) -> Result<()> {
    let client = jenkins_client(config);

    client
        .wait_until_available_within(config.poll.short())
        .await
        .with_context(|| format!("Jenkins at {} did not come up", client.base_url()))?;

    println!("{} Jenkins is available at {}", "✓".green(), client.base_url());
    Ok(())
}

/// Print the Jenkins version
pub async fn version(config: &Config) -> Result<()> {
    let client = jenkins_client(config);
    let version = client
        .get_version()
        .await
        .context("Failed to query Jenkins version")?;

    println!("{}", version);
    Ok(())
}

/// Restart the master and wait until it is back
pub async fn restart(config: &Config) -> Result<()> {
    let client = jenkins_client(config);

    client.restart().await.context("Failed to request restart")?;
    info!("Waiting for Jenkins to come back");

    client
        .wait_until_available_within(config.poll.long())
        .await
        .context("Jenkins did not come back after restart")?;

    println!("{} Jenkins restarted", "✓".green());
    Ok(())
}
