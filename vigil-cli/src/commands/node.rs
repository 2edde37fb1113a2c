//! Node command handlers
//!
//! Registers SSH agents on the master and waits for them to come online.
//! Agents launch independently, so each one is polled on its own task.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use tracing::{info, warn};
use vigil_client::{ClientErrorKind, JenkinsClient};
use vigil_core::domain::agent::Agent;
use vigil_core::dto::node::NodeInfo;
use vigil_core::poll::{AllowList, Budget, Poll};

use super::jenkins_client;
use crate::config::Config;

/// Node subcommands
#[derive(Subcommand)]
pub enum NodeCommands {
    /// Register SSH agents (if missing) and wait until all are online
    Add {
        /// Agent hostnames or addresses
        #[arg(required = true)]
        hosts: Vec<String>,

        /// Label jobs use to target these agents
        #[arg(long)]
        label: String,

        /// Id of SSH credentials stored on the master
        #[arg(long)]
        credentials_id: String,

        /// SSH port on the agents
        #[arg(long, default_value_t = 22)]
        port: u16,

        /// Number of executors per agent
        #[arg(long, default_value_t = 1)]
        executors: u32,
    },
    /// Show a node's state
    Status {
        /// Node name
        name: String,
    },
}

/// Handle node commands
pub async fn handle_node_command(command: NodeCommands, config: &Config) -> Result<()> {
    let client = jenkins_client(config);

    match command {
        NodeCommands::Add {
            hosts,
            label,
            credentials_id,
            port,
            executors,
        } => {
            let agents = hosts
                .into_iter()
                .map(|host| {
                    let mut agent = Agent::new(host, label.clone(), credentials_id.clone());
                    agent.port = port;
                    agent.executors = executors;
                    agent
                })
                .collect::<Vec<_>>();

            add_agents(&client, &agents, config.poll.long()).await
        }
        NodeCommands::Status { name } => {
            let info = client
                .get_node_info(&name)
                .await
                .with_context(|| format!("Failed to get node {}", name))?;
            print_node(&info);
            Ok(())
        }
    }
}

/// Create missing agents, then wait for every agent to come online
async fn add_agents(client: &JenkinsClient, agents: &[Agent], budget: Budget) -> Result<()> {
    for agent in agents {
        if client.node_exists(&agent.hostname).await? {
            info!("Node {} already registered", agent.hostname);
            continue;
        }
        client
            .create_node(agent)
            .await
            .with_context(|| format!("Failed to create node {}", agent.hostname))?;
    }

    let handles = agents
        .iter()
        .map(|agent| {
            let client = client.clone();
            let name = agent.hostname.clone();
            tokio::spawn(async move {
                let result = wait_until_online(&client, &name, budget).await;
                (name, result)
            })
        })
        .collect::<Vec<_>>();

    let mut failed = Vec::new();
    for handle in handles {
        let (name, result) = handle.await.context("Agent wait task panicked")?;
        match result {
            Ok(()) => println!("  {} {} online", "✓".green(), name),
            Err(e) => {
                warn!("Agent {} did not come online: {:#}", name, e);
                println!("  {} {} {}", "✗".red(), name, e);
                failed.push(name);
            }
        }
    }

    if !failed.is_empty() {
        anyhow::bail!("agent(s) not online: {}", failed.join(", "));
    }
    Ok(())
}

/// Poll one node until the master reports it online
async fn wait_until_online(client: &JenkinsClient, name: &str, budget: Budget) -> Result<()> {
    Poll::new(budget)
        .allow(AllowList::only([
            ClientErrorKind::Timeout,
            ClientErrorKind::Connection,
            ClientErrorKind::BadHttp,
        ]))
        .label(format!("node {}", name))
        .until_true(|| async { client.get_node_info(name).await.map(|n| n.is_online()) })
        .await?;

    Ok(())
}

/// Print a node summary
fn print_node(info: &NodeInfo) {
    let state = if info.is_online() {
        "online".green()
    } else {
        "offline".red()
    };

    println!("  {} Node {}", "▸".cyan(), info.display_name.bold());
    println!("    State:      {}", state);
    println!("    Executors:  {}", info.num_executors);
    if let Some(reason) = &info.offline_cause_reason {
        println!("    Reason:     {}", reason.dimmed());
    }
}
