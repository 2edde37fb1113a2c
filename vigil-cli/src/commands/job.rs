//! Job command handlers
//!
//! Handles job creation, existence checks and triggering builds.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use std::path::PathBuf;
use tracing::info;
use vigil_client::{ClientErrorKind, JenkinsClient};
use vigil_core::domain::job::Job;
use vigil_core::dto::job::{BuildInfo, EMPTY_CONFIG_XML};
use vigil_core::poll::{AllowList, Budget, Poll, Timer};

use super::jenkins_client;
use crate::config::Config;

/// Job subcommands
#[derive(Subcommand)]
pub enum JobCommands {
    /// Create a job unless it already exists
    Create {
        /// Job name
        name: String,

        /// config.xml to create the job from; a blank job when omitted
        #[arg(long)]
        xml: Option<PathBuf>,
    },
    /// Exit successfully if the job exists
    Exists {
        /// Job name
        name: String,
    },
    /// Trigger a build
    Build {
        /// Job name
        name: String,

        /// Wait for the build to finish and require success
        #[arg(long)]
        wait: bool,

        /// Require the build to run on a node carrying this label
        #[arg(long, requires = "wait")]
        label: Option<String>,
    },
}

/// Handle job commands
///
/// Routes job subcommands to their respective handlers.
pub async fn handle_job_command(command: JobCommands, config: &Config) -> Result<()> {
    let client = jenkins_client(config);

    match command {
        JobCommands::Create { name, xml } => {
            let job = match xml {
                Some(path) => Job::new(name).with_xml_path(path),
                None => Job::new(name),
            };
            create_job(&client, &job).await
        }
        JobCommands::Exists { name } => {
            if client.job_exists(&name).await? {
                println!("{} Job {} exists", "✓".green(), name.bold());
                Ok(())
            } else {
                anyhow::bail!("job {} does not exist", name)
            }
        }
        JobCommands::Build { name, wait, label } => {
            let job = match label {
                Some(label) => Job::new(name).with_label(label),
                None => Job::new(name),
            };
            build_job(&client, &job, wait.then(|| config.poll.long())).await
        }
    }
}

/// Create a job from its config.xml, or blank, unless it exists
async fn create_job(client: &JenkinsClient, job: &Job) -> Result<()> {
    if client.job_exists(&job.name).await? {
        println!("{} Job {} already exists", "✓".green(), job.name.bold());
        return Ok(());
    }

    let config_xml = match &job.xml_path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => EMPTY_CONFIG_XML.to_string(),
    };

    client
        .create_job(&job.name, &config_xml)
        .await
        .with_context(|| format!("Failed to create job {}", job.name))?;

    println!("{} Created job {}", "✓".green(), job.name.bold());
    Ok(())
}

/// Trigger a build, optionally waiting for it to succeed
///
/// Queueing and running share one budget.
async fn build_job(client: &JenkinsClient, job: &Job, wait: Option<Budget>) -> Result<()> {
    let name = job.name.as_str();
    let next_number = client
        .get_job_info(name)
        .await
        .with_context(|| format!("Failed to get job {}", name))?
        .next_build_number;

    let queue_id = client
        .build_job(name)
        .await
        .with_context(|| format!("Failed to trigger job {}", name))?;

    println!("{} Triggered {}", "✓".green(), name.bold());

    let Some(budget) = wait else {
        return Ok(());
    };
    let timer = Timer::start(budget.timeout());

    let number = match queue_id {
        Some(id) => wait_for_executable(client, id, budget).await?,
        None => next_number,
    };
    info!("Waiting for {} #{}", name, number);

    let left = Budget::new(timer.remaining()).with_interval(budget.interval());
    let build = wait_for_build(client, name, number, left).await?;
    if !build.succeeded() {
        anyhow::bail!("{} #{} finished with {:?}", name, number, build.result);
    }

    if let Some(label) = &job.label {
        check_built_on(client, &build, label).await?;
    }

    println!("{} {} #{} succeeded", "✓".green(), name.bold(), number);
    Ok(())
}

/// Error kinds tolerated while a build is queued or running
fn transient() -> AllowList<ClientErrorKind> {
    AllowList::only([
        ClientErrorKind::Timeout,
        ClientErrorKind::Connection,
        ClientErrorKind::BadHttp,
    ])
}

/// Wait for a queue item to start and return its build number
async fn wait_for_executable(client: &JenkinsClient, queue_id: u64, budget: Budget) -> Result<u32> {
    let probe = || async {
        client
            .get_queue_item(queue_id)
            .await
            .map(|item| item.executable.is_some())
    };

    Poll::new(budget)
        .allow(transient())
        .label(format!("queue item {}", queue_id))
        .until_true(probe)
        .await?;

    client
        .get_queue_item(queue_id)
        .await?
        .executable
        .map(|build| build.number)
        .context("queue item has no build")
}

/// Wait for a build to finish
///
/// The build is not found while it sits in the queue.
async fn wait_for_build(
    client: &JenkinsClient,
    name: &str,
    number: u32,
    budget: Budget,
) -> Result<BuildInfo> {
    Poll::new(budget)
        .allow(transient().with(ClientErrorKind::NotFound))
        .label(format!("build {} #{}", name, number))
        .until_true(|| async {
            client
                .get_build_info(name, number)
                .await
                .map(|build| build.is_finished())
        })
        .await?;

    Ok(client.get_build_info(name, number).await?)
}

/// Fail unless the build ran on a node carrying `label`
async fn check_built_on(client: &JenkinsClient, build: &BuildInfo, label: &str) -> Result<()> {
    let nodes = client
        .get_label_nodes(label)
        .await
        .with_context(|| format!("Failed to list nodes labelled {}", label))?;
    let built_on = build.built_on.as_deref().unwrap_or_default();

    if !nodes.iter().any(|node| node == built_on) {
        anyhow::bail!(
            "#{} ran on {:?}, which is not one of the {} nodes: {}",
            build.number,
            built_on,
            label,
            nodes.join(", ")
        );
    }
    Ok(())
}
