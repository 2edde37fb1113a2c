//! Plugin command handlers

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;

use super::jenkins_client;
use crate::config::Config;

/// Plugin subcommands
#[derive(Subcommand)]
pub enum PluginCommands {
    /// List installed plugins
    List,
    /// Fail unless every named plugin is installed
    Verify {
        /// Plugin short names (e.g. ssh-slaves)
        #[arg(required = true)]
        names: Vec<String>,
    },
}

/// Handle plugin commands
pub async fn handle_plugin_command(command: PluginCommands, config: &Config) -> Result<()> {
    let client = jenkins_client(config);

    let plugins = client
        .get_plugins()
        .await
        .context("Failed to list plugins")?;

    match command {
        PluginCommands::List => {
            println!(
                "{}",
                format!("Found {} installed plugin(s):", plugins.len()).bold()
            );
            for plugin in plugins {
                println!(
                    "  {} {} {}",
                    "▸".cyan(),
                    plugin.short_name.bold(),
                    plugin.version.unwrap_or_default().dimmed()
                );
            }
            Ok(())
        }
        PluginCommands::Verify { names } => {
            let missing = missing_plugins(&names, plugins.iter().map(|p| p.short_name.as_str()));

            for name in &names {
                if missing.contains(name) {
                    println!("  {} {}", "✗".red(), name);
                } else {
                    println!("  {} {}", "✓".green(), name);
                }
            }

            if !missing.is_empty() {
                anyhow::bail!("missing plugin(s): {}", missing.join(", "));
            }
            Ok(())
        }
    }
}

/// Names from `wanted` that are not installed
fn missing_plugins<'a>(wanted: &[String], installed: impl Iterator<Item = &'a str>) -> Vec<String> {
    let installed: Vec<&str> = installed.collect();
    wanted
        .iter()
        .filter(|name| !installed.contains(&name.as_str()))
        .cloned()
        .collect()
}
