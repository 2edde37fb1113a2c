//! Node (agent) API endpoints

use crate::JenkinsClient;
use crate::error::{ClientError, Result};
use tracing::info;
use vigil_core::domain::agent::Agent;
use vigil_core::dto::node::{CreateNode, LabelInfo, NodeInfo};

impl JenkinsClient {
    /// Check whether a node is defined
    pub async fn node_exists(&self, name: &str) -> Result<bool> {
        match self.get_node_info(name).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Get a node's state, including whether it is online
    pub async fn get_node_info(&self, name: &str) -> Result<NodeInfo> {
        let path = format!("computer/{}/api/json", name);
        let response = self.get(&path).send().await?;

        self.handle_response(response).await
    }

    /// Names of the nodes carrying a label
    pub async fn get_label_nodes(&self, label: &str) -> Result<Vec<String>> {
        let path = format!("label/{}/api/json", label);
        let response = self.get(&path).send().await?;
        let info: LabelInfo = self.handle_response(response).await?;

        Ok(info.node_names())
    }

    /// Register an SSH-launched agent
    ///
    /// The agent's credentials must already exist on the master.
    /// Fails with [`ClientError::AlreadyExists`] if a node with the same
    /// hostname is defined.
    pub async fn create_node(&self, agent: &Agent) -> Result<()> {
        if self.node_exists(&agent.hostname).await? {
            return Err(ClientError::AlreadyExists(format!(
                "node[{}]",
                agent.hostname
            )));
        }

        let response = self
            .post("computer/doCreateItem")
            .await?
            .form(&CreateNode::ssh(agent))
            .send()
            .await?;
        self.handle_empty_response(response).await?;

        if !self.node_exists(&agent.hostname).await? {
            return Err(ClientError::NotFound(format!(
                "node[{}] does not exist after create",
                agent.hostname
            )));
        }

        info!("Created node {} (label {})", agent.hostname, agent.label);
        Ok(())
    }
}
