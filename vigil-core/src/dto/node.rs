//! Node (agent) DTOs

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::agent::Agent;

const DUMB_SLAVE_DESCRIPTOR: &str = "hudson.slaves.DumbSlave$DescriptorImpl";
const SSH_LAUNCHER_CLASS: &str = "hudson.plugins.sshslaves.SSHLauncher";
const RETENTION_ALWAYS_CLASS: &str = "hudson.slaves.RetentionStrategy$Always";

/// `computer/{name}/api/json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    pub display_name: String,
    #[serde(default)]
    pub offline: bool,
    #[serde(default)]
    pub temporarily_offline: bool,
    #[serde(default)]
    pub idle: bool,
    #[serde(default)]
    pub num_executors: u32,
    #[serde(default)]
    pub offline_cause_reason: Option<String>,
}

impl NodeInfo {
    pub fn is_online(&self) -> bool {
        !self.offline
    }
}

/// `label/{name}/api/json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelInfo {
    #[serde(default)]
    pub nodes: Vec<LabelNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelNode {
    /// Empty for the built-in node
    pub node_name: String,
}

impl LabelInfo {
    pub fn node_names(&self) -> Vec<String> {
        self.nodes.iter().map(|node| node.node_name.clone()).collect()
    }
}

/// Form fields posted to `computer/doCreateItem`
#[derive(Debug, Clone, Serialize)]
pub struct CreateNode {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Node definition, JSON-encoded as Jenkins' form binder expects
    pub json: String,
}

impl CreateNode {
    /// Builds an exclusive SSH-launched agent definition
    pub fn ssh(agent: &Agent) -> Self {
        let definition = json!({
            "name": agent.hostname,
            "nodeDescription": agent.description,
            "numExecutors": agent.executors,
            "remoteFS": "/var/lib/jenkins",
            "labelString": agent.label,
            "mode": "EXCLUSIVE",
            "type": DUMB_SLAVE_DESCRIPTOR,
            "retentionStrategy": {"stapler-class": RETENTION_ALWAYS_CLASS},
            "nodeProperties": {"stapler-class-bag": "true"},
            "launcher": {
                "stapler-class": SSH_LAUNCHER_CLASS,
                "$class": SSH_LAUNCHER_CLASS,
                "host": agent.hostname,
                "port": agent.port.to_string(),
                "username": agent.username,
                "credentialsId": agent.credentials_id,
            },
        });

        Self {
            name: agent.hostname.clone(),
            kind: DUMB_SLAVE_DESCRIPTOR.to_string(),
            json: definition.to_string(),
        }
    }
}
