//! Build agent domain types

use serde::{Deserialize, Serialize};

/// An SSH-launched agent to register on the master
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub hostname: String,
    pub label: String,
    /// Id of credentials already stored on the master
    pub credentials_id: String,
    pub port: u16,
    pub username: String,
    pub executors: u32,
    pub description: String,
}

impl Agent {
    /// Creates an agent with the lab defaults: root over port 22, one executor
    pub fn new(
        hostname: impl Into<String>,
        label: impl Into<String>,
        credentials_id: impl Into<String>,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            label: label.into(),
            credentials_id: credentials_id.into(),
            port: 22,
            username: "root".to_string(),
            executors: 1,
            description: "test slave".to_string(),
        }
    }
}
