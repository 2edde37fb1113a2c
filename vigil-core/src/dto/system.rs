//! Master-level DTOs: plugins and CSRF crumbs

use serde::{Deserialize, Serialize};

/// One entry of `pluginManager/api/json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginInfo {
    pub short_name: String,
    #[serde(default)]
    pub long_name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub enabled: bool,
}

/// `pluginManager/api/json?depth=2`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginList {
    #[serde(default)]
    pub plugins: Vec<PluginInfo>,
}

/// `crumbIssuer/api/json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Crumb {
    pub crumb: String,
    pub crumb_request_field: String,
}

/// Response body of `queue/item/{id}/api/json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: u64,
    #[serde(default)]
    pub why: Option<String>,
    #[serde(default)]
    pub executable: Option<crate::dto::job::BuildRef>,
}
