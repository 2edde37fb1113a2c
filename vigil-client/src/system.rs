//! Master-level API endpoints: version, plugins, restart, availability

use crate::JenkinsClient;
use crate::error::{ClientError, ClientErrorKind, Result};
use tracing::{info, warn};
use vigil_core::dto::system::{PluginInfo, PluginList};
use vigil_core::poll::{AllowList, Budget, Poll};

/// Header carrying the Jenkins version on every response
const VERSION_HEADER: &str = "X-Jenkins";

impl JenkinsClient {
    /// Get the Jenkins version of the master
    pub async fn get_version(&self) -> Result<String> {
        let response = self.get("").send().await?;
        let response = self.check_status(response).await?;

        response
            .headers()
            .get(VERSION_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| ClientError::BadHttp {
                status: response.status().as_u16(),
                message: format!("missing {} header, is this Jenkins?", VERSION_HEADER),
            })
    }

    /// List installed plugins
    pub async fn get_plugins(&self) -> Result<Vec<PluginInfo>> {
        let response = self
            .get("pluginManager/api/json")
            .query(&[("depth", "2")])
            .send()
            .await?;

        let list: PluginList = self.handle_response(response).await?;
        Ok(list.plugins)
    }

    /// Check whether a plugin is installed, by short name
    pub async fn has_plugin(&self, short_name: &str) -> Result<bool> {
        let plugins = self.get_plugins().await?;
        Ok(plugins.iter().any(|p| p.short_name == short_name))
    }

    /// Ask the master to restart
    ///
    /// A 503 answer means the restart is already under way and is accepted.
    pub async fn restart(&self) -> Result<()> {
        let response = self.post("restart").await?.send().await?;

        match self.handle_empty_response(response).await {
            Err(ClientError::BadHttp { status: 503, .. }) | Ok(()) => {
                info!("Restart requested");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Wait until the master answers API calls, using the short budget
    pub async fn wait_until_available(&self) -> Result<()> {
        self.wait_until_available_within(Budget::SHORT).await
    }

    /// Wait until the master answers API calls
    ///
    /// Connection failures, timeouts and error responses are treated as
    /// transient while Jenkins starts up.
    pub async fn wait_until_available_within(&self, budget: Budget) -> Result<()> {
        let result = Poll::new(budget)
            .allow(AllowList::only([
                ClientErrorKind::BadHttp,
                ClientErrorKind::Api,
                ClientErrorKind::Timeout,
                ClientErrorKind::Connection,
            ]))
            .label("jenkins availability")
            .until_true(|| async { self.get_version().await.map(|_| true) })
            .await;

        if let Err(e) = &result {
            warn!("Jenkins at {} not available: {}", self.base_url(), e);
        }
        result.map_err(ClientError::from)
    }
}
