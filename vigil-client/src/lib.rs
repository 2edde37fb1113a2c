//! Vigil clients
//!
//! Typed access to the two remote collaborators the harness drives:
//!
//! - [`JenkinsClient`]: the Jenkins REST API (jobs, builds, nodes, plugins)
//! - [`SshHost`]: shell and file-copy access to lab hosts over OpenSSH
//!
//! Both return errors that implement [`vigil_core::poll::ErrorKind`], so
//! probes built on them can allow-list transient failures.
//!
//! # Example
//!
//! ```no_run
//! use vigil_client::JenkinsClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = JenkinsClient::new("http://localhost:8080").with_auth("admin", "admin");
//!
//!     client.wait_until_available().await?;
//!     println!("Jenkins {}", client.get_version().await?);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod host;
mod jobs;
mod nodes;
mod system;

// Re-export commonly used types
pub use error::{ClientError, ClientErrorKind, Result};
pub use host::{HostError, HostErrorKind, SshHost};

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;
use vigil_core::dto::system::Crumb;

/// Basic-auth credentials for the Jenkins API
#[derive(Debug, Clone)]
struct Credentials {
    username: String,
    password: String,
}

/// HTTP client for the Jenkins REST API
///
/// Methods are organized into logical groups:
/// - Jobs and builds (exists, create, trigger, build info)
/// - Nodes (exists, create SSH agents, online state)
/// - Master (version, plugins, restart, availability)
#[derive(Debug, Clone)]
pub struct JenkinsClient {
    /// Base URL of the master (e.g., "http://localhost:8080")
    base_url: String,
    /// HTTP client instance
    client: Client,
    credentials: Option<Credentials>,
    /// CSRF crumb, fetched once; `None` when the master has no crumb issuer
    crumb: Arc<OnceCell<Option<Crumb>>>,
}

impl JenkinsClient {
    /// Create a new Jenkins client
    ///
    /// The client keeps cookies: Jenkins only honours a crumb on the
    /// session that issued it.
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the master (e.g., "http://localhost:8080")
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .unwrap_or_default();
        Self::with_client(base_url, client)
    }

    /// Create a new Jenkins client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    /// Enable its cookie store if the master issues crumbs.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            credentials: None,
            crumb: Arc::new(OnceCell::new()),
        }
    }

    /// Authenticate every request with HTTP basic auth
    pub fn with_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    /// Get the base URL of the master
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Start a request with credentials applied
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match &self.credentials {
            Some(creds) => builder.basic_auth(&creds.username, Some(&creds.password)),
            None => builder,
        }
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.request(Method::GET, path)
    }

    /// Start a POST carrying the CSRF crumb when the master issues one
    async fn post(&self, path: &str) -> Result<RequestBuilder> {
        let builder = self.request(Method::POST, path);
        match self.crumb().await? {
            Some(crumb) => Ok(builder.header(crumb.crumb_request_field, crumb.crumb)),
            None => Ok(builder),
        }
    }

    async fn crumb(&self) -> Result<Option<Crumb>> {
        let crumb = self
            .crumb
            .get_or_try_init(|| self.fetch_crumb())
            .await?;

        Ok(crumb.clone())
    }

    async fn fetch_crumb(&self) -> Result<Option<Crumb>> {
        let response = self.get("crumbIssuer/api/json").send().await?;

        match self.handle_response::<Crumb>(response).await {
            Ok(crumb) => Ok(Some(crumb)),
            Err(e) if e.is_not_found() => {
                debug!("Master has no crumb issuer");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Checks the status code of a response, turning failures into errors
    async fn check_status(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let error_text = response
            .text()
            .await
            .ok()
            .filter(|text| !text.trim().is_empty())
            .unwrap_or(url);

        Err(ClientError::from_status(status.as_u16(), error_text))
    }

    /// Handle an API response and deserialize JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        self.check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response whose body is not needed
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        self.check_status(response).await.map(|_| ())
    }
}

/// Path of a job, expanding folders: `a/b` becomes `job/a/job/b`
fn job_path(name: &str) -> String {
    name.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| format!("job/{}", segment))
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = JenkinsClient::new("http://localhost:8080");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = JenkinsClient::new("http://localhost:8080/");
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(client.url("/api/json"), "http://localhost:8080/api/json");
    }

    #[test]
    fn test_client_with_custom_client() {
        let http_client = Client::new();
        let client = JenkinsClient::with_client("http://localhost:8080", http_client)
            .with_auth("admin", "admin");
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert!(client.credentials.is_some());
    }

    #[test]
    fn test_job_path_expands_folders() {
        assert_eq!(job_path("dev_job"), "job/dev_job");
        assert_eq!(job_path("team/dev_job"), "job/team/job/dev_job");
    }
}
