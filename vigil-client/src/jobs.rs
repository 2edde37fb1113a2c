//! Job- and build-related API endpoints

use crate::error::{ClientError, Result};
use crate::{JenkinsClient, job_path};
use reqwest::header::{CONTENT_TYPE, LOCATION};
use tracing::{debug, info};
use vigil_core::dto::job::{BuildInfo, JobInfo};
use vigil_core::dto::system::QueueItem;

impl JenkinsClient {
    // =============================================================================
    // Job Definitions
    // =============================================================================

    /// Check whether a job is defined
    ///
    /// # Arguments
    /// * `name` - The job name (folders separated by `/`)
    pub async fn job_exists(&self, name: &str) -> Result<bool> {
        let path = format!("{}/api/json", job_path(name));
        let response = self.get(&path).query(&[("tree", "name")]).send().await?;

        match self.handle_empty_response(response).await {
            Ok(()) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Get a job's top-level information
    ///
    /// # Returns
    /// The job document, including its last and next build numbers
    pub async fn get_job_info(&self, name: &str) -> Result<JobInfo> {
        let path = format!("{}/api/json", job_path(name));
        let response = self.get(&path).query(&[("depth", "0")]).send().await?;

        self.handle_response(response).await
    }

    /// Create a job from its config.xml
    ///
    /// Fails with [`ClientError::AlreadyExists`] if the job is already defined,
    /// and with [`ClientError::NotFound`] if Jenkins accepted the request but
    /// the job does not show up.
    ///
    /// # Example
    /// ```no_run
    /// # use vigil_client::JenkinsClient;
    /// # use vigil_core::dto::job::EMPTY_CONFIG_XML;
    /// # async fn example() -> anyhow::Result<()> {
    /// let client = JenkinsClient::new("http://localhost:8080");
    /// client.create_job("blank_job", EMPTY_CONFIG_XML).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create_job(&self, name: &str, config_xml: &str) -> Result<()> {
        if self.job_exists(name).await? {
            return Err(ClientError::AlreadyExists(format!("job[{}]", name)));
        }

        let (parent, leaf) = match name.rsplit_once('/') {
            Some((folder, leaf)) => (format!("{}/", job_path(folder)), leaf),
            None => (String::new(), name),
        };

        let response = self
            .post(&format!("{}createItem", parent))
            .await?
            .query(&[("name", leaf)])
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .body(config_xml.to_string())
            .send()
            .await?;
        self.handle_empty_response(response).await?;

        if !self.job_exists(name).await? {
            return Err(ClientError::NotFound(format!(
                "job[{}] does not exist after create",
                name
            )));
        }

        info!("Created job {}", name);
        Ok(())
    }

    // =============================================================================
    // Builds
    // =============================================================================

    /// Trigger a build of a job
    ///
    /// # Returns
    /// The queue item id when Jenkins reports one in the `Location` header
    pub async fn build_job(&self, name: &str) -> Result<Option<u64>> {
        let path = format!("{}/build", job_path(name));
        let response = self.post(&path).await?.send().await?;
        let response = self.check_status(response).await?;

        let queue_id = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_queue_id);

        debug!("Triggered build of {} (queue item {:?})", name, queue_id);
        Ok(queue_id)
    }

    /// Get information about a single build
    ///
    /// Fails with [`ClientError::NotFound`] while the build is still queued.
    pub async fn get_build_info(&self, name: &str, number: u32) -> Result<BuildInfo> {
        let path = format!("{}/{}/api/json", job_path(name), number);
        let response = self.get(&path).send().await?;

        self.handle_response(response).await
    }

    /// Get a queue item, which names its build once it leaves the queue
    pub async fn get_queue_item(&self, id: u64) -> Result<QueueItem> {
        let path = format!("queue/item/{}/api/json", id);
        let response = self.get(&path).send().await?;

        self.handle_response(response).await
    }
}

/// Extracts the id from `.../queue/item/{id}/`
fn parse_queue_id(location: &str) -> Option<u64> {
    let (_, rest) = location.split_once("/queue/item/")?;
    rest.trim_end_matches('/').parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_queue_id() {
        assert_eq!(parse_queue_id("http://jenkins:8080/queue/item/17/"), Some(17));
        assert_eq!(parse_queue_id("http://jenkins:8080/queue/item/17"), Some(17));
        assert_eq!(parse_queue_id("http://jenkins:8080/job/x/"), None);
    }
}
