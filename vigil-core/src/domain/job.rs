//! Job domain types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Directory on the Jenkins master where job data lives
pub const JOBS_ROOT: &str = "/var/lib/jenkins/jobs";

/// A Jenkins job exercised by the harness
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub name: String,
    /// Agent label the job is restricted to
    pub label: Option<String>,
    /// Local config.xml; `None` means a blank free-style job
    pub xml_path: Option<PathBuf>,
}

impl Job {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            xml_path: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_xml_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.xml_path = Some(path.into());
        self
    }

    /// Archive directory of the last successful build on the master
    pub fn latest_artifact_path(&self) -> String {
        format!("{}/{}/lastSuccessful/archive/", JOBS_ROOT, self.name)
    }
}
