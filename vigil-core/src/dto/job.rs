//! Job and build DTOs

use serde::{Deserialize, Serialize};

/// Blank free-style job definition
pub const EMPTY_CONFIG_XML: &str = r#"<?xml version='1.0' encoding='UTF-8'?>
<project>
  <keepDependencies>false</keepDependencies>
  <properties/>
  <scm class='jenkins.scm.NullSCM'/>
  <canRoam>true</canRoam>
  <disabled>false</disabled>
  <blockBuildWhenUpstreamBuilding>false</blockBuildWhenUpstreamBuilding>
  <triggers class='vector'/>
  <concurrentBuild>false</concurrentBuild>
  <builders/>
  <publishers/>
  <buildWrappers/>
</project>"#;

/// Reference to a build from a job document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRef {
    pub number: u32,
    #[serde(default)]
    pub url: Option<String>,
}

/// `job/{name}/api/json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInfo {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub buildable: bool,
    #[serde(default)]
    pub in_queue: bool,
    #[serde(default)]
    pub next_build_number: u32,
    #[serde(default)]
    pub last_build: Option<BuildRef>,
    #[serde(default)]
    pub last_completed_build: Option<BuildRef>,
    #[serde(default)]
    pub last_successful_build: Option<BuildRef>,
}

/// Final state of a finished build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildResult {
    Success,
    Unstable,
    Failure,
    NotBuilt,
    Aborted,
}

/// An archived artifact of a build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub file_name: String,
    pub relative_path: String,
}

/// `job/{name}/{number}/api/json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    pub number: u32,
    #[serde(default)]
    pub building: bool,
    /// `None` while the build is running
    #[serde(default)]
    pub result: Option<BuildResult>,
    #[serde(default)]
    pub duration: u64,
    #[serde(default)]
    pub built_on: Option<String>,
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
}

impl BuildInfo {
    pub fn is_finished(&self) -> bool {
        !self.building && self.result.is_some()
    }

    pub fn succeeded(&self) -> bool {
        self.result == Some(BuildResult::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_job_info() {
        let info: JobInfo = serde_json::from_value(serde_json::json!({
            "_class": "hudson.model.FreeStyleProject",
            "name": "dev_job",
            "buildable": true,
            "inQueue": false,
            "nextBuildNumber": 3,
            "lastBuild": {"number": 2, "url": "http://jenkins/job/dev_job/2/"},
            "lastCompletedBuild": null
        }))
        .unwrap();

        assert_eq!(info.name, "dev_job");
        assert_eq!(info.next_build_number, 3);
        assert_eq!(info.last_build.map(|b| b.number), Some(2));
        assert!(info.last_completed_build.is_none());
    }

    #[test]
    fn test_parse_running_build() {
        let info: BuildInfo = serde_json::from_value(serde_json::json!({
            "number": 4,
            "building": true,
            "result": null
        }))
        .unwrap();

        assert!(!info.is_finished());
        assert!(!info.succeeded());
    }

    #[test]
    fn test_parse_finished_build() {
        let info: BuildInfo = serde_json::from_value(serde_json::json!({
            "number": 4,
            "building": false,
            "result": "SUCCESS",
            "builtOn": "10.0.0.7",
            "artifacts": [{"fileName": "dummy_artifact", "relativePath": "out/dummy_artifact"}]
        }))
        .unwrap();

        assert!(info.is_finished());
        assert!(info.succeeded());
        assert_eq!(info.artifacts[0].relative_path, "out/dummy_artifact");

        let failed: BuildInfo =
            serde_json::from_value(serde_json::json!({"number": 5, "result": "NOT_BUILT"}))
                .unwrap();
        assert_eq!(failed.result, Some(BuildResult::NotBuilt));
    }
}
