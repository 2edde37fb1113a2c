use std::time::Duration;

use vigil_client::{ClientError, ClientErrorKind, JenkinsClient};
use vigil_core::domain::agent::Agent;
use vigil_core::dto::job::{BuildResult, EMPTY_CONFIG_XML};
use vigil_core::poll::{Budget, ErrorKind, PollError};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_budget() -> Budget {
    Budget::new(Duration::from_secs(5)).with_interval(Duration::from_millis(20))
}

async fn mount_job_exists(server: &MockServer, job: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/job/{}/api/json", job)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"name": job})))
        .mount(server)
        .await;
}

#[tokio::test]
async fn get_version_reads_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).insert_header("X-Jenkins", "2.440.1"))
        .mount(&server)
        .await;

    let client = JenkinsClient::new(server.uri());
    assert_eq!(client.get_version().await.unwrap(), "2.440.1");
}

#[tokio::test]
async fn get_version_without_header_is_bad_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not jenkins"))
        .mount(&server)
        .await;

    let client = JenkinsClient::new(server.uri());
    let err = client.get_version().await.unwrap_err();
    assert_eq!(err.kind(), ClientErrorKind::BadHttp);
}

#[tokio::test]
async fn requests_carry_basic_auth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("authorization", "Basic YWRtaW46YWRtaW4="))
        .respond_with(ResponseTemplate::new(200).insert_header("X-Jenkins", "2.440.1"))
        .expect(1)
        .mount(&server)
        .await;

    let client = JenkinsClient::new(server.uri()).with_auth("admin", "admin");
    client.get_version().await.unwrap();
}

#[tokio::test]
async fn job_exists_maps_not_found_to_false() {
    let server = MockServer::start().await;
    mount_job_exists(&server, "dev_job").await;

    let client = JenkinsClient::new(server.uri());
    assert!(client.job_exists("dev_job").await.unwrap());
    assert!(!client.job_exists("qa_job").await.unwrap());
}

#[tokio::test]
async fn create_job_posts_config_with_crumb() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/crumbIssuer/api/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "crumb": "abc123",
            "crumbRequestField": "Jenkins-Crumb"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/job/blank_job/api/json"))
        .respond_with(ResponseTemplate::new(404))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_job_exists(&server, "blank_job").await;
    Mock::given(method("POST"))
        .and(path("/createItem"))
        .and(query_param("name", "blank_job"))
        .and(header("Jenkins-Crumb", "abc123"))
        .and(body_string_contains("<project>"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = JenkinsClient::new(server.uri());
    client.create_job("blank_job", EMPTY_CONFIG_XML).await.unwrap();
}

#[tokio::test]
async fn posts_return_the_crumb_session_cookie() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/crumbIssuer/api/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Set-Cookie", "JSESSIONID.abc=s1; Path=/; HttpOnly")
                .set_body_json(serde_json::json!({
                    "crumb": "abc123",
                    "crumbRequestField": "Jenkins-Crumb"
                })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/job/dev_job/build"))
        .and(header("Jenkins-Crumb", "abc123"))
        .and(header("cookie", "JSESSIONID.abc=s1"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("No valid crumb"))
        .with_priority(10)
        .mount(&server)
        .await;

    let client = JenkinsClient::new(server.uri()).with_auth("admin", "admin");
    assert_eq!(client.build_job("dev_job").await.unwrap(), None);
}

#[tokio::test]
async fn create_existing_job_fails() {
    let server = MockServer::start().await;
    mount_job_exists(&server, "dev_job").await;

    let client = JenkinsClient::new(server.uri());
    let err = client.create_job("dev_job", EMPTY_CONFIG_XML).await.unwrap_err();

    assert!(matches!(err, ClientError::AlreadyExists(_)));
    assert_eq!(err.kind(), ClientErrorKind::Api);
}

#[tokio::test]
async fn build_job_returns_queue_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/job/dev_job/build"))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("Location", format!("{}/queue/item/42/", server.uri()).as_str()),
        )
        .mount(&server)
        .await;

    let client = JenkinsClient::new(server.uri());
    assert_eq!(client.build_job("dev_job").await.unwrap(), Some(42));
}

#[tokio::test]
async fn get_build_info_parses_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/job/dev_job/3/api/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "number": 3,
            "building": false,
            "result": "SUCCESS",
            "artifacts": []
        })))
        .mount(&server)
        .await;

    let client = JenkinsClient::new(server.uri());
    let info = client.get_build_info("dev_job", 3).await.unwrap();
    assert_eq!(info.result, Some(BuildResult::Success));

    let err = client.get_build_info("dev_job", 4).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn create_node_posts_ssh_definition() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/computer/10.0.0.7/api/json"))
        .respond_with(ResponseTemplate::new(404))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/computer/10.0.0.7/api/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "displayName": "10.0.0.7",
            "offline": true
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/computer/doCreateItem"))
        .and(body_string_contains("name=10.0.0.7"))
        .and(body_string_contains("SSHLauncher"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = JenkinsClient::new(server.uri());
    client
        .create_node(&Agent::new("10.0.0.7", "dev", "cred-1"))
        .await
        .unwrap();

    let info = client.get_node_info("10.0.0.7").await.unwrap();
    assert!(!info.is_online());
}

#[tokio::test]
async fn has_plugin_checks_short_names() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pluginManager/api/json"))
        .and(query_param("depth", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "plugins": [
                {"shortName": "ssh-slaves", "version": "1.31", "active": true, "enabled": true},
                {"shortName": "credentials", "active": true, "enabled": true}
            ]
        })))
        .mount(&server)
        .await;

    let client = JenkinsClient::new(server.uri());
    assert!(client.has_plugin("ssh-slaves").await.unwrap());
    assert!(!client.has_plugin("git").await.unwrap());
}

#[tokio::test]
async fn restart_accepts_service_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/restart"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let client = JenkinsClient::new(server.uri());
    client.restart().await.unwrap();
}

#[tokio::test]
async fn wait_until_available_retries_while_starting() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(3)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).insert_header("X-Jenkins", "2.440.1"))
        .mount(&server)
        .await;

    let client = JenkinsClient::new(server.uri());
    client.wait_until_available_within(fast_budget()).await.unwrap();
}

#[tokio::test]
async fn wait_until_available_propagates_disallowed_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = JenkinsClient::new(server.uri());
    let err = client
        .wait_until_available_within(fast_budget())
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn wait_until_available_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = JenkinsClient::new(server.uri());
    let budget = Budget::new(Duration::from_millis(200)).with_interval(Duration::from_millis(20));
    let err = client.wait_until_available_within(budget).await.unwrap_err();

    assert_eq!(err.kind(), ClientErrorKind::Unavailable);
    assert!(err.to_string().contains("jenkins availability failed to evaluate"));
    match err {
        ClientError::Unavailable(poll) => {
            assert!(matches!(*poll, PollError::NeverEvaluated { .. }))
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
