//! End-to-end command tests against a mock sqlmapapi server.

use serde_json::json;
use sqlmapcli_app::cli::{Command, RunArgs};
use sqlmapcli_app::commands::execute;
use sqlmapcli_client::TaskId;
use sqlmapcli_core::ClientConfig;
use std::io::Write;
use tempfile::NamedTempFile;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ADMIN_ID: &str = "10af2eefc9606577bccb75ced1fa74db";

fn config_for(server: &MockServer) -> ClientConfig {
    let address = server.address();
    let mut config = ClientConfig::default();
    config.server.host = address.ip().to_string();
    config.server.port = address.port();
    config.server.admin_id = ADMIN_ID.to_string();
    config
}

fn ok(body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

async fn mount_finished_scan(server: &MockServer, deletes: u64) {
    Mock::given(method("GET"))
        .and(path("/task/new"))
        .respond_with(ok(json!({"success": true, "taskid": "abc"})))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/scan/abc/start"))
        .respond_with(ok(json!({"success": true, "engineid": 4242})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/scan/abc/status"))
        .respond_with(ok(json!({"success": true, "status": "terminated", "returncode": 0})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/scan/abc/data"))
        .respond_with(ok(json!({
            "success": true,
            "data": [{"status": 1, "type": 2, "value": "MySQL >= 5.0"}],
            "error": []
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/task/abc/delete"))
        .respond_with(ok(json!({"success": true})))
        .expect(deletes)
        .mount(server)
        .await;
}

fn run_args() -> RunArgs {
    RunArgs {
        interval: Some(1),
        ..RunArgs::default()
    }
}

#[tokio::test]
async fn test_scan_deletes_task() {
    let server = MockServer::start().await;
    mount_finished_scan(&server, 1).await;

    execute(
        Command::Scan {
            url: "http://x/?id=1".to_string(),
            run: run_args(),
            keep: false,
        },
        &config_for(&server),
    )
    .await
    .expect("scan succeeds");
}

#[tokio::test]
async fn test_scan_keep_leaves_task() {
    let server = MockServer::start().await;
    mount_finished_scan(&server, 0).await;

    execute(
        Command::Scan {
            url: "http://x/?id=1".to_string(),
            run: run_args(),
            keep: true,
        },
        &config_for(&server),
    )
    .await
    .expect("scan succeeds");
}

#[tokio::test]
async fn test_batch_uses_one_task() {
    let server = MockServer::start().await;
    mount_finished_scan(&server, 1).await;

    let mut file = NamedTempFile::new().expect("temp file");
    writeln!(file, "http://a/?id=1\n\nhttp://b/?id=2").expect("write urls");

    execute(
        Command::Batch {
            file: file.path().to_path_buf(),
            run: run_args(),
        },
        &config_for(&server),
    )
    .await
    .expect("batch succeeds");

    let starts = server
        .received_requests()
        .await
        .expect("recorded requests")
        .into_iter()
        .filter(|r| r.url.path() == "/scan/abc/start")
        .count();
    assert_eq!(starts, 2);
}

#[tokio::test]
async fn test_scan_fails_when_task_cannot_be_created() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/task/new"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = execute(
        Command::Scan {
            url: "http://x/?id=1".to_string(),
            run: run_args(),
            keep: false,
        },
        &config_for(&server),
    )
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_stop_failure_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/scan/abc/stop"))
        .respond_with(ok(json!({"success": false, "message": "Invalid task ID"})))
        .mount(&server)
        .await;

    let err = execute(
        Command::Stop {
            task_id: TaskId::new("abc").expect("task id"),
        },
        &config_for(&server),
    )
    .await
    .expect_err("stop rejected");
    assert_eq!(err.to_string(), "Fail to stop task<abc>");
}

#[tokio::test]
async fn test_status_error_propagates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/scan/abc/status"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = execute(
        Command::Status {
            task_id: TaskId::new("abc").expect("task id"),
        },
        &config_for(&server),
    )
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_flush() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/admin/{ADMIN_ID}/flush")))
        .respond_with(ok(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    execute(Command::Flush, &config_for(&server))
        .await
        .expect("flush succeeds");
}
