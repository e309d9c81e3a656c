//! Integration tests for task creation, deletion and admin calls.

use serde_json::json;
use sqlmapcli_client::{Client, TaskId, TaskInfo};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::fmt::MakeWriter;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ADMIN_ID: &str = "10af2eefc9606577bccb75ced1fa74db";

fn client_for(server: &MockServer) -> Client {
    Client::with_address(ADMIN_ID, &server.uri(), Duration::from_secs(5)).expect("create client")
}

/// In-memory sink for formatted log lines.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().expect("log buffer")).into_owned()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log buffer").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Route this thread's log events into a buffer until the guard drops.
fn capture_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (logs, guard)
}

async fn mount_new_task(server: &MockServer, task_id: &str) {
    Mock::given(method("GET"))
        .and(path("/task/new"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "taskid": task_id})),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_create_task_assigns_server_id() {
    let server = MockServer::start().await;
    mount_new_task(&server, "abc").await;

    let client = client_for(&server);
    let task = client.create_task(None).await.expect("task created");

    assert_eq!(task.id().as_str(), "abc");
    assert_eq!(task.address(), client.address());
    assert!(task.list_options().is_empty());
    assert!(task.url().is_none());
}

#[tokio::test]
async fn test_create_task_with_initial_options() {
    let server = MockServer::start().await;
    mount_new_task(&server, "abc").await;

    let client = client_for(&server);
    let options = [("url", "http://x/y?id=1"), ("dbms", "mysql")]
        .into_iter()
        .collect();
    let task = client.create_task(Some(options)).await.expect("task created");

    assert_eq!(task.url().as_deref(), Some("http://x/y?id=1"));
    assert_eq!(task.list_options().len(), 2);
}

#[tokio::test]
async fn test_tasks_own_their_options() {
    let server = MockServer::start().await;
    mount_new_task(&server, "abc").await;

    let client = client_for(&server)
        .with_default_options([("batch", true)].into_iter().collect());
    let mut first = client.create_task(None).await.expect("first task");
    let second = client.create_task(None).await.expect("second task");

    first.set_option("url", "http://only-first/");

    assert!(second.get_option("url").is_none());
    assert!(second.get_option("batch").is_some());
    assert!(first.get_option("batch").is_some());
}

#[tokio::test]
async fn test_create_task_returns_none_on_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/task/new"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    assert!(client_for(&server).create_task(None).await.is_none());
}

#[tokio::test]
async fn test_create_task_returns_none_on_invalid_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/task/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    assert!(client_for(&server).create_task(None).await.is_none());
}

#[tokio::test]
async fn test_create_task_returns_none_when_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/task/new"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": false, "message": "Too many tasks"})),
        )
        .mount(&server)
        .await;

    assert!(client_for(&server).create_task(None).await.is_none());
}

#[tokio::test]
async fn test_create_task_returns_none_without_success_field() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/task/new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"taskid": "abc"})))
        .mount(&server)
        .await;

    assert!(client_for(&server).create_task(None).await.is_none());
}

#[tokio::test]
async fn test_create_task_returns_none_when_unreachable() {
    let server = MockServer::start().await;
    let address = server.uri();
    drop(server);

    let client = Client::with_address(ADMIN_ID, &address, Duration::from_secs(2))
        .expect("create client");
    assert!(client.create_task(None).await.is_none());
}

#[tokio::test]
async fn test_delete_task() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/task/abc/delete"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/task/zzz/delete"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": false, "message": "unknown task"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.delete_task(&TaskId::new("abc").expect("task id")).await);
    assert!(!client.delete_task(&TaskId::new("zzz").expect("task id")).await);
}

#[tokio::test]
async fn test_delete_task_logs_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/task/zzz/delete"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": false, "message": "unknown task"})),
        )
        .mount(&server)
        .await;

    let (logs, _guard) = capture_logs();
    let client = client_for(&server);
    assert!(!client.delete_task(&TaskId::new("zzz").expect("task id")).await);

    let output = logs.contents();
    let line = output
        .lines()
        .find(|l| l.contains("Fail to GET /task/zzz/delete"))
        .unwrap_or_else(|| panic!("no failure line in log output:\n{output}"));
    assert!(line.contains("ERROR"), "not logged at error level: {line}");
    assert!(line.ends_with("Fail to GET /task/zzz/delete: unknown task"), "{line}");
}

#[tokio::test]
async fn test_create_task_logs_transport_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/task/new"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/task/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let (logs, _guard) = capture_logs();
    let client = client_for(&server);
    assert!(client.create_task(None).await.is_none());
    assert!(client.create_task(None).await.is_none());

    let output = logs.contents();
    let failures: Vec<&str> = output
        .lines()
        .filter(|l| l.contains("ERROR") && l.contains("Fail to GET /task/new: "))
        .collect();
    assert_eq!(failures.len(), 2, "log output:\n{output}");
    assert!(failures[0].ends_with("Fail to GET /task/new: HTTP status 500"), "{}", failures[0]);
    assert!(
        failures[1].contains("Fail to GET /task/new: malformed response"),
        "{}",
        failures[1]
    );
}

#[tokio::test]
async fn test_list_tasks() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/admin/{ADMIN_ID}/list")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "tasks_num": 2,
            "tasks": {"abc": "running", "def": "not running"}
        })))
        .mount(&server)
        .await;

    let tasks = client_for(&server).list_tasks().await;
    assert_eq!(
        tasks,
        vec![
            TaskInfo {
                task_id: "abc".to_string(),
                status: Some("running".to_string())
            },
            TaskInfo {
                task_id: "def".to_string(),
                status: Some("not running".to_string())
            },
        ]
    );
}

#[tokio::test]
async fn test_list_tasks_failure_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/admin/{ADMIN_ID}/list")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": false, "message": "Unauthorized"})),
        )
        .mount(&server)
        .await;

    assert!(client_for(&server).list_tasks().await.is_empty());
}

#[tokio::test]
async fn test_flush_tasks() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/admin/{ADMIN_ID}/flush")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client_for(&server).flush_tasks().await);
}

#[tokio::test]
async fn test_flush_tasks_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/admin/{ADMIN_ID}/flush")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    assert!(!client_for(&server).flush_tasks().await);
}
