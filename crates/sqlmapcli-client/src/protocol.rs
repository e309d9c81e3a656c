//! sqlmapapi REST-JSON endpoints and response payloads.
//!
//! | Verb | Path                               | Fields used            |
//! |------|------------------------------------|------------------------|
//! | GET  | `/task/new`                        | `taskid`               |
//! | GET  | `/task/<taskid>/delete`            |                        |
//! | GET  | `/admin/<admin_id>/list`           | `tasks_num`, `tasks`   |
//! | GET  | `/admin/<admin_id>/flush`          |                        |
//! | POST | `/scan/<taskid>/start`             | `engineid`             |
//! | GET  | `/scan/<taskid>/stop`              |                        |
//! | GET  | `/scan/<taskid>/kill`              |                        |
//! | GET  | `/scan/<taskid>/status`            | `status`, `returncode` |
//! | GET  | `/scan/<taskid>/data`              | `data`                 |
//! | GET  | `/scan/<taskid>/log`               | `log`                  |
//! | GET  | `/scan/<taskid>/log/<start>/<end>` | `log`                  |
//!
//! Every envelope also carries `success` and, on failure, `message`; the
//! transport checks those before any payload below is decoded.

use crate::status::TaskStatus;
use serde::{Deserialize, Deserializer};
use sqlmapcli_core::{AdminId, EngineId, TaskId};
use std::collections::BTreeMap;

pub(crate) const TASK_NEW: &str = "/task/new";

pub(crate) fn task_delete(task_id: &TaskId) -> String {
    format!("/task/{task_id}/delete")
}

pub(crate) fn admin_list(admin_id: &AdminId) -> String {
    format!("/admin/{admin_id}/list")
}

pub(crate) fn admin_flush(admin_id: &AdminId) -> String {
    format!("/admin/{admin_id}/flush")
}

pub(crate) fn scan_start(task_id: &TaskId) -> String {
    format!("/scan/{task_id}/start")
}

pub(crate) fn scan_stop(task_id: &TaskId) -> String {
    format!("/scan/{task_id}/stop")
}

pub(crate) fn scan_kill(task_id: &TaskId) -> String {
    format!("/scan/{task_id}/kill")
}

pub(crate) fn scan_status(task_id: &TaskId) -> String {
    format!("/scan/{task_id}/status")
}

pub(crate) fn scan_data(task_id: &TaskId) -> String {
    format!("/scan/{task_id}/data")
}

pub(crate) fn scan_log(task_id: &TaskId, range: Option<(u64, u64)>) -> String {
    match range {
        Some((start, end)) => format!("/scan/{task_id}/log/{start}/{end}"),
        None => format!("/scan/{task_id}/log"),
    }
}

/// Envelope with no payload beyond `success`.
#[derive(Debug, Deserialize)]
pub(crate) struct Ack {}

#[derive(Debug, Deserialize)]
pub(crate) struct NewTaskResponse {
    pub taskid: TaskId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StartResponse {
    #[serde(default)]
    pub engineid: Option<EngineId>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusResponse {
    pub status: TaskStatus,
    #[serde(default)]
    pub returncode: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DataResponse {
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LogResponse {
    #[serde(default)]
    pub log: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListResponse {
    #[serde(default)]
    pub tasks_num: Option<u64>,
    #[serde(default, deserialize_with = "deserialize_tasks")]
    pub tasks: Vec<TaskInfo>,
}

/// Server-side view of one task, as reported by the admin list endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInfo {
    /// Remote task identifier
    pub task_id: String,
    /// Status string, when the server reports one
    pub status: Option<String>,
}

/// sqlmapapi has reported tasks both as `{taskid: status}` and as a bare
/// list of ids.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTasks {
    Map(BTreeMap<String, String>),
    List(Vec<String>),
}

fn deserialize_tasks<'de, D>(deserializer: D) -> Result<Vec<TaskInfo>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawTasks>::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawTasks::Map(map)) => map
            .into_iter()
            .map(|(task_id, status)| TaskInfo {
                task_id,
                status: Some(status),
            })
            .collect(),
        Some(RawTasks::List(ids)) => ids
            .into_iter()
            .map(|task_id| TaskInfo {
                task_id,
                status: None,
            })
            .collect(),
        None => Vec::new(),
    })
}
