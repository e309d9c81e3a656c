//! Remote scan task handle and its lifecycle operations.
//!
//! A [`Task`] mirrors server state; it never asserts a transition locally.
//! Status is fetched on every query, options live in an owned map that is
//! sent as the start request body, and only `status`, `get_result` and
//! `get_log` report failures as errors. Everything else degrades to
//! `None`/`false` after logging.

use crate::error::{TaskError, TransportError};
use crate::options::{Options, URL_KEY};
use crate::protocol::{self, Ack, DataResponse, LogResponse, StartResponse, StatusResponse};
use crate::status::ScanStatus;
use crate::transport::Transport;
use crate::watchdog::KillWatchdog;
use serde_json::Value;
use sqlmapcli_core::{EngineId, OptionValue, TaskId};
use std::fmt;
use std::time::Duration;
use url::Url;

/// Default interval between status polls in [`Task::run`].
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Handle to one task allocated on the sqlmapapi server.
///
/// Dropping the handle does not delete the remote task; use
/// [`Client::delete_task`](crate::Client::delete_task) for that. A task is
/// meant for a single owner: nothing prevents two handles with the same id
/// from interleaving requests.
#[derive(Debug, Clone)]
pub struct Task {
    id: TaskId,
    transport: Transport,
    options: Options,
    engine_id: Option<EngineId>,
}

impl Task {
    pub(crate) fn new(id: TaskId, options: Options, transport: Transport) -> Self {
        Self {
            id,
            transport,
            options,
            engine_id: None,
        }
    }

    /// Server-issued task identifier.
    #[must_use]
    pub fn id(&self) -> &TaskId {
        &self.id
    }

    /// Base address of the server owning this task.
    #[must_use]
    pub fn address(&self) -> &Url {
        self.transport.address()
    }

    /// Current scan target (the `url` option).
    #[must_use]
    pub fn url(&self) -> Option<String> {
        self.options.url()
    }

    /// Engine id returned by the last successful [`Task::start`].
    #[must_use]
    pub fn engine_id(&self) -> Option<&EngineId> {
        self.engine_id.as_ref()
    }

    /// Set one option. Chainable.
    pub fn set_option(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> &mut Self {
        self.options.set(key, value);
        self
    }

    /// Look up one caller-set option.
    #[must_use]
    pub fn get_option(&self, key: &str) -> Option<&OptionValue> {
        self.options.get(key)
    }

    /// Merge several options at once.
    pub fn update_options(&mut self, options: Options) {
        self.options.update(options);
    }

    /// Options set by the caller. Server-side defaults are not included.
    #[must_use]
    pub fn list_options(&self) -> &Options {
        &self.options
    }

    /// Start the scan with the current options.
    ///
    /// `options` are merged first and `url` is applied after them, so the
    /// shorthand overrides a `url` key inside `options`. Returns the engine
    /// id, or `None` if the server did not accept the start.
    pub async fn start(&mut self, url: Option<&str>, options: Option<Options>) -> Option<EngineId> {
        if let Some(options) = options {
            self.update_options(options);
        }
        if let Some(url) = url {
            self.set_option(URL_KEY, url);
        }

        let path = protocol::scan_start(&self.id);
        self.engine_id = match self
            .transport
            .post::<_, StartResponse>(&path, &self.options)
            .await
        {
            Ok(r) => {
                match &r.engineid {
                    Some(engine_id) => {
                        tracing::info!("Start task<{}>, EngineID: {}", self.id, engine_id);
                    }
                    None => tracing::warn!("Start task<{}>: server sent no engine id", self.id),
                }
                r.engineid
            }
            Err(_) => None,
        };
        self.engine_id.clone()
    }

    /// Ask the server to stop the scan.
    pub async fn stop(&self) -> bool {
        let ok = self.ack(&protocol::scan_stop(&self.id)).await;
        if ok {
            tracing::info!("Stop task<{}>", self.id);
        }
        ok
    }

    /// Kill the scan unconditionally.
    pub async fn kill(&self) -> bool {
        let ok = self.ack(&protocol::scan_kill(&self.id)).await;
        if ok {
            tracing::info!("Kill task<{}>", self.id);
        }
        ok
    }

    /// Fetch the current status from the server.
    ///
    /// # Errors
    /// Returns [`TaskError::Status`] if the request fails or is rejected.
    pub async fn status(&self) -> Result<ScanStatus, TaskError> {
        let r: StatusResponse = self
            .transport
            .get(&protocol::scan_status(&self.id))
            .await
            .map_err(|source| self.status_error(source))?;
        tracing::debug!("Task<{}> status: {}", self.id, r.status);
        Ok(ScanStatus {
            status: r.status,
            retcode: r.returncode,
        })
    }

    /// Whether the task has been created but not started.
    ///
    /// A failed status query is logged and reported as `false`.
    pub async fn is_ready(&self) -> bool {
        self.check_status(ScanStatus::is_ready).await
    }

    /// Whether the scan is running.
    ///
    /// A failed status query is logged and reported as `false`.
    pub async fn is_running(&self) -> bool {
        self.check_status(ScanStatus::is_running).await
    }

    /// Whether the scan has finished.
    ///
    /// A failed status query is logged and reported as `false`.
    pub async fn is_finished(&self) -> bool {
        self.check_status(ScanStatus::is_finished).await
    }

    /// Fetch the scan result data.
    ///
    /// # Errors
    /// Returns [`TaskError::Result`] if the request fails or is rejected.
    pub async fn get_result(&self) -> Result<Value, TaskError> {
        let r: DataResponse = self
            .transport
            .get(&protocol::scan_data(&self.id))
            .await
            .map_err(|source| TaskError::Result {
                task_id: self.id.clone(),
                source,
            })?;
        Ok(r.data)
    }

    /// Fetch the scan log, or the `start..end` slice of it when both bounds
    /// are given.
    ///
    /// # Errors
    /// Returns [`TaskError::Log`] if the request fails or is rejected.
    pub async fn get_log(&self, start: Option<u64>, end: Option<u64>) -> Result<Value, TaskError> {
        let range = start.zip(end);
        let r: LogResponse = self
            .transport
            .get(&protocol::scan_log(&self.id, range))
            .await
            .map_err(|source| TaskError::Log {
                task_id: self.id.clone(),
                source,
            })?;
        Ok(r.log)
    }

    /// Start the scan, wait for it to leave the running state, and fetch
    /// the result.
    ///
    /// Polls every `interval` with no upper bound. A result that cannot be
    /// fetched is logged and yields `Ok(None)`.
    ///
    /// # Errors
    /// Returns [`TaskError::Status`] if a status poll fails.
    pub async fn run(
        &mut self,
        url: Option<&str>,
        options: Option<Options>,
        interval: Duration,
    ) -> Result<Option<Value>, TaskError> {
        self.start(url, options).await;
        self.wait_and_collect(interval).await
    }

    /// Like [`Task::run`], but kills the scan if it has not finished within
    /// `timeout`.
    ///
    /// The kill timer is armed before the start request and cancelled on
    /// every way out of this call.
    ///
    /// # Errors
    /// Returns [`TaskError::Status`] if a status poll fails.
    pub async fn run_with_timeout(
        &mut self,
        url: Option<&str>,
        options: Option<Options>,
        interval: Duration,
        timeout: Duration,
    ) -> Result<Option<Value>, TaskError> {
        let watchdog = KillWatchdog::arm(self.transport.clone(), self.id.clone(), timeout);

        self.start(url, options).await;
        let result = self.wait_and_collect(interval).await;

        if watchdog.fired() {
            tracing::warn!("Task<{}> timed out after {}s", self.id, timeout.as_secs_f64());
        }
        result
    }

    async fn wait_and_collect(&self, interval: Duration) -> Result<Option<Value>, TaskError> {
        while self.status().await?.is_running() {
            tokio::time::sleep(interval).await;
        }

        match self.get_result().await {
            Ok(data) => Ok(Some(data)),
            Err(e) => {
                tracing::error!("Fail to GET task<{}> result: {}", self.id, e);
                Ok(None)
            }
        }
    }

    async fn check_status(&self, predicate: fn(&ScanStatus) -> bool) -> bool {
        match self.status().await {
            Ok(status) => predicate(&status),
            Err(e) => {
                tracing::error!("Fail to GET task<{}> status: {}", self.id, e);
                false
            }
        }
    }

    async fn ack(&self, path: &str) -> bool {
        self.transport.get::<Ack>(path).await.is_ok()
    }

    fn status_error(&self, source: TransportError) -> TaskError {
        TaskError::Status {
            task_id: self.id.clone(),
            source,
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Task#{}>", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::DEFAULT_REQUEST_TIMEOUT;

    fn task(options: Options) -> Task {
        let transport =
            Transport::new("http://127.0.0.1:8775", DEFAULT_REQUEST_TIMEOUT).expect("transport");
        Task::new(TaskId::new("abc").expect("task id"), options, transport)
    }

    #[test]
    fn test_display() {
        assert_eq!(task(Options::new()).to_string(), "<Task#abc>");
    }

    #[test]
    fn test_initial_url_from_options() {
        let t = task(Options::new().with("url", "http://x/?id=1"));
        assert_eq!(t.url().as_deref(), Some("http://x/?id=1"));
        assert!(t.engine_id().is_none());
    }

    #[test]
    fn test_set_option_chains_and_mirrors_url() {
        let mut t = task(Options::new());
        t.set_option("dbms", "mysql").set_option("url", "http://x/y?id=1");

        assert_eq!(t.url().as_deref(), Some("http://x/y?id=1"));
        assert_eq!(t.get_option("dbms"), Some(&OptionValue::from("mysql")));
        assert_eq!(t.list_options().len(), 2);
    }

    #[test]
    fn test_update_options_mirrors_url() {
        let mut t = task(Options::new().with("url", "http://old/"));
        t.update_options(Options::new().with("level", 2));
        assert_eq!(t.url().as_deref(), Some("http://old/"));

        t.update_options(Options::new().with("url", "http://new/"));
        assert_eq!(t.url().as_deref(), Some("http://new/"));
    }

    #[test]
    fn test_address_shared_from_transport() {
        let t = task(Options::new());
        assert_eq!(t.address().as_str(), "http://127.0.0.1:8775/");
    }
}
