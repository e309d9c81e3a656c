//! Task creation/deletion and admin-scoped listing against one server.

use crate::error::{ClientError, Result};
use crate::options::Options;
use crate::protocol::{self, Ack, ListResponse, NewTaskResponse, TaskInfo};
use crate::task::Task;
use crate::transport::{Transport, DEFAULT_REQUEST_TIMEOUT};
use sqlmapcli_core::{AdminId, ClientConfig, TaskId, DEFAULT_HOST, DEFAULT_PORT};
use std::time::Duration;
use url::Url;

/// Client for one sqlmapapi server.
///
/// Creates tasks (each gets its own copy of the option map) and issues the
/// admin list/flush calls scoped by the admin id. An empty admin id is
/// allowed; list/flush then fail without contacting the server.
#[derive(Debug, Clone)]
pub struct Client {
    admin_id: Option<AdminId>,
    transport: Transport,
    default_options: Options,
}

impl Client {
    /// Create a client for `http://<host>:<port>`.
    ///
    /// # Errors
    /// Returns error if the admin id is not a valid path segment, the
    /// address cannot be parsed, or the HTTP client cannot be created.
    pub fn new(admin_id: impl Into<String>, host: &str, port: u16) -> Result<Self> {
        Self::with_address(
            admin_id,
            &format!("http://{host}:{port}"),
            DEFAULT_REQUEST_TIMEOUT,
        )
    }

    /// Create a client for the default local server, `127.0.0.1:8775`.
    ///
    /// # Errors
    /// See [`Client::new`].
    pub fn local(admin_id: impl Into<String>) -> Result<Self> {
        Self::new(admin_id, DEFAULT_HOST, DEFAULT_PORT)
    }

    /// Create a client for an explicit base address.
    ///
    /// # Errors
    /// See [`Client::new`].
    pub fn with_address(
        admin_id: impl Into<String>,
        address: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let admin_id = admin_id.into();
        let admin_id = if admin_id.is_empty() {
            None
        } else {
            Some(AdminId::new(admin_id)?)
        };
        let transport = Transport::new(address, timeout)?;
        tracing::debug!("sqlmapapi client for {}", transport.address());
        Ok(Self {
            admin_id,
            transport,
            default_options: Options::new(),
        })
    }

    /// Create a client from configuration.
    ///
    /// The `[scan].options` table becomes the default options of every task.
    ///
    /// # Errors
    /// Returns error if the configuration is invalid; see also [`Client::new`].
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let client = Self::with_address(
            config.server.admin_id.clone(),
            &config.server.address(),
            Duration::from_secs(config.server.request_timeout_secs),
        )?;
        Ok(client.with_default_options(Options::from(config.scan.options.clone())))
    }

    /// Options merged into every task before its own initial options.
    #[must_use]
    pub fn with_default_options(mut self, options: Options) -> Self {
        self.default_options = options;
        self
    }

    /// Admin id used for list/flush.
    #[must_use]
    pub fn admin_id(&self) -> Option<&AdminId> {
        self.admin_id.as_ref()
    }

    /// Base address of the server.
    #[must_use]
    pub fn address(&self) -> &Url {
        self.transport.address()
    }

    /// Allocate a task on the server and return a handle to it.
    ///
    /// Returns `None` if the server could not be reached or refused.
    pub async fn create_task(&self, options: Option<Options>) -> Option<Task> {
        let r: NewTaskResponse = self.transport.get(protocol::TASK_NEW).await.ok()?;
        tracing::info!("Create task<{}>", r.taskid);

        let mut task_options = self.default_options.clone();
        if let Some(options) = options {
            task_options.update(options);
        }
        Some(Task::new(r.taskid, task_options, self.transport.clone()))
    }

    /// Handle for a task that already exists on the server.
    ///
    /// No request is made; the handle starts with the default options.
    #[must_use]
    pub fn attach_task(&self, task_id: TaskId) -> Task {
        Task::new(task_id, self.default_options.clone(), self.transport.clone())
    }

    /// Delete a remote task. Local handles are unaffected.
    pub async fn delete_task(&self, task_id: &TaskId) -> bool {
        let ok = self
            .transport
            .get::<Ack>(&protocol::task_delete(task_id))
            .await
            .is_ok();
        if ok {
            tracing::info!("Delete task<{}>", task_id);
        }
        ok
    }

    /// List the server's tasks. Any failure yields an empty list.
    pub async fn list_tasks(&self) -> Vec<TaskInfo> {
        let Some(admin_id) = self.admin_id() else {
            tracing::error!("Fail to list tasks: no admin id configured");
            return Vec::new();
        };
        match self
            .transport
            .get::<ListResponse>(&protocol::admin_list(admin_id))
            .await
        {
            Ok(r) => {
                tracing::info!(
                    "Admin list {} tasks",
                    r.tasks_num.unwrap_or(r.tasks.len() as u64)
                );
                r.tasks
            }
            Err(_) => Vec::new(),
        }
    }

    /// Remove every task on the server.
    pub async fn flush_tasks(&self) -> bool {
        let Some(admin_id) = self.admin_id() else {
            tracing::error!("Fail to flush tasks: no admin id configured");
            return false;
        };
        let ok = self
            .transport
            .get::<Ack>(&protocol::admin_flush(admin_id))
            .await
            .is_ok();
        if ok {
            tracing::info!("Admin flush tasks");
        }
        ok
    }

    /// Download a file produced by a scan.
    ///
    /// # Errors
    /// Always returns [`ClientError::Unsupported`]; no request is made.
    pub async fn download_task(
        &self,
        _task_id: &TaskId,
        _target: &str,
        _filename: &str,
    ) -> Result<Vec<u8>> {
        Err(ClientError::Unsupported("download_task"))
    }
}
