//! sqlmapcli Client - async client for the sqlmapapi REST-JSON server.
//!
//! This crate wraps the scan server's task lifecycle: allocate a task,
//! configure its options, start/stop/kill the scan, poll status, and fetch
//! results and logs.
//!
//! # Features
//!
//! - **Task lifecycle**: `start`, `stop`, `kill`, `status` and the
//!   `is_ready`/`is_running`/`is_finished` shorthands
//! - **Run to completion**: [`Task::run`] polls until the scan leaves the
//!   running state, [`Task::run_with_timeout`] also kills scans that
//!   overrun a deadline
//! - **Explicit failure modes**: operations with a natural fallback return
//!   `Option`/`bool`; `status`, `get_result` and `get_log` return
//!   [`TaskError`]
//!
//! # Example
//!
//! ```rust,no_run
//! use sqlmapcli_client::{Client, DEFAULT_POLL_INTERVAL};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::local("10af2eefc9606577bccb75ced1fa74db")?;
//!
//! if let Some(mut task) = client.create_task(None).await {
//!     task.set_option("batch", true);
//!     let data = task
//!         .run(Some("http://testphp.vulnweb.com/artists.php?artist=1"), None, DEFAULT_POLL_INTERVAL)
//!         .await?;
//!     println!("{data:?}");
//!     client.delete_task(task.id()).await;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Lifecycle
//!
//! ```text
//! create_task ─► READY ("not running") ─► start ─► RUNNING ─► FINISHED ("terminated")
//!                                                     │            ▲
//!                                                     └─ stop/kill ┘
//! ```
//!
//! State is never cached locally: every status query is a request.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod client;
pub mod error;
pub mod options;
mod protocol;
pub mod status;
pub mod task;
pub mod transport;
pub mod watchdog;

// Re-export commonly used types
pub use client::Client;
pub use error::{ClientError, Result, TaskError, TransportError};
pub use options::Options;
pub use protocol::TaskInfo;
pub use sqlmapcli_core::{AdminId, EngineId, OptionValue, TaskId};
pub use status::{ScanStatus, TaskStatus};
pub use task::{Task, DEFAULT_POLL_INTERVAL};
pub use transport::Transport;
pub use watchdog::KillWatchdog;
