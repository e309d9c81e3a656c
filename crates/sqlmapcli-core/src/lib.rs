//! sqlmapcli Core - Foundation crate for the sqlmapapi client.
//!
//! This crate provides the shared configuration, identifier newtypes and
//! error types that the client, report and binary crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths and env overrides
//! - [`types`] - Identifier newtypes (`TaskId`, `AdminId`, `EngineId`)
//!
//! # Example
//!
//! ```rust
//! use sqlmapcli_core::ClientConfig;
//!
//! let config = ClientConfig::default();
//! assert_eq!(config.server.address(), "http://127.0.0.1:8775");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{ClientConfig, ScanConfig, ServerConfig, DEFAULT_HOST, DEFAULT_PORT};
pub use error::{ConfigError, ConfigResult, CoreError};
pub use types::{AdminId, EngineId, OptionValue, TaskId};
