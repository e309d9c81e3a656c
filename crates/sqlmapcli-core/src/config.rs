//! Configuration management for sqlmapcli.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use crate::types::OptionValue;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Default sqlmapapi host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default sqlmapapi port.
pub const DEFAULT_PORT: u16 = 8775;

/// Main client configuration.
///
/// This is loaded from `~/.config/sqlmapcli/config.toml` (or platform
/// equivalent). If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Remote sqlmapapi server settings
    pub server: ServerConfig,
    /// Scan execution settings
    pub scan: ScanConfig,
}

impl ClientConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit file.
    ///
    /// Unlike [`ClientConfig::load`], a missing file is an error here.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }
        tracing::debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `SQLMAPCLI_HOST`: Override server host
    /// - `SQLMAPCLI_PORT`: Override server port
    /// - `SQLMAPCLI_ADMIN_ID`: Override admin id
    /// - `SQLMAPCLI_POLL_INTERVAL`: Override status poll interval (seconds)
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    ///
    /// Values that fail to parse are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SQLMAPCLI_HOST") {
            tracing::debug!("Override server.host from env: {}", host);
            self.server.host = host;
        }

        if let Some(val) = lookup("SQLMAPCLI_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
                tracing::debug!("Override server.port from env: {}", port);
            }
        }

        if let Some(admin_id) = lookup("SQLMAPCLI_ADMIN_ID") {
            tracing::debug!("Override server.admin_id from env");
            self.server.admin_id = admin_id;
        }

        if let Some(val) = lookup("SQLMAPCLI_POLL_INTERVAL") {
            if let Ok(secs) = val.parse() {
                self.scan.poll_interval_secs = secs;
                tracing::debug!("Override scan.poll_interval_secs from env: {}", secs);
            }
        }
    }

    /// Save configuration to the default location.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    /// Save configuration to an explicit file.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let config_dir = path.parent().ok_or_else(|| ConfigError::InvalidValue {
            field: "config_path".to_string(),
            reason: "no parent directory".to_string(),
        })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/sqlmapcli/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("com", "sqlmapcli", "sqlmapcli").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Check that the configuration can be used to reach a server.
    pub fn validate(&self) -> ConfigResult<()> {
        self.server.validate()?;
        if self.scan.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scan.poll_interval_secs".to_string(),
                reason: "must be at least 1 second".to_string(),
            });
        }
        Ok(())
    }
}

/// Remote sqlmapapi server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host name or IP address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Admin id for the list/flush endpoints (printed by `sqlmapapi -s`)
    pub admin_id: String,
    /// Per-request HTTP timeout in seconds
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    /// Base address of the server, `http://<host>:<port>`.
    #[must_use]
    pub fn address(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Reject settings that cannot produce a usable address.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "server.host".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            admin_id: String::new(),
            request_timeout_secs: 30,
        }
    }
}

/// Scan execution settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Seconds between status polls while a scan runs
    pub poll_interval_secs: u64,
    /// Kill a scan that is still running after this many seconds (none = wait forever)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Options merged into every newly created task
    pub options: BTreeMap<String, OptionValue>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 5,
            timeout_secs: None,
            options: BTreeMap::new(),
        }
    }
}
