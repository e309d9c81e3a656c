//! Command-line arguments.

use clap::{Args, Parser, Subcommand};
use sqlmapcli_client::{OptionValue, Options, TaskId};
use sqlmapcli_core::ClientConfig;
use std::path::PathBuf;

/// Command-line client for the sqlmapapi REST server
#[derive(Parser, Debug, Clone)]
#[command(name = "sqlmapcli")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Flags shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// sqlmapapi host
    #[arg(long = "host", value_name = "HOST", global = true)]
    pub host: Option<String>,

    /// sqlmapapi port
    #[arg(short = 'p', long = "port", value_name = "PORT", global = true)]
    pub port: Option<u16>,

    /// Admin id printed by `sqlmapapi -s`, needed for list/flush
    #[arg(long = "admin-id", value_name = "ID", global = true)]
    pub admin_id: Option<String>,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", global = true,
          value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,
}

impl GlobalArgs {
    /// Apply host/port/admin id flags on top of a loaded configuration.
    pub fn apply_to(&self, config: &mut ClientConfig) {
        if let Some(host) = &self.host {
            config.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(admin_id) = &self.admin_id {
            config.server.admin_id.clone_from(admin_id);
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Scan one url, print the report and delete the task
    Scan {
        /// Target url
        #[arg(short = 'u', long = "url", value_name = "URL")]
        url: String,

        #[command(flatten)]
        run: RunArgs,

        /// Keep the task on the server after the scan
        #[arg(long = "keep")]
        keep: bool,
    },

    /// Scan every url listed in a file with one task
    Batch {
        /// File with one url per line
        #[arg(short = 'f', long = "file", value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Show the status of a task
    Status {
        #[arg(value_parser = parse_task_id)]
        task_id: TaskId,
    },

    /// Print the log of a task
    Log {
        #[arg(value_parser = parse_task_id)]
        task_id: TaskId,

        /// First log entry to return
        #[arg(long = "start", requires = "end")]
        start: Option<u64>,

        /// Last log entry to return
        #[arg(long = "end", requires = "start")]
        end: Option<u64>,
    },

    /// Print the result of a task
    Result {
        #[arg(value_parser = parse_task_id)]
        task_id: TaskId,

        /// Print the raw JSON data instead of the report
        #[arg(long = "json")]
        json: bool,
    },

    /// Stop a running scan
    Stop {
        #[arg(value_parser = parse_task_id)]
        task_id: TaskId,
    },

    /// Kill a running scan
    Kill {
        #[arg(value_parser = parse_task_id)]
        task_id: TaskId,
    },

    /// Delete a task
    Delete {
        #[arg(value_parser = parse_task_id)]
        task_id: TaskId,
    },

    /// List every task on the server
    List,

    /// Delete every task on the server
    Flush,
}

/// Options controlling one scan run.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Scan option as key=value (repeatable)
    #[arg(short = 'o', long = "option", value_name = "KEY=VALUE", value_parser = parse_option)]
    pub options: Vec<(String, OptionValue)>,

    /// Seconds between status polls
    #[arg(short = 'i', long = "interval", value_name = "SECS")]
    pub interval: Option<u64>,

    /// Kill the scan after this many seconds
    #[arg(short = 't', long = "timeout", value_name = "SECS")]
    pub timeout: Option<u64>,
}

impl RunArgs {
    /// Collect the `--option` pairs; later keys win.
    pub fn to_options(&self) -> Options {
        self.options.iter().cloned().collect()
    }
}

/// Parse `key=value`, typing the value as bool, integer, float or text.
pub fn parse_option(raw: &str) -> Result<(String, OptionValue), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty option name in `{raw}`"));
    }
    Ok((key.to_string(), OptionValue::parse(value)))
}

fn parse_task_id(raw: &str) -> Result<TaskId, String> {
    TaskId::new(raw).map_err(|e| e.to_string())
}
