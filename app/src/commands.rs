//! Command handlers.
//!
//! Each handler returns `Err` when the requested operation failed so the
//! binary can exit non-zero.

use crate::cli::{Command, RunArgs};
use anyhow::{anyhow, bail, Context, Result};
use serde_json::Value;
use sqlmapcli_client::{Client, Task, TaskId};
use sqlmapcli_core::ClientConfig;
use sqlmapcli_report::Report;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info, warn};

/// Dispatch one command against the configured server.
pub async fn execute(command: Command, config: &ClientConfig) -> Result<()> {
    let client = Client::from_config(config).context("Invalid client configuration")?;

    match command {
        Command::Scan { url, run, keep } => scan(&client, config, &url, &run, keep).await,
        Command::Batch { file, run } => batch(&client, config, &file, &run).await,
        Command::Status { task_id } => {
            let status = client.attach_task(task_id).status().await?;
            match status.retcode {
                Some(code) => println!("{} (return code {code})", status.status),
                None => println!("{}", status.status),
            }
            Ok(())
        }
        Command::Log { task_id, start, end } => {
            let log = client.attach_task(task_id).get_log(start, end).await?;
            print_json(&log)
        }
        Command::Result { task_id, json } => {
            let data = client.attach_task(task_id).get_result().await?;
            if json {
                print_json(&data)
            } else {
                print_report(&data)
            }
        }
        Command::Stop { task_id } => {
            ensure_done(client.attach_task(task_id.clone()).stop().await, "stop", &task_id)
        }
        Command::Kill { task_id } => {
            ensure_done(client.attach_task(task_id.clone()).kill().await, "kill", &task_id)
        }
        Command::Delete { task_id } => {
            ensure_done(client.delete_task(&task_id).await, "delete", &task_id)
        }
        Command::List => {
            if client.admin_id().is_none() {
                bail!("Listing tasks needs an admin id (--admin-id or SQLMAPCLI_ADMIN_ID)");
            }
            for task in client.list_tasks().await {
                println!(
                    "{}\t{}",
                    task.task_id,
                    task.status.as_deref().unwrap_or("-")
                );
            }
            Ok(())
        }
        Command::Flush => {
            if client.admin_id().is_none() {
                bail!("Flushing tasks needs an admin id (--admin-id or SQLMAPCLI_ADMIN_ID)");
            }
            if !client.flush_tasks().await {
                bail!("Fail to flush tasks");
            }
            Ok(())
        }
    }
}

async fn scan(
    client: &Client,
    config: &ClientConfig,
    url: &str,
    run: &RunArgs,
    keep: bool,
) -> Result<()> {
    let mut task = client
        .create_task(Some(run.to_options()))
        .await
        .ok_or_else(|| anyhow!("Fail to create task on {}", client.address()))?;

    let outcome = run_one(&mut task, config, run, url).await;

    if keep {
        info!("Keeping {} on the server", task);
    } else if !client.delete_task(task.id()).await {
        warn!("Fail to delete {}", task);
    }

    print_report(&outcome?)
}

async fn batch(client: &Client, config: &ClientConfig, file: &Path, run: &RunArgs) -> Result<()> {
    let contents = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read url list {}", file.display()))?;
    let urls = target_lines(&contents);
    if urls.is_empty() {
        bail!("No urls found in {}", file.display());
    }

    let mut task = client
        .create_task(Some(run.to_options()))
        .await
        .ok_or_else(|| anyhow!("Fail to create task on {}", client.address()))?;

    let mut failed = 0usize;
    for url in &urls {
        info!("Scanning {}", url);
        let outcome = run_one(&mut task, config, run, url).await;
        match outcome.and_then(|data| print_report(&data)) {
            Ok(()) => {}
            Err(e) => {
                error!("Scan of {} failed: {:#}", url, e);
                failed += 1;
            }
        }
    }

    if !client.delete_task(task.id()).await {
        warn!("Fail to delete {}", task);
    }

    if failed > 0 {
        bail!("{failed} of {} scans failed", urls.len());
    }
    Ok(())
}

async fn run_one(task: &mut Task, config: &ClientConfig, run: &RunArgs, url: &str) -> Result<Value> {
    let interval = Duration::from_secs(run.interval.unwrap_or(config.scan.poll_interval_secs).max(1));
    let data = match run.timeout.or(config.scan.timeout_secs) {
        Some(secs) => {
            task.run_with_timeout(Some(url), None, interval, Duration::from_secs(secs))
                .await?
        }
        None => task.run(Some(url), None, interval).await?,
    };
    data.ok_or_else(|| anyhow!("No result for {} ({})", url, task))
}

/// Non-blank lines of a url list, skipping `#` comments.
pub fn target_lines(contents: &str) -> Vec<&str> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect()
}

fn print_report(data: &Value) -> Result<()> {
    match Report::from_data(data) {
        Ok(report) => print!("{report}"),
        Err(e) => {
            warn!("Cannot decode scan data as a report: {}", e);
            return print_json(data);
        }
    }
    Ok(())
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn ensure_done(ok: bool, action: &str, task_id: &TaskId) -> Result<()> {
    if ok {
        Ok(())
    } else {
        bail!("Fail to {action} task<{task_id}>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_lines() {
        let contents = "http://a/?id=1\n\n  # staging\n  http://b/?q=x  \n";
        assert_eq!(target_lines(contents), vec!["http://a/?id=1", "http://b/?q=x"]);
    }

    #[test]
    fn test_ensure_done() {
        let task_id = TaskId::new("abc").expect("task id");
        assert!(ensure_done(true, "stop", &task_id).is_ok());

        let err = ensure_done(false, "stop", &task_id).expect_err("failure");
        assert_eq!(err.to_string(), "Fail to stop task<abc>");
    }

    #[tokio::test]
    async fn test_list_requires_admin_id() {
        let config = ClientConfig::default();
        let err = execute(Command::List, &config)
            .await
            .expect_err("no admin id");
        assert!(err.to_string().contains("admin id"));
    }
}
