//! Utility functions for the CLI

use crate::error::{CliError, CliResult};
use colored::{ColoredString, Colorize};
use element_executor::{ExecutionRequest, FileFormat};
use std::path::Path;
use std::str::FromStr;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const ENV_JSON_LOGS: &str = "ELEMENT_EXECUTOR_JSON_LOGS";

/// Initialize tracing from `RUST_LOG` and `ELEMENT_EXECUTOR_JSON_LOGS`
pub fn init_tracing(verbose: bool) -> CliResult<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.to_string());
    let json_logs = std::env::var(ENV_JSON_LOGS)
        .map(|v| v.to_lowercase() == "true")
        .unwrap_or(false);

    init_with_config(&log_level, json_logs)?;
    Ok(())
}

/// Initialize logging with custom configuration
pub fn init_with_config(log_level: &str, json_logs: bool) -> anyhow::Result<()> {
    let env_filter = EnvFilter::from_str(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);

    // Logs go to stderr so command output on stdout stays machine readable
    if json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_target(true)
                    .with_level(true),
            )
            .try_init()?;
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .try_init()?;
    }

    tracing::debug!(log_level = %log_level, json_logs, "Logging initialized");
    Ok(())
}

/// Utility for colored console output
pub struct ColoredOutput;

impl ColoredOutput {
    pub fn success(msg: &str) -> ColoredString {
        msg.green().bold()
    }

    pub fn error(msg: &str) -> ColoredString {
        msg.red().bold()
    }

    pub fn warning(msg: &str) -> ColoredString {
        msg.yellow().bold()
    }

    pub fn dim(msg: &str) -> ColoredString {
        msg.dimmed()
    }

    pub fn highlight(msg: &str) -> ColoredString {
        msg.cyan().bold()
    }
}

/// Format duration in a human-readable way
pub fn format_duration(duration: std::time::Duration) -> String {
    let ms = duration.as_millis();
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        format!("{:.1}m", ms as f64 / 60_000.0)
    }
}

/// Validate file exists and is readable
pub fn validate_file_exists(path: &Path) -> CliResult<()> {
    if !path.exists() {
        return Err(CliError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

/// Read a batch task list; the format follows the file extension.
pub fn read_tasks_file(path: &Path) -> CliResult<Vec<ExecutionRequest>> {
    validate_file_exists(path)?;
    let format = FileFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)?;
    let tasks: Vec<ExecutionRequest> = format.parse(&content)?;
    if tasks.is_empty() {
        return Err(CliError::InvalidArgument(format!(
            "Task file '{}' contains no tasks",
            path.display()
        )));
    }
    Ok(tasks)
}
