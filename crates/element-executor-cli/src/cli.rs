//! CLI argument definitions using clap

use clap::{Parser, Subcommand};
use serde_json::Value as JsonValue;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "element-executor",
    about = "Trigger element executions and inspect their traces",
    version,
    author = "TRS Team"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (YAML or JSON); environment variables override it
    #[arg(long, short = 'c', env = "ELEMENT_EXECUTOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, help = "Disable colored output")]
    pub no_color: bool,
}

/// Element and environment of one execution.
#[derive(clap::Args, Debug, Clone, PartialEq)]
pub struct ExecutionArgs {
    /// Element to execute
    pub element_id: String,

    /// Target environment
    #[arg(long)]
    pub env: String,

    /// Account the execution runs as
    #[arg(long = "operator", short = 'o')]
    pub operator_account: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Trigger a single element execution
    Trigger {
        #[command(flatten)]
        execution: ExecutionArgs,

        /// Wait for the execution to reach a terminal status
        #[arg(long)]
        wait: bool,
    },

    /// Fetch the trace detail of an execution
    Trace {
        /// Execution identifier
        execution_id: String,

        /// Only print these fields, searched anywhere in the detail
        #[arg(long = "field", short = 'f')]
        fields: Vec<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "pretty")]
        format: OutputFormat,
    },

    /// Poll an execution until it finishes or the wait limit passes
    Wait {
        /// Execution identifier
        execution_id: String,

        /// Maximum time to wait, overriding the configured value
        #[arg(long)]
        max_wait_secs: Option<u64>,

        /// Poll interval, overriding the configured value
        #[arg(long)]
        interval_secs: Option<u64>,
    },

    /// Trigger, wait, then extract fields from the execution trace
    Extract {
        #[command(flatten)]
        execution: ExecutionArgs,

        /// Field to extract; repeat for several
        #[arg(long = "field", short = 'f', required = true)]
        fields: Vec<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "pretty")]
        format: OutputFormat,
    },

    /// Trigger every task listed in a YAML or JSON file, one after another
    Batch {
        /// Task file: a list of {element_id, env, operator_account}
        tasks: PathBuf,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    Pretty,
    /// Compact JSON
    Json,
    /// YAML format
    Yaml,
}

impl OutputFormat {
    /// Format a JSON value according to the output format
    pub fn format_json(&self, value: &JsonValue) -> crate::error::CliResult<String> {
        match self {
            Self::Pretty => Ok(serde_json::to_string_pretty(value)?),
            Self::Json => Ok(serde_json::to_string(value)?),
            Self::Yaml => Ok(serde_yaml::to_string(value)?),
        }
    }
}
