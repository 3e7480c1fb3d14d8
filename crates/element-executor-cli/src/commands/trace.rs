//! Trace detail command

use crate::{cli::OutputFormat, error::CliResult, utils::ColoredOutput};
use element_executor::{execution_status, extract_fields, ExecutorClient};
use serde_json::Value as JsonValue;
use tracing::debug;

pub struct TraceCommand;

impl TraceCommand {
    pub fn run(client: &ExecutorClient, execution_id: &str, fields: &[String], format: OutputFormat) -> CliResult<()> {
        let detail = client.get_trace(execution_id)?;
        debug!(
            execution_id,
            status = execution_status(&detail.data),
            "Fetched trace detail"
        );

        let output = Self::select(&detail.data, fields)?;
        println!("{}", format.format_json(&output)?);

        if !fields.is_empty() {
            let missing: Vec<&str> = output
                .as_object()
                .map(|map| {
                    map.iter()
                        .filter(|(_, value)| value.is_null())
                        .map(|(name, _)| name.as_str())
                        .collect()
                })
                .unwrap_or_default();
            if !missing.is_empty() {
                eprintln!(
                    "{} {}",
                    ColoredOutput::warning("Fields not found:"),
                    missing.join(", ")
                );
            }
        }
        Ok(())
    }

    /// The whole detail, or just the requested fields keyed by name.
    fn select(detail: &JsonValue, fields: &[String]) -> CliResult<JsonValue> {
        if fields.is_empty() {
            return Ok(detail.clone());
        }
        Ok(serde_json::to_value(extract_fields(detail, fields))?)
    }
}
