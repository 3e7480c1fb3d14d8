//! Trigger-wait-extract command

use super::describe_outcome;
use crate::{
    cli::{ExecutionArgs, OutputFormat},
    error::CliResult,
    utils::ColoredOutput,
};
use element_executor::{ExecutionRequest, ExecutorClient, ExtractionReport, FieldResults};
use serde::Serialize;

pub struct ExtractCommand;

/// Printed form of an [`ExtractionReport`].
#[derive(Debug, Serialize)]
struct ExtractOutput<'a> {
    execution_id: &'a str,
    status: String,
    succeeded: bool,
    fields: &'a FieldResults,
}

impl<'a> From<&'a ExtractionReport> for ExtractOutput<'a> {
    fn from(report: &'a ExtractionReport) -> Self {
        Self {
            execution_id: &report.execution_id,
            status: describe_outcome(&report.completion),
            succeeded: report.completion.succeeded(),
            fields: &report.fields,
        }
    }
}

impl ExtractCommand {
    pub fn run(
        client: &ExecutorClient,
        execution: ExecutionArgs,
        fields: &[String],
        format: OutputFormat,
    ) -> CliResult<()> {
        let request = ExecutionRequest::from(execution);
        let report = client.extract_fields_from_execution(&request, fields)?;

        let output = serde_json::to_value(ExtractOutput::from(&report))?;
        println!("{}", format.format_json(&output)?);

        let summary = format!("Found {}/{} fields", report.found_count(), report.fields.len());
        if report.found_count() == report.fields.len() {
            eprintln!("{}", ColoredOutput::success(&summary));
        } else {
            eprintln!("{}", ColoredOutput::warning(&summary));
        }
        if !report.completion.succeeded() {
            eprintln!(
                "{} {}",
                ColoredOutput::warning("Execution did not pass:"),
                describe_outcome(&report.completion)
            );
        }
        Ok(())
    }
}
