//! Batch trigger command

use crate::{
    error::{CliError, CliResult},
    utils::{format_duration, read_tasks_file, ColoredOutput},
};
use element_executor::{BatchReport, ExecutorClient};
use std::path::Path;
use std::time::Instant;
use tracing::info;

pub struct BatchCommand;

impl BatchCommand {
    pub fn run(client: &ExecutorClient, tasks_file: &Path) -> CliResult<()> {
        let tasks = read_tasks_file(tasks_file)?;
        info!(tasks = tasks.len(), file = %tasks_file.display(), "Running batch");

        let start_time = Instant::now();
        let report = client.batch_trigger(&tasks);

        for line in Self::render(&report) {
            println!("{}", line);
        }
        println!(
            "\n{} {}/{} triggered in {}",
            ColoredOutput::highlight("Batch finished:"),
            report.success_count(),
            report.total(),
            format_duration(start_time.elapsed())
        );

        let failed = report.total() - report.success_count();
        if failed > 0 {
            return Err(CliError::ExecutionFailed(format!(
                "{} of {} tasks failed",
                failed,
                report.total()
            )));
        }
        Ok(())
    }

    /// One line per task, in submission order.
    fn render(report: &BatchReport) -> Vec<String> {
        report
            .entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let prefix = format!("[{}/{}] {}", index + 1, report.total(), entry.request.element_id);
                match &entry.outcome {
                    Ok(handle) => format!(
                        "{} {} -> {}",
                        ColoredOutput::success("✓"),
                        prefix,
                        handle.execution_id
                    ),
                    Err(error) => format!("{} {}: {}", ColoredOutput::error("✗"), prefix, error),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::test_client;
    use element_executor::testing::ScriptedTransport;
    use element_executor::{ApiError, BatchEntry, ExecutionHandle, ExecutionRequest, RawResponse};
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_render_lines() {
        colored::control::set_override(false);
        let report = BatchReport {
            entries: vec![
                BatchEntry {
                    request: ExecutionRequest::new("1", "env", "op"),
                    outcome: Ok(ExecutionHandle {
                        execution_id: "100".to_string(),
                    }),
                },
                BatchEntry {
                    request: ExecutionRequest::new("2", "env", "op"),
                    outcome: Err(ApiError::TriggerRejected {
                        code: Some(json!(9)),
                    }),
                },
            ],
        };

        let lines = BatchCommand::render(&report);

        assert_eq!(lines[0], "✓ [1/2] 1 -> 100");
        assert_eq!(lines[1], "✗ [2/2] 2: trigger rejected by service (code: 9)");
    }

    #[test]
    fn test_partial_failure_is_an_error() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[{{"element_id": "1", "env": "e", "operator_account": "op"}},
                {{"element_id": "2", "env": "e", "operator_account": "op"}}]"#
        )
        .unwrap();
        file.flush().unwrap();

        let client = test_client(
            ScriptedTransport::new()
                .respond(RawResponse::json(200, &json!({"code": 0, "data": 1})))
                .respond(RawResponse::json(200, &json!({"code": 1}))),
        );

        let err = BatchCommand::run(&client, file.path()).unwrap_err();

        assert_eq!(err.to_string(), "Execution failed: 1 of 2 tasks failed");
    }
}
