//! Completion wait command

use super::describe_outcome;
use crate::{
    error::{CliError, CliResult},
    utils::{format_duration, ColoredOutput},
};
use element_executor::{ExecutorClient, PollConfig, PollOutcome};
use std::time::{Duration, Instant};
use tracing::info;

pub struct WaitCommand;

impl WaitCommand {
    pub fn run(
        client: &ExecutorClient,
        execution_id: &str,
        max_wait_secs: Option<u64>,
        interval_secs: Option<u64>,
    ) -> CliResult<()> {
        let poll = Self::poll_config(client.config().poll.clone(), max_wait_secs, interval_secs)?;
        Self::wait_and_report(client, execution_id, &poll)
    }

    /// Wait for `execution_id` and print the outcome; anything but `pass` is an error.
    pub fn wait_and_report(client: &ExecutorClient, execution_id: &str, poll: &PollConfig) -> CliResult<()> {
        info!(
            execution_id,
            max_wait_secs = poll.max_wait.as_secs(),
            "Waiting for execution"
        );

        let start_time = Instant::now();
        let outcome = client.wait_for_completion(execution_id, poll)?;
        let waited = start_time.elapsed();

        match &outcome {
            PollOutcome::Finished(status) if status.succeeded() => {
                println!(
                    "{} {} ({})",
                    ColoredOutput::success("✓ Execution passed:"),
                    ColoredOutput::highlight(execution_id),
                    ColoredOutput::dim(&format_duration(waited))
                );
                Ok(())
            }
            other => Err(CliError::ExecutionFailed(format!(
                "execution {} {}",
                execution_id,
                describe_outcome(other)
            ))),
        }
    }

    fn poll_config(
        mut poll: PollConfig,
        max_wait_secs: Option<u64>,
        interval_secs: Option<u64>,
    ) -> CliResult<PollConfig> {
        if let Some(secs) = max_wait_secs {
            poll.max_wait = Duration::from_secs(secs);
        }
        if let Some(secs) = interval_secs {
            if secs == 0 {
                return Err(CliError::InvalidArgument(
                    "--interval-secs must be greater than zero".to_string(),
                ));
            }
            poll.interval = Duration::from_secs(secs);
        }
        Ok(poll)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::test_client;
    use element_executor::testing::ScriptedTransport;
    use element_executor::RawResponse;
    use serde_json::json;

    fn detail(status: &str) -> RawResponse {
        RawResponse::json(200, &json!({"code": 0, "data": {"status": status}}))
    }

    #[test]
    fn test_poll_config_overrides() {
        let base = PollConfig::default();

        let poll = WaitCommand::poll_config(base.clone(), Some(30), Some(2)).unwrap();
        assert_eq!(poll.max_wait, Duration::from_secs(30));
        assert_eq!(poll.interval, Duration::from_secs(2));

        assert_eq!(WaitCommand::poll_config(base.clone(), None, None).unwrap(), base);
        assert!(matches!(
            WaitCommand::poll_config(base, None, Some(0)),
            Err(CliError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_pass_is_success() {
        let client = test_client(ScriptedTransport::new().respond(detail("running")).respond(detail("pass")));
        assert!(WaitCommand::run(&client, "1", None, None).is_ok());
    }

    #[test]
    fn test_other_outcomes_are_failures() {
        let client = test_client(ScriptedTransport::new().respond(detail("fail")));
        let err = WaitCommand::run(&client, "1", None, None).unwrap_err();
        assert_eq!(err.to_string(), "Execution failed: execution 1 fail");

        let client = test_client(ScriptedTransport::new().repeat(detail("running")));
        let err = WaitCommand::run(&client, "2", Some(10), None).unwrap_err();
        assert!(err.to_string().contains("timed out after 10s"));
    }
}
