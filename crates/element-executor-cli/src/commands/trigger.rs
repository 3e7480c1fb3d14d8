//! Single execution trigger command

use super::WaitCommand;
use crate::{cli::ExecutionArgs, error::CliResult, utils::ColoredOutput};
use element_executor::{ExecutionRequest, ExecutorClient};
use tracing::info;

pub struct TriggerCommand;

impl TriggerCommand {
    pub fn run(client: &ExecutorClient, execution: ExecutionArgs, wait: bool) -> CliResult<()> {
        let request = ExecutionRequest::from(execution);
        info!(element_id = %request.element_id, env = %request.env, "Triggering element");

        let handle = client.trigger(&request)?;
        println!(
            "{} {}",
            ColoredOutput::success("✓ Execution triggered:"),
            ColoredOutput::highlight(&handle.execution_id)
        );

        if wait {
            WaitCommand::wait_and_report(client, &handle.execution_id, &client.config().poll)?;
        }
        Ok(())
    }
}
