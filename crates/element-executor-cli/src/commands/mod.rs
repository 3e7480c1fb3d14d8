pub mod batch;
pub mod extract;
pub mod trace;
pub mod trigger;
pub mod wait;

// Re-export command handlers
pub use batch::BatchCommand;
pub use extract::ExtractCommand;
pub use trace::TraceCommand;
pub use trigger::TriggerCommand;
pub use wait::WaitCommand;

use crate::cli::ExecutionArgs;
use element_executor::{ExecutionRequest, PollOutcome};

impl From<ExecutionArgs> for ExecutionRequest {
    fn from(args: ExecutionArgs) -> Self {
        ExecutionRequest::new(args.element_id, args.env, args.operator_account)
    }
}

/// One-line description of how polling ended.
pub fn describe_outcome(outcome: &PollOutcome) -> String {
    match outcome {
        PollOutcome::Finished(status) => status.to_string(),
        PollOutcome::TimedOut {
            last_status: Some(status),
            waited,
        } => format!("timed out after {}s (last status: {})", waited.as_secs(), status),
        PollOutcome::TimedOut {
            last_status: None,
            waited,
        } => format!("timed out after {}s", waited.as_secs()),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use element_executor::TerminalStatus;
    use std::time::Duration;

    #[test]
    fn test_describe_outcome() {
        assert_eq!(describe_outcome(&PollOutcome::Finished(TerminalStatus::Fail)), "fail");
        assert_eq!(
            describe_outcome(&PollOutcome::TimedOut {
                last_status: Some("running".to_string()),
                waited: Duration::from_secs(300),
            }),
            "timed out after 300s (last status: running)"
        );
        assert_eq!(
            describe_outcome(&PollOutcome::TimedOut {
                last_status: None,
                waited: Duration::from_secs(10),
            }),
            "timed out after 10s"
        );
    }
}
