//! Completion polling

use crate::client::ExecutorClient;
use crate::config::PollConfig;
use crate::error::ApiResult;
use crate::observability::ExecutorEvent;
use crate::trace::execution_status;
use std::fmt;
use std::time::Duration;
use tracing::instrument;

/// Statuses after which an execution no longer changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminalStatus {
    Pass,
    Fail,
    Completed,
    Success,
}

impl TerminalStatus {
    /// Parse a status string; `None` means the execution is still running.
    pub fn parse(status: &str) -> Option<Self> {
        match status {
            "pass" => Some(Self::Pass),
            "fail" => Some(Self::Fail),
            "completed" => Some(Self::Completed),
            "success" => Some(Self::Success),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Completed => "completed",
            Self::Success => "success",
        }
    }

    /// Only `pass` counts as a successful run.
    pub fn succeeded(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

impl fmt::Display for TerminalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How waiting for an execution ended.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Finished(TerminalStatus),
    TimedOut {
        /// Last status read before giving up; `None` if no fetch succeeded.
        last_status: Option<String>,
        waited: Duration,
    },
}

impl PollOutcome {
    pub fn succeeded(&self) -> bool {
        match self {
            Self::Finished(status) => status.succeeded(),
            Self::TimedOut { .. } => false,
        }
    }
}

impl ExecutorClient {
    /// Poll the execution detail until a terminal status shows up or
    /// `poll.max_wait` has elapsed.
    ///
    /// Failed fetches are waited out like a non-terminal status, except a
    /// permission denial which is returned immediately.
    #[instrument(level = "info", skip(self, poll), fields(max_wait_secs = poll.max_wait.as_secs()))]
    pub fn wait_for_completion(&self, execution_id: &str, poll: &PollConfig) -> ApiResult<PollOutcome> {
        let start = self.clock.now();
        let mut last_status = None;

        while self.clock.now().duration_since(start) < poll.max_wait {
            match self.fetch_detail_once(execution_id) {
                Ok(detail) => {
                    let status = execution_status(&detail.data);
                    if let Some(terminal) = TerminalStatus::parse(status) {
                        self.events.emit(ExecutorEvent::PollFinished {
                            execution_id: execution_id.to_string(),
                            status: terminal.to_string(),
                        });
                        return Ok(PollOutcome::Finished(terminal));
                    }
                    self.events.emit(ExecutorEvent::PollStatus {
                        execution_id: execution_id.to_string(),
                        status: status.to_string(),
                    });
                    last_status = Some(status.to_string());
                }
                Err(error) if !error.is_transient() => return Err(error),
                Err(_) => {}
            }
            self.clock.sleep(poll.interval);
        }

        let waited = self.clock.now().duration_since(start);
        self.events.emit(ExecutorEvent::PollTimedOut {
            execution_id: execution_id.to_string(),
            waited,
        });
        Ok(PollOutcome::TimedOut { last_status, waited })
    }
}
