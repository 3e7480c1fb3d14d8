//! Progress events emitted by the client
//!
//! Components never configure logging themselves. They report what happens
//! to an [`EventSink`] handed to them by the caller; [`TracingSink`] forwards
//! to `tracing`, [`RecordingSink`] keeps events in memory.

use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum ExecutorEvent {
    AttemptStarted {
        target: String,
        attempt: u32,
        max_attempts: u32,
    },
    ResponseReceived {
        target: String,
        attempt: u32,
        status_code: u16,
    },
    AttemptTimedOut {
        target: String,
        attempt: u32,
        max_attempts: u32,
    },
    BackingOff {
        target: String,
        attempt: u32,
        delay: Duration,
    },
    RequestFailed {
        target: String,
        reason: String,
    },
    ExecutionTriggered {
        element_id: String,
        execution_id: String,
    },
    TriggerFailed {
        element_id: String,
        reason: String,
    },
    PollStatus {
        execution_id: String,
        status: String,
    },
    PollFinished {
        execution_id: String,
        status: String,
    },
    PollTimedOut {
        execution_id: String,
        waited: Duration,
    },
    FieldsExtracted {
        found: usize,
        requested: usize,
    },
    BatchTaskStarted {
        index: usize,
        total: usize,
        element_id: String,
    },
    BatchCompleted {
        succeeded: usize,
        total: usize,
    },
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: ExecutorEvent);
}

/// Forwards every event to `tracing` with structured fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: ExecutorEvent) {
        match event {
            ExecutorEvent::AttemptStarted { target, attempt, max_attempts } => {
                tracing::debug!(target_call = %target, attempt, max_attempts, "Sending request");
            }
            ExecutorEvent::ResponseReceived { target, attempt, status_code } => {
                tracing::debug!(target_call = %target, attempt, http_status = status_code, "Response received");
            }
            ExecutorEvent::AttemptTimedOut { target, attempt, max_attempts } => {
                tracing::warn!(target_call = %target, attempt, max_attempts, "Request timed out");
            }
            ExecutorEvent::BackingOff { target, attempt, delay } => {
                tracing::warn!(
                    target_call = %target,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Retrying after backoff"
                );
            }
            ExecutorEvent::RequestFailed { target, reason } => {
                tracing::error!(target_call = %target, reason = %reason, "Request failed");
            }
            ExecutorEvent::ExecutionTriggered { element_id, execution_id } => {
                tracing::info!(element_id = %element_id, execution_id = %execution_id, "Execution triggered");
            }
            ExecutorEvent::TriggerFailed { element_id, reason } => {
                tracing::error!(element_id = %element_id, reason = %reason, "Trigger failed");
            }
            ExecutorEvent::PollStatus { execution_id, status } => {
                tracing::info!(execution_id = %execution_id, status = %status, "Execution still running");
            }
            ExecutorEvent::PollFinished { execution_id, status } => {
                tracing::info!(execution_id = %execution_id, status = %status, "Execution finished");
            }
            ExecutorEvent::PollTimedOut { execution_id, waited } => {
                tracing::warn!(
                    execution_id = %execution_id,
                    waited_secs = waited.as_secs(),
                    "Timed out waiting for execution"
                );
            }
            ExecutorEvent::FieldsExtracted { found, requested } => {
                tracing::info!(found, requested, "Field extraction finished");
            }
            ExecutorEvent::BatchTaskStarted { index, total, element_id } => {
                tracing::info!(index, total, element_id = %element_id, "Running batch task");
            }
            ExecutorEvent::BatchCompleted { succeeded, total } => {
                tracing::info!(succeeded, total, "Batch finished");
            }
        }
    }
}

/// Keeps events in memory, in emission order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ExecutorEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ExecutorEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn count(&self, predicate: impl Fn(&ExecutorEvent) -> bool) -> usize {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|event| predicate(event))
            .count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: ExecutorEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }
}
