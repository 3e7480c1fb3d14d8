//! Sequential batch triggering

use crate::client::ExecutorClient;
use crate::error::ApiResult;
use crate::observability::ExecutorEvent;
use crate::trigger::{ExecutionHandle, ExecutionRequest};
use tracing::instrument;

/// Outcome of one task in a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry {
    pub request: ExecutionRequest,
    pub outcome: ApiResult<ExecutionHandle>,
}

/// Per-task outcomes, in submission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    pub fn success_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.outcome.is_ok()).count()
    }

    pub fn total(&self) -> usize {
        self.entries.len()
    }

    pub fn handles(&self) -> impl Iterator<Item = &ExecutionHandle> {
        self.entries.iter().filter_map(|entry| entry.outcome.as_ref().ok())
    }
}

impl ExecutorClient {
    /// Trigger each request in turn, pausing `batch_delay` between tasks.
    ///
    /// A failed task does not stop the batch.
    #[instrument(level = "info", skip(self, requests), fields(tasks = requests.len()))]
    pub fn batch_trigger(&self, requests: &[ExecutionRequest]) -> BatchReport {
        let total = requests.len();
        let mut report = BatchReport {
            entries: Vec::with_capacity(total),
        };

        for (index, request) in requests.iter().enumerate() {
            if index > 0 {
                self.clock.sleep(self.config.batch_delay);
            }
            self.events.emit(ExecutorEvent::BatchTaskStarted {
                index: index + 1,
                total,
                element_id: request.element_id.clone(),
            });
            report.entries.push(BatchEntry {
                request: request.clone(),
                outcome: self.trigger(request),
            });
        }

        self.events.emit(ExecutorEvent::BatchCompleted {
            succeeded: report.success_count(),
            total,
        });
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::ExecutorConfig;
    use crate::error::ApiError;
    use crate::observability::RecordingSink;
    use crate::testing::ScriptedTransport;
    use crate::transport::RawResponse;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn accepted(id: u64) -> RawResponse {
        RawResponse::json(200, &json!({"code": 0, "data": id}))
    }

    fn requests(count: usize) -> Vec<ExecutionRequest> {
        (0..count)
            .map(|i| ExecutionRequest::new(format!("{}", 1000 + i), "env-1", "op"))
            .collect()
    }

    #[test]
    fn test_tasks_are_spaced_by_batch_delay() {
        let clock = Arc::new(ManualClock::new());
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(accepted(1))
                .respond(accepted(2))
                .respond(accepted(3))
                .with_clock(clock.clone()),
        );
        let sink = Arc::new(RecordingSink::new());
        let config = ExecutorConfig::new("http://executor.test", "token").unwrap();
        let client = ExecutorClient::with_transport(config, transport.clone())
            .with_clock(clock.clone())
            .with_event_sink(sink.clone());

        let report = client.batch_trigger(&requests(3));

        assert_eq!(report.total(), 3);
        assert_eq!(report.success_count(), 3);
        let ids: Vec<&str> = report.handles().map(|h| h.execution_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(
            transport.sent_at(),
            vec![Duration::ZERO, Duration::from_secs(1), Duration::from_secs(2)]
        );
        assert_eq!(clock.elapsed(), Duration::from_secs(2));
        assert_eq!(
            sink.events().last(),
            Some(&ExecutorEvent::BatchCompleted {
                succeeded: 3,
                total: 3
            })
        );
    }

    #[test]
    fn test_failures_do_not_stop_the_batch() {
        let clock = Arc::new(ManualClock::new());
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(accepted(1))
                .respond(RawResponse::json(200, &json!({"code": 7, "msg": "bad env"})))
                .respond(RawResponse::json(403, &json!({"message": "denied"})))
                .respond(accepted(4)),
        );
        let config = ExecutorConfig::new("http://executor.test", "token").unwrap();
        let client = ExecutorClient::with_transport(config, transport.clone())
            .with_clock(clock)
            .with_event_sink(Arc::new(RecordingSink::new()));

        let report = client.batch_trigger(&requests(4));

        assert_eq!(report.success_count(), 2);
        assert_eq!(report.total(), 4);
        assert_eq!(transport.call_count(), 4);
        assert_eq!(
            report.entries[1].outcome,
            Err(ApiError::TriggerRejected {
                code: Some(json!(7))
            })
        );
        assert_eq!(report.entries[2].request.element_id, "1002");
    }

    #[test]
    fn test_empty_batch() {
        let clock = Arc::new(ManualClock::new());
        let config = ExecutorConfig::new("http://executor.test", "token").unwrap();
        let client = ExecutorClient::with_transport(config, Arc::new(ScriptedTransport::new()))
            .with_clock(clock.clone())
            .with_event_sink(Arc::new(RecordingSink::new()));

        let report = client.batch_trigger(&[]);

        assert_eq!(report.total(), 0);
        assert_eq!(report.success_count(), 0);
        assert!(clock.sleeps().is_empty());
    }
}
