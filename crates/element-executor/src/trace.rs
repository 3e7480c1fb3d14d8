//! Trace/record detail query

use crate::client::ExecutorClient;
use crate::config::RetryPolicy;
use crate::error::ApiResult;
use crate::retry_manager::{ApiResponse, NotFoundPolicy};
use crate::transport::HttpRequest;
use serde_json::Value as JsonValue;
use tracing::instrument;

/// Status reported when the detail carries no string `data.status`.
pub const UNKNOWN_STATUS: &str = "unknown";

impl ExecutorClient {
    /// Fetch the stored detail of an execution.
    ///
    /// A 404 is reported as [`ApiError::NotFound`](crate::ApiError::NotFound)
    /// straight away; other failures go through the configured retry policy.
    #[instrument(level = "debug", skip(self))]
    pub fn get_trace(&self, execution_id: &str) -> ApiResult<ApiResponse> {
        self.fetch_detail(execution_id, &self.config.retry)
    }

    /// Single-attempt detail fetch used while polling.
    pub(crate) fn fetch_detail_once(&self, execution_id: &str) -> ApiResult<ApiResponse> {
        self.fetch_detail(execution_id, &RetryPolicy::single_attempt())
    }

    fn fetch_detail(&self, execution_id: &str, policy: &RetryPolicy) -> ApiResult<ApiResponse> {
        let url = self
            .config
            .endpoint(&["external", "execution", "trace", execution_id, "detail"]);
        let target = format!("trace {execution_id}");
        self.send(&target, &HttpRequest::get(url), policy, NotFoundPolicy::Report)
    }
}

/// `data.status` of a detail body, or `"unknown"`.
pub fn execution_status(detail: &JsonValue) -> &str {
    detail
        .get("data")
        .and_then(|data| data.get("status"))
        .and_then(JsonValue::as_str)
        .unwrap_or(UNKNOWN_STATUS)
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
    use reqwest::Method;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn client(transport: Arc<ScriptedTransport>, clock: Arc<ManualClock>) -> ExecutorClient {
        let config = ExecutorConfig::new("http://executor.test/api", "token").unwrap();
        ExecutorClient::with_transport(config, transport)
            .with_clock(clock)
            .with_event_sink(Arc::new(RecordingSink::new()))
    }

    #[test]
    fn test_get_trace_url_and_body() {
        let body = json!({"code": 0, "data": {"status": "pass"}});
        let transport = Arc::new(ScriptedTransport::new().respond(RawResponse::json(200, &body)));
        let client = client(transport.clone(), Arc::new(ManualClock::new()));

        let response = client.get_trace("2500402495").unwrap();

        assert_eq!(response.status_code, 200);
        assert_eq!(response.data, body);
        let requests = transport.requests();
        assert_eq!(requests[0].method, Method::GET);
        assert_eq!(
            requests[0].url.as_str(),
            "http://executor.test/api/external/execution/trace/2500402495/detail"
        );
        assert!(requests[0].query.is_empty());
    }

    #[test]
    fn test_get_trace_not_found_is_not_retried() {
        let transport = Arc::new(ScriptedTransport::new().repeat(RawResponse::new(404, "")));
        let client = client(transport.clone(), Arc::new(ManualClock::new()));

        let result = client.get_trace("missing");

        assert_eq!(
            result,
            Err(ApiError::NotFound {
                target: "trace missing".to_string()
            })
        );
        assert_eq!(transport.call_count(), 1);
    }

    #[test]
    fn test_get_trace_retries_server_errors() {
        let clock = Arc::new(ManualClock::new());
        let transport = Arc::new(ScriptedTransport::new().repeat(RawResponse::new(502, "bad gateway")));
        let client = client(transport.clone(), clock.clone());

        let result = client.get_trace("1");

        assert_eq!(
            result,
            Err(ApiError::RetriesExhausted {
                last_status: Some(502),
                attempts: 3
            })
        );
        assert_eq!(transport.call_count(), 3);
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(1), Duration::from_secs(2)]);
    }

    #[test]
    fn test_fetch_detail_once_makes_one_call() {
        let clock = Arc::new(ManualClock::new());
        let transport = Arc::new(ScriptedTransport::new().repeat(RawResponse::new(500, "")));
        let client = client(transport.clone(), clock.clone());

        let result = client.fetch_detail_once("1");

        assert_eq!(
            result,
            Err(ApiError::RetriesExhausted {
                last_status: Some(500),
                attempts: 1
            })
        );
        assert_eq!(transport.call_count(), 1);
        assert!(clock.sleeps().is_empty());
    }

    #[test]
    fn test_execution_status() {
        assert_eq!(execution_status(&json!({"data": {"status": "running"}})), "running");
        assert_eq!(execution_status(&json!({"data": {"status": 3}})), "unknown");
        assert_eq!(execution_status(&json!({"data": {}})), "unknown");
        assert_eq!(execution_status(&json!({"status": "pass"})), "unknown");
        assert_eq!(execution_status(&json!("plain text")), "unknown");
    }
}
