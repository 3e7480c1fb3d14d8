//! Execution trigger

use crate::client::ExecutorClient;
use crate::error::{ApiError, ApiResult};
use crate::extractor::value_to_text;
use crate::observability::ExecutorEvent;
use crate::retry_manager::NotFoundPolicy;
use crate::transport::HttpRequest;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::instrument;

/// Parameters of one element execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub element_id: String,
    pub env: String,
    pub operator_account: String,
}

impl ExecutionRequest {
    pub fn new(
        element_id: impl Into<String>,
        env: impl Into<String>,
        operator_account: impl Into<String>,
    ) -> Self {
        Self {
            element_id: element_id.into(),
            env: env.into(),
            operator_account: operator_account.into(),
        }
    }
}

/// Identifier of a triggered execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionHandle {
    pub execution_id: String,
}

/// `code` value the service uses for success.
const SUCCESS_CODE: f64 = 0.0;

impl ExecutorClient {
    /// Ask the service to execute an element.
    ///
    /// Inputs are passed through untouched; the service rejects bad values.
    #[instrument(level = "info", skip(self, request), fields(element_id = %request.element_id, env = %request.env))]
    pub fn trigger(&self, request: &ExecutionRequest) -> ApiResult<ExecutionHandle> {
        let url = self
            .config
            .endpoint(&["external", "execution", "element_executor"]);
        let http_request = HttpRequest::post(url)
            .with_query("element_id", request.element_id.as_str())
            .with_query("env", request.env.as_str())
            .with_query("operator_account", request.operator_account.as_str())
            .with_body("");

        let target = format!("element {}", request.element_id);
        let outcome = self
            .send(&target, &http_request, &self.config.retry, NotFoundPolicy::Retry)
            .and_then(|response| parse_trigger_response(&response.data));

        match &outcome {
            Ok(handle) => self.events.emit(ExecutorEvent::ExecutionTriggered {
                element_id: request.element_id.clone(),
                execution_id: handle.execution_id.clone(),
            }),
            Err(error) => self.events.emit(ExecutorEvent::TriggerFailed {
                element_id: request.element_id.clone(),
                reason: error.to_string(),
            }),
        }

        outcome
    }
}

/// Turn a 200 body into a handle: `code` must be numeric 0 and `data` present.
pub fn parse_trigger_response(body: &JsonValue) -> ApiResult<ExecutionHandle> {
    let code = body.get("code");
    if code.and_then(JsonValue::as_f64) != Some(SUCCESS_CODE) {
        return Err(ApiError::TriggerRejected {
            code: code.cloned(),
        });
    }

    match body.get("data") {
        None | Some(JsonValue::Null) => Err(ApiError::InvalidResponse(
            "trigger response has no execution id in 'data'".to_string(),
        )),
        Some(data) => Ok(ExecutionHandle {
            execution_id: value_to_text(data),
        }),
    }
}
