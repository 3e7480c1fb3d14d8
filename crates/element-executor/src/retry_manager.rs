//! Bounded retry with exponential backoff and status classification

use crate::clock::Clock;
use crate::config::RetryPolicy;
use crate::error::{ApiError, ApiResult, TransportError};
use crate::observability::{EventSink, ExecutorEvent};
use crate::transport::RawResponse;
use serde_json::Value as JsonValue;
use std::time::Duration;

/// Body of a 200 response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status_code: u16,
    /// Parsed JSON, or the raw text as `Value::String` when it is not JSON.
    /// An empty body is `Value::Null`.
    pub data: JsonValue,
}

/// How a call treats HTTP 404.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundPolicy {
    /// Same as any other non-200 status: back off and retry.
    Retry,
    /// Report [`ApiError::NotFound`] immediately.
    Report,
}

/// Classification of a received status code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClassification {
    Success,
    PermissionDenied,
    NotFound,
    Retryable,
}

/// What to do after a failed attempt
#[derive(Debug, Clone, PartialEq)]
pub enum RetryDecision {
    /// Try again after `delay` (zero for timeouts)
    Retry { delay: Duration },
    /// Give up and return this error
    Stop(ApiError),
}

/// Runs a remote call under a [`RetryPolicy`].
pub struct RetryManager<'a> {
    policy: &'a RetryPolicy,
    clock: &'a dyn Clock,
    events: &'a dyn EventSink,
}

impl<'a> RetryManager<'a> {
    pub fn new(policy: &'a RetryPolicy, clock: &'a dyn Clock, events: &'a dyn EventSink) -> Self {
        Self {
            policy,
            clock,
            events,
        }
    }

    /// Classify a status code for the given 404 handling.
    pub fn classify_status_code(status_code: u16, not_found: NotFoundPolicy) -> StatusClassification {
        match status_code {
            200 => StatusClassification::Success,
            403 => StatusClassification::PermissionDenied,
            404 if not_found == NotFoundPolicy::Report => StatusClassification::NotFound,
            _ => StatusClassification::Retryable,
        }
    }

    /// Decide what follows a retryable status on 0-indexed `attempt`.
    pub fn on_status(&self, status_code: u16, attempt: u32) -> RetryDecision {
        if self.is_final(attempt) {
            RetryDecision::Stop(ApiError::RetriesExhausted {
                last_status: Some(status_code),
                attempts: attempt + 1,
            })
        } else {
            RetryDecision::Retry {
                delay: self.policy.delay_for_attempt(attempt),
            }
        }
    }

    /// Decide what follows a transport failure on 0-indexed `attempt`.
    ///
    /// Timeouts retry without waiting; anything else stops at once.
    pub fn on_transport_error(&self, error: &TransportError, attempt: u32) -> RetryDecision {
        match error {
            TransportError::Timeout(_) if self.is_final(attempt) => {
                RetryDecision::Stop(ApiError::Timeout {
                    attempts: attempt + 1,
                })
            }
            TransportError::Timeout(_) => RetryDecision::Retry {
                delay: Duration::ZERO,
            },
            TransportError::Other(message) => RetryDecision::Stop(ApiError::Transport(message.clone())),
        }
    }

    /// Execute `call` until it succeeds, fails terminally, or attempts run out.
    ///
    /// `target` names the call in events and in [`ApiError::NotFound`].
    pub fn execute<F>(&self, target: &str, not_found: NotFoundPolicy, mut call: F) -> ApiResult<ApiResponse>
    where
        F: FnMut() -> Result<RawResponse, TransportError>,
    {
        let max_attempts = self.policy.max_attempts;

        for attempt in 0..max_attempts {
            self.events.emit(ExecutorEvent::AttemptStarted {
                target: target.to_string(),
                attempt: attempt + 1,
                max_attempts,
            });

            let decision = match call() {
                Ok(response) => {
                    self.events.emit(ExecutorEvent::ResponseReceived {
                        target: target.to_string(),
                        attempt: attempt + 1,
                        status_code: response.status,
                    });

                    match Self::classify_status_code(response.status, not_found) {
                        StatusClassification::Success => {
                            return Ok(ApiResponse {
                                status_code: response.status,
                                data: parse_body(&response.body),
                            });
                        }
                        StatusClassification::PermissionDenied => {
                            RetryDecision::Stop(ApiError::PermissionDenied {
                                message: error_message(&response.body),
                            })
                        }
                        StatusClassification::NotFound => RetryDecision::Stop(ApiError::NotFound {
                            target: target.to_string(),
                        }),
                        StatusClassification::Retryable => self.on_status(response.status, attempt),
                    }
                }
                Err(error) => {
                    if matches!(error, TransportError::Timeout(_)) {
                        self.events.emit(ExecutorEvent::AttemptTimedOut {
                            target: target.to_string(),
                            attempt: attempt + 1,
                            max_attempts,
                        });
                    }
                    self.on_transport_error(&error, attempt)
                }
            };

            match decision {
                RetryDecision::Retry { delay } => {
                    if !delay.is_zero() {
                        self.events.emit(ExecutorEvent::BackingOff {
                            target: target.to_string(),
                            attempt: attempt + 1,
                            delay,
                        });
                        self.clock.sleep(delay);
                    }
                }
                RetryDecision::Stop(error) => {
                    self.events.emit(ExecutorEvent::RequestFailed {
                        target: target.to_string(),
                        reason: error.to_string(),
                    });
                    return Err(error);
                }
            }
        }

        let error = ApiError::RetriesExhausted {
            last_status: None,
            attempts: max_attempts,
        };
        self.events.emit(ExecutorEvent::RequestFailed {
            target: target.to_string(),
            reason: error.to_string(),
        });
        Err(error)
    }

    fn is_final(&self, attempt: u32) -> bool {
        attempt + 1 >= self.policy.max_attempts
    }
}

/// JSON when it parses, otherwise the raw text.
pub fn parse_body(body: &str) -> JsonValue {
    if body.is_empty() {
        return JsonValue::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|_| JsonValue::String(body.to_string()))
}

/// The `message` field of a JSON error body, if any.
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<JsonValue>(body)
        .ok()?
        .get("message")?
        .as_str()
        .map(str::to_string)
}
