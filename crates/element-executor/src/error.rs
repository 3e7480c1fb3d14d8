//! Error types for remote calls and configuration

use std::time::Duration;

/// Failure of a single transport call, before any HTTP status is known.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("transport failure: {0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }
}

/// Structured failure of a remote call.
///
/// Every expected failure mode of the service (auth denial, missing record,
/// timeouts, exhausted retries, rejected trigger) is reported through this
/// type; none of them panic.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// The transport timed out on every attempt.
    #[error("request timed out after {attempts} attempt(s)")]
    Timeout { attempts: u32 },

    /// Non-timeout transport failure (connection refused, DNS, TLS). Not retried.
    #[error("transport error: {0}")]
    Transport(String),

    /// HTTP 403. Carries the service-provided `message` when there is one.
    #[error("permission denied: {}", message.as_deref().unwrap_or("unknown error"))]
    PermissionDenied { message: Option<String> },

    /// HTTP 404 on calls that report it distinctly.
    #[error("{target} not found")]
    NotFound { target: String },

    /// Every attempt ended with a non-200 status.
    #[error("{}", retries_exhausted_message(*last_status, *attempts))]
    RetriesExhausted {
        last_status: Option<u16>,
        attempts: u32,
    },

    /// HTTP 200 but the body's `code` was missing or not the success sentinel.
    #[error("trigger rejected by service (code: {})", code.as_ref().map(|c| c.to_string()).unwrap_or_else(|| "none".to_string()))]
    TriggerRejected { code: Option<serde_json::Value> },

    /// HTTP 200 but the body lacked a field the operation requires.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

fn retries_exhausted_message(last_status: Option<u16>, attempts: u32) -> String {
    match last_status {
        Some(status) => format!("request failed with status {status} after {attempts} attempt(s)"),
        None => format!("request failed after {attempts} attempt(s)"),
    }
}

impl ApiError {
    /// HTTP status code associated with this failure, when one was received.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::PermissionDenied { .. } => Some(403),
            ApiError::NotFound { .. } => Some(404),
            ApiError::RetriesExhausted { last_status, .. } => *last_status,
            ApiError::TriggerRejected { .. } | ApiError::InvalidResponse(_) => Some(200),
            ApiError::Timeout { .. } | ApiError::Transport(_) => None,
        }
    }

    /// Whether waiting and asking again could change the answer.
    pub fn is_transient(&self) -> bool {
        !matches!(self, ApiError::PermissionDenied { .. })
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing required setting: {0}")]
    MissingField(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl ConfigError {
    pub(crate) fn invalid_duration(key: &str, value: Duration) -> Self {
        ConfigError::Validation(format!("{key} must be greater than zero, got {value:?}"))
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::PermissionDenied { message: None }.status_code(), Some(403));
        assert_eq!(
            ApiError::NotFound { target: "trace 1".to_string() }.status_code(),
            Some(404)
        );
        assert_eq!(
            ApiError::RetriesExhausted { last_status: Some(502), attempts: 3 }.status_code(),
            Some(502)
        );
        assert_eq!(ApiError::Timeout { attempts: 3 }.status_code(), None);
    }

    #[test]
    fn test_display_messages() {
        let denied = ApiError::PermissionDenied { message: Some("token expired".to_string()) };
        assert_eq!(denied.to_string(), "permission denied: token expired");

        let denied = ApiError::PermissionDenied { message: None };
        assert_eq!(denied.to_string(), "permission denied: unknown error");

        let exhausted = ApiError::RetriesExhausted { last_status: Some(500), attempts: 3 };
        assert_eq!(exhausted.to_string(), "request failed with status 500 after 3 attempt(s)");

        let rejected = ApiError::TriggerRejected { code: Some(serde_json::json!(1001)) };
        assert_eq!(rejected.to_string(), "trigger rejected by service (code: 1001)");
    }

    #[test]
    fn test_transient_classification() {
        assert!(!ApiError::PermissionDenied { message: None }.is_transient());
        assert!(ApiError::Timeout { attempts: 1 }.is_transient());
        assert!(ApiError::RetriesExhausted { last_status: Some(500), attempts: 1 }.is_transient());
    }
}
