//! HTTP transport adapter
//!
//! The rest of the crate talks to the service through [`Transport`], so the
//! retry, trigger and polling logic can run against a scripted endpoint.

use crate::config::ExecutorConfig;
use crate::error::{ConfigError, ConfigResult, TransportError};
use reqwest::blocking::Client;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use url::Url;

/// One outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub query: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            query: Vec::new(),
            body: None,
        }
    }

    pub fn post(url: Url) -> Self {
        Self {
            method: Method::POST,
            url,
            query: Vec::new(),
            body: None,
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Status and raw body of a completed exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self::new(status, body.to_string())
    }
}

pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<RawResponse, TransportError>;
}

/// [`Transport`] backed by a blocking `reqwest` client.
///
/// The auth token and `Accept: */*` are installed as default headers; the
/// per-call timeout comes from [`ExecutorConfig::request_timeout`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn from_config(config: &ExecutorConfig) -> ConfigResult<Self> {
        let mut default_headers = HeaderMap::new();

        let token_header = HeaderName::from_bytes(config.token_header.as_bytes()).map_err(|e| {
            ConfigError::Validation(format!("Invalid token header name '{}': {}", config.token_header, e))
        })?;
        let mut token_value = HeaderValue::from_str(&config.token)
            .map_err(|_| ConfigError::Validation("Token contains invalid header characters".to_string()))?;
        token_value.set_sensitive(true);
        default_headers.insert(token_header, token_value);
        default_headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));

        let client = Client::builder()
            .default_headers(default_headers)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &HttpRequest) -> Result<RawResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone());

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;

        Ok(RawResponse { status, body })
    }
}
