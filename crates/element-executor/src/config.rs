//! Client configuration
//!
//! The base URL and token have no defaults and must come from a config file
//! or the environment. Everything else falls back to the service's usual
//! settings.

use crate::error::{ConfigError, ConfigResult};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

pub const ENV_BASE_URL: &str = "ELEMENT_EXECUTOR_BASE_URL";
pub const ENV_TOKEN: &str = "ELEMENT_EXECUTOR_TOKEN";
pub const ENV_TOKEN_HEADER: &str = "ELEMENT_EXECUTOR_TOKEN_HEADER";
pub const ENV_TIMEOUT_SECS: &str = "ELEMENT_EXECUTOR_TIMEOUT_SECS";
pub const ENV_MAX_ATTEMPTS: &str = "ELEMENT_EXECUTOR_MAX_ATTEMPTS";
pub const ENV_MAX_WAIT_SECS: &str = "ELEMENT_EXECUTOR_MAX_WAIT_SECS";
pub const ENV_POLL_INTERVAL_SECS: &str = "ELEMENT_EXECUTOR_POLL_INTERVAL_SECS";
pub const ENV_BATCH_DELAY_MS: &str = "ELEMENT_EXECUTOR_BATCH_DELAY_MS";

pub const DEFAULT_TOKEN_HEADER: &str = "rubik-token";

/// Retry policy for remote calls
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the second attempt, in milliseconds
    pub base_delay_ms: u64,
    /// Growth factor applied per attempt
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Delay after the failed 0-indexed `attempt`: `base * multiplier^attempt`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay_ms = self.base_delay_ms as f64 * self.backoff_multiplier.powi(attempt as i32);
        Duration::from_millis(delay_ms as u64)
    }

    /// A single try, used for the poller's detail fetches.
    pub fn single_attempt() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }
}

/// Completion polling settings
#[derive(Debug, Clone, PartialEq)]
pub struct PollConfig {
    pub max_wait: Duration,
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_wait: Duration::from_secs(300),
            interval: Duration::from_secs(5),
        }
    }
}

#[derive(Clone, PartialEq)]
pub struct ExecutorConfig {
    pub base_url: Url,
    pub token: String,
    pub token_header: String,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
    pub poll: PollConfig,
    /// Pause between consecutive batch tasks
    pub batch_delay: Duration,
}

impl fmt::Debug for ExecutorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutorConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"<redacted>")
            .field("token_header", &self.token_header)
            .field("request_timeout", &self.request_timeout)
            .field("retry", &self.retry)
            .field("poll", &self.poll)
            .field("batch_delay", &self.batch_delay)
            .finish()
    }
}

impl ExecutorConfig {
    /// Build a config with default tuning for the given endpoint and token.
    pub fn new(base_url: &str, token: impl Into<String>) -> ConfigResult<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            token: token.into(),
            token_header: DEFAULT_TOKEN_HEADER.to_string(),
            request_timeout: Duration::from_secs(60),
            retry: RetryPolicy::default(),
            poll: PollConfig::default(),
            batch_delay: Duration::from_secs(1),
        })
    }

    /// Load configuration from environment variables only.
    pub fn from_env() -> ConfigResult<Self> {
        Self::load(None::<&Path>)
    }

    /// Load a YAML or JSON file, then apply environment overrides.
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> ConfigResult<Self> {
        let mut settings = match path {
            Some(path) => ConfigFile::from_path(path)?,
            None => ConfigFile::default(),
        };
        settings.apply_overrides(|key| std::env::var(key).ok())?;
        settings.into_config()
    }

    /// Join path segments onto the base URL, percent-encoding each segment.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.token.trim().is_empty() {
            return Err(ConfigError::MissingField("token".to_string()));
        }
        if self.token_header.trim().is_empty() {
            return Err(ConfigError::Validation("token_header must not be empty".to_string()));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::invalid_duration("request_timeout", self.request_timeout));
        }
        if self.poll.interval.is_zero() {
            return Err(ConfigError::invalid_duration("poll.interval", self.poll.interval));
        }
        if self.retry.backoff_multiplier < 0.0 || !self.retry.backoff_multiplier.is_finite() {
            return Err(ConfigError::Validation(format!(
                "retry.backoff_multiplier must be a finite non-negative number, got {}",
                self.retry.backoff_multiplier
            )));
        }
        Ok(())
    }
}

/// Supported file formats for configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Yaml,
    Json,
}

impl FileFormat {
    /// Detect file format from extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        match path.as_ref().extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => Ok(FileFormat::Yaml),
            Some("json") => Ok(FileFormat::Json),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::UnsupportedFormat("no extension".to_string())),
        }
    }

    /// Parse `content` in this format.
    pub fn parse<T: serde::de::DeserializeOwned>(self, content: &str) -> ConfigResult<T> {
        Ok(match self {
            FileFormat::Yaml => serde_yaml::from_str(content)?,
            FileFormat::Json => serde_json::from_str(content)?,
        })
    }
}

/// On-disk shape of the configuration; every field optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub token_header: Option<String>,
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub retry: Option<RetryPolicy>,
    #[serde(default)]
    pub poll: Option<PollFile>,
    pub batch_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PollFile {
    pub max_wait_secs: Option<u64>,
    pub interval_secs: Option<u64>,
}

impl ConfigFile {
    pub fn from_path<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let format = FileFormat::from_path(path)?;
        let content = fs::read_to_string(path)?;
        format.parse(&content)
    }

    /// Overlay values found through `lookup` (normally the process environment).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_BASE_URL) {
            self.base_url = Some(value);
        }
        if let Some(value) = lookup(ENV_TOKEN) {
            self.token = Some(value);
        }
        if let Some(value) = lookup(ENV_TOKEN_HEADER) {
            self.token_header = Some(value);
        }
        if let Some(value) = lookup(ENV_TIMEOUT_SECS) {
            self.request_timeout_secs = Some(parse_number(ENV_TIMEOUT_SECS, &value)?);
        }
        if let Some(value) = lookup(ENV_MAX_ATTEMPTS) {
            self.retry.get_or_insert_with(RetryPolicy::default).max_attempts =
                parse_number(ENV_MAX_ATTEMPTS, &value)?;
        }
        if let Some(value) = lookup(ENV_MAX_WAIT_SECS) {
            self.poll.get_or_insert_with(PollFile::default).max_wait_secs =
                Some(parse_number(ENV_MAX_WAIT_SECS, &value)?);
        }
        if let Some(value) = lookup(ENV_POLL_INTERVAL_SECS) {
            self.poll.get_or_insert_with(PollFile::default).interval_secs =
                Some(parse_number(ENV_POLL_INTERVAL_SECS, &value)?);
        }
        if let Some(value) = lookup(ENV_BATCH_DELAY_MS) {
            self.batch_delay_ms = Some(parse_number(ENV_BATCH_DELAY_MS, &value)?);
        }
        Ok(())
    }

    /// Resolve into a validated [`ExecutorConfig`].
    pub fn into_config(self) -> ConfigResult<ExecutorConfig> {
        let base_url = self
            .base_url
            .ok_or_else(|| ConfigError::MissingField(format!("base_url (or {ENV_BASE_URL})")))?;
        let token = self
            .token
            .ok_or_else(|| ConfigError::MissingField(format!("token (or {ENV_TOKEN})")))?;

        let mut config = ExecutorConfig::new(&base_url, token)?;
        if let Some(header) = self.token_header {
            config.token_header = header;
        }
        if let Some(secs) = self.request_timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(retry) = self.retry {
            config.retry = retry;
        }
        if let Some(poll) = self.poll {
            if let Some(secs) = poll.max_wait_secs {
                config.poll.max_wait = Duration::from_secs(secs);
            }
            if let Some(secs) = poll.interval_secs {
                config.poll.interval = Duration::from_secs(secs);
            }
        }
        if let Some(ms) = self.batch_delay_ms {
            config.batch_delay = Duration::from_millis(ms);
        }

        config.validate()?;
        Ok(config)
    }
}

fn parse_base_url(raw: &str) -> ConfigResult<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::Validation(format!("Invalid base URL '{}': {}", raw, e)))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "Base URL must use http or https, got '{}://'",
            url.scheme()
        )));
    }
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(ConfigError::Validation(format!("Base URL '{}' has no host", raw)));
    }
    Ok(url)
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> ConfigResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Validation(format!("{key} must be a non-negative integer, got '{value}'")))
}
