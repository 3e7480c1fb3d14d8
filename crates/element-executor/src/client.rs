//! Consolidated client for the element executor service

use crate::clock::{Clock, SystemClock};
use crate::config::{ExecutorConfig, RetryPolicy};
use crate::error::{ApiResult, ConfigResult};
use crate::extractor::{extract_fields, FieldResults};
use crate::observability::{EventSink, ExecutorEvent, TracingSink};
use crate::poller::PollOutcome;
use crate::retry_manager::{ApiResponse, NotFoundPolicy, RetryManager};
use crate::transport::{HttpRequest, HttpTransport, Transport};
use crate::trigger::ExecutionRequest;
use std::sync::Arc;
use tracing::instrument;

/// Client for triggering element executions and reading their traces.
///
/// Every operation blocks the calling thread. Retries, polling and batch
/// pacing wait through the configured [`Clock`]; progress is reported to the
/// configured [`EventSink`].
///
/// ```no_run
/// use element_executor::{ExecutionRequest, ExecutorClient, ExecutorConfig};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ExecutorConfig::from_env()?;
/// let client = ExecutorClient::new(config)?;
///
/// let request = ExecutionRequest::new("2055498", "env-3474", "zhangsan");
/// let report = client.extract_fields_from_execution(&request, &["channelUserId"])?;
/// println!("{:?}", report.fields);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ExecutorClient {
    pub(crate) config: ExecutorConfig,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) events: Arc<dyn EventSink>,
}

impl std::fmt::Debug for ExecutorClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutorClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ExecutorClient {
    /// Create a client that talks HTTP to `config.base_url`.
    pub fn new(config: ExecutorConfig) -> ConfigResult<Self> {
        config.validate()?;
        let transport = HttpTransport::from_config(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client over any [`Transport`].
    pub fn with_transport(config: ExecutorConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            clock: Arc::new(SystemClock),
            events: Arc::new(TracingSink),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Send `request` under `policy`.
    pub(crate) fn send(
        &self,
        target: &str,
        request: &HttpRequest,
        policy: &RetryPolicy,
        not_found: NotFoundPolicy,
    ) -> ApiResult<ApiResponse> {
        RetryManager::new(policy, self.clock.as_ref(), self.events.as_ref())
            .execute(target, not_found, || self.transport.send(request))
    }

    /// Trigger an element, wait for it to finish, then extract `field_names` from
    /// its trace.
    ///
    /// A poll timeout does not stop the extraction; the detail is fetched
    /// anyway and the timeout is reported in [`ExtractionReport::completion`].
    #[instrument(level = "info", skip(self, request, field_names), fields(element_id = %request.element_id))]
    pub fn extract_fields_from_execution<S: AsRef<str>>(
        &self,
        request: &ExecutionRequest,
        field_names: &[S],
    ) -> ApiResult<ExtractionReport> {
        let handle = self.trigger(request)?;
        let completion = self.wait_for_completion(&handle.execution_id, &self.config.poll)?;
        let detail = self.get_trace(&handle.execution_id)?;

        let fields = extract_fields(&detail.data, field_names);
        let found = fields.values().filter(|value| value.is_some()).count();
        self.events.emit(ExecutorEvent::FieldsExtracted {
            found,
            requested: fields.len(),
        });

        Ok(ExtractionReport {
            execution_id: handle.execution_id,
            completion,
            fields,
        })
    }
}

/// Result of [`ExecutorClient::extract_fields_from_execution`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionReport {
    pub execution_id: String,
    pub completion: PollOutcome,
    pub fields: FieldResults,
}

impl ExtractionReport {
    /// Number of requested fields that were found.
    pub fn found_count(&self) -> usize {
        self.fields.values().filter(|value| value.is_some()).count()
    }
}
