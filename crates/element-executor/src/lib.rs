//! Blocking client for the element executor service.
//!
//! Triggers element executions, polls them to completion, fetches their
//! trace detail and pulls named fields out of it.

pub mod batch;
pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod extractor;
pub mod observability;
pub mod poller;
pub mod retry_manager;
pub mod testing;
pub mod trace;
pub mod transport;
pub mod trigger;

// Re-export commonly used types
pub use batch::{BatchEntry, BatchReport};
pub use client::{ExecutorClient, ExtractionReport};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ExecutorConfig, FileFormat, PollConfig, RetryPolicy};
pub use error::{ApiError, ApiResult, ConfigError, ConfigResult, TransportError};
pub use extractor::{extract_fields, find_field, FieldResults};
pub use observability::{EventSink, ExecutorEvent, RecordingSink, TracingSink};
pub use poller::{PollOutcome, TerminalStatus};
pub use retry_manager::{ApiResponse, NotFoundPolicy, RetryManager};
pub use trace::execution_status;
pub use transport::{HttpRequest, HttpTransport, RawResponse, Transport};
pub use trigger::{ExecutionHandle, ExecutionRequest};
