//! Structured request logging utilities.
//!
//! The extraction service receives a `RequestLogger` rather than reaching for
//! process-global logger state, so every event it emits carries the request id
//! and operation as structured fields.

use tracing::{error, info, Span};

use shotclip_models::RequestId;

/// Request logger for structured logging with consistent formatting.
#[derive(Debug, Clone)]
pub struct RequestLogger {
    request_id: RequestId,
    operation: String,
}

impl RequestLogger {
    /// Create a new logger for a specific request and operation.
    ///
    /// # Arguments
    /// * `request_id` - The id assigned by the request id middleware
    /// * `operation` - The type of operation (e.g., "extract_clip")
    pub fn new(request_id: &RequestId, operation: &str) -> Self {
        Self {
            request_id: request_id.clone(),
            operation: operation.to_string(),
        }
    }

    /// Log the start of an operation.
    pub fn log_start(&self, message: &str) {
        info!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Request started: {}", message
        );
    }

    /// Log a progress update.
    pub fn log_progress(&self, message: &str) {
        info!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Request progress: {}", message
        );
    }

    /// Log an error.
    pub fn log_error(&self, message: &str) {
        error!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Request error: {}", message
        );
    }

    /// Log the completion of an operation.
    pub fn log_completion(&self, message: &str) {
        info!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Request completed: {}", message
        );
    }

    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Create a tracing span for this request.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "request",
            request_id = %self.request_id,
            operation = %self.operation
        )
    }
}
