//! # Worker Error Types
//!
//! Structured error handling for the queue worker using thiserror.
//! Invocation failures stay transparent so callers see the handler's
//! original error, not a wrapped one.

use thiserror::Error;

/// Errors surfaced while adapting and dispatching queue messages
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error(
        "No custom handler configured for topic: {topic_arn}. This message is missing the \
         standard job envelope; to process non-standard queue payloads, add a topic-to-handler \
         entry under `handlers` in the worker configuration."
    )]
    MissingHandlerMapping { topic_arn: String },

    #[error("Malformed message body: {message}")]
    MalformedBody { message: String },

    #[error("Unrecognized message body: {message}")]
    UnrecognizedBody { message: String },

    #[error("No handler registered for reference: {handler_ref}")]
    HandlerNotRegistered { handler_ref: String },

    #[error(transparent)]
    Invocation(#[from] anyhow::Error),

    #[error("Queue operation failed: {queue_name}: {operation}: {message}")]
    QueueOperation {
        queue_name: String,
        operation: String,
        message: String,
    },

    #[error("Configuration error: {component}: {message}")]
    Configuration { component: String, message: String },
}

impl WorkerError {
    /// Create a missing handler mapping error for a topic
    pub fn missing_handler_mapping(topic_arn: impl Into<String>) -> Self {
        Self::MissingHandlerMapping {
            topic_arn: topic_arn.into(),
        }
    }

    /// Create a malformed body error
    pub fn malformed_body(message: impl Into<String>) -> Self {
        Self::MalformedBody {
            message: message.into(),
        }
    }

    /// Create an unrecognized body error
    pub fn unrecognized_body(message: impl Into<String>) -> Self {
        Self::UnrecognizedBody {
            message: message.into(),
        }
    }

    /// Create a handler not registered error
    pub fn handler_not_registered(handler_ref: impl Into<String>) -> Self {
        Self::HandlerNotRegistered {
            handler_ref: handler_ref.into(),
        }
    }

    /// Create a queue operation error
    pub fn queue_operation(
        queue_name: impl Into<String>,
        operation: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::QueueOperation {
            queue_name: queue_name.into(),
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Whether this error indicates an operator-fixable configuration problem
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingHandlerMapping { .. } | Self::Configuration { .. }
        )
    }
}

/// Conversion from serde_json::Error to WorkerError
///
/// A body that cannot be parsed cannot be detected, resolved, or rewritten,
/// so every JSON failure on the dispatch path is a malformed body.
impl From<serde_json::Error> for WorkerError {
    fn from(err: serde_json::Error) -> Self {
        WorkerError::malformed_body(err.to_string())
    }
}

/// Result type alias for worker operations
pub type Result<T> = std::result::Result<T, WorkerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let missing = WorkerError::missing_handler_mapping("arn:aws:sns:us-east-1:0123:orders");
        assert!(matches!(missing, WorkerError::MissingHandlerMapping { .. }));
        assert!(missing.is_configuration());

        let queue_err = WorkerError::queue_operation("default", "release", "timed out");
        assert!(matches!(queue_err, WorkerError::QueueOperation { .. }));
        assert!(!queue_err.is_configuration());
    }

    #[test]
    fn test_missing_mapping_message_names_topic_and_remedy() {
        let err = WorkerError::missing_handler_mapping("arn:aws:sns:us-east-1:0123:orders");
        let display = format!("{err}");
        assert!(display.contains("arn:aws:sns:us-east-1:0123:orders"));
        assert!(display.contains("topic-to-handler"));
        assert!(display.contains("handlers"));
    }

    #[test]
    fn test_invocation_error_stays_transparent() {
        let original = anyhow::anyhow!("payment gateway returned 503");
        let err: WorkerError = original.into();
        assert_eq!(format!("{err}"), "payment gateway returned 503");
    }

    #[test]
    fn test_serde_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: WorkerError = json_err.into();
        assert!(matches!(err, WorkerError::MalformedBody { .. }));
    }
}
