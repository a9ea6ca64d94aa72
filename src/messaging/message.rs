//! # Transport Message Record
//!
//! The physical message as dequeued from the queue transport. Transport
//! metadata (message id, receipt handle, attributes) is owned by the
//! transport; envelope rewriting only ever replaces the body.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Attribute carrying the delivery attempt counter, SQS-style
pub const RECEIVE_COUNT_ATTRIBUTE: &str = "ApproximateReceiveCount";

/// A dequeued transport message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueMessage {
    /// Transport-assigned message identifier
    pub message_id: String,
    /// Receipt handle for release/delete operations on this delivery
    pub receipt_handle: String,
    /// Logical message body, as delivered
    pub body: String,
    /// Transport attributes, carried opaquely
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl QueueMessage {
    /// Create a message with the given identifiers and body
    pub fn new(
        message_id: impl Into<String>,
        receipt_handle: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            message_id: message_id.into(),
            receipt_handle: receipt_handle.into(),
            body: body.into(),
            attributes: HashMap::new(),
        }
    }

    /// Attach a transport attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Number of times this message has been dequeued without being deleted.
    /// The transport counts the current delivery, so a first delivery is 1.
    pub fn attempts(&self) -> u32 {
        self.attributes
            .get(RECEIVE_COUNT_ATTRIBUTE)
            .and_then(|count| count.parse().ok())
            .unwrap_or(1)
    }

    /// Produce a copy carrying a rewritten body. All transport metadata is
    /// preserved bit-identical; only the logical body changes.
    pub fn with_body(&self, body: impl Into<String>) -> Self {
        Self {
            message_id: self.message_id.clone(),
            receipt_handle: self.receipt_handle.clone(),
            body: body.into(),
            attributes: self.attributes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempts_from_receive_count() {
        let message = QueueMessage::new("m-1", "rh-1", "{}")
            .with_attribute(RECEIVE_COUNT_ATTRIBUTE, "4");
        assert_eq!(message.attempts(), 4);
    }

    #[test]
    fn test_attempts_defaults_to_first_delivery() {
        let message = QueueMessage::new("m-1", "rh-1", "{}");
        assert_eq!(message.attempts(), 1);

        let garbage = QueueMessage::new("m-1", "rh-1", "{}")
            .with_attribute(RECEIVE_COUNT_ATTRIBUTE, "not-a-number");
        assert_eq!(garbage.attempts(), 1);
    }

    #[test]
    fn test_with_body_preserves_transport_metadata() {
        let original = QueueMessage::new("m-1", "rh-1", r#"{"a":1}"#)
            .with_attribute(RECEIVE_COUNT_ATTRIBUTE, "2")
            .with_attribute("SentTimestamp", "1700000000");

        let rewritten = original.with_body(r#"{"b":2}"#);

        assert_eq!(rewritten.message_id, original.message_id);
        assert_eq!(rewritten.receipt_handle, original.receipt_handle);
        assert_eq!(rewritten.attributes, original.attributes);
        assert_eq!(rewritten.body, r#"{"b":2}"#);
    }
}
