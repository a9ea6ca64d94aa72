//! # Per-Message Adaptation Context
//!
//! Detection result and handler resolution for exactly one dequeued message.
//! Each message gets a fresh context; nothing here outlives the message, so
//! a stale handler can never leak across unrelated topics.

use crate::config::WorkerConfig;
use crate::error::Result;
use crate::messaging::envelope::{self, EnvelopeShape, TOPIC_ARN_KEY};
use serde_json::Value;
use std::cell::OnceCell;

/// Parsed body, detected shape, and lazily resolved handler for one message
#[derive(Debug)]
pub struct MessageContext {
    body: Value,
    shape: EnvelopeShape,
    resolved_handler: OnceCell<Option<String>>,
}

impl MessageContext {
    /// Parse a raw body and detect its shape. A body that cannot be parsed
    /// cannot be routed, so parse failures surface as malformed-body errors.
    pub fn parse(raw_body: &str) -> Result<Self> {
        let body: Value = serde_json::from_str(raw_body)?;
        let shape = envelope::detect(&body);
        Ok(Self {
            body,
            shape,
            resolved_handler: OnceCell::new(),
        })
    }

    /// Detected shape of the body
    pub fn shape(&self) -> EnvelopeShape {
        self.shape
    }

    /// The parsed body
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Topic identifier from the raw delivery, when present
    pub fn topic_arn(&self) -> Option<&str> {
        self.body.get(TOPIC_ARN_KEY).and_then(Value::as_str)
    }

    /// Resolve the configured handler for this message's topic.
    ///
    /// Computed once per context; repeated calls reuse the first lookup.
    /// Absence is a valid result; the rewrite decides whether it is fatal.
    pub fn handler_for<'a>(&'a self, config: &WorkerConfig) -> Option<&'a str> {
        self.resolved_handler
            .get_or_init(|| {
                self.topic_arn()
                    .and_then(|topic_arn| config.handler_for(topic_arn))
                    .map(str::to_string)
            })
            .as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_mapping(topic_arn: &str, handler_ref: &str) -> WorkerConfig {
        let mut config = WorkerConfig::default();
        config
            .handlers
            .insert(topic_arn.to_string(), handler_ref.to_string());
        config
    }

    #[test]
    fn test_parse_detects_shape() {
        let canonical = MessageContext::parse(r#"{"job": "h#handle", "data": 1}"#).unwrap();
        assert_eq!(canonical.shape(), EnvelopeShape::Canonical);

        let raw = MessageContext::parse(r#"{"TopicArn": "arn:x", "Message": "{}"}"#).unwrap();
        assert_eq!(raw.shape(), EnvelopeShape::RawDelivery);
        assert_eq!(raw.topic_arn(), Some("arn:x"));

        let other = MessageContext::parse(r#"{"foo": "bar"}"#).unwrap();
        assert_eq!(other.shape(), EnvelopeShape::Unrecognized);
    }

    #[test]
    fn test_parse_rejects_malformed_body() {
        assert!(MessageContext::parse("{not json").is_err());
    }

    #[test]
    fn test_handler_resolution_is_compute_once() {
        let context =
            MessageContext::parse(r#"{"TopicArn": "arn:x", "Message": "{}"}"#).unwrap();

        let config = config_with_mapping("arn:x", "app.jobs.x#handle");
        assert_eq!(context.handler_for(&config), Some("app.jobs.x#handle"));

        // A different mapping does not change the already-resolved handler.
        let other = config_with_mapping("arn:x", "app.jobs.other#handle");
        assert_eq!(context.handler_for(&other), Some("app.jobs.x#handle"));
    }

    #[test]
    fn test_unmapped_topic_resolves_to_none() {
        let context =
            MessageContext::parse(r#"{"TopicArn": "arn:unmapped", "Message": "{}"}"#).unwrap();
        let config = config_with_mapping("arn:x", "app.jobs.x#handle");
        assert_eq!(context.handler_for(&config), None);
    }
}
