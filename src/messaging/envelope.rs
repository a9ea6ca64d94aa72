//! # Envelope Detection and Rewriting
//!
//! A dequeued body is either already in the canonical job envelope
//! (`job` + `data`), a raw notification delivery from the pub/sub fan-out
//! (`TopicArn` + `Message`), or unrecognized. Detection is a pure check and
//! gates the entire rewrite path; rewriting replaces `Message` with a
//! `job`/`data` pair while leaving every other key untouched.

use crate::error::{Result, WorkerError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body key naming the handler to invoke
pub const JOB_KEY: &str = "job";
/// Body key carrying the handler payload
pub const DATA_KEY: &str = "data";
/// Raw delivery key identifying the originating topic
pub const TOPIC_ARN_KEY: &str = "TopicArn";
/// Raw delivery key carrying the published payload
pub const MESSAGE_KEY: &str = "Message";

/// The canonical body shape the job framework expects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobEnvelope {
    /// Handler reference: a string naming a target handler and method
    pub job: String,
    /// Payload passed through to the handler unmodified
    pub data: Value,
}

impl JobEnvelope {
    /// Create a new envelope
    pub fn new(job: impl Into<String>, data: Value) -> Self {
        Self {
            job: job.into(),
            data,
        }
    }

    /// Serialize for queue storage
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse from a raw body string
    pub fn from_json_str(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }
}

/// Detected shape of a dequeued message body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeShape {
    /// Body already carries a `job` key; never rewritten
    Canonical,
    /// Raw notification delivery; needs a handler mapping and a rewrite
    RawDelivery,
    /// Neither shape; cannot be routed
    Unrecognized,
}

/// Inspect a parsed body and determine whether it can be dispatched directly
/// or needs transformation. No side effects.
pub fn detect(body: &Value) -> EnvelopeShape {
    match body {
        Value::Object(map) if map.contains_key(JOB_KEY) => EnvelopeShape::Canonical,
        Value::Object(map) if map.contains_key(TOPIC_ARN_KEY) => EnvelopeShape::RawDelivery,
        _ => EnvelopeShape::Unrecognized,
    }
}

/// Rewrite a raw notification delivery into the canonical envelope.
///
/// Sets `job` to the resolved handler reference, moves the `Message` payload
/// under `data`, and preserves every other key. Fails before any mutation
/// when no handler is configured for the topic.
pub fn rewrite(body: &Value, handler_ref: Option<&str>) -> Result<Value> {
    let map = body.as_object().ok_or_else(|| {
        WorkerError::unrecognized_body("raw delivery body is not a JSON object")
    })?;

    let handler_ref = match handler_ref {
        Some(handler_ref) if !handler_ref.trim().is_empty() => handler_ref,
        _ => {
            let topic_arn = map
                .get(TOPIC_ARN_KEY)
                .and_then(Value::as_str)
                .unwrap_or("<unknown>");
            return Err(WorkerError::missing_handler_mapping(topic_arn));
        }
    };

    let mut rewritten = map.clone();
    let payload = rewritten.remove(MESSAGE_KEY).unwrap_or(Value::Null);
    rewritten.insert(JOB_KEY.to_string(), Value::String(handler_ref.to_string()));
    rewritten.insert(DATA_KEY.to_string(), payload);

    Ok(Value::Object(rewritten))
}
