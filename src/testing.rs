//! # Test Support
//!
//! In-memory collaborators for exercising the dispatcher and driver without
//! a real queue transport or failed-job backend. Used by the unit and
//! integration suites; also handy for host applications writing their own
//! worker tests.

use crate::error::Result;
use crate::failed::FailedJobStore;
use crate::messaging::QueueMessage;
use crate::queue::QueueTransport;
use crate::registry::JobHandler;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use uuid::Uuid;

/// A message released back for retry, as recorded by [`InMemoryQueue`]
#[derive(Debug, Clone)]
pub struct ReleasedMessage {
    pub queue: String,
    pub message: QueueMessage,
    pub delay_seconds: u32,
}

/// A message deleted from the queue, as recorded by [`InMemoryQueue`]
#[derive(Debug, Clone)]
pub struct DeletedMessage {
    pub queue: String,
    pub message_id: String,
}

/// In-memory queue transport that records releases and deletes
#[derive(Default)]
pub struct InMemoryQueue {
    queues: Mutex<HashMap<String, VecDeque<QueueMessage>>>,
    released: Mutex<Vec<ReleasedMessage>>,
    deleted: Mutex<Vec<DeletedMessage>>,
}

impl InMemoryQueue {
    /// Create an empty transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a message for a later `pop`
    pub fn push(&self, queue: &str, message: QueueMessage) {
        self.queues
            .lock()
            .entry(queue.to_string())
            .or_default()
            .push_back(message);
    }

    /// Messages released back for retry, in release order
    pub fn released(&self) -> Vec<ReleasedMessage> {
        self.released.lock().clone()
    }

    /// Messages deleted, in deletion order
    pub fn deleted(&self) -> Vec<DeletedMessage> {
        self.deleted.lock().clone()
    }
}

#[async_trait]
impl QueueTransport for InMemoryQueue {
    async fn pop(&self, queue: &str) -> Result<Option<QueueMessage>> {
        Ok(self
            .queues
            .lock()
            .get_mut(queue)
            .and_then(VecDeque::pop_front))
    }

    async fn release(
        &self,
        queue: &str,
        message: &QueueMessage,
        delay_seconds: u32,
    ) -> Result<()> {
        self.released.lock().push(ReleasedMessage {
            queue: queue.to_string(),
            message: message.clone(),
            delay_seconds,
        });
        Ok(())
    }

    async fn delete(&self, queue: &str, message: &QueueMessage) -> Result<()> {
        self.deleted.lock().push(DeletedMessage {
            queue: queue.to_string(),
            message_id: message.message_id.clone(),
        });
        Ok(())
    }
}

/// A failed-job entry captured by [`RecordingFailedStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedJobRecord {
    pub connection: String,
    pub queue: String,
    pub raw_body: String,
}

/// Failed-job store that records every entry in memory
#[derive(Default)]
pub struct RecordingFailedStore {
    entries: Mutex<Vec<FailedJobRecord>>,
}

impl RecordingFailedStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries logged so far, in order
    pub fn entries(&self) -> Vec<FailedJobRecord> {
        self.entries.lock().clone()
    }
}

#[async_trait]
impl FailedJobStore for RecordingFailedStore {
    async fn log(&self, connection: &str, queue: &str, raw_body: &str) -> Result<()> {
        self.entries.lock().push(FailedJobRecord {
            connection: connection.to_string(),
            queue: queue.to_string(),
            raw_body: raw_body.to_string(),
        });
        Ok(())
    }
}

/// Handler that returns its payload unchanged
pub struct EchoHandler;

#[async_trait]
impl JobHandler for EchoHandler {
    async fn invoke(&self, payload: Value) -> anyhow::Result<Value> {
        Ok(payload)
    }
}

/// Handler that always fails with a fixed message
pub struct FailingHandler {
    message: String,
}

impl FailingHandler {
    /// Create a handler failing with `message`
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl JobHandler for FailingHandler {
    async fn invoke(&self, _payload: Value) -> anyhow::Result<Value> {
        Err(anyhow::anyhow!(self.message.clone()))
    }
}

/// Build a transport message with a random id and the given body
pub fn message_with_body(body: impl Into<String>) -> QueueMessage {
    QueueMessage::new(
        Uuid::new_v4().to_string(),
        Uuid::new_v4().to_string(),
        body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_queue_pop_order() {
        let queue = InMemoryQueue::new();
        queue.push("default", QueueMessage::new("m-1", "rh-1", "{}"));
        queue.push("default", QueueMessage::new("m-2", "rh-2", "{}"));

        let first = queue.pop("default").await.unwrap().unwrap();
        assert_eq!(first.message_id, "m-1");
        let second = queue.pop("default").await.unwrap().unwrap();
        assert_eq!(second.message_id, "m-2");
        assert!(queue.pop("default").await.unwrap().is_none());
    }

    #[test]
    fn test_message_with_body_generates_distinct_ids() {
        let first = message_with_body("{}");
        let second = message_with_body("{}");

        assert_eq!(first.body, "{}");
        assert_ne!(first.message_id, second.message_id);
        assert_ne!(first.receipt_handle, second.receipt_handle);
    }

    #[tokio::test]
    async fn test_recording_failed_store() {
        let store = RecordingFailedStore::new();
        store.log("sqs", "default", "{}").await.unwrap();

        let entries = store.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].connection, "sqs");
        assert_eq!(entries[0].queue, "default");
    }
}
