//! # Job Instance
//!
//! The in-memory wrapper the dispatcher invokes: one dequeued message, one
//! job, invoked at most once, then discarded. When a raw delivery is
//! rewritten, a new job is constructed over the same transport resources and
//! the original is discarded uninvoked.

use crate::error::{Result, WorkerError};
use crate::messaging::{JobEnvelope, QueueMessage};
use crate::queue::QueueTransport;
use crate::registry::HandlerRegistry;
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// A job bound to a single dequeued transport message
pub struct SqsJob {
    connection: String,
    queue: String,
    transport: Arc<dyn QueueTransport>,
    registry: Arc<HandlerRegistry>,
    message: QueueMessage,
    deleted: AtomicBool,
    released: AtomicBool,
    auto_delete: bool,
}

impl SqsJob {
    /// Construct a job over transport resources and a physical message
    pub fn new(
        connection: impl Into<String>,
        queue: impl Into<String>,
        transport: Arc<dyn QueueTransport>,
        registry: Arc<HandlerRegistry>,
        message: QueueMessage,
    ) -> Self {
        Self {
            connection: connection.into(),
            queue: queue.into(),
            transport,
            registry,
            message,
            deleted: AtomicBool::new(false),
            released: AtomicBool::new(false),
            auto_delete: true,
        }
    }

    /// Disable the post-invocation delete, leaving message lifetime to the
    /// transport's visibility timeout
    pub fn without_auto_delete(mut self) -> Self {
        self.auto_delete = false;
        self
    }

    /// Construct a replacement job carrying a rewritten body, bound to the
    /// same connection, queue, transport, and registry. Transport metadata
    /// on the message is preserved untouched.
    pub fn with_rewritten_body(&self, body: impl Into<String>) -> Self {
        Self {
            connection: self.connection.clone(),
            queue: self.queue.clone(),
            transport: Arc::clone(&self.transport),
            registry: Arc::clone(&self.registry),
            message: self.message.with_body(body),
            deleted: AtomicBool::new(self.deleted.load(Ordering::SeqCst)),
            released: AtomicBool::new(self.released.load(Ordering::SeqCst)),
            auto_delete: self.auto_delete,
        }
    }

    /// Connection name this job was dequeued from
    pub fn connection(&self) -> &str {
        &self.connection
    }

    /// Queue this job was dequeued from
    pub fn queue(&self) -> &str {
        &self.queue
    }

    /// The raw body as currently bound to this job
    pub fn raw_body(&self) -> &str {
        &self.message.body
    }

    /// The underlying transport message
    pub fn message(&self) -> &QueueMessage {
        &self.message
    }

    /// Number of times the underlying message has been dequeued
    pub fn attempts(&self) -> u32 {
        self.message.attempts()
    }

    /// Whether the message was removed from the queue
    pub fn is_deleted(&self) -> bool {
        self.deleted.load(Ordering::SeqCst)
    }

    /// Whether the message was released back for retry
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    /// Parse the body as the canonical job envelope
    pub fn envelope(&self) -> Result<JobEnvelope> {
        JobEnvelope::from_json_str(&self.message.body)
    }

    /// Execute the job: resolve the handler named by the envelope and invoke
    /// it with the payload. Runs to completion or errors before returning.
    pub async fn fire(&self) -> Result<Value> {
        let envelope = self.envelope()?;

        let handler = self
            .registry
            .resolve(&envelope.job)
            .ok_or_else(|| WorkerError::handler_not_registered(&envelope.job))?;

        debug!(
            handler_ref = %envelope.job,
            message_id = %self.message.message_id,
            "Invoking job handler"
        );

        Ok(handler.invoke(envelope.data).await?)
    }

    /// Release the message back onto the queue for retry after a delay
    pub async fn release(&self, delay_seconds: u32) -> Result<()> {
        self.transport
            .release(&self.queue, &self.message, delay_seconds)
            .await?;
        self.released.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Delete the message from the queue
    pub async fn delete(&self) -> Result<()> {
        self.transport.delete(&self.queue, &self.message).await?;
        self.deleted.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Delete the message after a successful invocation, if this job
    /// auto-deletes
    pub async fn delete_if_auto_deleting(&self) -> Result<()> {
        if self.auto_delete && !self.is_deleted() {
            self.delete().await?;
        }
        Ok(())
    }
}

impl fmt::Debug for SqsJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqsJob")
            .field("connection", &self.connection)
            .field("queue", &self.queue)
            .field("message_id", &self.message.message_id)
            .field("attempts", &self.attempts())
            .field("deleted", &self.is_deleted())
            .field("released", &self.is_released())
            .field("auto_delete", &self.auto_delete)
            .finish()
    }
}
