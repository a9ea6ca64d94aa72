//! # Queue Transport Seam
//!
//! The external queue transport the worker consumes. Polling mechanics,
//! visibility timeouts, and storage belong to the implementation behind this
//! trait; the worker core only pops, releases, and deletes.

use crate::error::Result;
use crate::messaging::QueueMessage;
use async_trait::async_trait;

/// Operations the dispatcher requires from a queue transport
#[async_trait]
pub trait QueueTransport: Send + Sync {
    /// Dequeue the next message, if any
    async fn pop(&self, queue: &str) -> Result<Option<QueueMessage>>;

    /// Return a dequeued-but-unfinished message to the queue, visible again
    /// after `delay_seconds`
    async fn release(
        &self,
        queue: &str,
        message: &QueueMessage,
        delay_seconds: u32,
    ) -> Result<()>;

    /// Remove a message from the queue permanently
    async fn delete(&self, queue: &str, message: &QueueMessage) -> Result<()>;
}
