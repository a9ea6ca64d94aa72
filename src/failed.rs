//! # Failed-Job Store Seam
//!
//! Messages that exceed their configured delivery attempts are routed here
//! instead of being invoked. Persistence belongs to the host framework.

use crate::error::Result;
use async_trait::async_trait;

/// External store for jobs that exhausted their retries
#[async_trait]
pub trait FailedJobStore: Send + Sync {
    /// Record a failed job with the connection and queue it came from and
    /// its raw body as dequeued
    async fn log(&self, connection: &str, queue: &str, raw_body: &str) -> Result<()>;
}
