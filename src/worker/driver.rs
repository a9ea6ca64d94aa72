//! # Polling Driver
//!
//! The generic dequeue loop, composed around the dispatcher rather than
//! inherited from it: pop one message, hand it to the dispatcher, sleep when
//! the queue is empty. Dispatch errors are logged and polling continues;
//! shutdown stops polling for new messages but never interrupts an in-flight
//! invocation.

use crate::config::WorkerConfig;
use crate::error::Result;
use crate::queue::QueueTransport;
use crate::registry::HandlerRegistry;
use crate::worker::dispatcher::{JobDispatcher, ProcessReport};
use crate::worker::job::SqsJob;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info};

/// Result of a single poll cycle
#[derive(Debug)]
pub enum PollOutcome {
    /// The queue was empty
    Idle,
    /// A message was dequeued and processed to a terminal outcome
    Processed(ProcessReport),
}

/// Polls the queue and delegates each message to the dispatcher
pub struct WorkerDriver {
    config: Arc<WorkerConfig>,
    transport: Arc<dyn QueueTransport>,
    registry: Arc<HandlerRegistry>,
    dispatcher: JobDispatcher,
}

impl WorkerDriver {
    /// Create a driver over a transport, registry, and dispatcher
    pub fn new(
        config: Arc<WorkerConfig>,
        transport: Arc<dyn QueueTransport>,
        registry: Arc<HandlerRegistry>,
        dispatcher: JobDispatcher,
    ) -> Self {
        Self {
            config,
            transport,
            registry,
            dispatcher,
        }
    }

    /// Pop and process at most one message.
    ///
    /// Dispatch errors propagate to the caller exactly as the dispatcher
    /// raised them; `run_until` is the place where they are absorbed.
    pub async fn run_once(&self) -> Result<PollOutcome> {
        let queue = &self.config.worker.queue;

        let Some(message) = self.transport.pop(queue).await? else {
            return Ok(PollOutcome::Idle);
        };

        debug!(
            queue = %queue,
            message_id = %message.message_id,
            attempts = message.attempts(),
            "Dequeued message"
        );

        let job = SqsJob::new(
            self.config.worker.connection.clone(),
            queue.clone(),
            Arc::clone(&self.transport),
            Arc::clone(&self.registry),
            message,
        );

        let report = self.dispatcher.process(job).await?;
        Ok(PollOutcome::Processed(report))
    }

    /// Poll until the shutdown signal flips to `true`, sleeping the
    /// configured interval whenever the queue is empty
    pub async fn run_until(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let sleep_interval = Duration::from_secs(self.config.worker.sleep_seconds);

        info!(
            queue = %self.config.worker.queue,
            connection = %self.config.worker.connection,
            "Worker polling started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            match self.run_once().await {
                Ok(PollOutcome::Processed(report)) => {
                    debug!(success = report.is_success(), "Message processed");
                }
                Ok(PollOutcome::Idle) => {
                    tokio::select! {
                        _ = tokio::time::sleep(sleep_interval) => {}
                        _ = shutdown.changed() => {}
                    }
                }
                Err(dispatch_error) => {
                    // The dispatcher already applied release/delete
                    // semantics; the daemon keeps polling.
                    error!(error = %dispatch_error, "Message processing failed");
                    tokio::select! {
                        _ = tokio::time::sleep(sleep_interval) => {}
                        _ = shutdown.changed() => {}
                    }
                }
            }
        }

        info!("Worker polling stopped");
        Ok(())
    }
}
