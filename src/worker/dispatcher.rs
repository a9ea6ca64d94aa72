//! # Job Dispatcher
//!
//! Orchestrates one dequeued message from receipt through invocation to
//! outcome: attempt-count check, envelope detection, conditional handler
//! resolution and rewrite, invocation, and release-vs-fail semantics.
//!
//! Each attempt produces a single outcome tag and the decision to release,
//! delete, or re-raise happens at one site, instead of layered catch
//! clauses. Release on any failure (unless the message was already deleted)
//! is a deliberately broad safety net: the queue's own retry accounting
//! eventually routes persistent failures to the failed-job store.

use crate::config::WorkerConfig;
use crate::error::{Result, WorkerError};
use crate::events::{EventPublisher, WorkerEvent};
use crate::failed::FailedJobStore;
use crate::messaging::EnvelopeShape;
use crate::worker::context::MessageContext;
use crate::worker::job::SqsJob;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Terminal result of processing one message
#[derive(Debug)]
pub enum ProcessReport {
    /// The job was invoked successfully; carries the (possibly rewritten)
    /// job instance and the handler's output
    Succeeded { job: SqsJob, output: Value },
    /// The message exceeded its delivery attempts and was routed to the
    /// failed-job store
    Failed { message_id: String },
}

impl ProcessReport {
    /// Whether the job was invoked successfully
    pub fn is_success(&self) -> bool {
        matches!(self, ProcessReport::Succeeded { .. })
    }

    /// Whether the message was routed to the failed-job store
    pub fn is_failed(&self) -> bool {
        matches!(self, ProcessReport::Failed { .. })
    }
}

/// Outcome tag of a single dispatch attempt, inspected once to decide
/// release/delete/re-raise
enum DispatchOutcome {
    Success { job: SqsJob, output: Value },
    RoutedToFailedStore { message_id: String },
    RetryableFailure { job: SqsJob, error: WorkerError },
    FatalFailure { error: WorkerError },
}

/// Processes dequeued jobs against the configured handler mapping
pub struct JobDispatcher {
    config: Arc<WorkerConfig>,
    failed_store: Arc<dyn FailedJobStore>,
    events: EventPublisher,
}

impl JobDispatcher {
    /// Create a dispatcher
    pub fn new(
        config: Arc<WorkerConfig>,
        failed_store: Arc<dyn FailedJobStore>,
        events: EventPublisher,
    ) -> Self {
        Self {
            config,
            failed_store,
            events,
        }
    }

    /// The event publisher success notifications are raised on
    pub fn events(&self) -> &EventPublisher {
        &self.events
    }

    /// Process one dequeued job to a terminal outcome.
    ///
    /// Returns `Ok` for a successful invocation or a max-tries routing;
    /// every error propagates to the caller after the release/delete
    /// decision has been applied.
    pub async fn process(&self, job: SqsJob) -> Result<ProcessReport> {
        match self.attempt(job).await? {
            DispatchOutcome::Success { job, output } => {
                self.raise_after_job_event(&job);
                Ok(ProcessReport::Succeeded { job, output })
            }
            DispatchOutcome::RoutedToFailedStore { message_id } => {
                Ok(ProcessReport::Failed { message_id })
            }
            DispatchOutcome::RetryableFailure { job, error } => {
                let delay = self.config.worker.retry_delay_seconds;
                warn!(
                    message_id = %job.message().message_id,
                    delay_seconds = delay,
                    error = %error,
                    "Job failed, releasing message for retry"
                );
                if let Err(release_error) = job.release(delay).await {
                    warn!(
                        message_id = %job.message().message_id,
                        error = %release_error,
                        "Failed to release message; leaving it to the visibility timeout"
                    );
                }
                Err(error)
            }
            DispatchOutcome::FatalFailure { error } => Err(error),
        }
    }

    /// Run one dispatch attempt, producing an outcome tag. Transport
    /// failures during max-tries routing propagate as errors in their own
    /// right rather than as outcomes.
    async fn attempt(&self, job: SqsJob) -> Result<DispatchOutcome> {
        let max_tries = self.config.worker.max_tries;
        if max_tries > 0 && job.attempts() > max_tries {
            return self.route_to_failed_store(job).await;
        }

        // Adaptation failures (malformed body, missing mapping) happen
        // before any invocation and must leave the message untouched: not
        // deleted, not released, redelivered by the transport.
        let job = match self.adapt(job) {
            Ok(job) => job,
            Err(error) => return Ok(DispatchOutcome::FatalFailure { error }),
        };

        match job.fire().await {
            Ok(output) => {
                if let Err(error) = job.delete_if_auto_deleting().await {
                    return Ok(self.failure_outcome(job, error));
                }
                Ok(DispatchOutcome::Success { job, output })
            }
            Err(error) => Ok(self.failure_outcome(job, error)),
        }
    }

    /// Detect the body shape and rewrite raw deliveries into the canonical
    /// envelope. Canonical bodies pass through as the original job instance;
    /// rewriting constructs a replacement job over the same transport
    /// resources.
    fn adapt(&self, job: SqsJob) -> Result<SqsJob> {
        let context = MessageContext::parse(job.raw_body())?;

        match context.shape() {
            EnvelopeShape::Canonical => Ok(job),
            EnvelopeShape::RawDelivery => {
                let handler_ref = context.handler_for(&self.config);
                let rewritten =
                    crate::messaging::envelope::rewrite(context.body(), handler_ref)?;
                let body = serde_json::to_string(&rewritten)?;

                debug!(
                    message_id = %job.message().message_id,
                    topic_arn = context.topic_arn().unwrap_or("<unknown>"),
                    handler_ref = handler_ref.unwrap_or(""),
                    "Rewrote raw delivery into job envelope"
                );

                Ok(job.with_rewritten_body(body))
            }
            EnvelopeShape::Unrecognized => Err(WorkerError::unrecognized_body(format!(
                "body carries neither a job envelope nor a topic delivery (message {})",
                job.message().message_id
            ))),
        }
    }

    /// Route a message that exhausted its attempts to the failed-job store,
    /// then delete it. The job is never invoked.
    async fn route_to_failed_store(&self, job: SqsJob) -> Result<DispatchOutcome> {
        let message_id = job.message().message_id.clone();

        info!(
            message_id = %message_id,
            attempts = job.attempts(),
            max_tries = self.config.worker.max_tries,
            "Message exceeded max tries, routing to failed-job store"
        );

        self.failed_store
            .log(job.connection(), job.queue(), job.raw_body())
            .await?;
        job.delete().await?;

        Ok(DispatchOutcome::RoutedToFailedStore { message_id })
    }

    /// Classify an invocation failure: release-eligible unless the handler
    /// already removed the message from the queue.
    fn failure_outcome(&self, job: SqsJob, error: WorkerError) -> DispatchOutcome {
        if job.is_deleted() {
            DispatchOutcome::FatalFailure { error }
        } else {
            DispatchOutcome::RetryableFailure { job, error }
        }
    }

    /// Fire the post-processing notification for a successful invocation
    fn raise_after_job_event(&self, job: &SqsJob) {
        let handler_ref = job
            .envelope()
            .map(|envelope| envelope.job)
            .unwrap_or_default();

        self.events.publish(WorkerEvent::JobProcessed {
            connection: job.connection().to_string(),
            queue: job.queue().to_string(),
            handler_ref,
            message_id: job.message().message_id.clone(),
            processed_at: chrono::Utc::now(),
        });
    }
}
