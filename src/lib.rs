#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # SNS Queue Worker
//!
//! Queue worker that lets a job-processing framework consume messages
//! published through an SNS-style topic fan-out without requiring every
//! producer to emit the framework's native job envelope.
//!
//! ## Overview
//!
//! Producers publish freeform payloads to a notification topic; a
//! subscription delivers them verbatim into a work queue. For each dequeued
//! message the worker detects whether the body already carries the canonical
//! `job`/`data` envelope. If it does, the job is dispatched directly; if the
//! body is a raw topic delivery, the worker resolves a handler from the
//! configured topic-to-handler mapping, rewrites the body into the canonical
//! envelope, and dispatches the rewritten job. Transport metadata is never
//! touched: only the logical body changes, exactly once per dequeue.
//!
//! ## Module Organization
//!
//! - [`config`] - Worker settings and the topic-to-handler mapping
//! - [`messaging`] - Transport message records, envelope detection/rewriting
//! - [`registry`] - Handler reference registry and the [`JobHandler`] trait
//! - [`queue`] - Queue transport seam
//! - [`failed`] - Failed-job store seam
//! - [`worker`] - Job instances, dispatcher state machine, polling driver
//! - [`events`] - Post-processing event bus
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sns_queue_worker::config::ConfigManager;
//! use sns_queue_worker::events::EventPublisher;
//! use sns_queue_worker::registry::HandlerRegistry;
//! use sns_queue_worker::worker::{JobDispatcher, WorkerDriver};
//!
//! # async fn example(
//! #     transport: Arc<dyn sns_queue_worker::queue::QueueTransport>,
//! #     failed_store: Arc<dyn sns_queue_worker::failed::FailedJobStore>,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let config = Arc::new(manager.config().clone());
//!
//! let registry = Arc::new(HandlerRegistry::new());
//! // registry.register("app.jobs.order_created#handle", Arc::new(MyHandler))?;
//!
//! let dispatcher = JobDispatcher::new(
//!     Arc::clone(&config),
//!     failed_store,
//!     EventPublisher::default(),
//! );
//! let driver = WorkerDriver::new(config, transport, registry, dispatcher);
//!
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! driver.run_until(shutdown_rx).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod failed;
pub mod logging;
pub mod messaging;
pub mod queue;
pub mod registry;
pub mod testing;
pub mod worker;

pub use config::{ConfigManager, WorkerConfig, WorkerSettings};
pub use error::{Result, WorkerError};
pub use events::{EventPublisher, WorkerEvent};
pub use failed::FailedJobStore;
pub use messaging::{EnvelopeShape, JobEnvelope, QueueMessage};
pub use queue::QueueTransport;
pub use registry::{HandlerRegistry, JobHandler};
pub use worker::{JobDispatcher, PollOutcome, ProcessReport, SqsJob, WorkerDriver};
