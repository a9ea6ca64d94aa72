#![allow(dead_code)]

//! Shared builders for the worker integration suites.

use async_trait::async_trait;
use serde_json::{json, Value};
use sns_queue_worker::events::EventPublisher;
use sns_queue_worker::registry::{HandlerRegistry, JobHandler};
use sns_queue_worker::testing::{InMemoryQueue, RecordingFailedStore};
use sns_queue_worker::worker::{JobDispatcher, SqsJob};
use sns_queue_worker::{FailedJobStore, QueueMessage, QueueTransport, WorkerConfig};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const ORDERS_TOPIC: &str = "arn:aws:sns:us-east-1:012345667910:orders";
pub const ORDERS_HANDLER: &str = "app.jobs.order_created#handle";

/// Handler that counts invocations and captures the last payload
#[derive(Default)]
pub struct CountingHandler {
    invocations: AtomicUsize,
    last_payload: parking_lot::Mutex<Option<Value>>,
    fail_with: Option<String>,
}

impl CountingHandler {
    pub fn succeeding() -> Self {
        Self::default()
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            fail_with: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    pub fn last_payload(&self) -> Option<Value> {
        self.last_payload.lock().clone()
    }
}

#[async_trait]
impl JobHandler for CountingHandler {
    async fn invoke(&self, payload: Value) -> anyhow::Result<Value> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        *self.last_payload.lock() = Some(payload);
        match &self.fail_with {
            Some(message) => Err(anyhow::anyhow!(message.clone())),
            None => Ok(json!({"handled": true})),
        }
    }
}

/// Everything a dispatcher test needs, wired together
pub struct Harness {
    pub config: Arc<WorkerConfig>,
    pub queue: Arc<InMemoryQueue>,
    pub registry: Arc<HandlerRegistry>,
    pub failed_store: Arc<RecordingFailedStore>,
    pub dispatcher: JobDispatcher,
    pub events: EventPublisher,
}

impl Harness {
    pub fn new(config: WorkerConfig) -> Self {
        let config = Arc::new(config);
        let queue = Arc::new(InMemoryQueue::new());
        let registry = Arc::new(HandlerRegistry::new());
        let failed_store = Arc::new(RecordingFailedStore::new());
        let events = EventPublisher::default();
        let dispatcher = JobDispatcher::new(
            Arc::clone(&config),
            Arc::clone(&failed_store) as Arc<dyn FailedJobStore>,
            events.clone(),
        );

        Self {
            config,
            queue,
            registry,
            failed_store,
            dispatcher,
            events,
        }
    }

    /// Config with the orders topic mapped to the orders handler
    pub fn with_orders_mapping() -> Self {
        let mut config = WorkerConfig::default();
        config
            .handlers
            .insert(ORDERS_TOPIC.to_string(), ORDERS_HANDLER.to_string());
        Self::new(config)
    }

    /// Build a job over this harness's transport and registry
    pub fn job(&self, message: QueueMessage) -> SqsJob {
        SqsJob::new(
            self.config.worker.connection.clone(),
            self.config.worker.queue.clone(),
            Arc::clone(&self.queue) as Arc<dyn QueueTransport>,
            Arc::clone(&self.registry),
            message,
        )
    }
}

/// A canonical job envelope body
pub fn canonical_body(handler_ref: &str, data: Value) -> String {
    json!({"job": handler_ref, "data": data}).to_string()
}

/// A raw notification delivery body as the fan-out produces it
pub fn raw_delivery_body(topic_arn: &str, message: &str) -> String {
    json!({
        "Type": "Notification",
        "MessageId": "sns-message-1",
        "TopicArn": topic_arn,
        "Message": message,
        "Timestamp": "2024-01-01T00:00:00.000Z",
    })
    .to_string()
}
