//! # Worker Events
//!
//! Post-processing notifications raised after successful job invocations,
//! consumed by unspecified listeners (metrics, audit, host framework hooks).

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

/// Events published by the dispatcher
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    /// A job was invoked successfully
    JobProcessed {
        connection: String,
        queue: String,
        handler_ref: String,
        message_id: String,
        processed_at: DateTime<Utc>,
    },
}

/// Broadcast-based event publisher for worker lifecycle events
#[derive(Debug, Clone)]
pub struct EventPublisher {
    sender: broadcast::Sender<WorkerEvent>,
}

impl EventPublisher {
    /// Create a new event publisher with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event. Having no subscribers is acceptable; the event is
    /// simply dropped.
    pub fn publish(&self, event: WorkerEvent) {
        let _ = self.sender.send(event);
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<WorkerEvent> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_and_receive() {
        let publisher = EventPublisher::default();
        let mut receiver = publisher.subscribe();

        publisher.publish(WorkerEvent::JobProcessed {
            connection: "sqs".to_string(),
            queue: "default".to_string(),
            handler_ref: "app.jobs.echo#handle".to_string(),
            message_id: "m-1".to_string(),
            processed_at: Utc::now(),
        });

        let WorkerEvent::JobProcessed { message_id, queue, .. } =
            receiver.recv().await.unwrap();
        assert_eq!(message_id, "m-1");
        assert_eq!(queue, "default");
    }

    #[test]
    fn test_publish_without_subscribers_is_fine() {
        let publisher = EventPublisher::new(8);
        assert_eq!(publisher.subscriber_count(), 0);
        publisher.publish(WorkerEvent::JobProcessed {
            connection: "sqs".to_string(),
            queue: "default".to_string(),
            handler_ref: "h#handle".to_string(),
            message_id: "m-2".to_string(),
            processed_at: Utc::now(),
        });
    }
}
