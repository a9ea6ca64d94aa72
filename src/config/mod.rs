//! # Worker Configuration
//!
//! Configuration for the queue worker: dispatch settings plus the
//! topic-to-handler mapping that drives envelope rewriting. Configuration is
//! loaded once at process start and immutable thereafter; the mapping is
//! safe for unsynchronized concurrent reads across worker instances.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use sns_queue_worker::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let delay = manager.config().worker.retry_delay_seconds;
//! let handler = manager.config().handler_for("arn:aws:sns:us-east-1:0123:orders");
//! # Ok(())
//! # }
//! ```

pub mod loader;

use crate::error::{Result, WorkerError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use loader::ConfigManager;

/// Root worker configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WorkerConfig {
    /// Dispatch and polling settings
    #[serde(default)]
    pub worker: WorkerSettings,

    /// Topic ARN to handler reference mapping for non-standard payloads.
    ///
    /// Keys are exact topic identifiers, values name a target handler and
    /// invocation method (e.g. `"app.jobs.order_created#handle"`). A topic
    /// with no entry is a valid state until a message from that topic
    /// actually needs rewriting.
    #[serde(default)]
    pub handlers: HashMap<String, String>,
}

/// Dispatch and polling settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkerSettings {
    /// Connection name reported to the failed-job store and event bus
    #[serde(default = "default_connection")]
    pub connection: String,

    /// Queue to poll
    #[serde(default = "default_queue")]
    pub queue: String,

    /// Maximum delivery attempts before routing to the failed-job store.
    /// Zero means unlimited.
    #[serde(default)]
    pub max_tries: u32,

    /// Delay in seconds applied when releasing a failed message for retry
    #[serde(default)]
    pub retry_delay_seconds: u32,

    /// Seconds the polling driver sleeps when the queue is empty
    #[serde(default = "default_sleep_seconds")]
    pub sleep_seconds: u64,
}

fn default_connection() -> String {
    "sqs".to_string()
}

fn default_queue() -> String {
    "default".to_string()
}

fn default_sleep_seconds() -> u64 {
    3
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            connection: default_connection(),
            queue: default_queue(),
            max_tries: 0,
            retry_delay_seconds: 0,
            sleep_seconds: default_sleep_seconds(),
        }
    }
}

impl WorkerConfig {
    /// Look up the configured handler reference for a topic.
    ///
    /// Pure lookup: absence is not an error here, the rewrite path decides
    /// that a missing mapping is fatal. Blank references are treated as
    /// absent so an empty YAML value cannot satisfy a rewrite.
    pub fn handler_for(&self, topic_arn: &str) -> Option<&str> {
        self.handlers
            .get(topic_arn)
            .map(String::as_str)
            .filter(|handler_ref| !handler_ref.trim().is_empty())
    }

    /// Validate the loaded configuration
    pub fn validate(&self) -> Result<()> {
        if self.worker.connection.trim().is_empty() {
            return Err(WorkerError::configuration(
                "worker.connection",
                "connection name must not be empty",
            ));
        }

        if self.worker.queue.trim().is_empty() {
            return Err(WorkerError::configuration(
                "worker.queue",
                "queue name must not be empty",
            ));
        }

        for (topic_arn, handler_ref) in &self.handlers {
            if topic_arn.trim().is_empty() {
                return Err(WorkerError::configuration(
                    "handlers",
                    "topic identifiers must not be empty",
                ));
            }
            if handler_ref.trim().is_empty() {
                return Err(WorkerError::configuration(
                    "handlers",
                    format!("handler reference for topic {topic_arn} must not be empty"),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WorkerConfig::default();
        assert_eq!(config.worker.connection, "sqs");
        assert_eq!(config.worker.queue, "default");
        assert_eq!(config.worker.max_tries, 0);
        assert_eq!(config.worker.sleep_seconds, 3);
        assert!(config.handlers.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_handler_lookup() {
        let mut config = WorkerConfig::default();
        config.handlers.insert(
            "arn:aws:sns:us-east-1:0123:orders".to_string(),
            "app.jobs.order_created#handle".to_string(),
        );

        assert_eq!(
            config.handler_for("arn:aws:sns:us-east-1:0123:orders"),
            Some("app.jobs.order_created#handle")
        );
        assert_eq!(config.handler_for("arn:aws:sns:us-east-1:0123:other"), None);
    }

    #[test]
    fn test_blank_handler_reference_treated_as_absent() {
        let mut config = WorkerConfig::default();
        config
            .handlers
            .insert("arn:aws:sns:us-east-1:0123:orders".to_string(), "  ".to_string());

        assert_eq!(config.handler_for("arn:aws:sns:us-east-1:0123:orders"), None);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_queue() {
        let mut config = WorkerConfig::default();
        config.worker.queue = String::new();
        assert!(config.validate().is_err());
    }
}
