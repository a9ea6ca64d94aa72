//! # Handler Registry
//!
//! Maps handler reference strings to concrete handler implementations.
//! References are the same strings the topic mapping declares
//! (e.g. `"app.jobs.order_created#handle"`), resolved once at startup and
//! read-only while the worker is processing.

use crate::error::{Result, WorkerError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

/// An invocable job handler
#[async_trait]
pub trait JobHandler: Send + Sync {
    /// Run the handler against the envelope payload.
    ///
    /// Errors are propagated to the dispatcher unchanged and decide
    /// release-for-retry semantics there.
    async fn invoke(&self, payload: Value) -> anyhow::Result<Value>;
}

/// Registry of handler references to handler implementations
pub struct HandlerRegistry {
    handlers: RwLock<HashMap<String, Arc<dyn JobHandler>>>,
}

impl HandlerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Register a handler under a reference string
    pub fn register(
        &self,
        handler_ref: impl Into<String>,
        handler: Arc<dyn JobHandler>,
    ) -> Result<()> {
        let handler_ref = handler_ref.into();

        if handler_ref.trim().is_empty() {
            return Err(WorkerError::configuration(
                "registry",
                "handler reference must not be empty",
            ));
        }

        let mut handlers = self
            .handlers
            .write()
            .map_err(|e| WorkerError::configuration("registry", e.to_string()))?;

        if handlers.contains_key(&handler_ref) {
            warn!(handler_ref = %handler_ref, "Handler already registered, replacing");
        }

        handlers.insert(handler_ref.clone(), handler);
        info!(handler_ref = %handler_ref, "Job handler registered");
        Ok(())
    }

    /// Resolve a handler by reference
    pub fn resolve(&self, handler_ref: &str) -> Option<Arc<dyn JobHandler>> {
        self.handlers.read().ok()?.get(handler_ref).cloned()
    }

    /// Registered handler references, for startup validation and diagnostics
    pub fn handler_refs(&self) -> Vec<String> {
        self.handlers
            .read()
            .map(|handlers| handlers.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of registered handlers
    pub fn len(&self) -> usize {
        self.handlers.read().map(|handlers| handlers.len()).unwrap_or(0)
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
