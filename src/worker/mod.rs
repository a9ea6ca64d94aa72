//! # Worker
//!
//! Per-message job instances, the adaptation context, the dispatcher state
//! machine, and the polling driver that ties them together.

pub mod context;
pub mod dispatcher;
pub mod driver;
pub mod job;

pub use context::MessageContext;
pub use dispatcher::{JobDispatcher, ProcessReport};
pub use driver::{PollOutcome, WorkerDriver};
pub use job::SqsJob;
