//! # Messaging
//!
//! Transport message records and the envelope detection/rewrite logic that
//! adapts raw notification deliveries into the canonical job envelope.

pub mod envelope;
pub mod message;

pub use envelope::{detect, rewrite, EnvelopeShape, JobEnvelope};
pub use message::{QueueMessage, RECEIVE_COUNT_ATTRIBUTE};
