//! Redis Streams job queue.
//!
//! This crate provides:
//! - Job enqueueing via Redis Streams with idempotency keys
//! - Worker consumption via consumer groups with retry/DLQ
//! - Stale job recovery for crashed workers

pub mod error;
pub mod job;
pub mod queue;

pub use error::{QueueError, QueueResult};
pub use job::ResizePhotoJob;
pub use queue::{JobQueue, QueueConfig};
