//! Photo derivative worker.
//!
//! This crate provides:
//! - Job executor consuming resize jobs from the queue
//! - Derivative pipeline (download, resize, upload, record update)
//! - Retry/DLQ handling with graceful shutdown

pub mod config;
pub mod error;
pub mod executor;
pub mod pipeline;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use executor::JobExecutor;
pub use pipeline::{process_photo, ObjectStore, ProcessingContext, RecordStore};
