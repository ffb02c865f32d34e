//! Firestore REST API client.
//!
//! This crate provides:
//! - A typed repository for photo records
//! - Precondition-guarded partial updates (optimistic concurrency)
//! - Service account authentication via gcp_auth with token caching
//! - Retry with exponential backoff and jitter

pub mod client;
pub mod error;
pub mod metrics;
pub mod record_repo;
pub mod retry;
pub mod token_cache;
pub mod types;

pub use client::{FirestoreClient, FirestoreConfig};
pub use error::{FirestoreError, FirestoreResult};
pub use record_repo::RecordRepository;
pub use types::{Document, FromFirestoreValue, ToFirestoreValue, Value};
