//! Cloudflare R2 photo storage client.
//!
//! This crate provides:
//! - Byte upload with user metadata (tier tag, source linkage)
//! - Byte download keyed by storage name
//! - Idempotent object deletion

pub mod client;
pub mod error;

pub use client::{R2Client, R2Config};
pub use error::{StorageError, StorageResult};
