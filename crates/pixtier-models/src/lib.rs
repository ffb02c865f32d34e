//! Shared data models for the Pixtier backend.
//!
//! This crate provides Serde-serializable types for:
//! - Work items and job identifiers
//! - Derivative tiers and their size bounds
//! - Photo records stored in Firestore
//! - Derivative references produced by the pipeline

pub mod derivative;
pub mod job;
pub mod record;
pub mod tier;

// Re-export common types
pub use derivative::{DerivativeRef, DerivativeSet};
pub use job::JobId;
pub use record::{PhotoRecord, RecordId};
pub use tier::{Tier, TierBounds, TierSpec};
