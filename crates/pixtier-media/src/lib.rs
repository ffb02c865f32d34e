//! Photo resizing for the Pixtier pipeline.
//!
//! This crate provides:
//! - Aspect-ratio-preserving target dimension math (never upscales)
//! - Decode → resize → JPEG re-encode as one pure operation

pub mod error;
pub mod resize;

pub use error::{MediaError, MediaResult};
pub use resize::{compute_target_dimensions, resize_to_bound, EncodedDerivative, JPEG_QUALITY};
