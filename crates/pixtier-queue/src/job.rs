//! Job types for the queue.

use serde::{Deserialize, Serialize};

use pixtier_models::{JobId, RecordId};

/// Job to produce the three derivatives for an uploaded photo.
///
/// The wire format uses PascalCase keys (`Id`, `PictureUri`) because upload
/// producers outside this codebase already emit it that way. `job_id` is
/// assigned on enqueue and defaulted on decode so older producers that omit
/// it still parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResizePhotoJob {
    /// Photo record to update once derivatives are stored
    #[serde(rename = "Id")]
    pub record_id: RecordId,

    /// Storage key of the uploaded original
    #[serde(rename = "PictureUri")]
    pub picture_uri: String,

    /// Unique job ID for tracing
    #[serde(default)]
    pub job_id: JobId,
}

impl ResizePhotoJob {
    pub fn new(record_id: RecordId, picture_uri: impl Into<String>) -> Self {
        Self {
            record_id,
            picture_uri: picture_uri.into(),
            job_id: JobId::new(),
        }
    }

    /// Generate idempotency key for deduplication.
    ///
    /// Two enqueues for the same record and source collapse into one; a
    /// re-upload with a fresh picture URI gets a fresh key.
    pub fn idempotency_key(&self) -> String {
        format!("resize:{}:{}", self.record_id, self.picture_uri)
    }
}
