//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Job failed: {0}")]
    JobFailed(String),

    #[error("Job timed out: {0}")]
    Timeout(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Source image not found: {0}")]
    SourceNotFound(String),

    #[error("Photo record not found: {0}")]
    RecordNotFound(String),

    #[error("Photo record write conflict: {0}")]
    RecordConflict(String),

    #[error("Invalid image: {0}")]
    Media(#[from] pixtier_media::MediaError),

    #[error("Storage error: {0}")]
    Storage(#[from] pixtier_storage::StorageError),

    #[error("Firestore error: {0}")]
    Firestore(#[from] pixtier_firestore::FirestoreError),

    #[error("Queue error: {0}")]
    Queue(#[from] pixtier_queue::QueueError),
}

impl WorkerError {
    pub fn job_failed(msg: impl Into<String>) -> Self {
        Self::JobFailed(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Check if error is retryable.
    ///
    /// Transient infrastructure failures and write conflicts are retryable;
    /// a missing source, a missing record, or an undecodable image will fail
    /// the same way every time and go straight to the DLQ.
    pub fn is_retryable(&self) -> bool {
        match self {
            WorkerError::Timeout(_)
            | WorkerError::RecordConflict(_)
            | WorkerError::Queue(_) => true,
            WorkerError::Storage(e) => e.is_retryable(),
            WorkerError::Firestore(e) => e.is_retryable(),
            WorkerError::JobFailed(_)
            | WorkerError::ConfigError(_)
            | WorkerError::SourceNotFound(_)
            | WorkerError::RecordNotFound(_)
            | WorkerError::Media(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixtier_media::MediaError;
    use pixtier_storage::StorageError;

    #[test]
    fn test_source_not_found_is_not_retryable() {
        assert!(!WorkerError::SourceNotFound("uploads/a.jpeg".into()).is_retryable());
    }

    #[test]
    fn test_invalid_image_is_not_retryable() {
        let err = WorkerError::from(MediaError::invalid_image("not a picture"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_upload_failure_is_retryable() {
        let err = WorkerError::from(StorageError::upload_failed("timed out"));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_record_conflict_is_retryable() {
        assert!(WorkerError::RecordConflict("rec-1".into()).is_retryable());
    }

    #[test]
    fn test_record_not_found_is_not_retryable() {
        assert!(!WorkerError::RecordNotFound("rec-1".into()).is_retryable());
    }
}
