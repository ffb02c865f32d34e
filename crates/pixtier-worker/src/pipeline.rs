//! Photo derivative pipeline.
//!
//! For each job: download the original, produce the three tier derivatives
//! concurrently, patch the record's URL fields in one atomic write, then
//! delete the original (best effort). The record is only touched once all
//! three derivatives are safely stored, so a crash mid-pipeline leaves at
//! worst orphaned derivative objects, never a record pointing at nothing.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use metrics::counter;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use pixtier_firestore::{FirestoreClient, FirestoreError, FirestoreResult, RecordRepository};
use pixtier_media::resize_to_bound;
use pixtier_models::{DerivativeRef, DerivativeSet, RecordId, TierSpec};
use pixtier_queue::ResizePhotoJob;
use pixtier_storage::{R2Client, StorageError, StorageResult};

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};

/// Content type of every stored derivative.
const DERIVATIVE_CONTENT_TYPE: &str = "image/jpeg";

/// Metadata key carrying the tier tag.
const METADATA_TYPE: &str = "Type";

/// Metadata key linking a derivative back to its source object.
const METADATA_ORIGINAL: &str = "Original";

// =============================================================================
// Seams
// =============================================================================

/// Object storage operations the pipeline needs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn download(&self, key: &str) -> StorageResult<Vec<u8>>;
    async fn upload(
        &self,
        data: Vec<u8>,
        key: &str,
        content_type: &str,
        metadata: &HashMap<String, String>,
    ) -> StorageResult<()>;
    async fn delete(&self, key: &str) -> StorageResult<()>;
}

#[async_trait]
impl ObjectStore for R2Client {
    async fn download(&self, key: &str) -> StorageResult<Vec<u8>> {
        self.download_bytes(key).await
    }

    async fn upload(
        &self,
        data: Vec<u8>,
        key: &str,
        content_type: &str,
        metadata: &HashMap<String, String>,
    ) -> StorageResult<()> {
        self.upload_bytes(data, key, content_type, metadata).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.delete_object(key).await
    }
}

/// Record store operations the pipeline needs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn set_photo_urls(
        &self,
        record_id: &RecordId,
        derivatives: &DerivativeSet,
    ) -> FirestoreResult<()>;
}

#[async_trait]
impl RecordStore for RecordRepository {
    async fn set_photo_urls(
        &self,
        record_id: &RecordId,
        derivatives: &DerivativeSet,
    ) -> FirestoreResult<()> {
        RecordRepository::set_photo_urls(self, record_id, derivatives).await
    }
}

// =============================================================================
// Context
// =============================================================================

/// Shared resources for job processing.
pub struct ProcessingContext {
    pub config: WorkerConfig,
    pub store: Arc<dyn ObjectStore>,
    pub records: Arc<dyn RecordStore>,
}

impl ProcessingContext {
    /// Create a context with live clients from the environment.
    pub async fn new(config: WorkerConfig) -> WorkerResult<Self> {
        let store = R2Client::from_env().await?;
        let firestore = FirestoreClient::from_env().await?;
        let records = RecordRepository::from_env(firestore);

        Ok(Self {
            config,
            store: Arc::new(store),
            records: Arc::new(records),
        })
    }
}

// =============================================================================
// Pipeline
// =============================================================================

/// Produce, encode, and store one tier derivative.
///
/// Returns a reference carrying the freshly generated `<uuid>.jpeg` name.
async fn produce_derivative(
    store: &dyn ObjectStore,
    spec: TierSpec,
    source: Arc<Vec<u8>>,
    source_ref: &str,
) -> WorkerResult<DerivativeRef> {
    // Decode + resize + encode is CPU-bound, keep it off the async runtime
    let encoded = tokio::task::spawn_blocking(move || resize_to_bound(&source, spec.bound))
        .await
        .map_err(|e| WorkerError::job_failed(format!("Resize task panicked: {}", e)))??;

    let storage_name = format!("{}.jpeg", Uuid::new_v4());

    let mut metadata = HashMap::new();
    metadata.insert(METADATA_TYPE.to_string(), spec.tier.tag().to_string());
    if !spec.tier.replaces_original() {
        metadata.insert(METADATA_ORIGINAL.to_string(), source_ref.to_string());
    }

    store
        .upload(encoded.bytes, &storage_name, DERIVATIVE_CONTENT_TYPE, &metadata)
        .await?;

    info!(
        tier = %spec.tier,
        name = %storage_name,
        width = encoded.width,
        height = encoded.height,
        "Stored derivative"
    );

    Ok(DerivativeRef {
        storage_name,
        tier: spec.tier,
        source_ref: source_ref.to_string(),
    })
}

/// Process one resize job end to end.
#[instrument(skip(ctx, job), fields(job_id = %job.job_id, record_id = %job.record_id))]
pub async fn process_photo(ctx: &ProcessingContext, job: &ResizePhotoJob) -> WorkerResult<()> {
    let source = match ctx.store.download(&job.picture_uri).await {
        Ok(bytes) => Arc::new(bytes),
        Err(StorageError::NotFound(key)) => return Err(WorkerError::SourceNotFound(key)),
        Err(e) => return Err(e.into()),
    };

    info!(bytes = source.len(), uri = %job.picture_uri, "Downloaded original");

    let [small_spec, medium_spec, large_spec] = ctx.config.bounds.specs();
    let store = ctx.store.as_ref();

    let (small, medium, large) = tokio::try_join!(
        produce_derivative(store, small_spec, Arc::clone(&source), &job.picture_uri),
        produce_derivative(store, medium_spec, Arc::clone(&source), &job.picture_uri),
        produce_derivative(store, large_spec, Arc::clone(&source), &job.picture_uri),
    )?;

    let derivatives = DerivativeSet {
        small: small.storage_name,
        medium: medium.storage_name,
        large: large.storage_name,
    };

    match ctx.records.set_photo_urls(&job.record_id, &derivatives).await {
        Ok(()) => {}
        Err(FirestoreError::NotFound(path)) => return Err(WorkerError::RecordNotFound(path)),
        Err(e) if e.is_precondition_failed() => {
            return Err(WorkerError::RecordConflict(job.record_id.to_string()))
        }
        Err(e) => return Err(e.into()),
    }

    // The large derivative has replaced the original. Deleting it is best
    // effort: the record already points at the derivatives, so a leaked
    // original costs storage, not correctness.
    if let Err(e) = ctx.store.delete(&job.picture_uri).await {
        warn!(uri = %job.picture_uri, "Failed to delete original: {}", e);
    }

    counter!("photos_processed_total").increment(1);
    info!("Photo derivatives complete");
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;
    use pixtier_models::Tier;

    /// Encode a solid-color JPEG of the given dimensions.
    fn jpeg_fixture(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([120u8, 80, 40]));
        let mut bytes = Vec::new();
        let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, 85);
        encoder
            .encode_image(&image::DynamicImage::ImageRgb8(img))
            .unwrap();
        bytes
    }

    fn test_ctx(store: MockObjectStore, records: MockRecordStore) -> ProcessingContext {
        ProcessingContext {
            config: WorkerConfig::default(),
            store: Arc::new(store),
            records: Arc::new(records),
        }
    }

    fn test_job() -> ResizePhotoJob {
        ResizePhotoJob::new(RecordId::from("rec-1"), "uploads/orig.jpeg")
    }

    #[tokio::test]
    async fn test_success_uploads_three_tiers_updates_record_and_deletes_original() {
        let mut store = MockObjectStore::new();
        let mut records = MockRecordStore::new();

        store
            .expect_download()
            .with(eq("uploads/orig.jpeg"))
            .times(1)
            .returning(|_| Ok(jpeg_fixture(1600, 1200)));

        store
            .expect_upload()
            .times(3)
            .withf(|_, key, content_type, metadata| {
                key.ends_with(".jpeg")
                    && content_type == DERIVATIVE_CONTENT_TYPE
                    && metadata.contains_key("Type")
            })
            .returning(|_, _, _, _| Ok(()));

        store
            .expect_delete()
            .with(eq("uploads/orig.jpeg"))
            .times(1)
            .returning(|_| Ok(()));

        records
            .expect_set_photo_urls()
            .times(1)
            .withf(|record_id, derivatives| {
                record_id.as_str() == "rec-1"
                    && derivatives.small.ends_with(".jpeg")
                    && derivatives.small != derivatives.medium
                    && derivatives.medium != derivatives.large
            })
            .returning(|_, _| Ok(()));

        let ctx = test_ctx(store, records);
        process_photo(&ctx, &test_job()).await.unwrap();
    }

    #[tokio::test]
    async fn test_metadata_links_small_and_medium_to_source_but_not_large() {
        let mut store = MockObjectStore::new();
        let mut records = MockRecordStore::new();

        store
            .expect_download()
            .returning(|_| Ok(jpeg_fixture(1600, 1200)));

        store
            .expect_upload()
            .times(3)
            .withf(|_, _, _, metadata| {
                let tag = metadata.get("Type").map(String::as_str);
                match tag {
                    Some("small") | Some("medium") => {
                        metadata.get("Original").map(String::as_str) == Some("uploads/orig.jpeg")
                    }
                    Some("big") => !metadata.contains_key("Original"),
                    _ => false,
                }
            })
            .returning(|_, _, _, _| Ok(()));

        store.expect_delete().returning(|_| Ok(()));
        records.expect_set_photo_urls().returning(|_, _| Ok(()));

        let ctx = test_ctx(store, records);
        process_photo(&ctx, &test_job()).await.unwrap();
    }

    #[tokio::test]
    async fn test_small_source_passes_through_and_original_still_deleted() {
        let mut store = MockObjectStore::new();
        let mut records = MockRecordStore::new();

        // 100x100 is below every bound; all three derivatives keep the
        // source dimensions but still get stored under fresh names.
        store
            .expect_download()
            .returning(|_| Ok(jpeg_fixture(100, 100)));
        store.expect_upload().times(3).returning(|_, _, _, _| Ok(()));
        store
            .expect_delete()
            .with(eq("uploads/orig.jpeg"))
            .times(1)
            .returning(|_| Ok(()));
        records.expect_set_photo_urls().times(1).returning(|_, _| Ok(()));

        let ctx = test_ctx(store, records);
        process_photo(&ctx, &test_job()).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_source_fails_without_touching_record() {
        let mut store = MockObjectStore::new();
        let mut records = MockRecordStore::new();

        store
            .expect_download()
            .returning(|key| Err(StorageError::not_found(key)));
        store.expect_upload().times(0);
        store.expect_delete().times(0);
        records.expect_set_photo_urls().times(0);

        let ctx = test_ctx(store, records);
        let err = process_photo(&ctx, &test_job()).await.unwrap_err();
        assert!(matches!(err, WorkerError::SourceNotFound(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_undecodable_source_is_invalid_image() {
        let mut store = MockObjectStore::new();
        let mut records = MockRecordStore::new();

        store
            .expect_download()
            .returning(|_| Ok(b"definitely not a jpeg".to_vec()));
        store.expect_upload().times(0);
        store.expect_delete().times(0);
        records.expect_set_photo_urls().times(0);

        let ctx = test_ctx(store, records);
        let err = process_photo(&ctx, &test_job()).await.unwrap_err();
        assert!(matches!(err, WorkerError::Media(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_upload_failure_skips_record_update_and_delete() {
        let mut store = MockObjectStore::new();
        let mut records = MockRecordStore::new();

        store
            .expect_download()
            .returning(|_| Ok(jpeg_fixture(1600, 1200)));
        store
            .expect_upload()
            .returning(|_, _, _, _| Err(StorageError::upload_failed("connection reset")));
        store.expect_delete().times(0);
        records.expect_set_photo_urls().times(0);

        let ctx = test_ctx(store, records);
        let err = process_photo(&ctx, &test_job()).await.unwrap_err();
        assert!(matches!(err, WorkerError::Storage(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_record_conflict_surfaces_and_original_survives() {
        let mut store = MockObjectStore::new();
        let mut records = MockRecordStore::new();

        store
            .expect_download()
            .returning(|_| Ok(jpeg_fixture(1600, 1200)));
        store.expect_upload().times(3).returning(|_, _, _, _| Ok(()));
        store.expect_delete().times(0);
        records.expect_set_photo_urls().returning(|_, _| {
            Err(FirestoreError::PreconditionFailed("updateTime mismatch".into()))
        });

        let ctx = test_ctx(store, records);
        let err = process_photo(&ctx, &test_job()).await.unwrap_err();
        assert!(matches!(err, WorkerError::RecordConflict(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_missing_record_fails_without_deleting_original() {
        let mut store = MockObjectStore::new();
        let mut records = MockRecordStore::new();

        store
            .expect_download()
            .returning(|_| Ok(jpeg_fixture(1600, 1200)));
        store.expect_upload().times(3).returning(|_, _, _, _| Ok(()));
        store.expect_delete().times(0);
        records
            .expect_set_photo_urls()
            .returning(|_, _| Err(FirestoreError::not_found("photos/rec-1")));

        let ctx = test_ctx(store, records);
        let err = process_photo(&ctx, &test_job()).await.unwrap_err();
        assert!(matches!(err, WorkerError::RecordNotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_failure_is_best_effort() {
        let mut store = MockObjectStore::new();
        let mut records = MockRecordStore::new();

        store
            .expect_download()
            .returning(|_| Ok(jpeg_fixture(1600, 1200)));
        store.expect_upload().times(3).returning(|_, _, _, _| Ok(()));
        store
            .expect_delete()
            .returning(|_| Err(StorageError::delete_failed("throttled")));
        records.expect_set_photo_urls().returning(|_, _| Ok(()));

        let ctx = test_ctx(store, records);
        // Delete is best effort; the job still succeeds.
        process_photo(&ctx, &test_job()).await.unwrap();
    }

    #[tokio::test]
    async fn test_tier_metadata_tags() {
        let mut store = MockObjectStore::new();

        store
            .expect_upload()
            .times(1)
            .withf(|_, _, _, metadata| metadata.get("Type").map(String::as_str) == Some("big"))
            .returning(|_, _, _, _| Ok(()));

        let spec = TierSpec {
            tier: Tier::Large,
            bound: 800,
        };
        let source = Arc::new(jpeg_fixture(1600, 1200));
        let derivative = produce_derivative(&store, spec, source, "uploads/orig.jpeg")
            .await
            .unwrap();

        assert_eq!(derivative.tier, Tier::Large);
        assert!(derivative.storage_name.ends_with(".jpeg"));
        assert_eq!(derivative.source_ref, "uploads/orig.jpeg");
    }
}
