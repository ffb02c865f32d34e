//! Typed repository for photo records.
//!
//! All writes go through precondition-guarded partial updates: the repository
//! reads the document's `updateTime` first and patches with
//! `currentDocument.updateTime` set, so a concurrent writer surfaces as
//! `PreconditionFailed` instead of a silent lost update.

use std::collections::HashMap;

use chrono::Utc;
use tracing::{debug, instrument};

use pixtier_models::{DerivativeSet, PhotoRecord, RecordId, Tier};

use crate::client::FirestoreClient;
use crate::error::{FirestoreError, FirestoreResult};
use crate::types::{Document, ToFirestoreValue, Value};

/// Default collection holding photo records.
pub const DEFAULT_COLLECTION: &str = "photos";

/// Repository for photo records.
#[derive(Clone)]
pub struct RecordRepository {
    client: FirestoreClient,
    collection: String,
}

impl RecordRepository {
    pub fn new(client: FirestoreClient, collection: impl Into<String>) -> Self {
        Self {
            client,
            collection: collection.into(),
        }
    }

    /// Create with the collection name from `PHOTO_COLLECTION` (or the default).
    pub fn from_env(client: FirestoreClient) -> Self {
        let collection =
            std::env::var("PHOTO_COLLECTION").unwrap_or_else(|_| DEFAULT_COLLECTION.to_string());
        Self::new(client, collection)
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Fetch a record by ID.
    #[instrument(skip(self), fields(collection = %self.collection))]
    pub async fn get(&self, record_id: &RecordId) -> FirestoreResult<Option<PhotoRecord>> {
        let doc = self
            .client
            .with_retry("get_record", || {
                self.client.get_document(&self.collection, record_id.as_str())
            })
            .await?;

        match doc {
            Some(doc) => Ok(Some(record_from_document(record_id, &doc)?)),
            None => Ok(None),
        }
    }

    /// Set the URL field for a single tier.
    ///
    /// Reads the document first to capture its `updateTime`, then patches only
    /// that field (plus `updatedAt`) under the captured precondition.
    #[instrument(skip(self, url), fields(collection = %self.collection, tier = %tier.tag()))]
    pub async fn set_photo_url(
        &self,
        record_id: &RecordId,
        tier: Tier,
        url: &str,
    ) -> FirestoreResult<()> {
        let doc = self
            .client
            .get_document(&self.collection, record_id.as_str())
            .await?
            .ok_or_else(|| {
                FirestoreError::not_found(format!("{}/{}", self.collection, record_id))
            })?;

        let mut fields = HashMap::new();
        fields.insert(tier.url_field().to_string(), url.to_firestore_value());
        fields.insert("updatedAt".to_string(), Utc::now().to_firestore_value());

        let mask = vec![tier.url_field().to_string(), "updatedAt".to_string()];

        self.client
            .update_document_with_precondition(
                &self.collection,
                record_id.as_str(),
                fields,
                Some(mask),
                doc.update_time.as_deref(),
            )
            .await?;

        debug!(record_id = %record_id, "Updated {} url", tier.tag());
        Ok(())
    }

    /// Atomically set all three URL fields from a complete derivative set.
    ///
    /// Either every tier URL lands or none does.
    #[instrument(skip(self, derivatives), fields(collection = %self.collection))]
    pub async fn set_photo_urls(
        &self,
        record_id: &RecordId,
        derivatives: &DerivativeSet,
    ) -> FirestoreResult<()> {
        let doc = self
            .client
            .get_document(&self.collection, record_id.as_str())
            .await?
            .ok_or_else(|| {
                FirestoreError::not_found(format!("{}/{}", self.collection, record_id))
            })?;

        let mut fields = HashMap::new();
        let mut mask = Vec::with_capacity(Tier::ALL.len() + 1);
        for tier in Tier::ALL {
            fields.insert(
                tier.url_field().to_string(),
                derivatives.url(tier).to_firestore_value(),
            );
            mask.push(tier.url_field().to_string());
        }
        fields.insert("updatedAt".to_string(), Utc::now().to_firestore_value());
        mask.push("updatedAt".to_string());

        self.client
            .update_document_with_precondition(
                &self.collection,
                record_id.as_str(),
                fields,
                Some(mask),
                doc.update_time.as_deref(),
            )
            .await?;

        debug!(record_id = %record_id, "Updated all tier urls");
        Ok(())
    }

    /// Create a record. Used by upload flows and integration tests.
    pub async fn create(&self, record: &PhotoRecord) -> FirestoreResult<()> {
        let fields = record_to_fields(record);
        self.client
            .create_document(&self.collection, record.record_id.as_str(), fields)
            .await?;
        Ok(())
    }

    /// Delete a record. Idempotent.
    pub async fn delete(&self, record_id: &RecordId) -> FirestoreResult<()> {
        self.client
            .delete_document(&self.collection, record_id.as_str())
            .await
    }
}

// =============================================================================
// Document Conversion
// =============================================================================

fn record_to_fields(record: &PhotoRecord) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("headline".to_string(), record.headline.to_firestore_value());
    if let Some(description) = &record.description {
        fields.insert("description".to_string(), description.to_firestore_value());
    }
    if let Some(position) = &record.position {
        fields.insert("position".to_string(), position.to_firestore_value());
    }
    for tier in Tier::ALL {
        if let Some(url) = record.url(tier) {
            fields.insert(tier.url_field().to_string(), url.to_firestore_value());
        }
    }
    fields.insert("createdAt".to_string(), record.created_at.to_firestore_value());
    fields.insert("updatedAt".to_string(), record.updated_at.to_firestore_value());
    fields
}

fn record_from_document(record_id: &RecordId, doc: &Document) -> FirestoreResult<PhotoRecord> {
    let now = Utc::now();
    Ok(PhotoRecord {
        record_id: record_id.clone(),
        headline: doc.get::<String>("headline").unwrap_or_default(),
        description: doc.get::<String>("description"),
        position: doc.get::<String>("position"),
        photo_small_url: doc.get::<String>(Tier::Small.url_field()),
        photo_medium_url: doc.get::<String>(Tier::Medium.url_field()),
        photo_large_url: doc.get::<String>(Tier::Large.url_field()),
        created_at: doc.get("createdAt").unwrap_or(now),
        updated_at: doc.get("updatedAt").unwrap_or(now),
    })
}
