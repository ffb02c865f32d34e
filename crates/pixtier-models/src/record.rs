//! Photo record models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::tier::Tier;

/// Unique identifier for a photo record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Photo record stored in Firestore.
///
/// The pipeline only ever rewrites the three URL fields; the descriptive
/// fields belong to the upload flow and are left untouched.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PhotoRecord {
    /// Unique record ID
    pub record_id: RecordId,

    /// Headline shown in the journal
    #[serde(default)]
    pub headline: String,

    /// Free-form description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Geographic position string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,

    /// Storage name of the small derivative
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_small_url: Option<String>,

    /// Storage name of the medium derivative
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_medium_url: Option<String>,

    /// Storage name of the large derivative
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_large_url: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl PhotoRecord {
    /// Create a new record with empty URL fields.
    pub fn new(record_id: RecordId, headline: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            record_id,
            headline: headline.into(),
            description: None,
            position: None,
            photo_small_url: None,
            photo_medium_url: None,
            photo_large_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// URL field for a tier, if set.
    pub fn url(&self, tier: Tier) -> Option<&str> {
        match tier {
            Tier::Small => self.photo_small_url.as_deref(),
            Tier::Medium => self.photo_medium_url.as_deref(),
            Tier::Large => self.photo_large_url.as_deref(),
        }
    }

    /// True once all three tiers have a URL.
    pub fn is_fully_derived(&self) -> bool {
        Tier::ALL.iter().all(|t| self.url(*t).is_some())
    }
}
