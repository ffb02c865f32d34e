//! Derivative tiers and their size bounds.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three fixed derivative size classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Small,
    Medium,
    Large,
}

impl Tier {
    /// All tiers in pipeline order.
    pub const ALL: [Tier; 3] = [Tier::Small, Tier::Medium, Tier::Large];

    /// Metadata tag attached to stored derivatives.
    pub fn tag(&self) -> &'static str {
        match self {
            Tier::Small => "small",
            Tier::Medium => "medium",
            Tier::Large => "big",
        }
    }

    /// Firestore field holding this tier's URL on the photo record.
    pub fn url_field(&self) -> &'static str {
        match self {
            Tier::Small => "photoSmallUrl",
            Tier::Medium => "photoMediumUrl",
            Tier::Large => "photoLargeUrl",
        }
    }

    /// Whether this tier's derivative logically replaces the original upload.
    pub fn replaces_original(&self) -> bool {
        matches!(self, Tier::Large)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Bigger-side pixel bounds for the three tiers.
///
/// Resolved once from configuration and injected; never hardcoded at use sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TierBounds {
    pub small: u32,
    pub medium: u32,
    pub large: u32,
}

impl Default for TierBounds {
    fn default() -> Self {
        Self {
            small: 270,
            medium: 500,
            large: 800,
        }
    }
}

impl TierBounds {
    /// Bound for a single tier.
    pub fn bound(&self, tier: Tier) -> u32 {
        match tier {
            Tier::Small => self.small,
            Tier::Medium => self.medium,
            Tier::Large => self.large,
        }
    }

    /// Descriptor for one producer invocation.
    pub fn spec(&self, tier: Tier) -> TierSpec {
        TierSpec {
            tier,
            bound: self.bound(tier),
        }
    }

    /// Descriptors for all three tiers in pipeline order.
    pub fn specs(&self) -> [TierSpec; 3] {
        [
            self.spec(Tier::Small),
            self.spec(Tier::Medium),
            self.spec(Tier::Large),
        ]
    }
}

/// Parameters for a single derivative producer invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierSpec {
    pub tier: Tier,
    pub bound: u32,
}
