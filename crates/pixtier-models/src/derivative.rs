//! References to produced derivatives.

use serde::{Deserialize, Serialize};

use crate::tier::Tier;

/// Reference to one stored derivative, linking it back to its source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivativeRef {
    /// Freshly generated storage name, `<uuid>.jpeg`
    pub storage_name: String,
    /// Tier this derivative belongs to
    pub tier: Tier,
    /// Storage key of the source image
    pub source_ref: String,
}

/// Storage names of all three successfully persisted derivatives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivativeSet {
    pub small: String,
    pub medium: String,
    pub large: String,
}

impl DerivativeSet {
    /// Storage name for a tier.
    pub fn url(&self, tier: Tier) -> &str {
        match tier {
            Tier::Small => &self.small,
            Tier::Medium => &self.medium,
            Tier::Large => &self.large,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_selects_tier() {
        let set = DerivativeSet {
            small: "s.jpeg".to_string(),
            medium: "m.jpeg".to_string(),
            large: "l.jpeg".to_string(),
        };
        assert_eq!(set.url(Tier::Small), "s.jpeg");
        assert_eq!(set.url(Tier::Medium), "m.jpeg");
        assert_eq!(set.url(Tier::Large), "l.jpeg");
    }
}
