//! Tier classification and per-tier structural bounds

use serde::Serialize;

use crate::config::TierConfig;
use crate::error::{ParlayError, Result};
use crate::models::Tier;

/// Structural constraints a tier hands to the builder before selection
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TierBounds {
    pub min_legs: usize,
    pub max_legs: usize,
    pub min_confidence: f64,
}

#[derive(Debug, Clone, Default)]
pub struct TierClassifier {
    config: TierConfig,
}

impl TierClassifier {
    pub fn new(config: TierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TierConfig {
        &self.config
    }

    /// Map a confidence figure to its tier. Lower bounds are inclusive.
    pub fn classify(&self, confidence: f64) -> Tier {
        let c = &self.config;
        if confidence >= c.goat_threshold {
            Tier::Goat
        } else if confidence >= c.premium_threshold {
            Tier::Premium
        } else if confidence >= c.free_threshold {
            Tier::Free
        } else {
            Tier::Unranked
        }
    }

    /// Leg bounds and confidence floor of a ranked tier
    pub fn bounds_for(&self, tier: Tier) -> Result<TierBounds> {
        match (self.config.threshold(tier), self.config.max_legs(tier)) {
            (Some(min_confidence), Some(max_legs)) => Ok(TierBounds {
                min_legs: self.config.min_legs,
                max_legs,
                min_confidence,
            }),
            _ => Err(ParlayError::Validation(format!(
                "{} parlays are not offered",
                tier
            ))),
        }
    }

    /// Bounds used when the caller targets odds or payout without naming a tier:
    /// the widest leg range and the lowest ranked confidence floor.
    pub fn open_bounds(&self) -> TierBounds {
        TierBounds {
            min_legs: self.config.min_legs,
            max_legs: self.config.widest_max_legs(),
            min_confidence: self.config.free_threshold,
        }
    }
}
