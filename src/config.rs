//! Engine configuration
//!
//! Every product constant (factor weights, tier thresholds, search limits)
//! lives here. The defaults are product decisions, not derived values, and can
//! be tuned from a TOML file:
//!
//! ```toml
//! [weights]
//! historical = 40.0
//! recent_form = 30.0
//!
//! [tiers]
//! min_legs = 5
//!
//! [search]
//! tolerance = 0.10
//! max_attempts = 200
//! ```

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{validate_leg_bounds, ParlayError, Result};
use crate::models::Tier;

/// Environment variable naming a TOML config file
pub const CONFIG_ENV_VAR: &str = "PARLAY_CONFIG";

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub weights: FactorWeights,
    pub tiers: TierConfig,
    pub search: SearchConfig,
    pub payout: PayoutConfig,
}

/// Confidence factor weights; must sum to 100
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FactorWeights {
    pub historical: f64,
    pub recent_form: f64,
    pub injury: f64,
    pub weather: f64,
    pub matchup: f64,
}

impl FactorWeights {
    pub fn total(&self) -> f64 {
        self.historical + self.recent_form + self.injury + self.weather + self.matchup
    }
}

impl Default for FactorWeights {
    fn default() -> Self {
        Self {
            historical: 40.0,
            recent_form: 30.0,
            injury: 15.0,
            weather: 10.0,
            matchup: 5.0,
        }
    }
}

/// Tier thresholds (inclusive lower bounds) and leg limits
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TierConfig {
    pub goat_threshold: f64,
    pub premium_threshold: f64,
    pub free_threshold: f64,
    pub goat_max_legs: usize,
    pub premium_max_legs: usize,
    pub free_max_legs: usize,
    /// Shared floor across tiers
    pub min_legs: usize,
}

impl TierConfig {
    pub fn threshold(&self, tier: Tier) -> Option<f64> {
        match tier {
            Tier::Goat => Some(self.goat_threshold),
            Tier::Premium => Some(self.premium_threshold),
            Tier::Free => Some(self.free_threshold),
            Tier::Unranked => None,
        }
    }

    pub fn max_legs(&self, tier: Tier) -> Option<usize> {
        match tier {
            Tier::Goat => Some(self.goat_max_legs),
            Tier::Premium => Some(self.premium_max_legs),
            Tier::Free => Some(self.free_max_legs),
            Tier::Unranked => None,
        }
    }

    /// Largest max_legs of any tier
    pub fn widest_max_legs(&self) -> usize {
        self.goat_max_legs
            .max(self.premium_max_legs)
            .max(self.free_max_legs)
    }
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            goat_threshold: 95.0,
            premium_threshold: 80.0,
            free_threshold: 70.0,
            goat_max_legs: 8,
            premium_max_legs: 7,
            free_max_legs: 6,
            min_legs: 5,
        }
    }
}

/// Bounded search settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Relative band around a target odds value, 0.10 = ±10%
    pub tolerance: f64,
    /// Backtracking attempts per build
    pub max_attempts: usize,
    /// Player overlap above which two slate parlays count as duplicates
    pub slate_overlap: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.10,
            max_attempts: 200,
            slate_overlap: 0.60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PayoutConfig {
    /// Stake used for `expected_payout` and target-payout conversion
    pub reference_stake: f64,
}

impl Default for PayoutConfig {
    fn default() -> Self {
        Self {
            reference_stake: 10.0,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig =
            toml::from_str(content).map_err(|e| ParlayError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from `PARLAY_CONFIG` if set, otherwise defaults
    pub fn from_env() -> Result<Self> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.is_empty() => Self::from_file(path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let w = &self.weights;
        for (name, value) in [
            ("historical", w.historical),
            ("recent_form", w.recent_form),
            ("injury", w.injury),
            ("weather", w.weather),
            ("matchup", w.matchup),
        ] {
            if !(value >= 0.0) {
                return Err(ParlayError::Config(format!(
                    "weight {} must be non-negative, got {}",
                    name, value
                )));
            }
        }
        if (w.total() - 100.0).abs() > 1e-6 {
            return Err(ParlayError::Config(format!(
                "factor weights must sum to 100, got {}",
                w.total()
            )));
        }

        let t = &self.tiers;
        if !(t.free_threshold < t.premium_threshold && t.premium_threshold < t.goat_threshold) {
            return Err(ParlayError::Config(
                "tier thresholds must increase Free < Premium < GOAT".to_string(),
            ));
        }
        if !(0.0..=100.0).contains(&t.free_threshold) || !(0.0..=100.0).contains(&t.goat_threshold)
        {
            return Err(ParlayError::Config(
                "tier thresholds must lie within [0, 100]".to_string(),
            ));
        }
        for tier in Tier::RANKED {
            let max_legs = t.max_legs(tier).unwrap_or(0);
            validate_leg_bounds(t.min_legs, max_legs)
                .map_err(|e| ParlayError::Config(format!("{} tier: {}", tier, e)))?;
        }

        let s = &self.search;
        if !(s.tolerance >= 0.0 && s.tolerance < 1.0) {
            return Err(ParlayError::Config(format!(
                "tolerance must be in [0, 1), got {}",
                s.tolerance
            )));
        }
        if !(s.slate_overlap > 0.0 && s.slate_overlap <= 1.0) {
            return Err(ParlayError::Config(format!(
                "slate_overlap must be in (0, 1], got {}",
                s.slate_overlap
            )));
        }
        if !(self.payout.reference_stake > 0.0) {
            return Err(ParlayError::Config(format!(
                "reference_stake must be positive, got {}",
                self.payout.reference_stake
            )));
        }
        Ok(())
    }
}
