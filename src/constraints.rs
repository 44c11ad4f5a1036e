//! Caller-supplied constraint set for a build request
//!
//! Only the options listed on [`ConstraintSet`] are recognized; anything else
//! in a serialized request is rejected rather than ignored.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::EngineConfig;
use crate::core::odds::required_odds_for_payout;
use crate::core::tier::TierClassifier;
use crate::error::{
    validate_american_odds, validate_confidence, validate_leg_bounds, validate_probability,
    ParlayError, Result,
};
use crate::models::{Sport, Tier};

/// Caller risk appetite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Minimum leg hit rate implied by this risk level
    pub fn hit_rate_floor(&self) -> f64 {
        match self {
            RiskLevel::Low => 0.85,
            RiskLevel::Medium => 0.75,
            RiskLevel::High => 0.60,
        }
    }

    /// Minimum leg confidence implied by this risk level
    pub fn confidence_floor(&self) -> f64 {
        match self {
            RiskLevel::Low => 85.0,
            RiskLevel::Medium => 75.0,
            RiskLevel::High => 60.0,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => f.write_str("low"),
            RiskLevel::Medium => f.write_str("medium"),
            RiskLevel::High => f.write_str("high"),
        }
    }
}

impl FromStr for RiskLevel {
    type Err = ParlayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" | "med" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            other => Err(ParlayError::Validation(format!(
                "Unknown risk level: {}",
                other
            ))),
        }
    }
}

/// Build request constraints.
///
/// `sport` is required, plus at least one of `tier`, `target_odds` or
/// `target_payout`. Everything else is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConstraintSet {
    pub sport: Sport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_odds: Option<i32>,
    /// Total return wanted on the reference stake
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_payout: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_legs: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_legs: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_hit_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
}

impl ConstraintSet {
    fn empty(sport: Sport) -> Self {
        Self {
            sport,
            tier: None,
            target_odds: None,
            target_payout: None,
            max_legs: None,
            min_legs: None,
            min_hit_rate: None,
            min_confidence: None,
            risk_level: None,
        }
    }

    pub fn for_tier(sport: Sport, tier: Tier) -> Self {
        Self {
            tier: Some(tier),
            ..Self::empty(sport)
        }
    }

    pub fn for_target_odds(sport: Sport, target_odds: i32) -> Self {
        Self {
            target_odds: Some(target_odds),
            ..Self::empty(sport)
        }
    }

    pub fn for_target_payout(sport: Sport, target_payout: f64) -> Self {
        Self {
            target_payout: Some(target_payout),
            ..Self::empty(sport)
        }
    }

    pub fn with_legs(mut self, min_legs: usize, max_legs: usize) -> Self {
        self.min_legs = Some(min_legs);
        self.max_legs = Some(max_legs);
        self
    }

    pub fn with_min_hit_rate(mut self, min_hit_rate: f64) -> Self {
        self.min_hit_rate = Some(min_hit_rate);
        self
    }

    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = Some(min_confidence);
        self
    }

    pub fn with_risk_level(mut self, risk_level: RiskLevel) -> Self {
        self.risk_level = Some(risk_level);
        self
    }

    /// Parse a JSON request body, rejecting unrecognized options
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| ParlayError::Validation(format!("Invalid constraint set: {}", e)))
    }

    /// Merge with tier bounds and configuration into the limits the builder runs with
    pub fn resolve(
        &self,
        classifier: &TierClassifier,
        config: &EngineConfig,
    ) -> Result<ResolvedConstraints> {
        if self.tier.is_none() && self.target_odds.is_none() && self.target_payout.is_none() {
            return Err(ParlayError::Validation(
                "A tier, target_odds or target_payout is required".to_string(),
            ));
        }
        if self.target_odds.is_some() && self.target_payout.is_some() {
            return Err(ParlayError::Validation(
                "target_odds and target_payout are mutually exclusive".to_string(),
            ));
        }

        let bounds = match self.tier {
            Some(tier) => classifier.bounds_for(tier)?,
            None => classifier.open_bounds(),
        };

        let max_legs = match self.max_legs {
            Some(max) if max > bounds.max_legs => {
                return Err(ParlayError::Validation(format!(
                    "max_legs {} exceeds the limit of {}",
                    max, bounds.max_legs
                )));
            }
            Some(max) => max,
            None => bounds.max_legs,
        };
        let min_legs = self.min_legs.unwrap_or(bounds.min_legs);
        validate_leg_bounds(min_legs, max_legs)?;

        let target_odds = match (self.target_odds, self.target_payout) {
            (Some(odds), _) => {
                validate_american_odds(odds)?;
                Some(odds)
            }
            (None, Some(payout)) => Some(required_odds_for_payout(
                payout,
                config.payout.reference_stake,
            )?),
            (None, None) => None,
        };

        let mut min_hit_rate = match self.min_hit_rate {
            Some(rate) => {
                validate_probability(rate)?;
                rate
            }
            None => 0.0,
        };
        let mut min_confidence = bounds.min_confidence;
        if let Some(conf) = self.min_confidence {
            validate_confidence(conf)?;
            min_confidence = min_confidence.max(conf);
        }
        if let Some(risk) = self.risk_level {
            min_hit_rate = min_hit_rate.max(risk.hit_rate_floor());
            min_confidence = min_confidence.max(risk.confidence_floor());
        }

        Ok(ResolvedConstraints {
            sport: self.sport,
            tier: self.tier,
            target_odds,
            min_legs,
            max_legs,
            min_hit_rate,
            min_confidence,
            tolerance: config.search.tolerance,
            max_attempts: config.search.max_attempts,
        })
    }
}

/// Constraints after merging caller options, tier bounds and configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConstraints {
    pub sport: Sport,
    pub tier: Option<Tier>,
    pub target_odds: Option<i32>,
    pub min_legs: usize,
    pub max_legs: usize,
    pub min_hit_rate: f64,
    pub min_confidence: f64,
    pub tolerance: f64,
    pub max_attempts: usize,
}

impl ResolvedConstraints {
    /// Whether `odds` lies within the tolerance band around `target`
    pub fn within_band(&self, odds: i32, target: i32) -> bool {
        band_distance(odds, target) <= self.tolerance
    }
}

/// Relative distance of `odds` from `target`
pub fn band_distance(odds: i32, target: i32) -> f64 {
    (odds as f64 - target as f64).abs() / (target as f64).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(constraints: &ConstraintSet) -> Result<ResolvedConstraints> {
        constraints.resolve(&TierClassifier::default(), &EngineConfig::default())
    }

    #[test]
    fn test_tier_bounds_flow_into_resolution() {
        let resolved = resolve(&ConstraintSet::for_tier(Sport::Nfl, Tier::Premium)).unwrap();
        assert_eq!(resolved.min_legs, 5);
        assert_eq!(resolved.max_legs, 7);
        assert_eq!(resolved.min_confidence, 80.0);
        assert_eq!(resolved.min_hit_rate, 0.0);
        assert_eq!(resolved.target_odds, None);
        assert_eq!(resolved.max_attempts, 200);
    }

    #[test]
    fn test_tier_or_target_required() {
        let mut constraints = ConstraintSet::for_tier(Sport::Nfl, Tier::Free);
        constraints.tier = None;
        assert!(matches!(
            resolve(&constraints),
            Err(ParlayError::Validation(_))
        ));
    }

    #[test]
    fn test_contradictory_targets_rejected() {
        let mut constraints = ConstraintSet::for_target_odds(Sport::Nfl, 2500);
        constraints.target_payout = Some(260.0);
        assert!(matches!(
            resolve(&constraints),
            Err(ParlayError::Validation(_))
        ));
    }

    #[test]
    fn test_min_legs_above_max_legs_rejected() {
        let constraints = ConstraintSet::for_tier(Sport::Nfl, Tier::Free).with_legs(6, 5);
        assert!(matches!(
            resolve(&constraints),
            Err(ParlayError::Validation(_))
        ));
    }

    #[test]
    fn test_max_legs_above_tier_limit_rejected() {
        let constraints = ConstraintSet::for_tier(Sport::Nfl, Tier::Free).with_legs(5, 7);
        let err = resolve(&constraints).unwrap_err();
        assert!(err.to_string().contains("exceeds the limit of 6"));
    }

    #[test]
    fn test_unranked_tier_rejected() {
        let constraints = ConstraintSet::for_tier(Sport::Nfl, Tier::Unranked);
        assert!(resolve(&constraints).is_err());
    }

    #[test]
    fn test_target_payout_converted_to_odds() {
        let resolved = resolve(&ConstraintSet::for_target_payout(Sport::Mlb, 260.0)).unwrap();
        assert_eq!(resolved.target_odds, Some(2500));
        assert_eq!(resolved.max_legs, 8);
        assert_eq!(resolved.min_confidence, 70.0);
    }

    #[test]
    fn test_zero_target_odds_rejected() {
        let constraints = ConstraintSet::for_target_odds(Sport::Nfl, 0);
        assert!(matches!(
            resolve(&constraints),
            Err(ParlayError::OddsComputation(_))
        ));
    }

    #[test]
    fn test_risk_level_raises_floors() {
        let constraints = ConstraintSet::for_tier(Sport::Nfl, Tier::Free)
            .with_min_hit_rate(0.5)
            .with_risk_level(RiskLevel::Medium);
        let resolved = resolve(&constraints).unwrap();
        assert_eq!(resolved.min_hit_rate, 0.75);
        assert_eq!(resolved.min_confidence, 75.0);

        // explicit floors above the risk floor win
        let constraints = ConstraintSet::for_tier(Sport::Nfl, Tier::Premium)
            .with_min_hit_rate(0.9)
            .with_risk_level(RiskLevel::High);
        let resolved = resolve(&constraints).unwrap();
        assert_eq!(resolved.min_hit_rate, 0.9);
        assert_eq!(resolved.min_confidence, 80.0);
    }

    #[test]
    fn test_invalid_floors_rejected() {
        let constraints = ConstraintSet::for_tier(Sport::Nfl, Tier::Free).with_min_hit_rate(1.5);
        assert!(resolve(&constraints).is_err());

        let constraints =
            ConstraintSet::for_tier(Sport::Nfl, Tier::Free).with_min_confidence(120.0);
        assert!(resolve(&constraints).is_err());
    }

    #[test]
    fn test_from_json() {
        let constraints = ConstraintSet::from_json(
            r#"{"sport": "NBA", "tier": "premium", "min_hit_rate": 0.7, "risk_level": "low"}"#,
        )
        .unwrap();
        assert_eq!(constraints.sport, Sport::Nba);
        assert_eq!(constraints.tier, Some(Tier::Premium));
        assert_eq!(constraints.risk_level, Some(RiskLevel::Low));
    }

    #[test]
    fn test_from_json_rejects_unknown_option() {
        let err = ConstraintSet::from_json(r#"{"sport": "NFL", "tier": "Free", "boost": true}"#)
            .unwrap_err();
        assert!(matches!(err, ParlayError::Validation(_)));
        assert!(err.to_string().contains("boost"));
    }

    #[test]
    fn test_from_json_requires_sport() {
        assert!(ConstraintSet::from_json(r#"{"tier": "Free"}"#).is_err());
    }

    #[test]
    fn test_within_band() {
        let resolved = resolve(&ConstraintSet::for_target_odds(Sport::Nfl, 2500)).unwrap();
        assert!(resolved.within_band(2250, 2500));
        assert!(resolved.within_band(2750, 2500));
        assert!(!resolved.within_band(2249, 2500));
        assert!(!resolved.within_band(2751, 2500));
    }

    #[test]
    fn test_risk_level_parse() {
        assert_eq!("LOW".parse::<RiskLevel>().unwrap(), RiskLevel::Low);
        assert_eq!("med".parse::<RiskLevel>().unwrap(), RiskLevel::Medium);
        assert!("extreme".parse::<RiskLevel>().is_err());
    }
}
