//! Post-hoc risk summary of a finished parlay

use crate::core::odds::parlay_probability;
use crate::models::{Analysis, Parlay, ParlayLeg, RiskAssessment, Tier};

/// Expected hit rate at or above which a parlay is "Low Risk"
pub const LOW_RISK_HIT_RATE: f64 = 0.30;
/// Expected hit rate at or above which a parlay is "Moderate Risk"
pub const MODERATE_RISK_HIT_RATE: f64 = 0.15;
/// Leg confidence counted as high in the key factors
pub const HIGH_CONFIDENCE_LEG: f64 = 90.0;
/// Recent-form hit fraction counted as a hot streak
pub const HOT_FORM_RATE: f64 = 0.8;

#[derive(Debug, Clone, Default)]
pub struct RiskAnalyzer;

impl RiskAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Π leg hit rates, legs assumed independent
    pub fn expected_hit_rate(&self, legs: &[ParlayLeg]) -> f64 {
        let rates: Vec<f64> = legs.iter().map(|leg| leg.hit_rate()).collect();
        parlay_probability(&rates)
    }

    /// Short notes on what the legs lean on, for display next to the analysis
    pub fn key_factors(&self, legs: &[ParlayLeg]) -> Vec<String> {
        let mut factors = Vec::new();

        let high = legs
            .iter()
            .filter(|l| l.confidence >= HIGH_CONFIDENCE_LEG)
            .count();
        if high > 0 {
            factors.push(format!(
                "{} high-confidence props ({:.0}%+)",
                high, HIGH_CONFIDENCE_LEG
            ));
        }

        let hot = legs
            .iter()
            .filter(|l| {
                l.prop
                    .recent_form_rate()
                    .is_some_and(|rate| rate >= HOT_FORM_RATE)
            })
            .count();
        if hot > 0 {
            factors.push(format!(
                "{} of {} players hit in {:.0}%+ of recent games",
                hot,
                legs.len(),
                HOT_FORM_RATE * 100.0
            ));
        }

        let injured = legs
            .iter()
            .filter(|l| l.prop.injury_factor.is_some_and(|f| f < 0.5))
            .count();
        if injured > 0 {
            factors.push(format!("{} legs carry injury concerns", injured));
        }

        if let Some(weakest) = legs
            .iter()
            .min_by(|a, b| a.hit_rate().total_cmp(&b.hit_rate()))
        {
            factors.push(format!(
                "Weakest leg: {} {} at {:.0}% hit rate",
                weakest.prop.player_name,
                weakest.prop.prop_type,
                weakest.hit_rate() * 100.0
            ));
        }

        factors
    }

    pub fn assess(&self, expected_hit_rate: f64) -> RiskAssessment {
        if expected_hit_rate >= LOW_RISK_HIT_RATE {
            RiskAssessment::Low
        } else if expected_hit_rate >= MODERATE_RISK_HIT_RATE {
            RiskAssessment::Moderate
        } else {
            RiskAssessment::High
        }
    }

    pub fn recommendation(
        &self,
        tier: Tier,
        overall_confidence: f64,
        expected_hit_rate: f64,
    ) -> String {
        let verdict = match (tier, self.assess(expected_hit_rate)) {
            (Tier::Goat, RiskAssessment::Low) => "STRONG BET",
            (_, RiskAssessment::Low) => "SOLID BET",
            (_, RiskAssessment::Moderate) => "VALUE PLAY",
            (_, RiskAssessment::High) => "PROCEED WITH CAUTION",
        };

        format!(
            "{}: {} parlay at {:.1}% average confidence with a {:.1}% expected hit rate",
            verdict,
            tier,
            overall_confidence,
            expected_hit_rate * 100.0
        )
    }

    pub fn analyze(&self, parlay: &Parlay) -> Analysis {
        let expected_hit_rate = self.expected_hit_rate(parlay.legs());

        Analysis {
            avg_confidence: parlay.overall_confidence(),
            expected_hit_rate,
            risk_assessment: self.assess(expected_hit_rate),
            recommendation: self.recommendation(
                parlay.tier(),
                parlay.overall_confidence(),
                expected_hit_rate,
            ),
        }
    }
}
