//! Confidence scoring for candidate legs
//!
//! score = Σ weight_i × factor_i, every factor normalized to [0, 1] and the sum
//! clamped to [0, 100]. Factors missing from the feed count as neutral (0.5).

use serde::Serialize;

use crate::config::FactorWeights;
use crate::models::{PlayerProp, ScoredProp};

/// Value used for any factor the feed does not provide
pub const NEUTRAL_FACTOR: f64 = 0.5;

/// Per-factor contributions to a confidence score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfidenceBreakdown {
    pub historical: f64,
    pub recent_form: f64,
    pub injury: f64,
    pub weather: f64,
    pub matchup: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ConfidenceScorer {
    weights: FactorWeights,
}

impl ConfidenceScorer {
    pub fn new(weights: FactorWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &FactorWeights {
        &self.weights
    }

    /// Confidence score in [0, 100]
    pub fn score(&self, prop: &PlayerProp) -> f64 {
        self.breakdown(prop).total
    }

    pub fn breakdown(&self, prop: &PlayerProp) -> ConfidenceBreakdown {
        let w = &self.weights;

        let historical = w.historical * normalize(prop.hit_rate);
        let recent_form = w.recent_form * prop.recent_form_rate().unwrap_or(NEUTRAL_FACTOR);
        let injury = w.injury * factor_or_neutral(prop.injury_factor);
        let weather = w.weather * factor_or_neutral(prop.weather_factor);
        let matchup = w.matchup * factor_or_neutral(prop.matchup_factor);

        let total = (historical + recent_form + injury + weather + matchup).clamp(0.0, 100.0);

        ConfidenceBreakdown {
            historical,
            recent_form,
            injury,
            weather,
            matchup,
            total,
        }
    }

    /// Attach a confidence score to a prop.
    ///
    /// A score already supplied by the feed is kept (clamped to [0, 100]);
    /// otherwise it is computed.
    pub fn annotate(&self, prop: &PlayerProp) -> ScoredProp {
        let confidence = match prop.confidence_score {
            Some(score) if score.is_finite() => score.clamp(0.0, 100.0),
            _ => self.score(prop),
        };

        ScoredProp {
            prop: prop.clone(),
            confidence,
        }
    }

    pub fn annotate_all(&self, props: &[PlayerProp]) -> Vec<ScoredProp> {
        props.iter().map(|p| self.annotate(p)).collect()
    }
}

fn normalize(value: f64) -> f64 {
    if value.is_nan() {
        NEUTRAL_FACTOR
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn factor_or_neutral(value: Option<f64>) -> f64 {
    value.map(normalize).unwrap_or(NEUTRAL_FACTOR)
}
