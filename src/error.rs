use thiserror::Error;

/// Engine error types
#[derive(Debug, Error)]
pub enum ParlayError {
    /// Malformed or contradictory constraints
    #[error("Validation error: {0}")]
    Validation(String),

    /// Zero or otherwise invalid odds value
    #[error("Odds computation error: {0}")]
    OddsComputation(String),

    /// Nothing survived the confidence / hit-rate filters
    #[error("No viable legs: {0}")]
    NoViableLegs(String),

    /// Some legs survived, but fewer than the minimum leg count
    #[error("Insufficient legs: found {found}, need at least {required}")]
    InsufficientLegs { found: usize, required: usize },

    /// Bad engine configuration
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ParlayError>;

impl ParlayError {
    /// Prefix a validation or odds message with where the bad value came from
    pub fn context(self, location: impl std::fmt::Display) -> Self {
        match self {
            ParlayError::Validation(msg) => {
                ParlayError::Validation(format!("{}: {}", location, msg))
            }
            ParlayError::OddsComputation(msg) => {
                ParlayError::OddsComputation(format!("{}: {}", location, msg))
            }
            other => other,
        }
    }
}

/// Validation functions
pub fn validate_american_odds(odds: i32) -> Result<()> {
    if odds == 0 {
        return Err(ParlayError::OddsComputation(
            "American odds of 0 are undefined".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_probability(prob: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&prob) || prob.is_nan() {
        return Err(ParlayError::Validation(format!(
            "Probability must be between 0 and 1, got {}",
            prob
        )));
    }
    Ok(())
}

/// Hit rates are strictly positive: a leg that never hits cannot be parlayed.
pub fn validate_hit_rate(hit_rate: f64) -> Result<()> {
    if !(hit_rate > 0.0 && hit_rate <= 1.0) {
        return Err(ParlayError::Validation(format!(
            "Hit rate must be in (0, 1], got {}",
            hit_rate
        )));
    }
    Ok(())
}

pub fn validate_confidence(confidence: f64) -> Result<()> {
    if !(0.0..=100.0).contains(&confidence) || confidence.is_nan() {
        return Err(ParlayError::Validation(format!(
            "Confidence must be between 0 and 100, got {}",
            confidence
        )));
    }
    Ok(())
}

pub fn validate_leg_bounds(min_legs: usize, max_legs: usize) -> Result<()> {
    if min_legs == 0 {
        return Err(ParlayError::Validation(
            "min_legs must be at least 1".to_string(),
        ));
    }
    if min_legs > max_legs {
        return Err(ParlayError::Validation(format!(
            "min_legs ({}) exceeds max_legs ({})",
            min_legs, max_legs
        )));
    }
    Ok(())
}
