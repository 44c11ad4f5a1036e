//! Core business logic modules

pub mod confidence;
pub mod odds;
pub mod risk;
pub mod tier;

// Re-export commonly used types
pub use confidence::{ConfidenceBreakdown, ConfidenceScorer};
pub use odds::{american_to_decimal, combine, decimal_to_american, implied_probability};
pub use risk::RiskAnalyzer;
pub use tier::{TierBounds, TierClassifier};
