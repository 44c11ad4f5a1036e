//! Parlay - player-prop parlay generation and confidence scoring
//!
//! This library provides:
//! - American/decimal odds arithmetic and multi-leg combination
//! - Weighted confidence scoring of player props
//! - Tier classification (Free / Premium / GOAT) with per-tier leg bounds
//! - Constrained parlay construction with a bounded substitution search
//! - Risk analysis of finished parlays
//! - Prop feed loading, a per-sport market registry and seeded synthetic feeds
//!
//! # Example
//!
//! ```no_run
//! use parlay::data::SyntheticPropGenerator;
//! use parlay::{ConstraintSet, ParlayEngine, Sport, Tier};
//!
//! let engine = ParlayEngine::default();
//! let props = SyntheticPropGenerator::new(42).generate(Sport::Nfl, 200);
//! let snapshot = engine.snapshot(Sport::Nfl, &props).unwrap();
//!
//! let response = engine
//!     .generate(&snapshot, &ConstraintSet::for_tier(Sport::Nfl, Tier::Free))
//!     .unwrap();
//! println!("{} at {:+}", response.parlay.description(), response.parlay.total_odds());
//! ```

pub mod builder;
pub mod config;
pub mod constraints;
pub mod core;
pub mod data;
pub mod engine;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use builder::{BuildOutcome, ParlayBuilder};
pub use config::EngineConfig;
pub use constraints::{ConstraintSet, RiskLevel};
pub use engine::ParlayEngine;
pub use error::{ParlayError, Result};
pub use models::{
    Analysis, LegKey, Parlay, ParlayLeg, ParlayResponse, PlayerProp, PropType, RiskAssessment,
    ScoredProp, Side, Sport, Tier,
};
