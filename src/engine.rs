//! Score → build → analyze pipeline
//!
//! [`ParlayEngine`] holds only configuration. Every call reads an immutable
//! [`PropSnapshot`] and returns fresh values, so one engine can serve any
//! number of threads at once.

use tracing::debug;

use crate::builder::{BuildOutcome, ParlayBuilder};
use crate::config::EngineConfig;
use crate::constraints::ConstraintSet;
use crate::core::confidence::ConfidenceScorer;
use crate::core::risk::RiskAnalyzer;
use crate::data::snapshot::PropSnapshot;
use crate::error::{ParlayError, Result};
use crate::models::{Analysis, Parlay, ParlayResponse, PlayerProp, ScoredProp, Sport};

#[derive(Debug, Clone, Default)]
pub struct ParlayEngine {
    scorer: ConfidenceScorer,
    builder: ParlayBuilder,
    analyzer: RiskAnalyzer,
}

impl ParlayEngine {
    /// Engine over a validated configuration
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            scorer: ConfidenceScorer::new(config.weights.clone()),
            builder: ParlayBuilder::new(config),
            analyzer: RiskAnalyzer::new(),
        })
    }

    /// Engine configured from `PARLAY_CONFIG`, or defaults
    pub fn from_env() -> Result<Self> {
        Self::new(EngineConfig::from_env()?)
    }

    pub fn config(&self) -> &EngineConfig {
        self.builder.config()
    }

    pub fn scorer(&self) -> &ConfidenceScorer {
        &self.scorer
    }

    pub fn builder(&self) -> &ParlayBuilder {
        &self.builder
    }

    pub fn analyzer(&self) -> &RiskAnalyzer {
        &self.analyzer
    }

    /// Score a raw feed. A prop with a hit rate outside (0, 1] or a zero
    /// price on either side rejects the whole feed.
    pub fn score(&self, props: &[PlayerProp]) -> Result<Vec<ScoredProp>> {
        props
            .iter()
            .enumerate()
            .map(|(i, prop)| {
                prop.validate()
                    .map_err(|e| e.context(format!("prop {} ({})", i, prop.player_name)))?;
                Ok(self.scorer.annotate(prop))
            })
            .collect()
    }

    /// Score a raw feed into a snapshot ready to publish
    pub fn snapshot(&self, sport: Sport, props: &[PlayerProp]) -> Result<PropSnapshot> {
        Ok(PropSnapshot::new(sport, self.score(props)?))
    }

    pub fn analyze(&self, parlay: &Parlay) -> Analysis {
        self.analyzer.analyze(parlay)
    }

    /// Build one parlay from the snapshot and attach its analysis
    pub fn generate(
        &self,
        snapshot: &PropSnapshot,
        constraints: &ConstraintSet,
    ) -> Result<ParlayResponse> {
        self.generate_with_report(snapshot, constraints)
            .map(|(response, _)| response)
    }

    /// Like [`generate`](Self::generate), also returning search bookkeeping
    pub fn generate_with_report(
        &self,
        snapshot: &PropSnapshot,
        constraints: &ConstraintSet,
    ) -> Result<(ParlayResponse, BuildOutcome)> {
        check_sport(snapshot, constraints)?;
        debug!(
            "Generating {} parlay from snapshot of {} props",
            constraints.sport,
            snapshot.len()
        );

        let outcome = self
            .builder
            .build_with_report(snapshot.props(), constraints)?;
        let response = self.respond(outcome.parlay.clone());
        Ok((response, outcome))
    }

    /// Several de-duplicated parlays for the same constraints
    pub fn generate_slate(
        &self,
        snapshot: &PropSnapshot,
        constraints: &ConstraintSet,
        count: usize,
    ) -> Result<Vec<ParlayResponse>> {
        check_sport(snapshot, constraints)?;
        let parlays = self
            .builder
            .build_slate(snapshot.props(), constraints, count)?;
        Ok(parlays.into_iter().map(|p| self.respond(p)).collect())
    }

    fn respond(&self, parlay: Parlay) -> ParlayResponse {
        let analysis = self.analyzer.analyze(&parlay);
        ParlayResponse { parlay, analysis }
    }
}

fn check_sport(snapshot: &PropSnapshot, constraints: &ConstraintSet) -> Result<()> {
    if snapshot.sport() != constraints.sport {
        return Err(ParlayError::Validation(format!(
            "Constraints ask for {} but the snapshot holds {} props",
            constraints.sport,
            snapshot.sport()
        )));
    }
    Ok(())
}
