use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{self, validate_american_odds, validate_hit_rate, ParlayError};

/// Supported sports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sport {
    #[serde(alias = "nfl")]
    Nfl,
    #[serde(alias = "mlb")]
    Mlb,
    #[serde(alias = "nba")]
    Nba,
    #[serde(alias = "nhl")]
    Nhl,
}

impl Sport {
    pub const ALL: [Sport; 4] = [Sport::Nfl, Sport::Mlb, Sport::Nba, Sport::Nhl];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sport::Nfl => "NFL",
            Sport::Mlb => "MLB",
            Sport::Nba => "NBA",
            Sport::Nhl => "NHL",
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sport {
    type Err = ParlayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "NFL" => Ok(Sport::Nfl),
            "MLB" => Ok(Sport::Mlb),
            "NBA" => Ok(Sport::Nba),
            "NHL" => Ok(Sport::Nhl),
            other => Err(ParlayError::Validation(format!("Unknown sport: {}", other))),
        }
    }
}

/// Prop type, e.g. `passing_yards` or `hits`.
///
/// Open-ended: valid values per sport live in the prop registry, not in this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct PropType(String);

impl PropType {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for PropType {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<PropType> for String {
    fn from(prop_type: PropType) -> Self {
        prop_type.0
    }
}

impl fmt::Display for PropType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Side of a prop line
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Over,
    Under,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Over => f.write_str("over"),
            Side::Under => f.write_str("under"),
        }
    }
}

/// Player prop candidate from the data feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProp {
    pub player_name: String,
    pub team: String,
    pub opponent: String,
    pub prop_type: PropType,
    pub line: f64,
    pub over_odds: i32,
    pub under_odds: i32,
    /// Historical fraction of games the line was cleared on `side`
    pub hit_rate: f64,
    /// Most recent game last
    #[serde(default)]
    pub recent_form: Vec<bool>,
    #[serde(default)]
    pub side: Side,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub injury_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matchup_factor: Option<f64>,
    /// Pre-computed score from the feed; computed by the scorer when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

impl PlayerProp {
    /// Identity of the prop within a parlay
    pub fn key(&self) -> LegKey {
        LegKey {
            player: self.player_name.clone(),
            prop_type: self.prop_type.clone(),
        }
    }

    /// Hit rate in (0, 1] and a defined price on both sides
    pub fn validate(&self) -> error::Result<()> {
        validate_hit_rate(self.hit_rate)?;
        validate_american_odds(self.over_odds)?;
        validate_american_odds(self.under_odds)
    }

    pub fn odds_for(&self, side: Side) -> i32 {
        match side {
            Side::Over => self.over_odds,
            Side::Under => self.under_odds,
        }
    }

    /// Odds of the side the hit rate was measured on
    pub fn selected_odds(&self) -> i32 {
        self.odds_for(self.side)
    }

    /// Fraction of hits over the recent-form window, `None` when the window is empty
    pub fn recent_form_rate(&self) -> Option<f64> {
        if self.recent_form.is_empty() {
            return None;
        }
        let hits = self.recent_form.iter().filter(|&&hit| hit).count();
        Some(hits as f64 / self.recent_form.len() as f64)
    }

    /// Bernoulli variance p(1-p) of the recent-form window.
    ///
    /// An empty window counts as maximally inconsistent (0.25).
    pub fn recent_form_variance(&self) -> f64 {
        match self.recent_form_rate() {
            Some(p) => p * (1.0 - p),
            None => 0.25,
        }
    }
}

/// (player, prop type) pair; unique within one parlay
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LegKey {
    pub player: String,
    pub prop_type: PropType,
}

/// Prop annotated with its confidence score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredProp {
    pub prop: PlayerProp,
    pub confidence: f64,
}

impl ScoredProp {
    pub fn hit_rate(&self) -> f64 {
        self.prop.hit_rate
    }

    pub fn key(&self) -> LegKey {
        self.prop.key()
    }
}

/// One selected side of one prop within a parlay
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParlayLeg {
    pub prop: PlayerProp,
    pub selection: Side,
    pub odds: i32,
    pub confidence: f64,
}

impl ParlayLeg {
    pub fn from_scored(scored: &ScoredProp) -> Self {
        Self {
            prop: scored.prop.clone(),
            selection: scored.prop.side,
            odds: scored.prop.selected_odds(),
            confidence: scored.confidence,
        }
    }

    pub fn hit_rate(&self) -> f64 {
        self.prop.hit_rate
    }

    pub fn key(&self) -> LegKey {
        self.prop.key()
    }
}

/// Named confidence bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    #[serde(alias = "unranked")]
    Unranked,
    #[serde(alias = "free")]
    Free,
    #[serde(alias = "premium")]
    Premium,
    #[serde(rename = "GOAT", alias = "goat")]
    Goat,
}

impl Tier {
    pub const RANKED: [Tier; 3] = [Tier::Free, Tier::Premium, Tier::Goat];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Unranked => "Unranked",
            Tier::Free => "Free",
            Tier::Premium => "Premium",
            Tier::Goat => "GOAT",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = ParlayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "free" => Ok(Tier::Free),
            "premium" => Ok(Tier::Premium),
            "goat" => Ok(Tier::Goat),
            other => Err(ParlayError::Validation(format!("Unknown tier: {}", other))),
        }
    }
}

/// Finished parlay. Built once per request by the builder, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parlay {
    tier: Tier,
    sport: Sport,
    legs: Vec<ParlayLeg>,
    total_odds: i32,
    expected_payout: f64,
    overall_confidence: f64,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<String>,
}

impl Parlay {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        tier: Tier,
        sport: Sport,
        legs: Vec<ParlayLeg>,
        total_odds: i32,
        expected_payout: f64,
        overall_confidence: f64,
        description: String,
        note: Option<String>,
    ) -> Self {
        Self {
            tier,
            sport,
            legs,
            total_odds,
            expected_payout,
            overall_confidence,
            description,
            note,
        }
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn sport(&self) -> Sport {
        self.sport
    }

    pub fn legs(&self) -> &[ParlayLeg] {
        &self.legs
    }

    pub fn total_odds(&self) -> i32 {
        self.total_odds
    }

    pub fn expected_payout(&self) -> f64 {
        self.expected_payout
    }

    pub fn overall_confidence(&self) -> f64 {
        self.overall_confidence
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn players(&self) -> impl Iterator<Item = &str> {
        self.legs.iter().map(|leg| leg.prop.player_name.as_str())
    }
}

/// Risk label derived from expected hit rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskAssessment {
    #[serde(rename = "Low Risk")]
    Low,
    #[serde(rename = "Moderate Risk")]
    Moderate,
    #[serde(rename = "High Risk")]
    High,
}

impl fmt::Display for RiskAssessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskAssessment::Low => f.write_str("Low Risk"),
            RiskAssessment::Moderate => f.write_str("Moderate Risk"),
            RiskAssessment::High => f.write_str("High Risk"),
        }
    }
}

/// Post-hoc summary attached to a parlay
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub avg_confidence: f64,
    pub expected_hit_rate: f64,
    pub risk_assessment: RiskAssessment,
    pub recommendation: String,
}

/// Parlay plus analysis, as handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParlayResponse {
    pub parlay: Parlay,
    pub analysis: Analysis,
}
