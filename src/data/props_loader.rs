//! Prop feed JSON loading
//!
//! A feed file is either a bare array of prop records or an object carrying
//! the sport alongside them:
//!
//! ```json
//! { "sport": "NFL", "generated_at": "...", "props": [ { "player_name": ... } ] }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::data::registry::PropRegistry;
use crate::error::{ParlayError, Result};
use crate::models::{PlayerProp, PropType, Side, Sport};

/// One prop row as it appears in a feed file; `line` may be omitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropRecord {
    pub player_name: String,
    pub team: String,
    pub opponent: String,
    pub prop_type: PropType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<f64>,
    pub over_odds: i32,
    pub under_odds: i32,
    pub hit_rate: f64,
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
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

impl From<PlayerProp> for PropRecord {
    fn from(p: PlayerProp) -> Self {
        Self {
            player_name: p.player_name,
            team: p.team,
            opponent: p.opponent,
            prop_type: p.prop_type,
            line: Some(p.line),
            over_odds: p.over_odds,
            under_odds: p.under_odds,
            hit_rate: p.hit_rate,
            recent_form: p.recent_form,
            side: p.side,
            injury_factor: p.injury_factor,
            weather_factor: p.weather_factor,
            matchup_factor: p.matchup_factor,
            confidence_score: p.confidence_score,
            game_date: p.game_date,
            position: p.position,
        }
    }
}

/// Feed file with its sport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropFeed {
    pub sport: Sport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    pub props: Vec<PropRecord>,
}

/// Load a feed file for `sport`
pub fn load_props<P: AsRef<Path>>(
    path: P,
    sport: Sport,
    registry: &PropRegistry,
) -> Result<Vec<PlayerProp>> {
    let path = path.as_ref();
    debug!("Loading props from {}", path.display());
    let content = fs::read_to_string(path)?;
    parse_props(&content, sport, registry)
}

/// Parse feed JSON into validated props.
///
/// Records whose prop type the registry does not list for `sport` are
/// skipped; a record with an invalid hit rate or odds fails the whole feed.
pub fn parse_props(
    content: &str,
    sport: Sport,
    registry: &PropRegistry,
) -> Result<Vec<PlayerProp>> {
    let records: Vec<PropRecord> = if content.trim_start().starts_with('{') {
        let feed: PropFeed = serde_json::from_str(content)?;
        if feed.sport != sport {
            return Err(ParlayError::Validation(format!(
                "Feed is for {}, expected {}",
                feed.sport, sport
            )));
        }
        feed.props
    } else {
        serde_json::from_str(content)?
    };

    let total = records.len();
    let mut props = Vec::with_capacity(total);
    for (index, record) in records.into_iter().enumerate() {
        if let Some(prop) = to_player_prop(index, record, sport, registry)? {
            props.push(prop);
        }
    }

    debug!("Loaded {} of {} {} props", props.len(), total, sport);
    Ok(props)
}

fn to_player_prop(
    index: usize,
    record: PropRecord,
    sport: Sport,
    registry: &PropRegistry,
) -> Result<Option<PlayerProp>> {
    let spec = match registry.spec(sport, &record.prop_type) {
        Some(spec) => spec,
        None => {
            warn!(
                "Skipping record {} ({}): {} is not a {} prop",
                index, record.player_name, record.prop_type, sport
            );
            return Ok(None);
        }
    };

    let location = format!("record {} ({})", index, record.player_name);

    let prop = PlayerProp {
        line: record.line.unwrap_or(spec.default_line),
        player_name: record.player_name,
        team: record.team,
        opponent: record.opponent,
        prop_type: record.prop_type,
        over_odds: record.over_odds,
        under_odds: record.under_odds,
        hit_rate: record.hit_rate,
        recent_form: record.recent_form,
        side: record.side,
        injury_factor: record.injury_factor,
        weather_factor: record.weather_factor,
        matchup_factor: record.matchup_factor,
        confidence_score: record.confidence_score,
        game_date: record.game_date,
        position: record.position,
    };
    prop.validate().map_err(|e| e.context(location))?;

    Ok(Some(prop))
}

/// Write a feed file
pub fn save_props<P: AsRef<Path>>(path: P, feed: &PropFeed) -> Result<()> {
    let content = serde_json::to_string_pretty(feed)?;
    fs::write(path.as_ref(), content)?;
    Ok(())
}
