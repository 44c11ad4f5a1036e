//! Synthetic prop feed
//!
//! Generate realistic prop pools for development and calibration tests when
//! no live feed is available. Output is a pure function of the seed.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::data::registry::PropRegistry;
use crate::models::{PlayerProp, Side, Sport};

/// Simulated games per prop; the hit rate is measured over these
const HISTORY_GAMES: usize = 20;

/// Trailing games kept as recent form
const RECENT_FORM_GAMES: usize = 5;

/// Prices seen on typical prop markets
const MARKET_ODDS: [i32; 6] = [-120, -115, -110, -105, 100, 105];

const FIRST_NAMES: [&str; 10] = [
    "Marcus", "Jalen", "Tyler", "Andre", "Cody", "Devin", "Luis", "Owen", "Trey", "Miles",
];

const LAST_NAMES: [&str; 10] = [
    "Bennett", "Carter", "Diaz", "Ellis", "Foster", "Grant", "Hayes", "Jordan", "Reed", "Walker",
];

fn teams(sport: Sport) -> &'static [&'static str] {
    match sport {
        Sport::Nfl => &["BUF", "KC", "PHI", "SF", "DAL", "MIA", "CIN", "DET"],
        Sport::Mlb => &["NYY", "LAD", "ATL", "HOU", "BOS", "SD", "SEA", "TOR"],
        Sport::Nba => &["BOS", "DEN", "LAL", "MIL", "PHX", "GSW", "DAL", "NYK"],
        Sport::Nhl => &["EDM", "COL", "BOS", "NYR", "TOR", "VGK", "FLA", "DAL"],
    }
}

/// Outdoor sports carry a weather factor
fn has_weather(sport: Sport) -> bool {
    matches!(sport, Sport::Nfl | Sport::Mlb)
}

/// Seeded synthetic prop generator
#[derive(Debug, Clone)]
pub struct SyntheticPropGenerator {
    seed: u64,
    registry: PropRegistry,
}

impl SyntheticPropGenerator {
    pub fn new(seed: u64) -> Self {
        Self::with_registry(seed, PropRegistry::default())
    }

    pub fn with_registry(seed: u64, registry: PropRegistry) -> Self {
        Self { seed, registry }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generate `count` props for `sport`, one per synthetic player.
    ///
    /// Each prop gets a hidden true hit probability; its hit rate and recent
    /// form come from simulated games, so higher-quality props score higher
    /// on average without scoring identically.
    pub fn generate(&self, sport: Sport, count: usize) -> Vec<PlayerProp> {
        let specs = self.registry.specs(sport);
        if specs.is_empty() {
            return Vec::new();
        }

        // Per-sport stream so pools for different sports are independent
        let stream = (sport as u64 + 1).wrapping_mul(0x9E37_79B9);
        let mut rng = StdRng::seed_from_u64(self.seed ^ stream);
        let teams = teams(sport);

        (0..count)
            .map(|i| {
                let spec = &specs[rng.gen_range(0..specs.len())];
                let team_idx = rng.gen_range(0..teams.len());
                let opp_idx = (team_idx + rng.gen_range(1..teams.len())) % teams.len();

                let true_rate: f64 = rng.gen_range(0.45..0.92);
                let games: Vec<bool> = (0..HISTORY_GAMES)
                    .map(|_| rng.gen_bool(true_rate))
                    .collect();
                let hits = games.iter().filter(|&&hit| hit).count().max(1);
                let recent_form = games[HISTORY_GAMES - RECENT_FORM_GAMES..].to_vec();

                let (low, high) = spec.line_range;
                let steps = (high - low).round() as usize;
                let line = low + rng.gen_range(0..=steps) as f64;

                let over_odds = *MARKET_ODDS.choose(&mut rng).unwrap_or(&-110);
                let under_odds = *MARKET_ODDS.choose(&mut rng).unwrap_or(&-110);

                let injury_factor = rng
                    .gen_bool(0.8)
                    .then(|| round2(rng.gen_range(0.7..=1.0)));
                let weather_factor = (has_weather(sport) && rng.gen_bool(0.7))
                    .then(|| round2(rng.gen_range(0.6..=1.0)));
                let matchup_factor = rng
                    .gen_bool(0.6)
                    .then(|| round2(rng.gen_range(0.3..=0.9)));

                PlayerProp {
                    player_name: player_name(i),
                    team: teams[team_idx].to_string(),
                    opponent: teams[opp_idx].to_string(),
                    prop_type: spec.prop_type.clone(),
                    line,
                    over_odds,
                    under_odds,
                    hit_rate: hits as f64 / HISTORY_GAMES as f64,
                    recent_form,
                    side: Side::Over,
                    injury_factor,
                    weather_factor,
                    matchup_factor,
                    confidence_score: None,
                    game_date: None,
                    position: None,
                }
            })
            .collect()
    }
}

impl Default for SyntheticPropGenerator {
    fn default() -> Self {
        Self::new(42)
    }
}

fn player_name(index: usize) -> String {
    let first = FIRST_NAMES[index % FIRST_NAMES.len()];
    let last = LAST_NAMES[(index / FIRST_NAMES.len()) % LAST_NAMES.len()];
    let cycle = index / (FIRST_NAMES.len() * LAST_NAMES.len());
    if cycle == 0 {
        format!("{} {}", first, last)
    } else {
        format!("{} {} {}", first, last, cycle + 1)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
