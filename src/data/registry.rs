//! Prop registry: sport → valid prop types with their default lines
//!
//! Adding a sport or a market is a data change: extend the built-in table or
//! load a TOML registry with [`PropRegistry::from_toml_str`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{ParlayError, Result};
use crate::models::{PropType, Sport};

/// One market offered for a sport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropSpec {
    pub prop_type: PropType,
    /// Line used when a feed row omits one
    pub default_line: f64,
    /// Typical (low, high) range of posted lines
    pub line_range: (f64, f64),
}

impl PropSpec {
    pub fn new(prop_type: &str, default_line: f64, line_range: (f64, f64)) -> Self {
        Self {
            prop_type: PropType::new(prop_type),
            default_line,
            line_range,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropRegistry {
    sports: BTreeMap<Sport, Vec<PropSpec>>,
}

impl PropRegistry {
    pub fn empty() -> Self {
        Self {
            sports: BTreeMap::new(),
        }
    }

    /// Parse a registry table, e.g.
    ///
    /// ```toml
    /// [[NBA]]
    /// prop_type = "steals"
    /// default_line = 1.5
    /// line_range = [0.5, 2.5]
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let registry: Self = toml::from_str(content)
            .map_err(|e| ParlayError::Config(format!("Invalid prop registry: {}", e)))?;
        for specs in registry.sports.values() {
            for spec in specs {
                let (low, high) = spec.line_range;
                if !(low <= high && spec.default_line.is_finite()) {
                    return Err(ParlayError::Config(format!(
                        "Invalid line range for {}: {}..{}",
                        spec.prop_type, low, high
                    )));
                }
            }
        }
        Ok(registry)
    }

    /// Add or replace a market for a sport
    pub fn register(&mut self, sport: Sport, spec: PropSpec) {
        let specs = self.sports.entry(sport).or_default();
        match specs.iter_mut().find(|s| s.prop_type == spec.prop_type) {
            Some(existing) => *existing = spec,
            None => specs.push(spec),
        }
    }

    pub fn sports(&self) -> impl Iterator<Item = Sport> + '_ {
        self.sports.keys().copied()
    }

    pub fn specs(&self, sport: Sport) -> &[PropSpec] {
        self.sports.get(&sport).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn prop_types(&self, sport: Sport) -> impl Iterator<Item = &PropType> + '_ {
        self.specs(sport).iter().map(|s| &s.prop_type)
    }

    pub fn spec(&self, sport: Sport, prop_type: &PropType) -> Option<&PropSpec> {
        self.specs(sport).iter().find(|s| &s.prop_type == prop_type)
    }

    pub fn is_valid(&self, sport: Sport, prop_type: &PropType) -> bool {
        self.spec(sport, prop_type).is_some()
    }

    pub fn default_line(&self, sport: Sport, prop_type: &PropType) -> Option<f64> {
        self.spec(sport, prop_type).map(|s| s.default_line)
    }
}

impl Default for PropRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();

        let table: [(Sport, &[(&str, f64, (f64, f64))]); 4] = [
            (
                Sport::Nfl,
                &[
                    ("passing_yards", 249.5, (225.5, 300.5)),
                    ("passing_touchdowns", 1.5, (1.5, 2.5)),
                    ("rushing_yards", 49.5, (40.5, 120.5)),
                    ("rushing_touchdowns", 0.5, (0.5, 1.5)),
                    ("receiving_yards", 49.5, (40.5, 90.5)),
                    ("receptions", 3.5, (3.5, 8.5)),
                ],
            ),
            (
                Sport::Mlb,
                &[
                    ("hits", 0.5, (0.5, 1.5)),
                    ("home_runs", 0.5, (0.5, 0.5)),
                    ("rbis", 0.5, (0.5, 1.5)),
                    ("strikeouts", 5.5, (4.5, 9.5)),
                    ("total_bases", 1.5, (1.5, 3.5)),
                ],
            ),
            (
                Sport::Nba,
                &[
                    ("points", 19.5, (10.5, 32.5)),
                    ("rebounds", 7.5, (3.5, 12.5)),
                    ("assists", 4.5, (2.5, 10.5)),
                    ("three_pointers", 2.5, (1.5, 4.5)),
                ],
            ),
            (
                Sport::Nhl,
                &[
                    ("goals", 0.5, (0.5, 0.5)),
                    ("assists", 0.5, (0.5, 1.5)),
                    ("points", 0.5, (0.5, 1.5)),
                    ("shots_on_goal", 2.5, (1.5, 4.5)),
                    ("saves", 27.5, (22.5, 32.5)),
                ],
            ),
        ];

        for (sport, specs) in table {
            for &(prop_type, line, range) in specs {
                registry.register(sport, PropSpec::new(prop_type, line, range));
            }
        }

        registry
    }
}
