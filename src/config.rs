//! Search configuration.
//!
//! The data-specific rules of the game (board cap, summon costs, excluded
//! minion kinds) and the evaluator constants live here instead of being
//! inlined. Every field has a default, so a partial JSON object is a valid
//! configuration.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::board::UnitKind;

/// Errors raised while adjusting a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown option '{0}'")]
    UnknownOption(String),

    #[error("invalid value '{value}' for option '{name}'")]
    InvalidValue { name: String, value: String },

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Per-term multipliers of the holistic evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HolisticWeights {
    pub material: f32,
    pub proximity: f32,
    pub safety: f32,
    pub offense: f32,
    pub cohesion: f32,
}

impl Default for HolisticWeights {
    fn default() -> Self {
        HolisticWeights {
            material: 1.0,
            proximity: 1.0,
            safety: 1.0,
            offense: 1.0,
            cohesion: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Fielded (non-summoned) units a side may have before summoning stops.
    pub board_cap: usize,
    pub summon_cost: u32,
    /// Summon cost near the opponent's home.
    pub advance_cost: u32,
    /// Distance from the opponent's home inside which `advance_cost` applies.
    pub advance_radius: u32,
    /// Kinds left out of unit counts in the per-unit evaluator.
    pub minion_kinds: Vec<UnitKind>,
    /// Reach of structure attacks.
    pub structure_range: u32,
    pub cohesion_radius: u32,
    pub cohesion_penalty: f32,
    /// Largest cost bucket; dearer candidates are dropped.
    pub max_bucket: u32,
    /// Restore the board to its starting state when the search ends.
    pub exploratory: bool,
    pub weights: HolisticWeights,
    /// Pause range between paced playback steps, in milliseconds.
    pub pace_ms: Range<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            board_cap: 5,
            summon_cost: 2,
            advance_cost: 3,
            advance_radius: 3,
            minion_kinds: vec![2001],
            structure_range: 2,
            cohesion_radius: 2,
            cohesion_penalty: 5.0,
            max_bucket: 10,
            exploratory: true,
            weights: HolisticWeights::default(),
            pace_ms: 400..600,
        }
    }
}

impl SearchConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sets a single option by its protocol name.
    pub fn set_option(&mut self, name: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
        };
        let int = || value.parse::<u32>().map_err(|_| invalid());
        let float = || value.parse::<f32>().map_err(|_| invalid());

        match name {
            "BoardCap" => self.board_cap = int()? as usize,
            "SummonCost" => self.summon_cost = int()?,
            "AdvanceCost" => self.advance_cost = int()?,
            "AdvanceRadius" => self.advance_radius = int()?,
            "StructureRange" => self.structure_range = int()?,
            "CohesionRadius" => self.cohesion_radius = int()?,
            "MaxBucket" => self.max_bucket = int()?,
            "Exploratory" => self.exploratory = value.parse().map_err(|_| invalid())?,
            "MinionKinds" => {
                self.minion_kinds = value
                    .split(',')
                    .filter(|s| !s.is_empty())
                    .map(|s| s.trim().parse::<UnitKind>().map_err(|_| invalid()))
                    .collect::<Result<_, _>>()?
            }
            "MaterialWeight" => self.weights.material = float()?,
            "ProximityWeight" => self.weights.proximity = float()?,
            "SafetyWeight" => self.weights.safety = float()?,
            "OffenseWeight" => self.weights.offense = float()?,
            "CohesionWeight" => self.weights.cohesion = float()?,
            "PaceMs" => {
                let (lo, hi) = value.split_once("..").ok_or_else(invalid)?;
                let lo = lo.parse::<u64>().map_err(|_| invalid())?;
                let hi = hi.parse::<u64>().map_err(|_| invalid())?;
                if lo > hi {
                    return Err(invalid());
                }
                self.pace_ms = lo..hi;
            }
            _ => return Err(ConfigError::UnknownOption(name.to_string())),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_game_rules() {
        let c = SearchConfig::default();
        assert_eq!(c.board_cap, 5);
        assert_eq!((c.summon_cost, c.advance_cost, c.advance_radius), (2, 3, 3));
        assert_eq!(c.minion_kinds, vec![2001]);
        assert_eq!(c.max_bucket, 10);
        assert!(c.exploratory);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let c = SearchConfig::from_json(r#"{"max_bucket": 6, "weights": {"safety": 2.0}}"#).unwrap();
        assert_eq!(c.max_bucket, 6);
        assert_eq!(c.weights.safety, 2.0);
        assert_eq!(c.weights.material, 1.0);
        assert_eq!(c.board_cap, 5);
    }

    #[test]
    fn set_option_parses_values() {
        let mut c = SearchConfig::default();
        c.set_option("MaxBucket", "4").unwrap();
        c.set_option("MinionKinds", "2001,2002").unwrap();
        c.set_option("PaceMs", "0..5").unwrap();
        assert_eq!(c.max_bucket, 4);
        assert_eq!(c.minion_kinds, vec![2001, 2002]);
        assert_eq!(c.pace_ms, 0..5);
        assert!(matches!(
            c.set_option("MaxBucket", "lots"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            c.set_option("Nope", "1"),
            Err(ConfigError::UnknownOption(_))
        ));
    }
}
