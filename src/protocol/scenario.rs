//! Scenario files.
//!
//! A scenario is a JSON document describing a complete position: grid size,
//! terrain, the catalog, pieces on the board, reserves, ability slots and
//! whose turn it is. `position <path>` loads one into the engine.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::board::{
    AbilitySlot, AbilitySpec, BoardError, BoardState, Building, Catalog, CatalogError, Position,
    ReserveUnit,
    Side, SkillSpec, Terrain, UnitKind, UnitStats,
};

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("cannot read scenario: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid scenario JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error("invalid grid size {width}x{height}")]
    InvalidSize { width: i32, height: i32 },

    #[error("cannot place {what} at {pos}: {source}")]
    Placement {
        what: &'static str,
        pos: Position,
        #[source]
        source: BoardError,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogSpec {
    pub units: Vec<UnitStats>,
    pub skills: Vec<SkillSpec>,
    pub abilities: Vec<AbilitySpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnitSpec {
    pub side: Side,
    pub kind: UnitKind,
    pub pos: Position,
    /// Starting health; full health when absent.
    #[serde(default)]
    pub hp: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PerSide<T> {
    pub red: Vec<T>,
    pub blue: Vec<T>,
}

impl<T> Default for PerSide<T> {
    fn default() -> Self {
        PerSide {
            red: Vec::new(),
            blue: Vec::new(),
        }
    }
}

impl<T> PerSide<T> {
    fn each(&self) -> impl Iterator<Item = (Side, &T)> {
        self.red
            .iter()
            .map(|t| (Side::Red, t))
            .chain(self.blue.iter().map(|t| (Side::Blue, t)))
    }
}

/// The JSON shape of a scenario file.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub walls: Vec<Position>,
    #[serde(default)]
    pub water: Vec<Position>,
    #[serde(default)]
    pub spawns: PerSide<Position>,
    #[serde(default = "red")]
    pub active: Side,
    #[serde(default)]
    pub action_points: u32,
    pub catalog: CatalogSpec,
    #[serde(default)]
    pub units: Vec<UnitSpec>,
    #[serde(default)]
    pub buildings: Vec<Building>,
    #[serde(default)]
    pub reserves: PerSide<ReserveUnit>,
    #[serde(default)]
    pub abilities: PerSide<AbilitySlot>,
}

fn red() -> Side {
    Side::Red
}

impl Scenario {
    /// Builds the in-memory board this scenario describes.
    pub fn build(self) -> Result<BoardState, ScenarioError> {
        if self.width <= 0 || self.height <= 0 {
            return Err(ScenarioError::InvalidSize {
                width: self.width,
                height: self.height,
            });
        }
        let catalog = Catalog::new(self.catalog.units, self.catalog.skills, self.catalog.abilities);
        catalog.validate()?;
        let catalog = Arc::new(catalog);
        let mut board = BoardState::new(self.width, self.height, catalog);

        let terrain = self
            .walls
            .iter()
            .map(|&p| (p, Terrain::Wall))
            .chain(self.water.iter().map(|&p| (p, Terrain::Water)))
            .chain(self.spawns.each().map(|(side, &p)| (p, Terrain::Spawn(side))));
        for (pos, t) in terrain {
            if !board.in_bounds(pos) {
                return Err(ScenarioError::Placement {
                    what: "terrain",
                    pos,
                    source: BoardError::OutOfBounds(pos),
                });
            }
            board.set_terrain(pos, t);
        }

        for building in self.buildings {
            let pos = building.pos;
            board
                .place_building(building)
                .map_err(|source| ScenarioError::Placement { what: "building", pos, source })?;
        }

        for spec in &self.units {
            let id = board
                .place_unit(spec.side, spec.kind, spec.pos)
                .map_err(|source| ScenarioError::Placement {
                    what: "unit",
                    pos: spec.pos,
                    source,
                })?;
            if let (Some(hp), Some(unit)) = (spec.hp, board.unit_mut(id)) {
                unit.hp = hp.clamp(1, unit.max_hp);
            }
        }

        for (side, r) in self.reserves.each() {
            board.add_reserve(side, r.kind, r.unlocked);
        }
        for (side, slot) in self.abilities.each() {
            board.add_ability(side, slot.id, slot.cooldown);
        }

        board.set_turn(self.active, self.action_points);
        tracing::debug!(
            width = self.width,
            height = self.height,
            units = self.units.len(),
            "scenario built"
        );
        Ok(board)
    }
}

/// Parses a scenario from JSON text and builds its board.
pub fn parse_scenario(json: &str) -> Result<BoardState, ScenarioError> {
    let scenario: Scenario = serde_json::from_str(json)?;
    scenario.build()
}

/// Reads and builds the scenario at `path`.
pub fn load_scenario(path: impl AsRef<Path>) -> Result<BoardState, ScenarioError> {
    let text = fs::read_to_string(path)?;
    parse_scenario(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Battlefield;

    const DUEL: &str = r#"{
        "width": 5,
        "height": 4,
        "walls": [{"x": 2, "y": 0}],
        "spawns": {"red": [{"x": 0, "y": 0}]},
        "active": "blue",
        "action_points": 4,
        "catalog": {
            "units": [{"kind": 1001, "max_hp": 6, "attack": 2, "skill": 1,
                       "profile": {"mode": "tank", "protect_weight": 10.0}}],
            "skills": [{"id": 1, "masks": {"enemy": 2}}],
            "abilities": [{"id": 101, "kind": "heal", "amount": 3}]
        },
        "units": [
            {"side": "red", "kind": 1001, "pos": {"x": 1, "y": 1}},
            {"side": "blue", "kind": 1001, "pos": {"x": 2, "y": 1}, "hp": 3}
        ],
        "buildings": [{"id": 1, "kind": "home", "side": "red", "pos": {"x": 0, "y": 2},
                       "hp": 20, "max_hp": 20, "attack": 2}],
        "reserves": {"blue": [{"kind": 1001}]},
        "abilities": {"red": [{"id": 101, "cooldown": 1}]}
    }"#;

    #[test]
    fn builds_the_described_board() {
        let board = parse_scenario(DUEL).unwrap();
        assert_eq!(board.active_side(), Side::Blue);
        assert_eq!(board.action_points(), 4);
        assert!(!board.is_cell_walkable(Position::new(2, 0)));
        assert_eq!(board.terrain(Position::new(0, 0)), Some(Terrain::Spawn(Side::Red)));

        let foe = board.unit_at(Position::new(2, 1)).unwrap();
        assert_eq!(foe.side, Side::Blue);
        assert_eq!((foe.hp, foe.max_hp), (3, 6));
        assert_eq!(board.unit_at(Position::new(1, 1)).unwrap().hp, 6);

        let layout = board.layout();
        assert_eq!(layout.buildings.len(), 1);
        assert_eq!(layout.reserves[Side::Blue.index()], vec![ReserveUnit { kind: 1001, unlocked: true }]);
        assert_eq!(layout.abilities[Side::Red.index()], vec![AbilitySlot { id: 101, cooldown: 1 }]);
    }

    #[test]
    fn reserves_and_abilities_load_for_both_sides() {
        let json = r#"{"width": 4, "height": 4, "active": "red", "action_points": 3,
            "catalog": {"units": [{"kind": 7, "max_hp": 5, "attack": 1, "skill": 1},
                                  {"kind": 8, "max_hp": 9, "attack": 3, "skill": 1}]},
            "reserves": {
                "red": [{"kind": 7}, {"kind": 8, "unlocked": false}],
                "blue": [{"kind": 8}]
            },
            "abilities": {
                "red": [{"id": 101, "cooldown": 2}],
                "blue": [{"id": 102, "cooldown": 1}, {"id": 101, "cooldown": 3}]
            }}"#;
        let board = parse_scenario(json).unwrap();
        let layout = board.layout();
        assert_eq!(
            layout.reserves[Side::Red.index()],
            vec![
                ReserveUnit { kind: 7, unlocked: true },
                ReserveUnit { kind: 8, unlocked: false }
            ]
        );
        assert_eq!(layout.reserves[Side::Blue.index()], vec![ReserveUnit { kind: 8, unlocked: true }]);
        assert_eq!(layout.abilities[Side::Red.index()], vec![AbilitySlot { id: 101, cooldown: 2 }]);
        assert_eq!(
            layout.abilities[Side::Blue.index()],
            vec![AbilitySlot { id: 102, cooldown: 1 }, AbilitySlot { id: 101, cooldown: 3 }]
        );
    }

    #[test]
    fn rejects_units_without_health() {
        let json = r#"{"width": 3, "height": 3,
            "catalog": {"units": [{"kind": 7, "max_hp": 0, "attack": 1, "skill": 1}]}}"#;
        assert!(matches!(
            parse_scenario(json),
            Err(ScenarioError::Catalog(CatalogError::InvalidHealth { kind: 7, max_hp: 0 }))
        ));
    }

    #[test]
    fn rejects_bad_json() {
        assert!(matches!(parse_scenario("{"), Err(ScenarioError::Json(_))));
        assert!(matches!(parse_scenario(r#"{"width": 3}"#), Err(ScenarioError::Json(_))));
    }

    #[test]
    fn rejects_empty_grid() {
        let json = r#"{"width": 0, "height": 3, "catalog": {}}"#;
        assert!(matches!(
            parse_scenario(json),
            Err(ScenarioError::InvalidSize { width: 0, height: 3 })
        ));
    }

    #[test]
    fn rejects_unknown_kind_and_blocked_cells() {
        let unknown = r#"{"width": 3, "height": 3, "catalog": {},
            "units": [{"side": "red", "kind": 9, "pos": {"x": 1, "y": 1}}]}"#;
        match parse_scenario(unknown) {
            Err(ScenarioError::Placement { what: "unit", source, .. }) => {
                assert_eq!(source, BoardError::Catalog(CatalogError::UnknownUnit(9)));
            }
            other => panic!("expected a placement error, got {:?}", other.map(|_| ())),
        }

        let off_board = r#"{"width": 3, "height": 3, "catalog": {},
            "walls": [{"x": 5, "y": 1}]}"#;
        assert!(matches!(
            parse_scenario(off_board),
            Err(ScenarioError::Placement { what: "terrain", .. })
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            load_scenario("/nonexistent/scenario.json"),
            Err(ScenarioError::Io(_))
        ));
    }
}
