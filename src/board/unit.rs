//! Units, buildings, sides, and status buffs.
//!
//! Represents the pieces on the board, their owning side, and the reserve
//! units waiting to be brought onto the board.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::position::Position;

/// One of the two opposing sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Red,
    Blue,
}

impl Side {
    pub const fn opponent(self) -> Side {
        match self {
            Side::Red => Side::Blue,
            Side::Blue => Side::Red,
        }
    }

    /// Index into per-side arrays.
    pub const fn index(self) -> usize {
        match self {
            Side::Red => 0,
            Side::Blue => 1,
        }
    }
}

/// Which cells a skill or range check is aimed at, relative to the caster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    Friend,
    Enemy,
    Neutral,
    EnemyAndNeutral,
    Any,
}

bitflags! {
    /// Status effects currently applied to a unit.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Buffs: u8 {
        const STUNNED  = 1 << 0;
        const ROOTED   = 1 << 1;
        const SILENCED = 1 << 2;
        const HASTED   = 1 << 3;
        const GILDED   = 1 << 4;
        const BURNING  = 1 << 5;
    }
}

/// Stable handle for a unit, unchanged as the unit moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub u32);

/// Catalog key for a kind of unit.
pub type UnitKind = u32;

/// A unit fielded on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub kind: UnitKind,
    pub side: Side,
    pub pos: Position,
    pub hp: i32,
    pub max_hp: i32,
    pub attack: i32,
    pub move_points: u32,
    pub skill_points: u32,
    pub buffs: Buffs,
    /// Spawned by an effect rather than brought in from the reserve.
    pub summoned: bool,
}

impl Unit {
    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Can be targeted by damage (not under the gold shield).
    pub fn is_attackable(&self) -> bool {
        self.is_alive() && !self.buffs.contains(Buffs::GILDED)
    }

    /// Can still reposition this turn.
    pub fn can_move(&self) -> bool {
        self.move_points > 0 && !self.buffs.intersects(Buffs::STUNNED | Buffs::ROOTED)
    }

    /// Can still cast its skill this turn.
    pub fn can_cast(&self) -> bool {
        self.skill_points > 0 && !self.buffs.intersects(Buffs::STUNNED | Buffs::SILENCED)
    }

    /// Relation of `other` as seen from this unit's side.
    pub fn relation_to(&self, other: Option<Side>) -> Relation {
        relation_between(self.side, other)
    }
}

/// Relation of a piece owned by `other` as seen from `side`.
pub fn relation_between(side: Side, other: Option<Side>) -> Relation {
    match other {
        Some(o) if o == side => Relation::Friend,
        Some(_) => Relation::Enemy,
        None => Relation::Neutral,
    }
}

/// The role of a building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildingKind {
    /// The side's main structure.
    Home,
    Tower,
    /// Unowned turret that damages anything nearby.
    Turret,
}

/// A fixed structure. Neutral turrets have no side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Building {
    pub id: u32,
    pub kind: BuildingKind,
    pub side: Option<Side>,
    pub pos: Position,
    pub hp: i32,
    pub max_hp: i32,
    pub attack: i32,
}

impl Building {
    pub fn is_standing(&self) -> bool {
        self.hp > 0
    }
}

/// A unit waiting off-board to be summoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReserveUnit {
    pub kind: UnitKind,
    #[serde(default = "unlocked_default")]
    pub unlocked: bool,
}

fn unlocked_default() -> bool {
    true
}

/// A side-wide special ability and its current cooldown counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AbilitySlot {
    pub id: u32,
    pub cooldown: u32,
}
