//! Board representation and the state API the planner drives.
//!
//! Contains positions and hex geometry, units and buildings, the read-only
//! catalog, action types, the `Battlefield` trait, and the in-memory board
//! that implements it.

pub mod action;
pub mod battlefield;
pub mod catalog;
pub mod geometry;
pub mod position;
pub mod state;
pub mod unit;

pub use action::{AbilityEffect, Action, ActionKind};
pub use battlefield::{apply_action, with_checkpoint, BoardError, Battlefield, CellQuery, SnapshotId};
pub use catalog::{
    AbilityKind, AbilitySpec, AiMode, AiProfile, Catalog, CatalogError, RangeMasks, Role,
    SkillSpec, UnitStats,
};
pub use geometry::{can_hit, can_hit_within_one_move, chessboard_distance, is_in_range, MAX_RING};
pub use position::{Position, SIX_SIDES};
pub use state::{BoardState, Layout, Terrain};
pub use unit::{
    AbilitySlot, Buffs, Building, BuildingKind, Relation, ReserveUnit, Side, Unit, UnitId,
    UnitKind,
};
