//! The transactional board API the planner drives.
//!
//! Everything the search needs from the game is expressed through the
//! `Battlefield` trait: read-only lookups, mutation primitives, and an
//! indexed snapshot stack. Every exploratory mutation is bracketed by
//! `with_checkpoint`, which restores the recorded snapshot on all exit paths.

use std::fmt;

use super::action::{AbilityEffect, Action, ActionKind};
use super::catalog::{AbilityKind, AbilitySpec, Catalog, CatalogError};
use super::position::Position;
use super::unit::{AbilitySlot, Building, BuildingKind, ReserveUnit, Side, Unit, UnitId, UnitKind};

/// Errors returned by board mutation primitives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("no unit at {0}")]
    NoUnitAt(Position),

    #[error("cell {0} is blocked or occupied")]
    CellBlocked(Position),

    #[error("cell {0} is off the board")]
    OutOfBounds(Position),

    #[error("need {needed} action points, {available} left")]
    InsufficientPoints { needed: u32, available: u32 },

    #[error("unit kind {0} is not available in the reserve")]
    NotInReserve(UnitKind),

    #[error("ability {0} is not available to this side")]
    AbilityUnavailable(u32),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("snapshot {0} was never recorded or has been released")]
    UnknownSnapshot(SnapshotId),
}

impl BoardError {
    /// Recoverable errors skip a single candidate or step; the rest abort
    /// the whole search.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, BoardError::UnknownSnapshot(_))
    }
}

/// Index of a recorded snapshot on the board's snapshot stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SnapshotId(pub usize);

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The cell sets the board can enumerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellQuery {
    /// Cells the unit at `from` can walk to.
    Move,
    /// Cells the unit at `from` can cast its skill on.
    CastSkill,
    /// Cells able to receive a summon for the active side.
    SummonTarget,
    /// Destinations of the ability currently in targeting mode.
    AbilityTarget,
}

/// Read/write access to a game board.
pub trait Battlefield {
    fn catalog(&self) -> &Catalog;
    fn active_side(&self) -> Side;
    fn action_points(&self) -> u32;
    fn spend_action_points(&mut self, points: u32) -> Result<(), BoardError>;

    fn units(&self) -> &[Unit];
    fn buildings(&self) -> &[Building];
    fn reserve(&self, side: Side) -> &[ReserveUnit];
    fn abilities(&self, side: Side) -> &[AbilitySlot];

    fn record_snapshot(&mut self) -> SnapshotId;
    /// Restores the state recorded at `id`. With `purge_newer`, snapshots
    /// recorded after `id` are dropped.
    fn restore_snapshot(&mut self, id: SnapshotId, purge_newer: bool) -> Result<(), BoardError>;
    /// Releases `id` and every snapshot recorded after it.
    fn clear_snapshot(&mut self, id: SnapshotId) -> Result<(), BoardError>;

    fn query_cells(&self, query: CellQuery, from: Position) -> Vec<Position>;

    fn apply_move(&mut self, from: Position, to: Position) -> Result<(), BoardError>;
    fn undo_move(&mut self, from: Position, to: Position) -> Result<(), BoardError>;
    fn apply_skill(
        &mut self,
        from: Position,
        target: Position,
        exploratory: bool,
    ) -> Result<(), BoardError>;
    fn apply_summon(&mut self, side: Side, kind: UnitKind, to: Position) -> Result<(), BoardError>;
    /// Enters the ability's targeting mode for the unit at `actor`. Legal
    /// destinations are then read with `CellQuery::AbilityTarget`.
    fn invoke_ability(&mut self, ability: u32, side: Side, actor: Position)
        -> Result<(), BoardError>;
    fn apply_ability(
        &mut self,
        ability: u32,
        side: Side,
        effect: AbilityEffect,
    ) -> Result<(), BoardError>;

    fn is_cell_walkable(&self, pos: Position) -> bool;
    fn is_line_blocked(&self, from: Position, to: Position) -> bool;
    fn is_cell_receivable(&self, pos: Position, side: Side) -> bool;

    fn unit_at(&self, pos: Position) -> Option<&Unit> {
        self.units().iter().find(|u| u.pos == pos)
    }

    fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units().iter().find(|u| u.id == id)
    }

    fn building_at(&self, pos: Position) -> Option<&Building> {
        self.buildings().iter().find(|b| b.pos == pos)
    }

    /// The side's main structure: its first `Home` building.
    fn home(&self, side: Side) -> Option<&Building> {
        self.buildings()
            .iter()
            .find(|b| b.side == Some(side) && b.kind == BuildingKind::Home)
    }

    fn is_occupied(&self, pos: Position) -> bool {
        self.unit_at(pos).is_some() || self.building_at(pos).is_some()
    }

    /// Units of `side` that came from the reserve (not effect summons).
    fn fielded_heroes(&self, side: Side) -> usize {
        self.units()
            .iter()
            .filter(|u| u.side == side && !u.summoned && u.is_alive())
            .count()
    }

    /// The first slot of `side` whose catalog entry is of `kind`.
    fn ability_slot(&self, side: Side, kind: AbilityKind) -> Option<(AbilitySlot, AbilitySpec)> {
        self.abilities(side).iter().find_map(|slot| {
            self.catalog()
                .ability(slot.id)
                .ok()
                .filter(|spec| spec.kind == kind)
                .map(|spec| (*slot, spec))
        })
    }
}

/// Runs `f` against the board and restores the state recorded beforehand,
/// whether `f` succeeds or fails. The checkpoint is released afterwards.
pub fn with_checkpoint<B, T, F>(board: &mut B, f: F) -> Result<T, BoardError>
where
    B: Battlefield + ?Sized,
    F: FnOnce(&mut B) -> Result<T, BoardError>,
{
    let id = board.record_snapshot();
    let out = f(board);
    board.restore_snapshot(id, true)?;
    board.clear_snapshot(id)?;
    out
}

/// Applies `action` for the active side and charges its point cost.
///
/// The cost is checked before anything is mutated, so a rejected action
/// leaves the board untouched. `exploratory` is forwarded to skill casts so
/// real playback can run the board's side-effect hooks.
pub fn apply_action<B>(board: &mut B, action: &Action, exploratory: bool) -> Result<(), BoardError>
where
    B: Battlefield + ?Sized,
{
    let available = board.action_points();
    if action.cost > available {
        return Err(BoardError::InsufficientPoints {
            needed: action.cost,
            available,
        });
    }
    let side = board.active_side();
    match action.kind {
        ActionKind::NoOp => return Ok(()),
        ActionKind::Summon { kind, to } => board.apply_summon(side, kind, to)?,
        ActionKind::Move { from, to } => board.apply_move(from, to)?,
        ActionKind::Skill { from, target } => board.apply_skill(from, target, exploratory)?,
        ActionKind::Ability { ability, effect } => board.apply_ability(ability, side, effect)?,
    }
    board.spend_action_points(action.cost)
}
