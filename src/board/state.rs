//! In-memory board.
//!
//! `BoardState` implements `Battlefield` over a rectangular hex grid. The
//! mutable part of the game lives in a `Layout`; snapshots are a stack of
//! cloned layouts, so restoring is a `clone_from` and the terrain and catalog
//! are never copied.

use std::collections::VecDeque;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::action::AbilityEffect;
use super::battlefield::{BoardError, Battlefield, CellQuery, SnapshotId};
use super::catalog::{AbilityKind, Catalog, SkillSpec};
use super::geometry::{chessboard_distance, hex_line, is_in_range, MAX_RING};
use super::position::{Position, SIX_SIDES};
use super::unit::{
    relation_between, AbilitySlot, Buffs, Building, BuildingKind, ReserveUnit, Relation, Side,
    Unit, UnitId, UnitKind,
};

/// What a cell is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    #[default]
    Plain,
    /// Blocks movement and line of sight.
    Wall,
    /// Blocks movement only.
    Water,
    /// Walkable cell that receives the side's summons.
    Spawn(Side),
}

impl Terrain {
    pub const fn is_walkable(self) -> bool {
        !matches!(self, Terrain::Wall | Terrain::Water)
    }
}

/// An ability waiting for its destination to be chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Targeting {
    pub ability: u32,
    pub kind: AbilityKind,
    pub actor: Position,
    pub range: u32,
}

/// Everything a snapshot captures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub active: Side,
    pub action_points: u32,
    pub units: Vec<Unit>,
    pub buildings: Vec<Building>,
    pub reserves: [Vec<ReserveUnit>; 2],
    pub abilities: [Vec<AbilitySlot>; 2],
    pub targeting: Option<Targeting>,
    next_unit_id: u32,
}

/// A rectangular hex board held in memory.
#[derive(Debug, Clone)]
pub struct BoardState {
    width: i32,
    height: i32,
    terrain: Vec<Terrain>,
    catalog: Arc<Catalog>,
    live: Layout,
    snapshots: Vec<Layout>,
}

impl BoardState {
    /// Creates an empty plain board with Red to act and no action points.
    pub fn new(width: i32, height: i32, catalog: Arc<Catalog>) -> Self {
        let cells = (width.max(0) * height.max(0)) as usize;
        BoardState {
            width,
            height,
            terrain: vec![Terrain::Plain; cells],
            catalog,
            live: Layout {
                active: Side::Red,
                action_points: 0,
                units: Vec::new(),
                buildings: Vec::new(),
                reserves: [Vec::new(), Vec::new()],
                abilities: [Vec::new(), Vec::new()],
                targeting: None,
                next_unit_id: 1,
            },
            snapshots: Vec::new(),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    fn index(&self, pos: Position) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| (pos.y * self.width + pos.x) as usize)
    }

    pub fn terrain(&self, pos: Position) -> Option<Terrain> {
        self.index(pos).map(|i| self.terrain[i])
    }

    /// Sets the terrain of a cell. Returns false if the cell is off the board.
    pub fn set_terrain(&mut self, pos: Position, terrain: Terrain) -> bool {
        match self.index(pos) {
            Some(i) => {
                self.terrain[i] = terrain;
                true
            }
            None => false,
        }
    }

    /// Every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Position::new(x, y)))
    }

    pub fn layout(&self) -> &Layout {
        &self.live
    }

    /// Number of snapshots currently recorded.
    pub fn snapshot_depth(&self) -> usize {
        self.snapshots.len()
    }

    pub fn set_turn(&mut self, side: Side, action_points: u32) {
        self.live.active = side;
        self.live.action_points = action_points;
        self.live.targeting = None;
    }

    /// Places a fresh unit of `kind` at full health with its stat points.
    pub fn place_unit(&mut self, side: Side, kind: UnitKind, pos: Position) -> Result<UnitId, BoardError> {
        if !self.in_bounds(pos) {
            return Err(BoardError::OutOfBounds(pos));
        }
        if !self.is_cell_walkable(pos) || self.is_occupied(pos) {
            return Err(BoardError::CellBlocked(pos));
        }
        let stats = self.catalog.unit(kind)?;
        let id = UnitId(self.live.next_unit_id);
        let unit = Unit {
            id,
            kind,
            side,
            pos,
            hp: stats.max_hp,
            max_hp: stats.max_hp,
            attack: stats.attack,
            move_points: stats.move_points,
            skill_points: stats.skill_points,
            buffs: Buffs::empty(),
            summoned: false,
        };
        self.live.next_unit_id += 1;
        self.live.units.push(unit);
        Ok(id)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.live.units.iter_mut().find(|u| u.id == id)
    }

    pub fn place_building(&mut self, building: Building) -> Result<(), BoardError> {
        if !self.in_bounds(building.pos) {
            return Err(BoardError::OutOfBounds(building.pos));
        }
        if self.is_occupied(building.pos) {
            return Err(BoardError::CellBlocked(building.pos));
        }
        self.live.buildings.push(building);
        Ok(())
    }

    pub fn add_reserve(&mut self, side: Side, kind: UnitKind, unlocked: bool) {
        self.live.reserves[side.index()].push(ReserveUnit { kind, unlocked });
    }

    pub fn add_ability(&mut self, side: Side, id: u32, cooldown: u32) {
        self.live.abilities[side.index()].push(AbilitySlot { id, cooldown });
    }

    fn unit_index(&self, pos: Position) -> Result<usize, BoardError> {
        self.live
            .units
            .iter()
            .position(|u| u.pos == pos)
            .ok_or(BoardError::NoUnitAt(pos))
    }

    fn ensure_free(&self, pos: Position) -> Result<(), BoardError> {
        if !self.in_bounds(pos) {
            return Err(BoardError::OutOfBounds(pos));
        }
        if !self.is_cell_walkable(pos) || self.is_occupied(pos) {
            return Err(BoardError::CellBlocked(pos));
        }
        Ok(())
    }

    /// Breadth-first walk over free cells up to `steps` away, start excluded.
    fn walk(&self, from: Position, steps: u32) -> Vec<Position> {
        let mut seen = vec![from];
        let mut reached = Vec::new();
        let mut frontier = VecDeque::from([(from, 0u32)]);
        while let Some((cell, depth)) = frontier.pop_front() {
            if depth == steps {
                continue;
            }
            for next in cell.neighbors() {
                if seen.contains(&next) || !self.is_cell_walkable(next) || self.is_occupied(next) {
                    continue;
                }
                seen.push(next);
                reached.push(next);
                frontier.push_back((next, depth + 1));
            }
        }
        reached
    }

    fn skill_targets(&self, caster: &Unit, skill: &SkillSpec) -> Vec<Position> {
        self.cells()
            .filter(|&cell| {
                let d = chessboard_distance(caster.pos, cell);
                if d == 0 || d > MAX_RING {
                    return false;
                }
                let relation = if let Some(u) = self.unit_at(cell) {
                    if relation_between(caster.side, Some(u.side)) != Relation::Friend
                        && !u.is_attackable()
                    {
                        return false;
                    }
                    relation_between(caster.side, Some(u.side))
                } else if let Some(b) = self.building_at(cell) {
                    if !b.is_standing() {
                        return false;
                    }
                    relation_between(caster.side, b.side)
                } else {
                    return false;
                };
                accepts(skill.target, relation)
                    && is_in_range(self, caster.pos, cell, &skill.masks, relation, skill.designated)
            })
            .collect()
    }

    /// Deals `amount` to whatever stands on `target`. Dead units are removed,
    /// buildings bottom out at zero.
    fn damage(&mut self, target: Position, amount: i32) -> Result<(), BoardError> {
        if let Ok(i) = self.unit_index(target) {
            let unit = &mut self.live.units[i];
            if !unit.is_attackable() {
                return Ok(());
            }
            unit.hp -= amount;
            if unit.hp <= 0 {
                self.live.units.remove(i);
            }
            return Ok(());
        }
        match self.live.buildings.iter_mut().find(|b| b.pos == target) {
            Some(b) => {
                b.hp = (b.hp - amount).max(0);
                Ok(())
            }
            None => Err(BoardError::NoUnitAt(target)),
        }
    }

    fn heal(&mut self, target: Position, amount: i32) -> Result<(), BoardError> {
        let i = self.unit_index(target)?;
        let unit = &mut self.live.units[i];
        unit.hp = (unit.hp + amount).min(unit.max_hp);
        Ok(())
    }

    fn take_from_reserve(&mut self, side: Side, kind: UnitKind) -> Result<(), BoardError> {
        let reserve = &mut self.live.reserves[side.index()];
        let slot = reserve
            .iter()
            .position(|r| r.kind == kind && r.unlocked)
            .ok_or(BoardError::NotInReserve(kind))?;
        reserve.remove(slot);
        Ok(())
    }

    fn ability_index(&self, side: Side, ability: u32) -> Result<usize, BoardError> {
        self.live.abilities[side.index()]
            .iter()
            .position(|slot| slot.id == ability)
            .ok_or(BoardError::AbilityUnavailable(ability))
    }
}

fn accepts(target: Relation, actual: Relation) -> bool {
    match target {
        Relation::Any => true,
        Relation::EnemyAndNeutral => matches!(actual, Relation::Enemy | Relation::Neutral),
        other => other == actual,
    }
}

impl Battlefield for BoardState {
    fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn active_side(&self) -> Side {
        self.live.active
    }

    fn action_points(&self) -> u32 {
        self.live.action_points
    }

    fn spend_action_points(&mut self, points: u32) -> Result<(), BoardError> {
        let available = self.live.action_points;
        if points > available {
            return Err(BoardError::InsufficientPoints {
                needed: points,
                available,
            });
        }
        self.live.action_points -= points;
        Ok(())
    }

    fn units(&self) -> &[Unit] {
        &self.live.units
    }

    fn buildings(&self) -> &[Building] {
        &self.live.buildings
    }

    fn reserve(&self, side: Side) -> &[ReserveUnit] {
        &self.live.reserves[side.index()]
    }

    fn abilities(&self, side: Side) -> &[AbilitySlot] {
        &self.live.abilities[side.index()]
    }

    fn record_snapshot(&mut self) -> SnapshotId {
        self.snapshots.push(self.live.clone());
        SnapshotId(self.snapshots.len() - 1)
    }

    fn restore_snapshot(&mut self, id: SnapshotId, purge_newer: bool) -> Result<(), BoardError> {
        let saved = self
            .snapshots
            .get(id.0)
            .ok_or(BoardError::UnknownSnapshot(id))?;
        self.live.clone_from(saved);
        if purge_newer {
            self.snapshots.truncate(id.0 + 1);
        }
        Ok(())
    }

    fn clear_snapshot(&mut self, id: SnapshotId) -> Result<(), BoardError> {
        if id.0 >= self.snapshots.len() {
            return Err(BoardError::UnknownSnapshot(id));
        }
        self.snapshots.truncate(id.0);
        Ok(())
    }

    fn query_cells(&self, query: CellQuery, from: Position) -> Vec<Position> {
        match query {
            CellQuery::Move => {
                let Some(unit) = self.unit_at(from) else {
                    return Vec::new();
                };
                if !unit.can_move() {
                    return Vec::new();
                }
                let range = self
                    .catalog
                    .unit(unit.kind)
                    .map(|s| s.move_range)
                    .unwrap_or(1);
                self.walk(from, range)
            }
            CellQuery::CastSkill => {
                let Some(unit) = self.unit_at(from).copied() else {
                    return Vec::new();
                };
                if !unit.can_cast() {
                    return Vec::new();
                }
                match self.catalog.skill_of(unit.kind) {
                    Ok(skill) => self.skill_targets(&unit, &skill),
                    Err(_) => Vec::new(),
                }
            }
            CellQuery::SummonTarget => {
                let side = self.live.active;
                self.cells()
                    .filter(|&c| self.is_cell_receivable(c, side))
                    .collect()
            }
            CellQuery::AbilityTarget => {
                let Some(t) = self.live.targeting.filter(|t| t.actor == from) else {
                    return Vec::new();
                };
                match t.kind {
                    AbilityKind::Flash => self
                        .cells()
                        .filter(|&c| {
                            let d = chessboard_distance(from, c);
                            d >= 1 && d <= t.range && self.is_cell_walkable(c) && !self.is_occupied(c)
                        })
                        .collect(),
                    AbilityKind::Dash => {
                        let Some(unit) = self.unit_at(from) else {
                            return Vec::new();
                        };
                        let range = self
                            .catalog
                            .unit(unit.kind)
                            .map(|s| s.move_range)
                            .unwrap_or(1);
                        self.walk(from, range + t.range)
                    }
                    _ => Vec::new(),
                }
            }
        }
    }

    fn apply_move(&mut self, from: Position, to: Position) -> Result<(), BoardError> {
        let i = self.unit_index(from)?;
        self.ensure_free(to)?;
        let unit = &mut self.live.units[i];
        unit.pos = to;
        unit.move_points = unit.move_points.saturating_sub(1);
        Ok(())
    }

    fn undo_move(&mut self, from: Position, to: Position) -> Result<(), BoardError> {
        let i = self.unit_index(to)?;
        self.ensure_free(from)?;
        let unit = &mut self.live.units[i];
        unit.pos = from;
        unit.move_points += 1;
        Ok(())
    }

    fn apply_skill(&mut self, from: Position, target: Position, exploratory: bool) -> Result<(), BoardError> {
        let i = self.unit_index(from)?;
        let caster = self.live.units[i];
        let skill = self.catalog.skill_of(caster.kind)?;
        if !self.is_occupied(target) {
            return Err(BoardError::NoUnitAt(target));
        }
        self.live.units[i].skill_points = caster.skill_points.saturating_sub(1);
        let amount = caster.attack * skill.effect_count;
        if skill.target == Relation::Friend {
            self.heal(target, amount)?;
        } else {
            self.damage(target, amount)?;
            if skill.displaces {
                let push = Position::new(target.x - from.x, target.y - from.y);
                let dest = target.offset(push);
                if SIX_SIDES.contains(&push) && self.unit_index(target).is_ok() && self.ensure_free(dest).is_ok() {
                    let j = self.unit_index(target)?;
                    self.live.units[j].pos = dest;
                }
            }
        }
        if !exploratory {
            tracing::trace!(%from, %target, "skill resolved for real");
        }
        Ok(())
    }

    fn apply_summon(&mut self, side: Side, kind: UnitKind, to: Position) -> Result<(), BoardError> {
        if !self.is_cell_receivable(to, side) {
            return Err(BoardError::CellBlocked(to));
        }
        self.catalog.unit(kind)?;
        self.take_from_reserve(side, kind)?;
        self.place_unit(side, kind, to)?;
        Ok(())
    }

    fn invoke_ability(&mut self, ability: u32, side: Side, actor: Position) -> Result<(), BoardError> {
        self.ability_index(side, ability)?;
        let spec = self.catalog.ability(ability)?;
        if matches!(spec.kind, AbilityKind::Flash | AbilityKind::Dash) {
            let i = self.unit_index(actor)?;
            if spec.kind == AbilityKind::Dash {
                let unit = &mut self.live.units[i];
                unit.buffs |= Buffs::HASTED;
                unit.move_points += spec.range;
            }
        }
        self.live.targeting = Some(Targeting {
            ability,
            kind: spec.kind,
            actor,
            range: spec.range,
        });
        Ok(())
    }

    fn apply_ability(&mut self, ability: u32, side: Side, effect: AbilityEffect) -> Result<(), BoardError> {
        let slot = self.ability_index(side, ability)?;
        let spec = self.catalog.ability(ability)?;
        let friendly = |s: &Self, pos: Position| -> Result<usize, BoardError> {
            let i = s.unit_index(pos)?;
            if s.live.units[i].side == side {
                Ok(i)
            } else {
                Err(BoardError::NoUnitAt(pos))
            }
        };

        match (spec.kind, effect) {
            (AbilityKind::Heal, AbilityEffect::Heal { target }) => {
                friendly(self, target)?;
                self.heal(target, spec.amount)?;
            }
            (AbilityKind::Ignite, AbilityEffect::Ignite { target }) => {
                let i = self.unit_index(target)?;
                if self.live.units[i].side == side {
                    return Err(BoardError::NoUnitAt(target));
                }
                self.live.units[i].buffs |= Buffs::BURNING;
                self.damage(target, spec.amount)?;
            }
            (AbilityKind::Gold, AbilityEffect::Gold { target }) => {
                let i = friendly(self, target)?;
                self.live.units[i].buffs |= Buffs::GILDED;
            }
            (AbilityKind::Teleport, AbilityEffect::Teleport { kind, to }) => {
                self.ensure_free(to)?;
                self.catalog.unit(kind)?;
                self.take_from_reserve(side, kind)?;
                self.place_unit(side, kind, to)?;
            }
            (AbilityKind::Flash, AbilityEffect::Flash { from, to }) => {
                let i = friendly(self, from)?;
                self.ensure_free(to)?;
                self.live.units[i].pos = to;
            }
            (AbilityKind::Dash, AbilityEffect::Dash { from, to }) => {
                let i = friendly(self, from)?;
                self.ensure_free(to)?;
                let unit = &mut self.live.units[i];
                unit.pos = to;
                unit.buffs |= Buffs::HASTED;
            }
            _ => return Err(BoardError::AbilityUnavailable(ability)),
        }

        self.live.abilities[side.index()][slot].cooldown += 1;
        self.live.targeting = None;
        Ok(())
    }

    fn is_cell_walkable(&self, pos: Position) -> bool {
        self.terrain(pos).is_some_and(Terrain::is_walkable)
    }

    fn is_line_blocked(&self, from: Position, to: Position) -> bool {
        hex_line(from, to)
            .into_iter()
            .any(|cell| self.terrain(cell) == Some(Terrain::Wall))
    }

    fn is_cell_receivable(&self, pos: Position, side: Side) -> bool {
        if !self.is_cell_walkable(pos) || self.is_occupied(pos) {
            return false;
        }
        self.terrain(pos) == Some(Terrain::Spawn(side))
            || self.live.buildings.iter().any(|b| {
                b.side == Some(side) && b.is_standing() && b.kind != BuildingKind::Turret && b.pos.is_adjacent(pos)
            })
    }
}
