//! One-turn kill detection and commitment.
//!
//! Scanning sums the damage every own unit could deal to each attackable
//! enemy this turn, plus damage an ignite will add next tick. Among the
//! enemies that total can kill, the one with the highest protect weight is
//! picked (later ties win). Committing then walks the attackers, casters
//! that don't displace their target first, and casts or steps-then-casts
//! until the target is down. A failed attempt is rolled back as a whole.

use std::collections::HashSet;

use crate::board::{
    apply_action, can_hit, can_hit_within_one_move, AbilityKind, Action, BoardError, Battlefield,
    CellQuery, Position, Relation, Unit, UnitId,
};

use super::SearchError;

/// An enemy the active side can kill this turn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LethalTarget {
    pub id: UnitId,
    pub pos: Position,
    pub hp: i32,
    /// Damage own units can deal this turn.
    pub damage: i32,
    /// Damage already guaranteed to land after the turn.
    pub deferred: i32,
    pub protect_weight: f32,
}

/// How a commit attempt ended.
#[derive(Debug, Clone, PartialEq)]
pub enum LethalOutcome {
    /// The target is dead or will die to deferred damage. Holds the actions
    /// that were committed.
    Verified(Vec<Action>),
    /// The target survived; the board is back where it started.
    Failed,
}

/// Damage the active side's ignite will deal next tick, if it is ready.
fn deferred_damage<B: Battlefield + ?Sized>(board: &B) -> i32 {
    match board.ability_slot(board.active_side(), AbilityKind::Ignite) {
        Some((slot, spec)) if slot.cooldown == 1 => spec.amount,
        _ => 0,
    }
}

/// Finds the most valuable enemy the active side can kill this turn,
/// ignoring anything in `skip`.
pub fn find_lethal_target<B>(board: &mut B, skip: &HashSet<UnitId>) -> Result<Option<LethalTarget>, BoardError>
where
    B: Battlefield + ?Sized,
{
    let side = board.active_side();
    let own: Vec<Unit> = board.units().iter().filter(|u| u.side == side).copied().collect();
    let enemies: Vec<Unit> = board
        .units()
        .iter()
        .filter(|u| u.side != side && u.is_attackable() && !skip.contains(&u.id))
        .copied()
        .collect();
    let deferred = deferred_damage(board);

    let mut best: Option<LethalTarget> = None;
    for enemy in enemies {
        let mut damage = 0;
        for attacker in own.iter().filter(|a| a.can_cast()) {
            let Ok(skill) = board.catalog().skill_of(attacker.kind) else {
                continue;
            };
            let reaches = if attacker.can_move() {
                can_hit_within_one_move(board, attacker.pos, enemy.pos, Relation::Enemy)?
            } else {
                can_hit(board, attacker.pos, enemy.pos, Relation::Enemy)
            };
            if reaches {
                damage += attacker.attack * skill.effect_count;
            }
        }
        if damage + deferred < enemy.hp {
            continue;
        }
        let Some(profile) = board.catalog().profile(enemy.kind) else {
            continue;
        };
        if best.map_or(true, |b| profile.protect_weight >= b.protect_weight) {
            best = Some(LethalTarget {
                id: enemy.id,
                pos: enemy.pos,
                hp: enemy.hp,
                damage,
                deferred,
                protect_weight: profile.protect_weight,
            });
        }
    }
    Ok(best)
}

/// Attackers in commit order: units whose skill leaves the target in place
/// come first.
fn attackers<B: Battlefield + ?Sized>(board: &B) -> Vec<UnitId> {
    let side = board.active_side();
    let displaces = |u: &Unit| board.catalog().skill_of(u.kind).map(|s| s.displaces).unwrap_or(false);
    let (fixed, pushing): (Vec<Unit>, Vec<Unit>) = board
        .units()
        .iter()
        .filter(|u| u.side == side)
        .copied()
        .partition(|u| !displaces(u));
    fixed.into_iter().chain(pushing).map(|u| u.id).collect()
}

/// Whether the target is dead or will die to deferred damage.
fn is_finished<B: Battlefield + ?Sized>(board: &B, target: &LethalTarget) -> bool {
    match board.unit(target.id) {
        Some(t) => t.hp <= 0 || t.hp <= target.deferred,
        None => true,
    }
}

fn can_cast_on<B: Battlefield + ?Sized>(board: &B, from: Position, target: Position) -> bool {
    can_hit(board, from, target, Relation::Enemy)
        && board.query_cells(CellQuery::CastSkill, from).contains(&target)
}

/// Commits one action for real. Recoverable failures are logged and
/// reported as `false`.
fn commit<B: Battlefield + ?Sized>(board: &mut B, action: &Action, log: &mut Vec<Action>) -> Result<bool, BoardError> {
    match apply_action(board, action, false) {
        Ok(()) => {
            tracing::debug!(%action, "lethal step committed");
            log.push(*action);
            Ok(true)
        }
        Err(e) if e.is_recoverable() => {
            tracing::warn!(%action, error = %e, "lethal step rejected");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

/// Tries every reachable cell of `attacker` in board order, keeping the
/// first one from which the target can be hit and casting from there.
fn step_and_cast<B>(board: &mut B, attacker: Unit, target: UnitId, log: &mut Vec<Action>) -> Result<(), BoardError>
where
    B: Battlefield + ?Sized,
{
    for cell in board.query_cells(CellQuery::Move, attacker.pos) {
        let step = board.record_snapshot();
        let mut steps = Vec::new();
        let moved = commit(board, &Action::mov(attacker.pos, cell), &mut steps)?;
        let target_pos = board.unit(target).map(|t| t.pos);
        let lands = match target_pos {
            Some(pos) if moved && board.action_points() >= 1 => can_cast_on(board, cell, pos),
            _ => false,
        };
        if lands {
            if let Some(pos) = target_pos {
                if commit(board, &Action::skill(cell, pos), &mut steps)? {
                    board.clear_snapshot(step)?;
                    log.extend(steps);
                    return Ok(());
                }
            }
        }
        board.restore_snapshot(step, true)?;
        board.clear_snapshot(step)?;
    }
    Ok(())
}

/// Commits actions against `target` until it is finished. On failure the
/// board is restored to its state before the call.
pub fn commit_lethal<B>(board: &mut B, target: &LethalTarget) -> Result<LethalOutcome, SearchError>
where
    B: Battlefield + ?Sized,
{
    let backup = board.record_snapshot();
    let mut log = Vec::new();

    for id in attackers(board) {
        if is_finished(board, target) || board.action_points() == 0 {
            break;
        }
        let (Some(attacker), Some(t)) = (board.unit(id).copied(), board.unit(target.id).copied()) else {
            continue;
        };
        if !attacker.can_cast() {
            continue;
        }
        if can_cast_on(board, attacker.pos, t.pos) {
            commit(board, &Action::skill(attacker.pos, t.pos), &mut log)?;
        } else if attacker.can_move()
            && board.action_points() >= 2
            && can_hit_within_one_move(board, attacker.pos, t.pos, Relation::Enemy)?
        {
            step_and_cast(board, attacker, target.id, &mut log)?;
        }
    }

    if is_finished(board, target) {
        board.clear_snapshot(backup)?;
        tracing::info!(target = target.id.0, actions = log.len(), "lethal sequence committed");
        Ok(LethalOutcome::Verified(log))
    } else {
        board.restore_snapshot(backup, true)?;
        board.clear_snapshot(backup)?;
        tracing::info!(target = target.id.0, "lethal sequence failed, rolled back");
        Ok(LethalOutcome::Failed)
    }
}
