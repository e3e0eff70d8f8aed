//! Special-ability candidates.
//!
//! Flash and dash destinations depend on board-side rules, so they are found
//! by invoking the ability's targeting mode inside a checkpoint and reading
//! the offered cells back.

use crate::board::{
    can_hit_within_one_move, with_checkpoint, AbilityEffect, AbilityKind, AbilitySlot, Action,
    BoardError, Battlefield, Buffs, CatalogError, CellQuery, Position, Relation, Unit,
};
use crate::config::SearchConfig;

use super::summon::unlocked_kinds;

/// Enemies at or below this health are worth an ignite.
pub const IGNITE_LETHAL_HP: i32 = 2;

/// Candidates for every ability slot of the active side. Slots whose id is
/// missing from the catalog are reported in `rejected` and skipped.
pub fn ability_candidates<B>(
    board: &mut B,
    config: &SearchConfig,
    rejected: &mut Vec<CatalogError>,
) -> Result<Vec<Action>, BoardError>
where
    B: Battlefield + ?Sized,
{
    let side = board.active_side();
    let slots: Vec<AbilitySlot> = board.abilities(side).to_vec();
    let mut actions = Vec::new();

    for slot in slots {
        let spec = match board.catalog().ability(slot.id) {
            Ok(spec) => spec,
            Err(e) => {
                tracing::warn!(ability = slot.id, "ability missing from catalog");
                rejected.push(e);
                continue;
            }
        };
        let own: Vec<Unit> = board.units().iter().filter(|u| u.side == side).copied().collect();
        let enemies: Vec<Unit> = board.units().iter().filter(|u| u.side != side).copied().collect();
        let cost = slot.cooldown;

        match spec.kind {
            AbilityKind::Ignite => {
                for e in enemies.iter().filter(|e| e.is_attackable() && e.hp <= IGNITE_LETHAL_HP) {
                    actions.push(Action::ability(slot.id, AbilityEffect::Ignite { target: e.pos }, cost));
                }
            }
            AbilityKind::Heal => {
                // Gilded units take no damage, so healing them is wasted.
                for u in own.iter().filter(|u| u.is_attackable() && u.hp < u.max_hp) {
                    actions.push(Action::ability(slot.id, AbilityEffect::Heal { target: u.pos }, cost));
                }
            }
            AbilityKind::Gold => {
                for u in own.iter().filter(|u| !u.summoned && !u.buffs.contains(Buffs::GILDED)) {
                    if expected_damage(board, u, &enemies)? >= u.hp {
                        actions.push(Action::ability(slot.id, AbilityEffect::Gold { target: u.pos }, cost));
                    }
                }
            }
            AbilityKind::Teleport => {
                if board.fielded_heroes(side) >= config.board_cap {
                    continue;
                }
                let cells = landing_cells(&*board, &enemies);
                for kind in unlocked_kinds(&*board) {
                    for &to in &cells {
                        actions.push(Action::ability(slot.id, AbilityEffect::Teleport { kind, to }, cost));
                    }
                }
            }
            AbilityKind::Flash | AbilityKind::Dash => {
                let cost = if spec.kind == AbilityKind::Dash { cost + 1 } else { cost };
                for u in own.iter().filter(|u| !u.buffs.contains(Buffs::STUNNED)) {
                    let from = u.pos;
                    let reachable = with_checkpoint(board, |b| {
                        b.invoke_ability(slot.id, side, from)?;
                        Ok(b.query_cells(CellQuery::AbilityTarget, from))
                    });
                    let cells = match reachable {
                        Ok(cells) => cells,
                        Err(e) if e.is_recoverable() => {
                            tracing::debug!(ability = slot.id, %from, error = %e, "ability target query skipped");
                            continue;
                        }
                        Err(e) => return Err(e),
                    };
                    for to in cells {
                        let effect = if spec.kind == AbilityKind::Dash {
                            AbilityEffect::Dash { from, to }
                        } else {
                            AbilityEffect::Flash { from, to }
                        };
                        actions.push(Action::ability(slot.id, effect, cost));
                    }
                }
            }
        }
    }
    Ok(actions)
}

/// Damage `unit` could take next turn from enemies able to reach it within
/// one move.
fn expected_damage<B>(board: &mut B, unit: &Unit, enemies: &[Unit]) -> Result<i32, BoardError>
where
    B: Battlefield + ?Sized,
{
    let mut total = 0;
    for e in enemies {
        if can_hit_within_one_move(board, e.pos, unit.pos, Relation::Enemy)? {
            let effect = board.catalog().skill_of(e.kind).map(|s| s.effect_count).unwrap_or(1);
            total += e.attack * effect;
        }
    }
    Ok(total)
}

/// Free walkable cells touching an attackable enemy, first-seen order.
fn landing_cells<B>(board: &B, enemies: &[Unit]) -> Vec<Position>
where
    B: Battlefield + ?Sized,
{
    let mut cells = Vec::new();
    for e in enemies.iter().filter(|e| e.is_attackable()) {
        for n in e.pos.neighbors() {
            if board.is_cell_walkable(n) && !board.is_occupied(n) && !cells.contains(&n) {
                cells.push(n);
            }
        }
    }
    cells
}
