//! Move and skill candidates for fielded units.

use crate::board::{Action, Battlefield, CatalogError, CellQuery, Unit, UnitId};

/// Own units of the active side, in `order` first and then board order for
/// anything `order` does not mention.
pub fn ordered_units<B>(board: &B, order: &[UnitId]) -> Vec<Unit>
where
    B: Battlefield + ?Sized,
{
    let side = board.active_side();
    let mut units: Vec<Unit> = order
        .iter()
        .filter_map(|&id| board.unit(id))
        .filter(|u| u.side == side)
        .copied()
        .collect();
    for u in board.units() {
        if u.side == side && !units.iter().any(|o| o.id == u.id) {
            units.push(*u);
        }
    }
    units
}

/// One `Move` per reachable cell and one `Skill` per castable cell, for
/// every own unit that still has the matching points.
pub fn unit_candidates<B>(board: &B, order: &[UnitId], rejected: &mut Vec<CatalogError>) -> Vec<Action>
where
    B: Battlefield + ?Sized,
{
    let mut actions = Vec::new();
    if board.action_points() == 0 {
        return actions;
    }
    for unit in ordered_units(board, order) {
        if unit.can_move() {
            for cell in board.query_cells(CellQuery::Move, unit.pos) {
                actions.push(Action::mov(unit.pos, cell));
            }
        }
        if unit.can_cast() {
            if let Err(e) = board.catalog().skill_of(unit.kind) {
                rejected.push(e);
                continue;
            }
            for cell in board.query_cells(CellQuery::CastSkill, unit.pos) {
                actions.push(Action::skill(unit.pos, cell));
            }
        }
    }
    actions
}
