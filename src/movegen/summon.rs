//! Summon candidates: reserve units onto receivable cells.

use crate::board::{chessboard_distance, Action, Battlefield, CellQuery, Position, UnitKind};
use crate::config::SearchConfig;

/// Point cost of summoning onto `cell`. Cells close to the opponent's home
/// cost `advance_cost`, everything else `summon_cost`.
pub fn entry_cost(cell: Position, opponent_home: Option<Position>, config: &SearchConfig) -> u32 {
    match opponent_home.map(|home| chessboard_distance(cell, home)) {
        Some(d) if d > 0 && d <= config.advance_radius => config.advance_cost,
        _ => config.summon_cost,
    }
}

/// Unlocked reserve kinds of the active side, first occurrence order.
pub fn unlocked_kinds<B>(board: &B) -> Vec<UnitKind>
where
    B: Battlefield + ?Sized,
{
    let mut kinds = Vec::new();
    for r in board.reserve(board.active_side()) {
        if r.unlocked && !kinds.contains(&r.kind) {
            kinds.push(r.kind);
        }
    }
    kinds
}

/// One candidate per receivable cell and unlocked reserve kind, while the
/// side is under its board cap.
pub fn summon_candidates<B>(board: &B, config: &SearchConfig) -> Vec<Action>
where
    B: Battlefield + ?Sized,
{
    let side = board.active_side();
    if board.fielded_heroes(side) >= config.board_cap {
        return Vec::new();
    }
    let kinds = unlocked_kinds(board);
    if kinds.is_empty() {
        return Vec::new();
    }
    let opponent_home = board.home(side.opponent()).map(|b| b.pos);

    let mut actions = Vec::new();
    for cell in board.query_cells(CellQuery::SummonTarget, Position::default()) {
        let cost = entry_cost(cell, opponent_home, config);
        for &kind in &kinds {
            actions.push(Action::summon(kind, cell, cost));
        }
    }
    actions
}
