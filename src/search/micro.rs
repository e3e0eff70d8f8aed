//! Per-unit planning with the mode evaluator.
//!
//! Enumerates the short plans a single unit can carry out this turn (stay,
//! move, move then cast, cast, cast then move), scores each final position
//! with the unit's AI mode and keeps the best. Later plans win ties.

use crate::board::{
    apply_action, with_checkpoint, Action, BoardError, Battlefield, CellQuery, Position, UnitId,
};
use crate::config::SearchConfig;
use crate::eval::{evaluate_mode, SENTINEL};

use super::SearchError;

/// The best plan found for one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitPlan {
    pub actions: Vec<Action>,
    pub score: f64,
}

impl UnitPlan {
    fn consider(&mut self, score: f64, actions: &[Action]) {
        if score >= self.score {
            self.score = score;
            self.actions = actions.to_vec();
        }
    }
}

/// Runs `f` inside a checkpoint, treating recoverable failures as a plan
/// that simply isn't available.
fn explore<B, F>(board: &mut B, f: F) -> Result<(), BoardError>
where
    B: Battlefield + ?Sized,
    F: FnOnce(&mut B) -> Result<(), BoardError>,
{
    match with_checkpoint(board, f) {
        Err(e) if e.is_recoverable() => {
            tracing::debug!(error = %e, "unit plan skipped");
            Ok(())
        }
        other => other,
    }
}

/// Finds the best plan for `unit`. The board is unchanged afterwards.
pub fn plan_unit<B>(board: &mut B, unit: UnitId, config: &SearchConfig) -> Result<UnitPlan, SearchError>
where
    B: Battlefield + ?Sized,
{
    let start = board.unit(unit).copied().ok_or(SearchError::UnknownUnit(unit))?;
    let mode = board
        .catalog()
        .profile(start.kind)
        .map(|p| p.mode)
        .unwrap_or_default();
    let origin = start.pos;

    let mut best = UnitPlan {
        actions: Vec::new(),
        score: -2.0 * SENTINEL,
    };
    best.consider(evaluate_mode(board, origin, mode, config)?, &[]);

    for to in board.query_cells(CellQuery::Move, origin) {
        let step = Action::mov(origin, to);
        explore(board, |b| {
            apply_action(b, &step, true)?;
            best.consider(evaluate_mode(b, to, mode, config)?, &[step]);
            for target in b.query_cells(CellQuery::CastSkill, to) {
                let cast = Action::skill(to, target);
                explore(b, |b| {
                    apply_action(b, &cast, true)?;
                    best.consider(evaluate_mode(b, to, mode, config)?, &[step, cast]);
                    Ok(())
                })?;
            }
            Ok(())
        })?;
    }

    for target in board.query_cells(CellQuery::CastSkill, origin) {
        let cast = Action::skill(origin, target);
        explore(board, |b| {
            apply_action(b, &cast, true)?;
            best.consider(evaluate_mode(b, origin, mode, config)?, &[cast]);
            let cells: Vec<Position> = b.query_cells(CellQuery::Move, origin);
            for to in cells {
                let step = Action::mov(origin, to);
                explore(b, |b| {
                    apply_action(b, &step, true)?;
                    best.consider(evaluate_mode(b, to, mode, config)?, &[cast, step]);
                    Ok(())
                })?;
            }
            Ok(())
        })?;
    }

    tracing::debug!(unit = unit.0, ?mode, score = best.score, actions = best.actions.len(), "unit planned");
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Buffs, Side};
    use crate::testkit;

    #[test]
    fn finishing_blow_beats_repositioning() {
        let mut board = testkit::board(7, 7);
        let warrior = board.place_unit(Side::Red, testkit::WARRIOR, Position::new(2, 2)).unwrap();
        let foe = board.place_unit(Side::Blue, testkit::WARRIOR, Position::new(3, 2)).unwrap();
        board.unit_mut(foe).unwrap().hp = 2;
        board.set_turn(Side::Red, 4);

        let before = board.layout().clone();
        let plan = plan_unit(&mut board, warrior, &SearchConfig::default()).unwrap();
        assert_eq!(plan.actions, vec![Action::skill(Position::new(2, 2), Position::new(3, 2))]);
        assert_eq!(board.layout(), &before);
        assert_eq!(board.snapshot_depth(), 0);
    }

    #[test]
    fn stunned_unit_stays_put() {
        let mut board = testkit::skirmish();
        let id = board.unit_at(Position::new(2, 3)).unwrap().id;
        board.unit_mut(id).unwrap().buffs |= Buffs::STUNNED;
        let plan = plan_unit(&mut board, id, &SearchConfig::default()).unwrap();
        assert!(plan.actions.is_empty());
        assert!(plan.score > -SENTINEL);
    }

    #[test]
    fn no_points_means_no_plan() {
        let mut board = testkit::skirmish();
        board.set_turn(Side::Red, 0);
        let id = board.unit_at(Position::new(1, 2)).unwrap().id;
        let plan = plan_unit(&mut board, id, &SearchConfig::default()).unwrap();
        assert!(plan.actions.is_empty());
    }

    #[test]
    fn unknown_unit_is_an_error() {
        let mut board = testkit::skirmish();
        assert!(matches!(
            plan_unit(&mut board, UnitId(999), &SearchConfig::default()),
            Err(SearchError::UnknownUnit(UnitId(999)))
        ));
    }
}
