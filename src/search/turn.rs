//! The turn search state machine.
//!
//! `Init` records the starting snapshot and orders the units, `LethalCheck`
//! commits one-turn kills while any exist, `GeneralSearch` runs one
//! generate/score/select/commit round per step, and `Done` restores the
//! starting snapshot when the search is exploratory. The committed actions
//! are replayed separately.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::board::{
    apply_action, with_checkpoint, Action, ActionKind, BoardError, Battlefield, CatalogError,
    CellQuery, Side, SnapshotId, UnitId,
};
use crate::config::SearchConfig;
use crate::eval::evaluate;
use crate::movegen::generate;

use super::candidate::Candidate;
use super::knapsack::{bucketize, dedup};
use super::lethal::{commit_lethal, find_lethal_target, LethalOutcome};
use super::SearchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    LethalCheck,
    GeneralSearch,
    Done,
}

/// What a finished turn search produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurnReport {
    /// Committed actions in commit order.
    pub actions: Vec<Action>,
    /// Targets killed by lethal sequences.
    pub lethal_kills: Vec<UnitId>,
    /// General search rounds run.
    pub iterations: u32,
    /// Candidates simulated.
    pub nodes: u64,
    /// Catalog lookups that failed during generation.
    pub rejected: Vec<CatalogError>,
    /// Action points spent by `actions`.
    pub spent: u32,
}

pub struct TurnSearch<'c> {
    config: &'c SearchConfig,
    phase: Phase,
    backup: Option<SnapshotId>,
    side: Side,
    budget: u32,
    order: Vec<UnitId>,
    /// Lethal targets already attempted this search.
    skip: HashSet<UnitId>,
    /// Actions whose commit failed; never offered again this search.
    refused: HashSet<Action>,
    stop: Option<Arc<AtomicBool>>,
    report: TurnReport,
}

impl<'c> TurnSearch<'c> {
    pub fn new(config: &'c SearchConfig) -> Self {
        TurnSearch {
            config,
            phase: Phase::Init,
            backup: None,
            side: Side::Red,
            budget: 0,
            order: Vec::new(),
            skip: HashSet::new(),
            refused: HashSet::new(),
            stop: None,
            report: TurnReport::default(),
        }
    }

    /// Checked between rounds; once set, the search ends after the current
    /// round.
    pub fn with_stop(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn report(&self) -> &TurnReport {
        &self.report
    }

    /// Runs every phase to completion.
    pub fn run<B: Battlefield + ?Sized>(&mut self, board: &mut B) -> Result<TurnReport, SearchError> {
        while self.phase != Phase::Done {
            self.phase = self.step(board)?;
        }
        Ok(self.report.clone())
    }

    /// Advances the state machine by one transition.
    pub fn step<B: Battlefield + ?Sized>(&mut self, board: &mut B) -> Result<Phase, SearchError> {
        match self.phase {
            Phase::Init => {
                self.init(board);
                Ok(Phase::LethalCheck)
            }
            Phase::LethalCheck => self.lethal_round(board),
            Phase::GeneralSearch => {
                if self.general_round(board)? {
                    Ok(Phase::GeneralSearch)
                } else {
                    self.finish(board)?;
                    Ok(Phase::Done)
                }
            }
            Phase::Done => Ok(Phase::Done),
        }
    }

    /// Restores the starting snapshot after a failed search.
    pub fn abort<B: Battlefield + ?Sized>(&mut self, board: &mut B) {
        if let Some(id) = self.backup.take() {
            let restored = board
                .restore_snapshot(id, true)
                .and_then(|()| board.clear_snapshot(id));
            if let Err(e) = restored {
                tracing::error!(error = %e, "could not restore the starting snapshot");
            }
        }
        self.phase = Phase::Done;
    }

    fn init<B: Battlefield + ?Sized>(&mut self, board: &mut B) {
        self.backup = Some(board.record_snapshot());
        self.side = board.active_side();
        self.budget = board.action_points();

        let mut units: Vec<(UnitId, usize)> = board
            .units()
            .iter()
            .filter(|u| u.side == self.side)
            .map(|u| (u.id, board.query_cells(CellQuery::Move, u.pos).len()))
            .collect();
        units.sort_by(|a, b| b.1.cmp(&a.1));
        self.order = units.into_iter().map(|(id, _)| id).collect();
        tracing::debug!(side = ?self.side, budget = self.budget, units = self.order.len(), "turn search started");
    }

    fn lethal_round<B: Battlefield + ?Sized>(&mut self, board: &mut B) -> Result<Phase, SearchError> {
        let Some(target) = find_lethal_target(board, &self.skip)? else {
            return Ok(Phase::GeneralSearch);
        };
        self.skip.insert(target.id);
        match commit_lethal(board, &target)? {
            LethalOutcome::Verified(actions) => {
                for action in actions {
                    self.record(board, action)?;
                }
                self.report.lethal_kills.push(target.id);
            }
            LethalOutcome::Failed => {}
        }
        Ok(Phase::LethalCheck)
    }

    /// One generate/score/select/commit round. Returns whether another
    /// round should follow.
    fn general_round<B: Battlefield + ?Sized>(&mut self, board: &mut B) -> Result<bool, SearchError> {
        if self.stop.as_ref().is_some_and(|s| s.load(Ordering::Relaxed)) {
            tracing::info!("turn search stopped");
            return Ok(false);
        }
        let remaining = board.action_points();
        if remaining == 0 {
            return Ok(false);
        }
        self.report.iterations += 1;

        let generated = generate(board, self.config, &self.order)?;
        for e in generated.rejected {
            tracing::warn!(error = %e, "catalog entry missing, candidates dropped");
            if !self.report.rejected.contains(&e) {
                self.report.rejected.push(e);
            }
        }

        let before = evaluate(board, self.side, self.config)?.total();
        let mut candidates = Vec::new();
        for action in generated.actions {
            if action.cost == 0 || action.cost > remaining || self.refused.contains(&action) {
                continue;
            }
            self.report.nodes += 1;
            let side = self.side;
            let config = self.config;
            let scored = with_checkpoint(board, |b| {
                apply_action(b, &action, true)?;
                evaluate(b, side, config)
            });
            match scored {
                Ok(after) => candidates.push(Candidate::new(action, after.total() - before, after)),
                Err(e) if e.is_recoverable() => {
                    tracing::debug!(%action, error = %e, "candidate skipped");
                }
                Err(e) => return Err(e.into()),
            }
        }
        tracing::debug!(round = self.report.iterations, scored = candidates.len(), remaining, "candidates scored");

        let mut buckets = bucketize(dedup(candidates), self.config.max_bucket);
        let (total, best) = buckets.select(remaining);
        let Some(best) = best.cloned() else {
            tracing::debug!("no improving action left");
            return Ok(false);
        };
        if best.action.is_noop() {
            return Ok(false);
        }
        tracing::debug!(
            action = %best.action,
            delta = best.delta,
            bundle = total,
            breakdown = %best.breakdown,
            "selected"
        );

        // Skill casts take the real path so the board runs its resolution hooks.
        let exploratory = !matches!(best.action.kind, ActionKind::Skill { .. });
        match apply_action(board, &best.action, exploratory) {
            Ok(()) => self.record(board, best.action)?,
            Err(e) if e.is_recoverable() => {
                tracing::warn!(action = %best.action, error = %e, "commit failed, action refused");
                self.refused.insert(best.action);
            }
            Err(e) => return Err(e.into()),
        }
        Ok(true)
    }

    /// Logs a committed action and checks the point budget.
    fn record<B: Battlefield + ?Sized>(&mut self, board: &B, action: Action) -> Result<(), SearchError> {
        self.report.spent += action.cost;
        self.report.actions.push(action);
        let remaining = board.action_points();
        if self.report.spent + remaining != self.budget {
            return Err(SearchError::BudgetViolation {
                budget: self.budget,
                spent: self.report.spent,
                remaining,
            });
        }
        tracing::debug!(%action, remaining, "committed");
        Ok(())
    }

    fn finish<B: Battlefield + ?Sized>(&mut self, board: &mut B) -> Result<(), BoardError> {
        if let Some(id) = self.backup.take() {
            if self.config.exploratory {
                board.restore_snapshot(id, true)?;
            }
            board.clear_snapshot(id)?;
        }
        tracing::info!(
            actions = self.report.actions.len(),
            spent = self.report.spent,
            kills = self.report.lethal_kills.len(),
            rounds = self.report.iterations,
            nodes = self.report.nodes,
            "turn search finished"
        );
        Ok(())
    }
}

/// Plans the active side's turn. A fatal error restores the starting state
/// and yields an empty plan.
pub fn run_turn_search<B: Battlefield + ?Sized>(board: &mut B, config: &SearchConfig) -> TurnReport {
    let mut search = TurnSearch::new(config);
    match search.run(board) {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, "turn search aborted, passing the turn");
            search.abort(board);
            TurnReport::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Battlefield, BoardState, Position};
    use crate::testkit;

    fn committed(config: &SearchConfig, board: &mut BoardState) -> TurnReport {
        let mut search = TurnSearch::new(config);
        search.run(board).unwrap()
    }

    #[test]
    fn exploratory_search_restores_the_board() {
        let mut board = testkit::skirmish();
        let before = board.layout().clone();
        let report = committed(&SearchConfig::default(), &mut board);
        assert!(!report.actions.is_empty());
        assert_eq!(board.layout(), &before);
        assert_eq!(board.snapshot_depth(), 0);
    }

    #[test]
    fn spent_points_stay_within_budget() {
        let config = SearchConfig {
            exploratory: false,
            ..SearchConfig::default()
        };
        let mut board = testkit::skirmish();
        let report = committed(&config, &mut board);
        let cost: u32 = report.actions.iter().map(|a| a.cost).sum();
        assert_eq!(cost, report.spent);
        assert!(report.spent <= 6);
        assert_eq!(report.spent + board.action_points(), 6);
    }

    #[test]
    fn lethal_target_is_killed_first() {
        let mut board = testkit::board(7, 7);
        board.place_unit(Side::Red, testkit::WARRIOR, Position::new(2, 2)).unwrap();
        let archer = board.place_unit(Side::Blue, testkit::ARCHER, Position::new(3, 2)).unwrap();
        board.unit_mut(archer).unwrap().hp = 2;
        board.set_turn(Side::Red, 3);

        let report = committed(&SearchConfig::default(), &mut board);
        assert_eq!(report.lethal_kills, vec![archer]);
        assert_eq!(report.actions[0], Action::skill(Position::new(2, 2), Position::new(3, 2)));
    }

    #[test]
    fn phases_run_in_order() {
        let config = SearchConfig::default();
        let mut board = testkit::skirmish();
        let mut search = TurnSearch::new(&config);
        assert_eq!(search.phase(), Phase::Init);
        assert_eq!(search.step(&mut board).unwrap(), Phase::LethalCheck);
        search.phase = Phase::LethalCheck;
        assert_eq!(search.step(&mut board).unwrap(), Phase::GeneralSearch);
    }

    #[test]
    fn no_points_means_no_actions() {
        let mut board = testkit::skirmish();
        board.set_turn(Side::Red, 0);
        let report = run_turn_search(&mut board, &SearchConfig::default());
        assert!(report.actions.is_empty());
        assert_eq!(report.iterations, 0);
    }

    #[test]
    fn stop_flag_ends_after_lethal_check() {
        let config = SearchConfig::default();
        let stop = Arc::new(AtomicBool::new(true));
        let mut board = testkit::skirmish();
        let report = TurnSearch::new(&config).with_stop(stop).run(&mut board).unwrap();
        assert!(report.actions.is_empty());
        assert_eq!(board.snapshot_depth(), 0);
    }

    #[test]
    fn corrupted_snapshot_stack_yields_empty_plan() {
        /// Wraps a board and forgets every snapshot after the first.
        struct Forgetful(BoardState, usize);

        impl Battlefield for Forgetful {
            fn catalog(&self) -> &crate::board::Catalog {
                self.0.catalog()
            }
            fn active_side(&self) -> Side {
                self.0.active_side()
            }
            fn action_points(&self) -> u32 {
                self.0.action_points()
            }
            fn spend_action_points(&mut self, points: u32) -> Result<(), BoardError> {
                self.0.spend_action_points(points)
            }
            fn units(&self) -> &[crate::board::Unit] {
                self.0.units()
            }
            fn buildings(&self) -> &[crate::board::Building] {
                self.0.buildings()
            }
            fn reserve(&self, side: Side) -> &[crate::board::ReserveUnit] {
                self.0.reserve(side)
            }
            fn abilities(&self, side: Side) -> &[crate::board::AbilitySlot] {
                self.0.abilities(side)
            }
            fn record_snapshot(&mut self) -> SnapshotId {
                self.1 += 1;
                if self.1 > 1 {
                    SnapshotId(usize::MAX)
                } else {
                    self.0.record_snapshot()
                }
            }
            fn restore_snapshot(&mut self, id: SnapshotId, purge_newer: bool) -> Result<(), BoardError> {
                self.0.restore_snapshot(id, purge_newer)
            }
            fn clear_snapshot(&mut self, id: SnapshotId) -> Result<(), BoardError> {
                self.0.clear_snapshot(id)
            }
            fn query_cells(&self, query: CellQuery, from: Position) -> Vec<Position> {
                self.0.query_cells(query, from)
            }
            fn apply_move(&mut self, from: Position, to: Position) -> Result<(), BoardError> {
                self.0.apply_move(from, to)
            }
            fn undo_move(&mut self, from: Position, to: Position) -> Result<(), BoardError> {
                self.0.undo_move(from, to)
            }
            fn apply_skill(&mut self, from: Position, target: Position, exploratory: bool) -> Result<(), BoardError> {
                self.0.apply_skill(from, target, exploratory)
            }
            fn apply_summon(&mut self, side: Side, kind: u32, to: Position) -> Result<(), BoardError> {
                self.0.apply_summon(side, kind, to)
            }
            fn invoke_ability(&mut self, ability: u32, side: Side, actor: Position) -> Result<(), BoardError> {
                self.0.invoke_ability(ability, side, actor)
            }
            fn apply_ability(
                &mut self,
                ability: u32,
                side: Side,
                effect: crate::board::AbilityEffect,
            ) -> Result<(), BoardError> {
                self.0.apply_ability(ability, side, effect)
            }
            fn is_cell_walkable(&self, pos: Position) -> bool {
                self.0.is_cell_walkable(pos)
            }
            fn is_line_blocked(&self, from: Position, to: Position) -> bool {
                self.0.is_line_blocked(from, to)
            }
            fn is_cell_receivable(&self, pos: Position, side: Side) -> bool {
                self.0.is_cell_receivable(pos, side)
            }
        }

        let mut board = Forgetful(testkit::skirmish(), 0);
        let before = board.0.layout().clone();
        let report = run_turn_search(&mut board, &SearchConfig::default());
        assert_eq!(report, TurnReport::default());
        assert_eq!(board.0.layout(), &before);
        assert_eq!(board.0.snapshot_depth(), 0);
    }
}
