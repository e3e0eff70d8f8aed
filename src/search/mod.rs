//! Search and planning.
//!
//! A single-turn planner: detect and commit one-turn kills, then repeatedly
//! generate, simulate and score every candidate, pick the next action with
//! a bounded knapsack, and commit it, until the action points run out or
//! nothing improves the position.

pub mod candidate;
pub mod knapsack;
pub mod lethal;
pub mod micro;
pub mod turn;

pub use candidate::{ActionClass, Candidate, Cell};
pub use lethal::{commit_lethal, find_lethal_target, LethalOutcome, LethalTarget};
pub use micro::{plan_unit, UnitPlan};
pub use turn::{run_turn_search, Phase, TurnReport, TurnSearch};

use crate::board::{BoardError, UnitId};

/// Errors that abort a search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("board error: {0}")]
    Board(#[from] BoardError),

    #[error("committed {spent} of {budget} points but {remaining} remain")]
    BudgetViolation { budget: u32, spent: u32, remaining: u32 },

    #[error("unit {0:?} is not on the board")]
    UnknownUnit(UnitId),
}
