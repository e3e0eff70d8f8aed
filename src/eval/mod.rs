//! Position evaluation.
//!
//! Two evaluators share the board API: the holistic evaluator scores a whole
//! position for one side and drives the turn search; the mode evaluator
//! scores a single unit's situation according to its AI profile and drives
//! the per-unit planner.

pub mod holistic;
pub mod mode;
pub mod weights;

pub use holistic::{evaluate, Breakdown};
pub use mode::evaluate_mode;
pub use weights::{Term, SENTINEL};
