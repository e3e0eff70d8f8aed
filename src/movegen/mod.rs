//! Candidate action generation.
//!
//! Enumerates every legal action for the active side: summons from the
//! reserve, unit moves and skill casts, and special abilities. Generation
//! runs inside a checkpoint, so the board is unchanged afterwards even
//! though ability probing mutates it.

pub mod ability;
pub mod summon;
pub mod unit;

use crate::board::{with_checkpoint, Action, BoardError, Battlefield, CatalogError, UnitId};
use crate::config::SearchConfig;

/// The output of one generation pass.
#[derive(Debug, Clone, Default)]
pub struct Generated {
    pub actions: Vec<Action>,
    /// Catalog lookups that failed; the affected actions were dropped.
    pub rejected: Vec<CatalogError>,
}

/// Generates all candidates for the active side. Unit actions follow
/// `order`; units it does not list come after, in board order.
pub fn generate<B>(board: &mut B, config: &SearchConfig, order: &[UnitId]) -> Result<Generated, BoardError>
where
    B: Battlefield + ?Sized,
{
    if board.action_points() == 0 {
        return Ok(Generated::default());
    }
    with_checkpoint(board, |b| {
        let mut out = Generated::default();
        out.actions.extend(summon::summon_candidates(&*b, config));
        out.actions.extend(unit::unit_candidates(&*b, order, &mut out.rejected));
        let abilities = ability::ability_candidates(b, config, &mut out.rejected)?;
        out.actions.extend(abilities);
        Ok(out)
    })
}
