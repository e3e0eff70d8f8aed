//! Real playback of a committed plan.
//!
//! Search never runs here: playback consumes the finished action log and
//! applies each action through the non-exploratory path, one at a time.
//! Paced playback sleeps a jittered interval between steps.

use std::ops::Range;
use std::thread;
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::board::{apply_action, Action, BoardError, Battlefield};
use crate::config::SearchConfig;

pub struct Playback {
    rng: SmallRng,
    pace_ms: Range<u64>,
    paced: bool,
}

impl Playback {
    pub fn new(pace_ms: Range<u64>, paced: bool) -> Self {
        Playback {
            rng: SmallRng::from_entropy(),
            pace_ms,
            paced,
        }
    }

    pub fn seeded(pace_ms: Range<u64>, paced: bool, seed: u64) -> Self {
        Playback {
            rng: SmallRng::seed_from_u64(seed),
            pace_ms,
            paced,
        }
    }

    /// The pause before the next step.
    pub fn next_pause(&mut self) -> Duration {
        let ms = if self.pace_ms.is_empty() {
            self.pace_ms.start
        } else {
            self.rng.gen_range(self.pace_ms.clone())
        };
        Duration::from_millis(ms)
    }

    /// Applies `actions` in order and returns how many were applied. No-ops
    /// are skipped. Stops at the first action the board rejects.
    pub fn play<B>(&mut self, board: &mut B, actions: &[Action]) -> Result<usize, BoardError>
    where
        B: Battlefield + ?Sized,
    {
        let mut applied = 0;
        for action in actions.iter().filter(|a| !a.is_noop()) {
            if self.paced && applied > 0 {
                thread::sleep(self.next_pause());
            }
            if let Err(e) = apply_action(board, action, false) {
                tracing::warn!(%action, error = %e, step = applied, "playback stopped");
                return Err(e);
            }
            tracing::debug!(%action, "played");
            applied += 1;
        }
        Ok(applied)
    }
}

/// Plays `actions` back on `board` with the pacing from `config`.
pub fn replay<B>(board: &mut B, actions: &[Action], paced: bool, config: &SearchConfig) -> Result<usize, BoardError>
where
    B: Battlefield + ?Sized,
{
    Playback::new(config.pace_ms.clone(), paced).play(board, actions)
}
