//! Engine state management.
//!
//! Holds the current board position, the search configuration, engine
//! options and the last plan found, and runs the turn search for the `go`
//! command.

use std::collections::HashMap;
use std::io::{self, Write};
use std::path::Path;

use crate::board::{Action, Battlefield, BoardState, UnitId};
use crate::config::SearchConfig;
use crate::eval::evaluate;
use crate::playback::replay;
use crate::protocol::notation::{format_actions, parse_actions};
use crate::protocol::scenario::{load_scenario, ScenarioError};
use crate::search::{plan_unit, run_turn_search};

/// Holds the mutable state of the engine between commands.
pub struct Engine {
    pub position: Option<BoardState>,
    pub config: SearchConfig,
    pub options: HashMap<String, String>,
    last_plan: Vec<Action>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Creates a new engine with no position and the default configuration.
    pub fn new() -> Self {
        Engine {
            position: None,
            config: SearchConfig::default(),
            options: HashMap::new(),
            last_plan: Vec::new(),
        }
    }

    /// Resets the position and plan. Options survive a new game.
    pub fn new_game(&mut self) {
        self.position = None;
        self.last_plan.clear();
    }

    /// Loads the position from the scenario file at `path`.
    pub fn set_position(&mut self, path: impl AsRef<Path>) -> Result<(), ScenarioError> {
        let board = load_scenario(path)?;
        self.position = Some(board);
        self.last_plan.clear();
        Ok(())
    }

    /// Sets an engine option. Options that name a configuration field are
    /// applied to the search configuration; invalid values are logged and
    /// leave the configuration unchanged.
    pub fn set_option(&mut self, name: String, value: Option<String>) {
        let value = value.unwrap_or_default();
        if let Err(e) = self.config.set_option(&name, &value) {
            tracing::warn!(option = %name, error = %e, "option not applied");
        }
        self.options.insert(name, value);
    }

    pub fn last_plan(&self) -> &[Action] {
        &self.last_plan
    }

    /// Handles the `isready` command.
    pub fn handle_isready<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "readyok")?;
        out.flush()
    }

    /// Handles `go`: plans the whole turn for the side to act and writes
    /// `info` lines followed by `bestactions`.
    pub fn handle_go<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let board = match self.position.as_mut() {
            Some(b) => b,
            None => {
                tracing::warn!("go: no position set");
                return Ok(());
            }
        };

        let report = run_turn_search(board, &self.config);
        for rejected in &report.rejected {
            writeln!(out, "info rejected {}", rejected)?;
        }
        writeln!(
            out,
            "info lethal {} iterations {} nodes {} spent {}",
            report.lethal_kills.len(),
            report.iterations,
            report.nodes,
            report.spent
        )?;
        writeln!(out, "bestactions {}", format_actions(&report.actions))?;
        out.flush()?;

        self.last_plan = report.actions;
        Ok(())
    }

    /// Handles `go unit <id>`: plans a single unit with its own evaluator.
    pub fn handle_go_unit<W: Write>(&mut self, out: &mut W, unit: UnitId) -> io::Result<()> {
        let board = match self.position.as_mut() {
            Some(b) => b,
            None => {
                tracing::warn!("go: no position set");
                return Ok(());
            }
        };

        match plan_unit(board, unit, &self.config) {
            Ok(plan) => {
                writeln!(out, "info score {:.2}", plan.score)?;
                writeln!(out, "bestunitplan {}", format_actions(&plan.actions))?;
                self.last_plan = plan.actions;
            }
            Err(e) => {
                tracing::warn!(unit = unit.0, error = %e, "unit planning failed");
                writeln!(out, "bestunitplan {}", format_actions(&[]))?;
            }
        }
        out.flush()
    }

    /// Handles `eval`: scores the position for the side to act.
    pub fn handle_eval<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let board = match self.position.as_mut() {
            Some(b) => b,
            None => {
                tracing::warn!("eval: no position set");
                return Ok(());
            }
        };
        let side = board.active_side();
        match evaluate(board, side, &self.config) {
            Ok(breakdown) => writeln!(out, "info eval {}", breakdown)?,
            Err(e) => tracing::warn!(error = %e, "evaluation failed"),
        }
        out.flush()
    }

    /// Handles `replay`: plays `actions` (or the last plan) on the position
    /// and reports how many were applied.
    pub fn handle_replay<W: Write>(
        &mut self,
        out: &mut W,
        paced: bool,
        actions: Option<&str>,
    ) -> io::Result<()> {
        let board = match self.position.as_mut() {
            Some(b) => b,
            None => {
                tracing::warn!("replay: no position set");
                return Ok(());
            }
        };

        let plan = match actions.map(parse_actions) {
            Some(Ok(plan)) => plan,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "replay: cannot parse actions");
                return Ok(());
            }
            None => self.last_plan.clone(),
        };

        match replay(board, &plan, paced, &self.config) {
            Ok(applied) => writeln!(out, "replayed {}", applied)?,
            Err(e) => writeln!(out, "replayfailed {}", e)?,
        }
        out.flush()
    }
}
