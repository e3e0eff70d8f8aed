//! Tactician -- a turn planner for hex skirmish games.
//!
//! This binary reads commands from stdin and writes responses to stdout.
//! Diagnostics go to stderr through `tracing`; set `RUST_LOG` to see them.

use std::io::{self, BufRead};

use tracing_subscriber::EnvFilter;

use tactician::engine::Engine;
use tactician::protocol::parser::{parse_command, Command};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Runs the main protocol loop, reading commands from stdin and writing
/// responses to stdout.
fn main() -> io::Result<()> {
    init_logging();

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let mut engine = Engine::new();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };

        let cmd = match parse_command(&line) {
            Some(c) => c,
            None => continue,
        };

        match cmd {
            Command::IsReady => engine.handle_isready(&mut out)?,
            Command::SetOption { name, value } => engine.set_option(name, value),
            Command::NewGame => engine.new_game(),
            Command::Position { path } => {
                if let Err(e) = engine.set_position(&path) {
                    tracing::error!(%path, error = %e, "position not loaded");
                }
            }
            Command::Go(params) => match params.unit {
                Some(unit) => engine.handle_go_unit(&mut out, unit)?,
                None => engine.handle_go(&mut out)?,
            },
            Command::Eval => engine.handle_eval(&mut out)?,
            Command::Replay { paced, actions } => {
                engine.handle_replay(&mut out, paced, actions.as_deref())?
            }
            Command::Quit => break,
        }
    }
    Ok(())
}
