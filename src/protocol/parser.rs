//! Command parser.
//!
//! Parses incoming protocol commands from raw text into structured
//! `Command` variants that the engine main loop can dispatch on.

use crate::board::UnitId;

/// Constraints passed with the `go` command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoParams {
    /// Plan a single unit with its own evaluator instead of the whole turn.
    pub unit: Option<UnitId>,
}

/// A parsed client-to-engine command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Synchronization ping; engine must reply `readyok`.
    IsReady,

    /// Set an engine option: `setoption name <id> [value <x>]`.
    SetOption { name: String, value: Option<String> },

    /// Reset engine state for a new game.
    NewGame,

    /// Load the board position from a scenario file.
    Position { path: String },

    /// Plan the turn (or one unit) for the active side.
    Go(GoParams),

    /// Score the current position for the active side.
    Eval,

    /// Play a plan on the current position. Without explicit actions the
    /// last plan found by `go` is used.
    Replay { paced: bool, actions: Option<String> },

    /// Terminate the engine process.
    Quit,
}

/// Parses a single line of input into a `Command`.
///
/// Returns `None` for empty lines or unrecognized commands. Malformed
/// arguments for known commands also return `None` after logging a warning.
pub fn parse_command(line: &str) -> Option<Command> {
    let trimmed = line.trim();
    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    let first = *tokens.first()?;

    match first {
        "isready" => Some(Command::IsReady),
        "quit" => Some(Command::Quit),
        "newgame" => Some(Command::NewGame),
        "eval" => Some(Command::Eval),

        "setoption" => parse_setoption(&tokens),
        "position" => parse_position(trimmed),
        "go" => parse_go(&tokens),
        "replay" => Some(parse_replay(trimmed)),

        other => {
            tracing::warn!(command = other, "unknown command");
            None
        }
    }
}

/// Parses `setoption name <id> [value <x>]`.
fn parse_setoption(tokens: &[&str]) -> Option<Command> {
    if tokens.len() < 3 || tokens[1] != "name" {
        tracing::warn!("malformed setoption: expected 'setoption name <id> [value <x>]'");
        return None;
    }

    let value_idx = tokens.iter().position(|&t| t == "value");

    let (name, value) = match value_idx {
        Some(vi) => {
            let name_parts = &tokens[2..vi];
            let value_parts = &tokens[vi + 1..];
            if name_parts.is_empty() {
                tracing::warn!("malformed setoption: empty name");
                return None;
            }
            let value = if value_parts.is_empty() {
                None
            } else {
                Some(value_parts.join(" "))
            };
            (name_parts.join(" "), value)
        }
        None => (tokens[2..].join(" "), None),
    };

    Some(Command::SetOption { name, value })
}

/// Parses `position <path>`. The path is the rest of the line.
fn parse_position(line: &str) -> Option<Command> {
    let path = line.strip_prefix("position").unwrap_or("").trim();
    if path.is_empty() {
        tracing::warn!("malformed position: expected 'position <path>'");
        return None;
    }
    Some(Command::Position {
        path: path.to_string(),
    })
}

/// Parses `go [unit <id>]`.
fn parse_go(tokens: &[&str]) -> Option<Command> {
    let mut params = GoParams::default();
    let mut i = 1;

    while i < tokens.len() {
        match tokens[i] {
            "unit" => {
                i += 1;
                match tokens.get(i).map(|t| t.parse::<u32>()) {
                    Some(Ok(id)) => params.unit = Some(UnitId(id)),
                    Some(Err(_)) => {
                        tracing::warn!(value = tokens[i], "invalid unit id");
                        return None;
                    }
                    None => {
                        tracing::warn!("malformed go: expected 'go unit <id>'");
                        return None;
                    }
                }
            }
            other => {
                tracing::warn!(param = other, "unknown go parameter");
            }
        }
        i += 1;
    }

    Some(Command::Go(params))
}

/// Parses `replay [paced] [<actions>]`.
fn parse_replay(line: &str) -> Command {
    let rest = line.strip_prefix("replay").unwrap_or("").trim();
    let (paced, rest) = match rest.strip_prefix("paced") {
        Some(r) if r.is_empty() || r.starts_with(' ') => (true, r.trim()),
        _ => (false, rest),
    };
    let actions = if rest.is_empty() {
        None
    } else {
        Some(rest.to_string())
    };
    Command::Replay { paced, actions }
}
