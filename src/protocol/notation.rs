//! Action notation.
//!
//! The text form used in `bestactions`, `bestunitplan` and `replay`:
//!
//! ```text
//! noop
//! move 1,2>2,3
//! skill 1,2@4,4
//! summon 1003@0,1#2
//! ability 101 heal@3,3#1
//! ability 104 teleport 1002@5,2#3
//! ability 105 flash 2,3>4,3#2
//! ```
//!
//! Several actions are joined with ` ; `.

use thiserror::Error;

use crate::board::{AbilityEffect, Action, Position};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NotationError {
    #[error("empty input")]
    EmptyInput,

    #[error("unknown action '{0}'")]
    UnknownAction(String),

    #[error("unknown ability effect '{0}'")]
    UnknownEffect(String),

    #[error("invalid cell '{0}'")]
    InvalidCell(String),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("expected {expected} in '{found}'")]
    Malformed { expected: &'static str, found: String },
}

fn cell(s: &str) -> Result<Position, NotationError> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| NotationError::InvalidCell(s.to_string()))?;
    match (x.trim().parse(), y.trim().parse()) {
        (Ok(x), Ok(y)) => Ok(Position::new(x, y)),
        _ => Err(NotationError::InvalidCell(s.to_string())),
    }
}

fn number(s: &str) -> Result<u32, NotationError> {
    s.trim()
        .parse()
        .map_err(|_| NotationError::InvalidNumber(s.to_string()))
}

fn split<'a>(s: &'a str, sep: char, expected: &'static str) -> Result<(&'a str, &'a str), NotationError> {
    s.split_once(sep).ok_or_else(|| NotationError::Malformed {
        expected,
        found: s.to_string(),
    })
}

/// Splits a trailing `#cost`.
fn costed(s: &str) -> Result<(&str, u32), NotationError> {
    let (body, cost) = s.rsplit_once('#').ok_or_else(|| NotationError::Malformed {
        expected: "'#cost'",
        found: s.to_string(),
    })?;
    Ok((body, number(cost)?))
}

fn effect(s: &str) -> Result<AbilityEffect, NotationError> {
    let (name, args) = match s.split_once(' ') {
        Some((name, args)) => (name, args),
        None => split(s, '@', "'@target'")?,
    };
    let hop = |args: &str| -> Result<(Position, Position), NotationError> {
        let (from, to) = split(args, '>', "'from>to'")?;
        Ok((cell(from)?, cell(to)?))
    };
    match name {
        "heal" => Ok(AbilityEffect::Heal { target: cell(args)? }),
        "ignite" => Ok(AbilityEffect::Ignite { target: cell(args)? }),
        "gold" => Ok(AbilityEffect::Gold { target: cell(args)? }),
        "teleport" => {
            let (kind, to) = split(args, '@', "'kind@cell'")?;
            Ok(AbilityEffect::Teleport {
                kind: number(kind)?,
                to: cell(to)?,
            })
        }
        "flash" => hop(args).map(|(from, to)| AbilityEffect::Flash { from, to }),
        "dash" => hop(args).map(|(from, to)| AbilityEffect::Dash { from, to }),
        other => Err(NotationError::UnknownEffect(other.to_string())),
    }
}

/// Parses one action.
pub fn parse_action(s: &str) -> Result<Action, NotationError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(NotationError::EmptyInput);
    }
    let (verb, rest) = s.split_once(' ').unwrap_or((s, ""));
    let rest = rest.trim();

    match verb {
        "noop" => Ok(Action::noop()),
        "move" => {
            let (from, to) = split(rest, '>', "'from>to'")?;
            Ok(Action::mov(cell(from)?, cell(to)?))
        }
        "skill" => {
            let (from, target) = split(rest, '@', "'from@target'")?;
            Ok(Action::skill(cell(from)?, cell(target)?))
        }
        "summon" => {
            let (body, cost) = costed(rest)?;
            let (kind, to) = split(body, '@', "'kind@cell'")?;
            Ok(Action::summon(number(kind)?, cell(to)?, cost))
        }
        "ability" => {
            let (id, body) = split(rest, ' ', "'id effect'")?;
            let (body, cost) = costed(body.trim())?;
            Ok(Action::ability(number(id)?, effect(body)?, cost))
        }
        other => Err(NotationError::UnknownAction(other.to_string())),
    }
}

/// Parses actions separated by ` ; `.
pub fn parse_actions(s: &str) -> Result<Vec<Action>, NotationError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(NotationError::EmptyInput);
    }
    s.split(';').map(parse_action).collect()
}

/// Formats a plan. An empty plan is written as `noop`.
pub fn format_actions(actions: &[Action]) -> String {
    if actions.is_empty() {
        return Action::noop().to_string();
    }
    actions
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(" ; ")
}
