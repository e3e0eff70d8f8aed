//! Action types a side can take during its turn.
//!
//! Each variant carries exactly the cells and ids it needs. Actions are
//! immutable once built; the generator creates them fresh every search
//! iteration.

use std::fmt;

use super::position::Position;
use super::unit::UnitKind;

/// What a special ability does when it resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbilityEffect {
    Heal { target: Position },
    Ignite { target: Position },
    Gold { target: Position },
    /// Brings a reserve unit straight onto `to`.
    Teleport { kind: UnitKind, to: Position },
    /// Blinks the unit at `from` onto `to`.
    Flash { from: Position, to: Position },
    /// Hastes the unit at `from` and moves it to `to`.
    Dash { from: Position, to: Position },
}

/// The kind-specific part of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    NoOp,
    Summon { kind: UnitKind, to: Position },
    Move { from: Position, to: Position },
    Skill { from: Position, target: Position },
    Ability { ability: u32, effect: AbilityEffect },
}

/// A single action and the action points it consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Action {
    pub kind: ActionKind,
    pub cost: u32,
}

impl Action {
    pub const fn noop() -> Self {
        Action { kind: ActionKind::NoOp, cost: 0 }
    }

    pub const fn mov(from: Position, to: Position) -> Self {
        Action { kind: ActionKind::Move { from, to }, cost: 1 }
    }

    pub const fn skill(from: Position, target: Position) -> Self {
        Action { kind: ActionKind::Skill { from, target }, cost: 1 }
    }

    pub const fn summon(kind: UnitKind, to: Position, cost: u32) -> Self {
        Action { kind: ActionKind::Summon { kind, to }, cost }
    }

    pub const fn ability(ability: u32, effect: AbilityEffect, cost: u32) -> Self {
        Action { kind: ActionKind::Ability { ability, effect }, cost }
    }

    /// Returns a copy with the point cost overridden.
    pub const fn with_cost(self, cost: u32) -> Self {
        Action { kind: self.kind, cost }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self.kind, ActionKind::NoOp)
    }
}

impl fmt::Display for AbilityEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbilityEffect::Heal { target } => write!(f, "heal@{}", target),
            AbilityEffect::Ignite { target } => write!(f, "ignite@{}", target),
            AbilityEffect::Gold { target } => write!(f, "gold@{}", target),
            AbilityEffect::Teleport { kind, to } => write!(f, "teleport {}@{}", kind, to),
            AbilityEffect::Flash { from, to } => write!(f, "flash {}>{}", from, to),
            AbilityEffect::Dash { from, to } => write!(f, "dash {}>{}", from, to),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ActionKind::NoOp => write!(f, "noop"),
            ActionKind::Summon { kind, to } => write!(f, "summon {}@{}#{}", kind, to, self.cost),
            ActionKind::Move { from, to } => write!(f, "move {}>{}", from, to),
            ActionKind::Skill { from, target } => write!(f, "skill {}@{}", from, target),
            ActionKind::Ability { ability, effect } => {
                write!(f, "ability {} {}#{}", ability, effect, self.cost)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_costs() {
        let a = Position::new(0, 0);
        let b = Position::new(1, 0);
        assert_eq!(Action::mov(a, b).cost, 1);
        assert_eq!(Action::skill(a, b).cost, 1);
        assert_eq!(Action::noop().cost, 0);
        assert_eq!(Action::mov(a, b).with_cost(4).cost, 4);
    }

    #[test]
    fn notation() {
        let a = Position::new(1, 2);
        let b = Position::new(2, 3);
        assert_eq!(Action::mov(a, b).to_string(), "move 1,2>2,3");
        assert_eq!(Action::skill(a, b).to_string(), "skill 1,2@2,3");
        assert_eq!(Action::summon(1003, a, 2).to_string(), "summon 1003@1,2#2");
        assert_eq!(
            Action::ability(101, AbilityEffect::Heal { target: b }, 1).to_string(),
            "ability 101 heal@2,3#1"
        );
        assert_eq!(Action::noop().to_string(), "noop");
    }
}
