//! Scored candidate actions.

use crate::board::{AbilityEffect, Action, ActionKind, Position, UnitKind};
use crate::eval::Breakdown;

/// Whether a candidate relocates something or affects a target in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionClass {
    /// Moves, summons and the relocating abilities.
    Move,
    /// Skill casts and the targeted abilities.
    Skill,
    Idle,
}

/// A normalized cell used for conflict detection. Summoned and teleported
/// units have not reached the board yet, so they are identified by their
/// reserve kind instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Board(Position),
    Reserve(UnitKind),
    None,
}

/// An action together with the evaluation change it produced when
/// simulated.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub action: Action,
    /// Score after minus score before.
    pub delta: f32,
    /// Evaluation after the action, kept for logging.
    pub breakdown: Breakdown,
    pub class: ActionClass,
    pub actor_cell: Cell,
    pub target_cell: Cell,
}

impl Candidate {
    pub fn new(action: Action, delta: f32, breakdown: Breakdown) -> Self {
        let (class, actor_cell, target_cell) = normalize(&action);
        Candidate {
            action,
            delta,
            breakdown,
            class,
            actor_cell,
            target_cell,
        }
    }

    /// The do-nothing result the selector falls back to.
    pub fn idle() -> Self {
        Candidate::new(Action::noop(), 0.0, Breakdown::default())
    }

    /// Score delta per action point. Free actions have no efficiency.
    pub fn efficiency(&self) -> f32 {
        if self.action.cost > 0 {
            self.delta / self.action.cost as f32
        } else {
            0.0
        }
    }

    pub fn is_move(&self) -> bool {
        self.class == ActionClass::Move
    }

    pub fn is_skill(&self) -> bool {
        self.class == ActionClass::Skill
    }

    /// The special-ability id, if this is an ability use.
    pub fn ability(&self) -> Option<u32> {
        match self.action.kind {
            ActionKind::Ability { ability, .. } => Some(ability),
            _ => None,
        }
    }
}

fn normalize(action: &Action) -> (ActionClass, Cell, Cell) {
    use Cell::{Board, Reserve};
    match action.kind {
        ActionKind::NoOp => (ActionClass::Idle, Cell::None, Cell::None),
        ActionKind::Move { from, to } => (ActionClass::Move, Board(from), Board(to)),
        ActionKind::Summon { kind, to } => (ActionClass::Move, Reserve(kind), Board(to)),
        ActionKind::Skill { from, target } => (ActionClass::Skill, Board(from), Board(target)),
        ActionKind::Ability { effect, .. } => match effect {
            AbilityEffect::Teleport { kind, to } => (ActionClass::Move, Reserve(kind), Board(to)),
            AbilityEffect::Flash { from, to } | AbilityEffect::Dash { from, to } => {
                (ActionClass::Move, Board(from), Board(to))
            }
            AbilityEffect::Heal { target }
            | AbilityEffect::Ignite { target }
            | AbilityEffect::Gold { target } => (ActionClass::Skill, Cell::None, Board(target)),
        },
    }
}
