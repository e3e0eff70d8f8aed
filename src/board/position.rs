//! Grid coordinates on the hex board.
//!
//! The board uses axial coordinates where each cell touches six others:
//! the four orthogonal neighbours plus the `(1,1)` / `(-1,-1)` diagonal.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An integer `(x, y)` cell coordinate.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

/// Offsets to the six cells sharing an edge with any cell.
pub const SIX_SIDES: [Position; 6] = [
    Position::new(1, 0),
    Position::new(0, 1),
    Position::new(1, 1),
    Position::new(-1, 0),
    Position::new(0, -1),
    Position::new(-1, -1),
];

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    /// Returns this position shifted by `offset`.
    pub const fn offset(self, offset: Position) -> Position {
        Position::new(self.x + offset.x, self.y + offset.y)
    }

    /// Iterates the six adjacent cells in `SIX_SIDES` order.
    pub fn neighbors(self) -> impl Iterator<Item = Position> {
        SIX_SIDES.into_iter().map(move |side| self.offset(side))
    }

    /// Returns true if `other` shares an edge with this cell.
    pub fn is_adjacent(self, other: Position) -> bool {
        self.neighbors().any(|n| n == other)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Position::new(x, y)
    }
}
