//! Hex distance, range masks, line of sight, and hit reachability.
//!
//! `can_hit_within_one_move` is the most expensive primitive in the planner:
//! it relocates the actor to each free neighbour, retests, and undoes the
//! move, all inside a single checkpoint.

use super::battlefield::{with_checkpoint, BoardError, Battlefield};
use super::catalog::RangeMasks;
use super::position::Position;
use super::unit::Relation;

/// Largest ring searched by `chessboard_distance`.
pub const MAX_RING: u32 = 10;

/// Uncapped hex distance between two cells.
#[inline]
pub fn hex_distance(a: Position, b: Position) -> u32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dx.unsigned_abs()
        .max(dy.unsigned_abs())
        .max((dx - dy).unsigned_abs())
}

/// Ring index at which `target` appears around `center`.
///
/// Returns 0 for the same cell and for cells beyond `MAX_RING`; callers treat
/// 0 as "not reachable within the searched radius".
#[inline]
pub fn chessboard_distance(center: Position, target: Position) -> u32 {
    let d = hex_distance(center, target);
    if d > MAX_RING {
        0
    } else {
        d
    }
}

/// Cells strictly between `from` and `to` on the straight hex line.
pub fn hex_line(from: Position, to: Position) -> Vec<Position> {
    let n = hex_distance(from, to);
    if n < 2 {
        return Vec::new();
    }
    let cube = |p: Position| (p.x as f64, -(p.y as f64), (p.y - p.x) as f64);
    // Nudge off exact cell edges so ties round consistently.
    let (ax, ay, az) = cube(from);
    let (ax, ay, az) = (ax + 1e-6, ay + 2e-6, az - 3e-6);
    let (bx, by, bz) = cube(to);

    (1..n)
        .map(|i| {
            let t = i as f64 / n as f64;
            let fx = ax + (bx - ax) * t;
            let fy = ay + (by - ay) * t;
            let fz = az + (bz - az) * t;
            let (mut rx, mut ry, rz) = (fx.round(), fy.round(), fz.round());
            let (dx, dy, dz) = ((rx - fx).abs(), (ry - fy).abs(), (rz - fz).abs());
            if dx > dy && dx > dz {
                rx = -ry - rz;
            } else if dy > dz {
                ry = -rx - rz;
            }
            Position::new(rx as i32, -(ry as i32))
        })
        .collect()
}

/// Tests whether `to` is inside the range encoded by `masks` for `relation`.
///
/// Past distance 1, skills that are not `designated` also need a clear line
/// of sight.
pub fn is_in_range<B>(
    board: &B,
    from: Position,
    to: Position,
    masks: &RangeMasks,
    relation: Relation,
    designated: bool,
) -> bool
where
    B: Battlefield + ?Sized,
{
    let distance = chessboard_distance(from, to);
    if masks.for_relation(relation) & (1u32 << distance) == 0 {
        return false;
    }
    if distance > 1 && !designated && board.is_line_blocked(from, to) {
        return false;
    }
    true
}

/// Whether the unit at `actor` can reach `target` with its skill from where
/// it stands.
pub fn can_hit<B>(board: &B, actor: Position, target: Position, relation: Relation) -> bool
where
    B: Battlefield + ?Sized,
{
    let Some(unit) = board.unit_at(actor) else {
        return false;
    };
    match board.catalog().skill_of(unit.kind) {
        Ok(skill) => is_in_range(board, actor, target, &skill.masks, relation, skill.designated),
        Err(_) => false,
    }
}

/// Whether the unit at `actor` can reach `target` from its cell or from any
/// free, walkable neighbour.
pub fn can_hit_within_one_move<B>(
    board: &mut B,
    actor: Position,
    target: Position,
    relation: Relation,
) -> Result<bool, BoardError>
where
    B: Battlefield + ?Sized,
{
    if board.unit_at(actor).is_none() {
        return Ok(false);
    }
    if can_hit(board, actor, target, relation) {
        return Ok(true);
    }
    let steps: Vec<Position> = actor
        .neighbors()
        .filter(|&n| board.is_cell_walkable(n) && !board.is_occupied(n))
        .collect();
    if steps.is_empty() {
        return Ok(false);
    }

    with_checkpoint(board, |b| {
        for step in steps {
            b.apply_move(actor, step)?;
            let hit = can_hit(b, step, target, relation);
            b.undo_move(actor, step)?;
            if hit {
                return Ok(true);
            }
        }
        Ok(false)
    })
}
