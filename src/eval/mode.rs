//! Per-unit evaluation by AI mode.
//!
//! Each mode sums a different weighted subset of primitive sub-scores. The
//! `Tank` mode layers reciprocal-distance fallbacks under a large negative
//! sentinel so that "priority target in range" always outranks "chasing a
//! priority target", which always outranks "chasing anything".

use crate::board::{
    can_hit, can_hit_within_one_move, chessboard_distance, AiMode, BoardError, Battlefield,
    Building, BuildingKind, Position, Relation, Side, Unit,
};
use crate::config::SearchConfig;

use super::weights::{Term, SENTINEL};

/// Reach of the turret attraction in every mode.
const TURRET_RANGE: u32 = 2;
const NEAR_HOME_RANGE: u32 = 10;

/// Health of each side weighted by protect weight, ours minus theirs.
fn hero_blood<B: Battlefield + ?Sized>(board: &B, side: Side) -> f64 {
    let catalog = board.catalog();
    let mut ours = 0.0;
    let mut theirs = 0.0;
    for u in board.units().iter().filter(|u| u.is_alive()) {
        let weight = catalog.profile(u.kind).map(|p| p.protect_weight).unwrap_or(1.0) as f64;
        let v = u.hp as f64 * weight / u.max_hp.max(1) as f64 * 100.0;
        if u.side == side {
            ours += v;
        } else {
            theirs += v;
        }
    }
    (ours - theirs).trunc() * Term::HeroBlood.weight()
}

fn hero_count<B: Battlefield + ?Sized>(board: &B, side: Side, config: &SearchConfig) -> f64 {
    let count = |s: Side| {
        board
            .units()
            .iter()
            .filter(|u| u.side == s && u.is_alive() && !config.minion_kinds.contains(&u.kind))
            .count() as f64
    };
    (count(side) - count(side.opponent())) * Term::HeroCount.weight()
}

fn action_points<B: Battlefield + ?Sized>(board: &B) -> f64 {
    board.action_points() as f64 * Term::ActionPoints.weight()
}

fn side_buildings<B>(board: &B, side: Side) -> impl Iterator<Item = &Building>
where
    B: Battlefield + ?Sized,
{
    board
        .buildings()
        .iter()
        .filter(move |b| b.side == Some(side) && b.is_standing())
}

/// Health percentage of every structure of each side, ours minus theirs.
fn nexus_blood<B: Battlefield + ?Sized>(board: &B, side: Side) -> f64 {
    let pct = |s: Side| -> f64 {
        side_buildings(board, s)
            .map(|b| b.hp as f64 / b.max_hp.max(1) as f64 * 100.0)
            .sum()
    };
    (pct(side) - pct(side.opponent())).trunc() * Term::NexusBlood.weight()
}

/// Share of enemies unable to reach `actor` even after one step.
fn cant_be_hit<B: Battlefield + ?Sized>(board: &mut B, actor: &Unit) -> Result<f64, BoardError> {
    let enemies: Vec<Position> = board
        .units()
        .iter()
        .filter(|u| u.side != actor.side)
        .map(|u| u.pos)
        .collect();
    if enemies.is_empty() {
        return Ok(0.0);
    }
    let share = (100 / enemies.len()) as f64;
    let mut score = 0.0;
    for e in enemies {
        if !can_hit_within_one_move(board, e, actor.pos, Relation::Enemy)? {
            score += share;
        }
    }
    Ok(score * Term::CantBeHit.weight())
}

/// Share of all other units `actor` can reach from where it stands.
fn can_hit_share<B: Battlefield + ?Sized>(board: &B, actor: &Unit) -> f64 {
    let others: Vec<Position> = board
        .units()
        .iter()
        .filter(|u| u.id != actor.id)
        .map(|u| u.pos)
        .collect();
    if others.is_empty() {
        return 0.0;
    }
    let share = (100 / others.len()) as f64;
    let hits = others
        .iter()
        .filter(|&&p| can_hit(board, actor.pos, p, Relation::Any))
        .count();
    hits as f64 * share * Term::CanHit.weight()
}

fn near_enemy<B: Battlefield + ?Sized>(board: &B, side: Side) -> f64 {
    let units = board.units();
    let mut score = 0.0;
    for u in units.iter().filter(|u| u.side == side) {
        for e in units.iter().filter(|e| e.side != side) {
            let d = chessboard_distance(u.pos, e.pos);
            if d > 0 {
                score += 100.0 / d as f64;
            }
        }
    }
    score * Term::NearEnemy.weight()
}

fn near_turret<B: Battlefield + ?Sized>(board: &B, side: Side, radius: u32) -> f64 {
    let mut score = 0.0;
    for u in board.units().iter().filter(|u| u.side == side) {
        for t in board
            .buildings()
            .iter()
            .filter(|b| b.kind == BuildingKind::Turret && b.side.is_none() && b.is_standing())
        {
            // A turret occupies its cell, so 0 only means out of the ring.
            let d = chessboard_distance(u.pos, t.pos);
            if d > 0 && d <= radius {
                score += 1.0 / d as f64;
            }
        }
    }
    score * Term::NearTurret.weight()
}

/// Closeness to every opposing structure; `10 - d` for each within 10.
fn near_their_home<B: Battlefield + ?Sized>(board: &B, side: Side) -> f64 {
    let targets: Vec<Position> = side_buildings(board, side.opponent()).map(|b| b.pos).collect();
    let score: u32 = board
        .units()
        .iter()
        .filter(|u| u.side == side)
        .flat_map(|u| targets.iter().map(move |&t| chessboard_distance(u.pos, t)))
        .filter(|&d| d < NEAR_HOME_RANGE)
        .map(|d| NEAR_HOME_RANGE - d)
        .sum();
    score as f64 * Term::NearTheirHome.weight()
}

/// Tank pressure on ranged and support enemies.
fn chase_crispy<B: Battlefield + ?Sized>(board: &B, actor: &Unit) -> f64 {
    let catalog = board.catalog();
    let enemies: Vec<&Unit> = board
        .units()
        .iter()
        .filter(|u| u.side != actor.side && u.is_attackable())
        .collect();
    let crispy: Vec<&Unit> = enemies
        .iter()
        .copied()
        .filter(|u| catalog.role(u.kind).is_crispy())
        .collect();

    if !crispy.is_empty() {
        let share = (100 / enemies.len()) as f64;
        let hits = crispy
            .iter()
            .filter(|c| can_hit(board, actor.pos, c.pos, Relation::Enemy))
            .count();
        if hits > 0 {
            return hits as f64 * share * Term::ChaseCrispy.weight();
        }
    }

    let nearest = |units: &[&Unit]| {
        units
            .iter()
            .map(|u| chessboard_distance(actor.pos, u.pos))
            .filter(|&d| d != 0)
            .min()
    };
    let mut score = -SENTINEL;
    if let Some(d) = nearest(&crispy) {
        score += 1.0 / d as f64 * 1_000_000.0;
    } else if let Some(d) = nearest(&enemies) {
        score += 1.0 / d as f64 * 100.0;
    }
    score
}

/// Scores the position for the unit standing at `actor` under `mode`.
pub fn evaluate_mode<B>(
    board: &mut B,
    actor: Position,
    mode: AiMode,
    config: &SearchConfig,
) -> Result<f64, BoardError>
where
    B: Battlefield + ?Sized,
{
    let unit = *board.unit_at(actor).ok_or(BoardError::NoUnitAt(actor))?;
    let side = unit.side;
    let hb = hero_blood(board, side);
    let nb = nexus_blood(board, side);
    let ne = near_enemy(board, side);
    let ap = action_points(board);
    let ntt = near_their_home(board, side);
    let turret = near_turret(board, side, TURRET_RANGE);

    let score = match mode {
        AiMode::Balance | AiMode::MaxDamage => {
            hb + hero_count(board, side, config) + ne + nb + turret + ap + ntt
        }
        AiMode::MaxAttackDistance => {
            can_hit_share(board, &unit) + cant_be_hit(board, &unit)? + hb + ne / 2.0 + nb + turret + ap + ntt
        }
        AiMode::Escape => cant_be_hit(board, &unit)? + hb / 2.0 + ne / 3.0 + nb + turret + ap + ntt,
        AiMode::Tank => chase_crispy(board, &unit) + hb * 10.0 + nb + turret + ntt,
    };
    Ok(score)
}
