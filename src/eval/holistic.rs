//! Holistic position evaluation.
//!
//! Scores a board from one side's perspective as the sum of five terms:
//! material, structure proximity, safety, offense, and cohesion. Terms are
//! returned separately in a `Breakdown` so the search can log why a
//! candidate won.
//!
//! Offense tests one-move reachability, which mutates and restores the
//! board; evaluation therefore needs `&mut` access.

use std::fmt;

use crate::board::{
    can_hit, can_hit_within_one_move, chessboard_distance, BoardError, Battlefield, Building,
    Catalog, Relation, Side, Unit, UnitKind,
};
use crate::config::SearchConfig;

const UNIT_VALUE: f32 = 100.0;
const ELITE_VALUE: f32 = 150.0;
const STRUCTURE_VALUE: f32 = 200.0;
/// Added to both sides of health ratios so near-dead pieces keep some value.
const HP_SMOOTHING: f32 = 3.0;
const PROXIMITY_REACH: f32 = 25.0;

/// Per-term scores of one evaluation, already weighted.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Breakdown {
    pub material: f32,
    pub proximity: f32,
    pub safety: f32,
    pub offense: f32,
    pub cohesion: f32,
}

impl Breakdown {
    pub fn total(&self) -> f32 {
        self.material + self.proximity + self.safety + self.offense + self.cohesion
    }
}

impl fmt::Display for Breakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2} / {:.2} / {:.2} / {:.2} / {:.2} / {:.2}",
            self.total(),
            self.material,
            self.proximity,
            self.safety,
            self.offense,
            self.cohesion
        )
    }
}

#[inline]
pub(crate) fn unit_value(catalog: &Catalog, kind: UnitKind) -> f32 {
    if catalog.is_elite(kind) {
        ELITE_VALUE
    } else {
        UNIT_VALUE
    }
}

#[inline]
pub(crate) fn health_ratio(hp: i32, max_hp: i32) -> f32 {
    (hp as f32 + HP_SMOOTHING) / (max_hp as f32 + HP_SMOOTHING)
}

/// Damage one cast of `unit`'s skill deals.
#[inline]
pub(crate) fn skill_damage(catalog: &Catalog, unit: &Unit) -> i32 {
    let effect = catalog.skill_of(unit.kind).map(|s| s.effect_count).unwrap_or(1);
    unit.attack * effect
}

fn side_units<B: Battlefield + ?Sized>(board: &B, side: Side) -> Vec<Unit> {
    board
        .units()
        .iter()
        .filter(|u| u.side == side && u.is_alive())
        .copied()
        .collect()
}

fn side_buildings<B: Battlefield + ?Sized>(board: &B, side: Side) -> Vec<Building> {
    board
        .buildings()
        .iter()
        .filter(|b| b.side == Some(side) && b.is_standing())
        .copied()
        .collect()
}

/// Fielded units, reserve, and structures of `side`, scaled by health.
fn material<B: Battlefield + ?Sized>(board: &B, side: Side) -> f32 {
    let catalog = board.catalog();
    let fielded: f32 = side_units(board, side)
        .iter()
        .map(|u| unit_value(catalog, u.kind) * health_ratio(u.hp, u.max_hp))
        .sum();
    let reserve: f32 = board
        .reserve(side)
        .iter()
        .map(|r| unit_value(catalog, r.kind))
        .sum();
    let structures: f32 = side_buildings(board, side)
        .iter()
        .map(|b| STRUCTURE_VALUE * health_ratio(b.hp, b.max_hp))
        .sum();
    fielded + reserve + structures
}

/// How close `side`'s units stand to the opposing structures.
fn proximity<B: Battlefield + ?Sized>(board: &B, side: Side) -> f32 {
    let targets = side_buildings(board, side.opponent());
    let mut score = 0.0;
    for u in side_units(board, side) {
        for b in &targets {
            // Beyond the searched ring the distance reads 0 and the full
            // reach is awarded.
            let reach = PROXIMITY_REACH - chessboard_distance(u.pos, b.pos) as f32;
            if reach > 0.0 {
                score += reach;
            }
        }
    }
    score
}

/// Penalty for own units exposed to damage this turn. Only counts hits the
/// enemy can land without moving.
fn safety<B: Battlefield + ?Sized>(board: &B, side: Side, config: &SearchConfig) -> f32 {
    let catalog = board.catalog();
    let enemies = side_units(board, side.opponent());
    let towers = side_buildings(board, side.opponent());
    let mut score = 0.0;

    for u in side_units(board, side).iter().filter(|u| !u.summoned) {
        let mut incoming: i32 = enemies
            .iter()
            .filter(|e| can_hit(board, e.pos, u.pos, Relation::Enemy))
            .map(|e| skill_damage(catalog, e))
            .sum();
        for b in &towers {
            let d = chessboard_distance(b.pos, u.pos);
            if d >= 1 && d <= config.structure_range {
                incoming += b.attack;
            }
        }
        if incoming == 0 {
            continue;
        }
        let taken = incoming.min(u.hp) as f32;
        let hp = u.hp as f32;
        score -= (unit_value(catalog, u.kind) / 4.0) * health_ratio(u.hp, u.max_hp) * taken
            / u.max_hp.max(1) as f32
            * 6.0
            / hp;
    }
    score
}

/// Value of the best hit each own unit could land, now or after one step.
fn offense<B: Battlefield + ?Sized>(board: &mut B, side: Side) -> Result<f32, BoardError> {
    let own = side_units(board, side);
    let enemies: Vec<Unit> = side_units(board, side.opponent())
        .into_iter()
        .filter(|e| e.is_attackable())
        .collect();
    let towers = side_buildings(board, side.opponent());
    let mut score = 0.0;

    for u in &own {
        let attack = skill_damage(board.catalog(), u) as f32;
        let mut best = 0.0f32;
        let targets = enemies
            .iter()
            .map(|e| (e.pos, e.hp, e.max_hp, unit_value(board.catalog(), e.kind)))
            .chain(towers.iter().map(|b| (b.pos, b.hp, b.max_hp, UNIT_VALUE)))
            .collect::<Vec<_>>();

        for (pos, hp, max_hp, value) in targets {
            let reach = if can_hit(board, u.pos, pos, Relation::Enemy) {
                value / 3.0
            } else if can_hit_within_one_move(board, u.pos, pos, Relation::Enemy)? {
                value / 9.0
            } else {
                continue;
            };
            let fraction = (attack / hp as f32).min(1.0);
            best = best.max(reach * health_ratio(hp, max_hp) * fraction);
        }
        score += best;
    }
    Ok(score)
}

/// Penalty for units standing apart from every ally and own structure.
fn cohesion<B: Battlefield + ?Sized>(board: &B, side: Side, config: &SearchConfig) -> f32 {
    let units = side_units(board, side);
    let anchors: Vec<_> = units
        .iter()
        .map(|u| u.pos)
        .chain(side_buildings(board, side).iter().map(|b| b.pos))
        .collect();
    let mut score = 0.0;
    for u in &units {
        let nearest = anchors
            .iter()
            .filter(|&&p| p != u.pos)
            .map(|&p| chessboard_distance(u.pos, p))
            .min();
        match nearest {
            Some(d) if d <= config.cohesion_radius => {}
            _ => score -= config.cohesion_penalty,
        }
    }
    score
}

/// Evaluates the board from `side`'s perspective.
pub fn evaluate<B>(board: &mut B, side: Side, config: &SearchConfig) -> Result<Breakdown, BoardError>
where
    B: Battlefield + ?Sized,
{
    let w = &config.weights;
    let opp = side.opponent();
    Ok(Breakdown {
        material: (material(board, side) - material(board, opp)) * w.material,
        proximity: (proximity(board, side) - proximity(board, opp)) * w.proximity,
        safety: safety(board, side, config) * w.safety,
        offense: offense(board, side)? * w.offense,
        cohesion: (cohesion(board, side, config) - cohesion(board, opp, config)) * w.cohesion,
    })
}
