//! Shared fixtures for unit tests: a small catalog and a ready-made
//! skirmish board.

use std::sync::Arc;

use crate::board::catalog::{
    AbilityKind, AbilitySpec, AiMode, AiProfile, Catalog, RangeMasks, Role, SkillSpec, UnitStats,
};
use crate::board::state::{BoardState, Terrain};
use crate::board::unit::{Building, BuildingKind, Relation, Side};
use crate::board::Position;

pub const WARRIOR: u32 = 1001;
pub const ARCHER: u32 = 1002;
pub const BRUTE: u32 = 1003;
pub const HEALER: u32 = 1004;
pub const MINION: u32 = 2001;

pub const HEAL: u32 = 101;
pub const IGNITE: u32 = 102;
pub const GOLD: u32 = 103;
pub const TELEPORT: u32 = 104;
pub const FLASH: u32 = 105;
pub const DASH: u32 = 106;

fn stats(kind: u32, max_hp: i32, attack: i32, skill: u32, role: Role, profile: Option<(AiMode, f32)>) -> UnitStats {
    UnitStats {
        kind,
        name: String::new(),
        max_hp,
        attack,
        move_range: 2,
        move_points: 1,
        skill_points: 1,
        skill,
        elite: false,
        role,
        profile: profile.map(|(mode, protect_weight)| AiProfile { mode, protect_weight }),
    }
}

fn skill(id: u32, mask: u32, target: Relation, displaces: bool) -> SkillSpec {
    let masks = match target {
        Relation::Friend => RangeMasks { friend: mask, ..RangeMasks::default() },
        _ => RangeMasks { enemy: mask, neutral: mask, ..RangeMasks::default() },
    };
    SkillSpec {
        id,
        masks,
        target,
        effect_count: 1,
        designated: false,
        displaces,
    }
}

pub fn catalog() -> Arc<Catalog> {
    let mut brute = stats(BRUTE, 8, 3, 3, Role::Tank, Some((AiMode::Tank, 60.0)));
    brute.elite = true;
    let units = vec![
        stats(WARRIOR, 6, 2, 1, Role::Warrior, Some((AiMode::Balance, 30.0))),
        stats(ARCHER, 4, 2, 2, Role::Ranged, Some((AiMode::MaxAttackDistance, 50.0))),
        brute,
        stats(HEALER, 4, 2, 4, Role::Support, Some((AiMode::Escape, 40.0))),
        stats(MINION, 2, 1, 1, Role::Warrior, None),
    ];
    let skills = vec![
        skill(1, RangeMasks::span(1, 1), Relation::Enemy, false),
        skill(2, RangeMasks::span(1, 3), Relation::Enemy, false),
        skill(3, RangeMasks::span(1, 1), Relation::Enemy, true),
        skill(4, RangeMasks::span(1, 2), Relation::Friend, false),
    ];
    let ability = |id, kind, amount, range| AbilitySpec { id, kind, amount, range };
    let abilities = vec![
        ability(HEAL, AbilityKind::Heal, 3, 0),
        ability(IGNITE, AbilityKind::Ignite, 2, 0),
        ability(GOLD, AbilityKind::Gold, 0, 0),
        ability(TELEPORT, AbilityKind::Teleport, 0, 0),
        ability(FLASH, AbilityKind::Flash, 0, 2),
        ability(DASH, AbilityKind::Dash, 0, 1),
    ];
    Arc::new(Catalog::new(units, skills, abilities))
}

/// An empty plain board using the test catalog.
pub fn board(width: i32, height: i32) -> BoardState {
    BoardState::new(width, height, catalog())
}

/// A 9x7 board with two units, a home and some reserve per side, Red to act
/// with 6 action points.
pub fn skirmish() -> BoardState {
    let mut b = board(9, 7);
    b.set_terrain(Position::new(1, 0), Terrain::Spawn(Side::Red));
    b.set_terrain(Position::new(1, 6), Terrain::Spawn(Side::Red));
    b.set_terrain(Position::new(7, 0), Terrain::Spawn(Side::Blue));
    b.set_terrain(Position::new(4, 1), Terrain::Wall);

    let home = |id, side, x| Building {
        id,
        kind: BuildingKind::Home,
        side: Some(side),
        pos: Position::new(x, 3),
        hp: 20,
        max_hp: 20,
        attack: 2,
    };
    b.place_building(home(1, Side::Red, 0)).unwrap();
    b.place_building(home(2, Side::Blue, 8)).unwrap();
    b.place_building(Building {
        id: 3,
        kind: BuildingKind::Turret,
        side: None,
        pos: Position::new(4, 6),
        hp: 10,
        max_hp: 10,
        attack: 1,
    })
    .unwrap();

    b.place_unit(Side::Red, WARRIOR, Position::new(2, 3)).unwrap();
    b.place_unit(Side::Red, ARCHER, Position::new(1, 2)).unwrap();
    b.place_unit(Side::Blue, WARRIOR, Position::new(5, 3)).unwrap();
    b.place_unit(Side::Blue, HEALER, Position::new(7, 4)).unwrap();

    b.add_reserve(Side::Red, ARCHER, true);
    b.add_reserve(Side::Red, BRUTE, false);
    b.add_reserve(Side::Blue, WARRIOR, true);

    b.add_ability(Side::Red, HEAL, 1);
    b.add_ability(Side::Red, FLASH, 2);
    b.add_ability(Side::Red, IGNITE, 1);
    b.add_ability(Side::Blue, HEAL, 1);

    b.set_turn(Side::Red, 6);
    b
}
