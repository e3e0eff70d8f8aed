//! Read-only game data: unit stats, skill ranges, special abilities, and
//! per-kind AI profiles.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::unit::{Relation, UnitKind};

/// Errors raised when an id is not present in the catalog or an entry is
/// unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("unknown unit kind {0}")]
    UnknownUnit(UnitKind),

    #[error("unknown skill id {0}")]
    UnknownSkill(u32),

    #[error("unknown ability id {0}")]
    UnknownAbility(u32),

    #[error("unit kind {kind} has max_hp {max_hp}")]
    InvalidHealth { kind: UnitKind, max_hp: i32 },
}

/// Per-relation range bitmasks: bit `i` set means distance `i` is in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RangeMasks {
    #[serde(default)]
    pub friend: u32,
    #[serde(default)]
    pub enemy: u32,
    #[serde(default)]
    pub neutral: u32,
    #[serde(default)]
    pub any: u32,
}

impl RangeMasks {
    /// Builds a mask with bits `min..=max` set.
    pub const fn span(min: u32, max: u32) -> u32 {
        let mut mask = 0u32;
        let mut d = min;
        while d <= max && d < 32 {
            mask |= 1 << d;
            d += 1;
        }
        mask
    }

    /// Selects the mask for `relation`. Combined relations take the
    /// numerically larger of the masks they cover.
    pub fn for_relation(&self, relation: Relation) -> u32 {
        match relation {
            Relation::Friend => self.friend,
            Relation::Enemy => self.enemy,
            Relation::Neutral => self.neutral,
            Relation::EnemyAndNeutral => self.enemy.max(self.neutral),
            Relation::Any => self.any.max(self.friend).max(self.enemy).max(self.neutral),
        }
    }
}

/// Behaviour profile used by the per-unit evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiMode {
    #[default]
    Balance,
    MaxAttackDistance,
    Escape,
    MaxDamage,
    Tank,
}

/// Broad combat role; ranged and support units are priority targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Warrior,
    Tank,
    Ranged,
    Support,
    Assassin,
}

impl Role {
    /// Fragile backline roles a tank should chase.
    pub const fn is_crispy(self) -> bool {
        matches!(self, Role::Ranged | Role::Support)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AiProfile {
    #[serde(default)]
    pub mode: AiMode,
    pub protect_weight: f32,
}

/// Static stats for a kind of unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitStats {
    pub kind: UnitKind,
    #[serde(default)]
    pub name: String,
    pub max_hp: i32,
    pub attack: i32,
    #[serde(default = "one")]
    pub move_range: u32,
    #[serde(default = "one")]
    pub move_points: u32,
    #[serde(default = "one")]
    pub skill_points: u32,
    pub skill: u32,
    #[serde(default)]
    pub elite: bool,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub profile: Option<AiProfile>,
}

fn one() -> u32 {
    1
}

/// Static description of a unit skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillSpec {
    pub id: u32,
    pub masks: RangeMasks,
    /// Relation of the cells the skill may be cast on.
    #[serde(default = "enemy")]
    pub target: Relation,
    /// Number of times the caster's attack is applied per cast.
    #[serde(default = "effect_once")]
    pub effect_count: i32,
    /// Aimed skills ignore line of sight.
    #[serde(default)]
    pub designated: bool,
    /// Pushes the target one cell away from the caster.
    #[serde(default)]
    pub displaces: bool,
}

fn enemy() -> Relation {
    Relation::Enemy
}

fn effect_once() -> i32 {
    1
}

/// The closed set of side-wide special abilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbilityKind {
    Heal,
    Ignite,
    Gold,
    Teleport,
    Flash,
    Dash,
}

/// Static description of a special ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilitySpec {
    pub id: u32,
    pub kind: AbilityKind,
    /// Heal amount, ignite damage; unused by relocating abilities.
    #[serde(default)]
    pub amount: i32,
    /// Extra reach for flash and dash.
    #[serde(default)]
    pub range: u32,
}

/// All read-only lookups, keyed by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    units: HashMap<UnitKind, UnitStats>,
    skills: HashMap<u32, SkillSpec>,
    abilities: HashMap<u32, AbilitySpec>,
}

impl Catalog {
    pub fn new(
        units: impl IntoIterator<Item = UnitStats>,
        skills: impl IntoIterator<Item = SkillSpec>,
        abilities: impl IntoIterator<Item = AbilitySpec>,
    ) -> Self {
        Catalog {
            units: units.into_iter().map(|u| (u.kind, u)).collect(),
            skills: skills.into_iter().map(|s| (s.id, s)).collect(),
            abilities: abilities.into_iter().map(|a| (a.id, a)).collect(),
        }
    }

    /// Rejects entries the evaluators cannot score, such as a unit kind
    /// without positive health.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut kinds: Vec<&UnitStats> = self.units.values().collect();
        kinds.sort_by_key(|u| u.kind);
        match kinds.into_iter().find(|u| u.max_hp <= 0) {
            Some(u) => Err(CatalogError::InvalidHealth {
                kind: u.kind,
                max_hp: u.max_hp,
            }),
            None => Ok(()),
        }
    }

    pub fn unit(&self, kind: UnitKind) -> Result<&UnitStats, CatalogError> {
        self.units.get(&kind).ok_or(CatalogError::UnknownUnit(kind))
    }

    pub fn skill(&self, id: u32) -> Result<SkillSpec, CatalogError> {
        self.skills
            .get(&id)
            .copied()
            .ok_or(CatalogError::UnknownSkill(id))
    }

    /// Skill of a unit kind, following the kind's skill id.
    pub fn skill_of(&self, kind: UnitKind) -> Result<SkillSpec, CatalogError> {
        self.skill(self.unit(kind)?.skill)
    }

    pub fn ability(&self, id: u32) -> Result<AbilitySpec, CatalogError> {
        self.abilities
            .get(&id)
            .copied()
            .ok_or(CatalogError::UnknownAbility(id))
    }

    /// Profile of a unit kind, if it takes part in priority weighting.
    pub fn profile(&self, kind: UnitKind) -> Option<AiProfile> {
        self.units.get(&kind).and_then(|u| u.profile)
    }

    pub fn is_elite(&self, kind: UnitKind) -> bool {
        self.units.get(&kind).is_some_and(|u| u.elite)
    }

    pub fn role(&self, kind: UnitKind) -> Role {
        self.units.get(&kind).map(|u| u.role).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_sets_inclusive_bits() {
        assert_eq!(RangeMasks::span(1, 2), 0b110);
        assert_eq!(RangeMasks::span(0, 0), 0b1);
        assert_eq!(RangeMasks::span(3, 1), 0);
    }

    #[test]
    fn combined_relations_take_larger_mask() {
        let masks = RangeMasks {
            friend: 0b10,
            enemy: 0b110,
            neutral: 0b1000,
            any: 0,
        };
        assert_eq!(masks.for_relation(Relation::EnemyAndNeutral), 0b1000);
        assert_eq!(masks.for_relation(Relation::Any), 0b1000);
        assert_eq!(masks.for_relation(Relation::Enemy), 0b110);
    }

    #[test]
    fn unknown_ids_are_errors() {
        let catalog = Catalog::default();
        assert_eq!(catalog.skill(7), Err(CatalogError::UnknownSkill(7)));
        assert_eq!(catalog.ability(9), Err(CatalogError::UnknownAbility(9)));
        assert!(catalog.profile(1).is_none());
        assert_eq!(catalog.role(1), Role::Warrior);
    }

    #[test]
    fn zero_health_kind_is_rejected() {
        let unit = |kind, max_hp| UnitStats {
            kind,
            name: String::new(),
            max_hp,
            attack: 1,
            move_range: 1,
            move_points: 1,
            skill_points: 1,
            skill: 1,
            elite: false,
            role: Role::default(),
            profile: None,
        };
        let validate = |units: Vec<UnitStats>| {
            Catalog::new(units, Vec::<SkillSpec>::new(), Vec::<AbilitySpec>::new()).validate()
        };
        assert_eq!(validate(vec![unit(1, 5)]), Ok(()));
        assert_eq!(
            validate(vec![unit(1, 5), unit(2, 0)]),
            Err(CatalogError::InvalidHealth { kind: 2, max_hp: 0 })
        );
    }
}
