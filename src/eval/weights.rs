//! Weight table for the per-unit evaluator.
//!
//! Sub-scores land roughly in 0..100 before weighting; the weights are
//! spread far enough apart that term magnitudes don't collide.

/// Rank-breaking constant. Also the "unset" marker for best-so-far scores;
/// never a real score.
pub const SENTINEL: f64 = 99_999_999.0;

/// A named term of the per-unit evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Term {
    HeroBlood,
    SelfBlood,
    OpBlood,
    HeroCount,
    NexusBlood,
    CanHit,
    CantBeHit,
    FarAway,
    Buff,
    NearTeammate,
    NearEnemy,
    NearTurret,
    ChaseCrispy,
    ActionPoints,
    NearTheirHome,
}

impl Term {
    pub const ALL: [Term; 15] = [
        Term::HeroBlood,
        Term::SelfBlood,
        Term::OpBlood,
        Term::HeroCount,
        Term::NexusBlood,
        Term::CanHit,
        Term::CantBeHit,
        Term::FarAway,
        Term::Buff,
        Term::NearTeammate,
        Term::NearEnemy,
        Term::NearTurret,
        Term::ChaseCrispy,
        Term::ActionPoints,
        Term::NearTheirHome,
    ];

    pub const fn weight(self) -> f64 {
        match self {
            Term::HeroBlood => 10.0,
            Term::SelfBlood => 10.0,
            Term::OpBlood => 15.0,
            Term::HeroCount => 600.0,
            Term::NexusBlood => 30.0,
            Term::CanHit => 5.0,
            Term::CantBeHit => 10.0,
            Term::FarAway => 10.0,
            Term::Buff => 10.0,
            Term::NearTeammate => 5.0,
            Term::NearEnemy => 30.0,
            Term::NearTurret => 1100.0,
            Term::ChaseCrispy => 10.0,
            Term::ActionPoints => 10.0,
            Term::NearTheirHome => 20.0,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Term::HeroBlood => "hero_blood",
            Term::SelfBlood => "self_blood",
            Term::OpBlood => "op_blood",
            Term::HeroCount => "hero_count",
            Term::NexusBlood => "nexus_blood",
            Term::CanHit => "can_hit",
            Term::CantBeHit => "cant_be_hit",
            Term::FarAway => "far_away",
            Term::Buff => "buff",
            Term::NearTeammate => "near_teammate",
            Term::NearEnemy => "near_enemy",
            Term::NearTurret => "near_turret",
            Term::ChaseCrispy => "chase_crispy",
            Term::ActionPoints => "action_points",
            Term::NearTheirHome => "near_their_home",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_are_positive_integers() {
        for t in Term::ALL {
            let w = t.weight();
            assert!(w >= 5.0 && w.fract() == 0.0, "{} has weight {}", t.name(), w);
        }
    }

    #[test]
    fn sentinel_dominates_weighted_terms() {
        let largest = Term::ALL.iter().map(|t| t.weight() * 100.0).fold(0.0, f64::max);
        assert!(SENTINEL > largest * 100.0);
    }
}
