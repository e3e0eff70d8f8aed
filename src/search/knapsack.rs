//! Knapsack selection of the next action to commit.
//!
//! Candidates are first made conflict-free, then split into cost buckets,
//! then a recursive bounded knapsack over the bucket heads finds the best
//! total. Only the head of each bucket is ever tried, which approximates
//! rather than proves the optimal subset; weights are tuned against this
//! behaviour, so it stays.

use super::candidate::{Candidate, Cell};
use crate::board::ActionKind;

/// Whether `new` may join a pool that already holds `kept`.
fn conflicts(new: &Candidate, kept: &Candidate) -> bool {
    match (&new.action.kind, &kept.action.kind) {
        (ActionKind::Move { from: a, .. }, ActionKind::Move { from: b, .. }) if a == b => return true,
        (ActionKind::Skill { from: a, .. }, ActionKind::Skill { from: b, .. }) if a == b => return true,
        (ActionKind::Summon { kind: ka, to: ta }, ActionKind::Summon { kind: kb, to: tb })
            if ka == kb || ta == tb =>
        {
            return true
        }
        _ => {}
    }
    // A relocation may not land where another relocation or cast is aimed.
    if new.is_move() && (kept.is_move() || kept.is_skill()) && new.target_cell == kept.target_cell {
        return true;
    }
    if new.ability().is_some() && new.ability() == kept.ability() {
        return true;
    }
    if new.is_move() && kept.is_move() && new.actor_cell == kept.actor_cell {
        return true;
    }
    new.is_skill()
        && kept.is_skill()
        && new.actor_cell != Cell::None
        && new.actor_cell == kept.actor_cell
}

/// Sorts by efficiency, best first, and greedily drops every candidate that
/// conflicts with one already kept. The sort is stable, so equally efficient
/// candidates keep generation order.
pub fn dedup(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.efficiency().total_cmp(&a.efficiency()));
    let mut kept: Vec<Candidate> = Vec::with_capacity(candidates.len());
    for c in candidates {
        if !kept.iter().any(|k| conflicts(&c, k)) {
            kept.push(c);
        }
    }
    kept
}

/// Conflict-free candidates grouped by point cost.
#[derive(Debug, Clone)]
pub struct Buckets {
    lists: Vec<Vec<Candidate>>,
    /// Heads already taken by the recursion in progress.
    taken: Vec<usize>,
}

/// Splits `pool` into buckets of cost 1 through `max_bucket`. Candidates
/// outside that range are dropped.
pub fn bucketize(pool: Vec<Candidate>, max_bucket: u32) -> Buckets {
    let size = max_bucket as usize;
    let mut lists: Vec<Vec<Candidate>> = vec![Vec::new(); size];
    for c in pool {
        let cost = c.action.cost as usize;
        if (1..=size).contains(&cost) {
            lists[cost - 1].push(c);
        } else {
            tracing::debug!(action = %c.action, cost, "candidate cost outside buckets, dropped");
        }
    }
    Buckets {
        taken: vec![0; size],
        lists,
    }
}

impl Buckets {
    pub fn len(&self) -> usize {
        self.lists.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn bucket(&self, cost: u32) -> &[Candidate] {
        match (cost as usize).checked_sub(1).and_then(|i| self.lists.get(i)) {
            Some(list) => list,
            None => &[],
        }
    }

    /// Best achievable total within `budget` and the single candidate to
    /// commit next, or `None` when nothing improves the position.
    pub fn select(&mut self, budget: u32) -> (f32, Option<&Candidate>) {
        let max = self.lists.len() as u32;
        let (total, best) = self.search(budget, max);
        (total, best.map(|(b, i)| &self.lists[b][i]))
    }

    fn search(&mut self, budget: u32, max: u32) -> (f32, Option<(usize, usize)>) {
        let mut best_score = 0.0f32;
        let mut best = None;

        for size in (1..=max).rev() {
            let b = size as usize - 1;
            if budget < size || self.taken[b] >= self.lists[b].len() {
                continue;
            }
            let head = (b, self.taken[b]);
            self.taken[b] += 1;
            let (rest, rest_best) = self.search(budget - size, size);
            self.taken[b] -= 1;

            let score = self.lists[head.0][head.1].delta + rest;
            if score > best_score {
                best_score = score;
                best = Some(self.order(head, rest_best));
            }
        }
        (best_score, best)
    }

    /// Picks which of a bucket head and the best of the remainder goes first:
    /// casts before relocations, otherwise the more efficient one.
    fn order(&self, head: (usize, usize), rest: Option<(usize, usize)>) -> (usize, usize) {
        let Some(rest) = rest else {
            return head;
        };
        let h = &self.lists[head.0][head.1];
        let r = &self.lists[rest.0][rest.1];
        if h.is_skill() && r.is_move() {
            head
        } else if h.is_move() && r.is_skill() {
            rest
        } else if h.efficiency() > r.efficiency() {
            head
        } else {
            rest
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{AbilityEffect, Action, Position};
    use crate::eval::Breakdown;

    fn cand(action: Action, delta: f32) -> Candidate {
        Candidate::new(action, delta, Breakdown::default())
    }

    fn p(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn dedup_keeps_the_most_efficient_move_per_unit() {
        let pool = dedup(vec![
            cand(Action::mov(p(1, 1), p(2, 1)), 3.0),
            cand(Action::mov(p(1, 1), p(1, 2)), 8.0),
            cand(Action::mov(p(4, 4), p(4, 5)), 1.0),
        ]);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool[0].action, Action::mov(p(1, 1), p(1, 2)));
        assert_eq!(pool[1].action, Action::mov(p(4, 4), p(4, 5)));
    }

    #[test]
    fn dedup_blocks_shared_destinations_and_repeated_abilities() {
        let pool = dedup(vec![
            cand(Action::summon(1002, p(1, 0), 2), 10.0),
            cand(Action::summon(1003, p(1, 0), 2), 9.0),
            cand(Action::summon(1002, p(1, 6), 2), 8.0),
            cand(Action::mov(p(2, 2), p(1, 0)), 1.0),
            cand(Action::ability(101, AbilityEffect::Heal { target: p(2, 2) }, 1), 5.0),
            cand(Action::ability(101, AbilityEffect::Heal { target: p(3, 3) }, 1), 4.0),
        ]);
        let actions: Vec<Action> = pool.iter().map(|c| c.action).collect();
        assert_eq!(
            actions,
            vec![
                Action::summon(1002, p(1, 0), 2),
                Action::ability(101, AbilityEffect::Heal { target: p(2, 2) }, 1),
            ]
        );
    }

    #[test]
    fn a_unit_moves_at_most_once() {
        let pool = dedup(vec![
            cand(Action::ability(105, AbilityEffect::Flash { from: p(2, 2), to: p(4, 2) }, 1), 6.0),
            cand(Action::mov(p(2, 2), p(3, 3)), 5.0),
            cand(Action::skill(p(2, 2), p(3, 2)), 4.0),
        ]);
        assert_eq!(pool.len(), 2, "flash and move share an actor: {:?}", pool);
        assert!(pool.iter().any(|c| c.is_skill()));
    }

    #[test]
    fn both_cheap_candidates_fit_the_budget() {
        let a = cand(Action::mov(p(1, 1), p(2, 1)), 10.0);
        let b = cand(Action::summon(1002, p(5, 5), 2), 15.0);
        let mut buckets = bucketize(dedup(vec![a.clone(), b]), 10);
        let (total, best) = buckets.select(3);
        assert_eq!(total, 25.0);
        assert_eq!(best.map(|c| c.action), Some(a.action));
    }

    #[test]
    fn budget_limits_the_bundle() {
        let a = cand(Action::mov(p(1, 1), p(2, 1)), 10.0);
        let b = cand(Action::summon(1002, p(5, 5), 2), 15.0);
        let mut buckets = bucketize(dedup(vec![a, b.clone()]), 10);
        let (total, best) = buckets.select(2);
        assert_eq!(total, 15.0);
        assert_eq!(best.map(|c| c.action), Some(b.action));
    }

    #[test]
    fn over_budget_bucket_is_dropped() {
        let dear = cand(Action::summon(1002, p(5, 5), 12), 1000.0);
        let cheap = cand(Action::mov(p(1, 1), p(2, 1)), 1.0);
        let mut buckets = bucketize(vec![dear, cheap.clone()], 10);
        assert_eq!(buckets.len(), 1);
        let (_, best) = buckets.select(20);
        assert_eq!(best.map(|c| c.action), Some(cheap.action));
    }

    #[test]
    fn casts_resolve_before_moves() {
        let hit = cand(Action::skill(p(1, 1), p(2, 1)), 2.0);
        let step = cand(Action::mov(p(4, 4), p(4, 5)), 9.0);
        let mut buckets = bucketize(dedup(vec![hit.clone(), step]), 10);
        let (total, best) = buckets.select(2);
        assert_eq!(total, 11.0);
        assert_eq!(best.map(|c| c.action), Some(hit.action));
    }

    #[test]
    fn nothing_positive_means_idle() {
        let mut buckets = bucketize(vec![cand(Action::mov(p(1, 1), p(2, 1)), -4.0)], 10);
        let (total, best) = buckets.select(5);
        assert_eq!(total, 0.0);
        assert!(best.is_none());
    }

    #[test]
    fn selection_restores_bucket_heads() {
        let mut buckets = bucketize(
            vec![
                cand(Action::mov(p(1, 1), p(2, 1)), 3.0),
                cand(Action::mov(p(3, 3), p(3, 4)), 2.0),
            ],
            10,
        );
        let first = buckets.select(2).0;
        let again = buckets.select(2).0;
        assert_eq!(first, again);
        assert_eq!(buckets.bucket(1).len(), 2);
        assert!(buckets.bucket(0).is_empty());
        assert!(buckets.bucket(11).is_empty());
    }
}
