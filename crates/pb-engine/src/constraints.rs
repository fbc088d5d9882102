//! Pure matchup predicates over a partially built schedule.

use std::collections::{HashMap, HashSet};

use pb_core::{unordered_pair, ConstraintToggles, GroupPlayerId, PlayerPair};

/// A participant as the generator sees it: identity plus current rating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Participant {
    pub id: GroupPlayerId,
    pub rating: f64,
}

/// Which rule a candidate game violates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    RepeatTeammateInEvent,
    RepeatTeammateFromPreviousEvent,
    RepeatOpponentInEvent,
    RatingImbalance,
}

/// Multiset of player pairs placed so far, with undo support.
///
/// Counts rather than membership because with a rule disabled the same pair
/// can legitimately appear twice, and backtracking must not erase the
/// earlier occurrence.
#[derive(Debug, Default)]
pub struct PairSet {
    counts: HashMap<PlayerPair, u32>,
}

impl PairSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, pair: PlayerPair) {
        *self.counts.entry(pair).or_insert(0) += 1;
    }

    pub fn remove(&mut self, pair: PlayerPair) {
        if let Some(count) = self.counts.get_mut(&pair) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(&pair);
            }
        }
    }

    pub fn contains(&self, pair: PlayerPair) -> bool {
        self.counts.contains_key(&pair)
    }
}

/// The active rules for one generation run.
///
/// All predicates are pure: they read the partial assignment handed in and
/// the prior-event teammate set captured at construction.
pub struct ConstraintSet {
    toggles: ConstraintToggles,
    prior_teammates: HashSet<PlayerPair>,
}

impl ConstraintSet {
    pub fn new(toggles: ConstraintToggles, prior_teammates: HashSet<PlayerPair>) -> Self {
        Self {
            toggles,
            prior_teammates,
        }
    }

    pub fn toggles(&self) -> ConstraintToggles {
        self.toggles
    }

    /// Check a candidate game against every enabled rule.
    ///
    /// `event_teammates` and `event_opponents` are the pairs of the games
    /// already placed in this event; `elo_diff_bound` is the effective
    /// rating-balance bound.
    pub fn check_game(
        &self,
        team1: [Participant; 2],
        team2: [Participant; 2],
        event_teammates: &PairSet,
        event_opponents: &PairSet,
        elo_diff_bound: f64,
    ) -> Result<(), Violation> {
        let pair1 = unordered_pair(team1[0].id, team1[1].id);
        let pair2 = unordered_pair(team2[0].id, team2[1].id);

        if self.toggles.no_repeat_teammate_in_event
            && (event_teammates.contains(pair1) || event_teammates.contains(pair2))
        {
            return Err(Violation::RepeatTeammateInEvent);
        }

        if self.toggles.no_repeat_teammate_from_previous_event
            && (self.prior_teammates.contains(&pair1) || self.prior_teammates.contains(&pair2))
        {
            return Err(Violation::RepeatTeammateFromPreviousEvent);
        }

        if self.toggles.no_repeat_opponent_in_event {
            for a in team1 {
                for b in team2 {
                    if event_opponents.contains(unordered_pair(a.id, b.id)) {
                        return Err(Violation::RepeatOpponentInEvent);
                    }
                }
            }
        }

        if rating_imbalance(team1, team2) > elo_diff_bound {
            return Err(Violation::RatingImbalance);
        }

        Ok(())
    }
}

/// Relative rating imbalance between two teams:
/// `|avg1 - avg2| / max(avg1, avg2)`, 0 when both averages are 0.
pub fn rating_imbalance(team1: [Participant; 2], team2: [Participant; 2]) -> f64 {
    let avg1 = (team1[0].rating + team1[1].rating) / 2.0;
    let avg2 = (team2[0].rating + team2[1].rating) / 2.0;
    let max = avg1.max(avg2);
    if max <= 0.0 {
        return 0.0;
    }
    (avg1 - avg2).abs() / max
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(rating: f64) -> Participant {
        Participant {
            id: GroupPlayerId::new(),
            rating,
        }
    }

    fn all_on() -> ConstraintToggles {
        ConstraintToggles {
            no_repeat_teammate_in_event: true,
            no_repeat_teammate_from_previous_event: true,
            no_repeat_opponent_in_event: true,
        }
    }

    #[test]
    fn test_rating_imbalance_is_a_ratio() {
        let t1 = [participant(1000.0), participant(1000.0)];
        let t2 = [participant(1500.0), participant(1500.0)];
        // |1000 - 1500| / 1500
        assert!((rating_imbalance(t1, t2) - 1.0 / 3.0).abs() < 1e-12);
        // Symmetric.
        assert_eq!(rating_imbalance(t1, t2), rating_imbalance(t2, t1));
    }

    #[test]
    fn test_balanced_mixed_teams_pass() {
        // Equal team sums balance even when individuals differ.
        let t1 = [participant(1000.0), participant(2000.0)];
        let t2 = [participant(1500.0), participant(1500.0)];
        assert_eq!(rating_imbalance(t1, t2), 0.0);
    }

    #[test]
    fn test_repeat_teammate_in_event() {
        let a = participant(1000.0);
        let b = participant(1000.0);
        let c = participant(1000.0);
        let d = participant(1000.0);

        let set = ConstraintSet::new(all_on(), HashSet::new());
        let mut teammates = PairSet::new();
        let opponents = PairSet::new();
        teammates.add(unordered_pair(a.id, b.id));

        assert_eq!(
            set.check_game([a, b], [c, d], &teammates, &opponents, 1.0),
            Err(Violation::RepeatTeammateInEvent)
        );
        // The same four players split differently are fine.
        assert_eq!(
            set.check_game([a, c], [b, d], &teammates, &opponents, 1.0),
            Ok(())
        );
    }

    #[test]
    fn test_repeat_teammate_from_previous_event() {
        let a = participant(1000.0);
        let b = participant(1000.0);
        let c = participant(1000.0);
        let d = participant(1000.0);

        let mut prior = HashSet::new();
        prior.insert(unordered_pair(c.id, d.id));
        let set = ConstraintSet::new(all_on(), prior);

        assert_eq!(
            set.check_game([a, b], [c, d], &PairSet::new(), &PairSet::new(), 1.0),
            Err(Violation::RepeatTeammateFromPreviousEvent)
        );
    }

    #[test]
    fn test_repeat_opponent_in_event() {
        let a = participant(1000.0);
        let b = participant(1000.0);
        let c = participant(1000.0);
        let d = participant(1000.0);

        let set = ConstraintSet::new(all_on(), HashSet::new());
        let teammates = PairSet::new();
        let mut opponents = PairSet::new();
        opponents.add(unordered_pair(a.id, c.id));

        assert_eq!(
            set.check_game([a, b], [c, d], &teammates, &opponents, 1.0),
            Err(Violation::RepeatOpponentInEvent)
        );
        // Once a and c team up instead, the old opposition no longer matters.
        assert_eq!(
            set.check_game([a, c], [b, d], &teammates, &opponents, 1.0),
            Ok(())
        );
    }

    #[test]
    fn test_disabled_rules_are_skipped() {
        let a = participant(1000.0);
        let b = participant(1000.0);
        let c = participant(1000.0);
        let d = participant(1000.0);

        let toggles = ConstraintToggles {
            no_repeat_teammate_in_event: false,
            no_repeat_teammate_from_previous_event: false,
            no_repeat_opponent_in_event: false,
        };
        let set = ConstraintSet::new(toggles, HashSet::new());

        let mut teammates = PairSet::new();
        teammates.add(unordered_pair(a.id, b.id));
        let mut opponents = PairSet::new();
        opponents.add(unordered_pair(a.id, c.id));

        assert_eq!(
            set.check_game([a, b], [c, d], &teammates, &opponents, 1.0),
            Ok(())
        );
    }

    #[test]
    fn test_rating_bound_enforced() {
        let set = ConstraintSet::new(all_on(), HashSet::new());
        let t1 = [participant(1000.0), participant(1000.0)];
        let t2 = [participant(1200.0), participant(1200.0)];

        // Imbalance is 200/1200 = 0.1667.
        assert_eq!(
            set.check_game(t1, t2, &PairSet::new(), &PairSet::new(), 0.05),
            Err(Violation::RatingImbalance)
        );
        assert_eq!(
            set.check_game(t1, t2, &PairSet::new(), &PairSet::new(), 0.2),
            Ok(())
        );
    }

    #[test]
    fn test_pair_set_counts_duplicates() {
        let a = GroupPlayerId::new();
        let b = GroupPlayerId::new();
        let pair = unordered_pair(a, b);

        let mut set = PairSet::new();
        set.add(pair);
        set.add(pair);
        set.remove(pair);
        // One occurrence remains after a single undo.
        assert!(set.contains(pair));
        set.remove(pair);
        assert!(!set.contains(pair));
    }
}
