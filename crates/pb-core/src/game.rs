//! Games and their results.

use serde::{Deserialize, Serialize};

use crate::id::{EventId, GameId, GroupPlayerId};

/// An unordered pair of group players, stored smallest id first.
pub type PlayerPair = (GroupPlayerId, GroupPlayerId);

/// Normalize two ids into an unordered pair.
pub fn unordered_pair(a: GroupPlayerId, b: GroupPlayerId) -> PlayerPair {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Outcome of a game, derived from its scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameResult {
    Team1Win,
    Team2Win,
    Tie,
    /// One or both scores missing.
    Unset,
}

impl GameResult {
    /// Derive the result from optional scores.
    pub fn from_scores(score_team1: Option<u32>, score_team2: Option<u32>) -> Self {
        match (score_team1, score_team2) {
            (Some(s1), Some(s2)) => match s1.cmp(&s2) {
                std::cmp::Ordering::Greater => GameResult::Team1Win,
                std::cmp::Ordering::Less => GameResult::Team2Win,
                std::cmp::Ordering::Equal => GameResult::Tie,
            },
            _ => GameResult::Unset,
        }
    }
}

/// One court-slot of an event: two teams of two.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub event_id: EventId,
    pub round_index: u32,
    pub court_index: u32,
    pub team1: [GroupPlayerId; 2],
    pub team2: [GroupPlayerId; 2],
    pub score_team1: Option<u32>,
    pub score_team2: Option<u32>,
    /// Sum of team 1's player ratings at generation time; advisory only.
    pub team1_elo: f64,
    /// Sum of team 2's player ratings at generation time; advisory only.
    pub team2_elo: f64,
}

impl Game {
    /// Create an unscored game.
    pub fn new(
        event_id: EventId,
        round_index: u32,
        court_index: u32,
        team1: [GroupPlayerId; 2],
        team2: [GroupPlayerId; 2],
        team1_elo: f64,
        team2_elo: f64,
    ) -> Self {
        Self {
            id: GameId::new(),
            event_id,
            round_index,
            court_index,
            team1,
            team2,
            score_team1: None,
            score_team2: None,
            team1_elo,
            team2_elo,
        }
    }

    /// The derived result of this game.
    pub fn result(&self) -> GameResult {
        GameResult::from_scores(self.score_team1, self.score_team2)
    }

    /// All four player slots in team order.
    pub fn players(&self) -> [GroupPlayerId; 4] {
        [self.team1[0], self.team1[1], self.team2[0], self.team2[1]]
    }

    /// Whether both scores are recorded.
    pub fn has_scores(&self) -> bool {
        self.score_team1.is_some() && self.score_team2.is_some()
    }

    /// Whether either score is recorded.
    pub fn has_any_score(&self) -> bool {
        self.score_team1.is_some() || self.score_team2.is_some()
    }

    /// The two teammate pairs of this game.
    pub fn teammate_pairs(&self) -> [PlayerPair; 2] {
        [
            unordered_pair(self.team1[0], self.team1[1]),
            unordered_pair(self.team2[0], self.team2[1]),
        ]
    }

    /// The four cross-team opponent pairs of this game.
    pub fn opponent_pairs(&self) -> [PlayerPair; 4] {
        [
            unordered_pair(self.team1[0], self.team2[0]),
            unordered_pair(self.team1[0], self.team2[1]),
            unordered_pair(self.team1[1], self.team2[0]),
            unordered_pair(self.team1[1], self.team2[1]),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_game() -> Game {
        Game::new(
            EventId::new(),
            0,
            0,
            [GroupPlayerId::new(), GroupPlayerId::new()],
            [GroupPlayerId::new(), GroupPlayerId::new()],
            2000.0,
            2000.0,
        )
    }

    #[test]
    fn test_result_from_scores() {
        assert_eq!(GameResult::from_scores(Some(11), Some(7)), GameResult::Team1Win);
        assert_eq!(GameResult::from_scores(Some(5), Some(11)), GameResult::Team2Win);
        assert_eq!(GameResult::from_scores(Some(9), Some(9)), GameResult::Tie);
        assert_eq!(GameResult::from_scores(None, Some(11)), GameResult::Unset);
        assert_eq!(GameResult::from_scores(Some(11), None), GameResult::Unset);
        assert_eq!(GameResult::from_scores(None, None), GameResult::Unset);
    }

    #[test]
    fn test_unordered_pair_is_symmetric() {
        let a = GroupPlayerId::new();
        let b = GroupPlayerId::new();
        assert_eq!(unordered_pair(a, b), unordered_pair(b, a));
    }

    #[test]
    fn test_score_state_helpers() {
        let mut game = test_game();
        assert!(!game.has_any_score());
        assert_eq!(game.result(), GameResult::Unset);

        game.score_team1 = Some(11);
        assert!(game.has_any_score());
        assert!(!game.has_scores());

        game.score_team2 = Some(8);
        assert!(game.has_scores());
        assert_eq!(game.result(), GameResult::Team1Win);
    }

    #[test]
    fn test_opponent_pairs_cross_teams_only() {
        let game = test_game();
        let teammates = game.teammate_pairs();
        for pair in game.opponent_pairs() {
            assert!(!teammates.contains(&pair));
        }
    }
}
