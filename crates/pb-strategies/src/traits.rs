//! Core trait for rating strategies.

use pb_core::{GameResult, GroupSettings, RatingSystem};

/// Context provided to a rating strategy for one scored game.
///
/// Ratings are the players' current (pre-game) values, supplied by the
/// rating pipeline; strategies never read storage.
#[derive(Debug, Clone, Copy)]
pub struct GameContext {
    /// Team 1's player ratings, in slot order.
    pub team1: [f64; 2],
    /// Team 2's player ratings, in slot order.
    pub team2: [f64; 2],
    /// The game's result; never `Unset` (completion requires scores).
    pub result: GameResult,
    pub score_team1: u32,
    pub score_team2: u32,
    /// Mean rating across the group, for catch-up scaling.
    pub group_mean_rating: f64,
}

impl GameContext {
    /// Team 1's combined rating.
    pub fn team1_rating(&self) -> f64 {
        self.team1[0] + self.team1[1]
    }

    /// Team 2's combined rating.
    pub fn team2_rating(&self) -> f64 {
        self.team2[0] + self.team2[1]
    }

    /// Actual score for team 1: 1 for a win, 0.5 for a tie, 0 for a loss.
    pub fn actual_team1(&self) -> f64 {
        match self.result {
            GameResult::Team1Win => 1.0,
            GameResult::Tie | GameResult::Unset => 0.5,
            GameResult::Team2Win => 0.0,
        }
    }
}

/// A rating system: given pre-game ratings and a result, produce per-player
/// rating deltas.
pub trait RatingStrategy: Send + Sync {
    /// Human-readable name for this system.
    fn name(&self) -> &str;

    /// Per-player deltas in input order: team 1's two players, then team 2's.
    fn compute_deltas(&self, ctx: &GameContext) -> [f64; 4];
}

/// Resolve the strategy for a settings tag.
///
/// Selection is explicit: the tag travels in the group settings and the
/// parameters come with it. There is no registry and no global state.
pub fn strategy_for(settings: &GroupSettings) -> Box<dyn RatingStrategy> {
    let k_factor = settings.effective_k_factor();
    let elo_const = settings.effective_elo_const();
    match settings.rating_system {
        RatingSystem::SeriousElo => Box::new(crate::SeriousElo { k_factor, elo_const }),
        RatingSystem::CatchUp => Box::new(crate::CatchUp { k_factor, elo_const }),
        RatingSystem::RacsElo => Box::new(crate::RacsElo { k_factor, elo_const }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actual_scores() {
        let mut ctx = GameContext {
            team1: [1000.0, 1000.0],
            team2: [1000.0, 1000.0],
            result: GameResult::Team1Win,
            score_team1: 11,
            score_team2: 7,
            group_mean_rating: 1000.0,
        };
        assert_eq!(ctx.actual_team1(), 1.0);

        ctx.result = GameResult::Tie;
        assert_eq!(ctx.actual_team1(), 0.5);

        ctx.result = GameResult::Team2Win;
        assert_eq!(ctx.actual_team1(), 0.0);
    }

    #[test]
    fn test_strategy_for_uses_system_defaults() {
        let mut settings = GroupSettings::default();
        assert_eq!(strategy_for(&settings).name(), "Serious Elo");

        settings.rating_system = RatingSystem::CatchUp;
        assert_eq!(strategy_for(&settings).name(), "Catch-Up");

        settings.rating_system = RatingSystem::RacsElo;
        assert_eq!(strategy_for(&settings).name(), "Rac's Elo");
    }
}
