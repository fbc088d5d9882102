//! Classic team Elo.

use crate::traits::{GameContext, RatingStrategy};

/// Serious Elo: the standard formula over combined team ratings.
///
/// `E1 = 1 / (1 + 10^((R2 - R1) / elo_const))`; each player on a team gains
/// `k_factor * (S - E)` for that team.
#[derive(Debug, Clone)]
pub struct SeriousElo {
    pub k_factor: f64,
    pub elo_const: f64,
}

impl Default for SeriousElo {
    fn default() -> Self {
        Self {
            k_factor: 32.0,
            elo_const: 400.0,
        }
    }
}

impl SeriousElo {
    /// Expected score for team 1 given combined team ratings.
    fn expected_team1(&self, r1: f64, r2: f64) -> f64 {
        1.0 / (1.0 + 10.0_f64.powf((r2 - r1) / self.elo_const))
    }
}

impl RatingStrategy for SeriousElo {
    fn name(&self) -> &str {
        "Serious Elo"
    }

    fn compute_deltas(&self, ctx: &GameContext) -> [f64; 4] {
        let e1 = self.expected_team1(ctx.team1_rating(), ctx.team2_rating());
        let s1 = ctx.actual_team1();

        let d1 = self.k_factor * (s1 - e1);
        let d2 = self.k_factor * ((1.0 - s1) - (1.0 - e1));

        [d1, d1, d2, d2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pb_core::GameResult;

    fn context(team1: [f64; 2], team2: [f64; 2], result: GameResult) -> GameContext {
        GameContext {
            team1,
            team2,
            result,
            score_team1: 11,
            score_team2: 7,
            group_mean_rating: 1000.0,
        }
    }

    #[test]
    fn test_even_teams_win_moves_sixteen() {
        // E1 = 0.5 at equal ratings, so a win is worth k/2 = +16 per player.
        let strategy = SeriousElo::default();
        let ctx = context([1000.0, 1000.0], [1000.0, 1000.0], GameResult::Team1Win);

        let deltas = strategy.compute_deltas(&ctx);
        assert_eq!(deltas, [16.0, 16.0, -16.0, -16.0]);
    }

    #[test]
    fn test_tie_between_even_teams_is_neutral() {
        let strategy = SeriousElo::default();
        let ctx = context([1000.0, 1000.0], [1000.0, 1000.0], GameResult::Tie);

        let deltas = strategy.compute_deltas(&ctx);
        for d in deltas {
            assert!(d.abs() < 1e-12);
        }
    }

    #[test]
    fn test_underdog_win_pays_more() {
        let strategy = SeriousElo::default();
        let underdog_win = strategy
            .compute_deltas(&context([900.0, 900.0], [1100.0, 1100.0], GameResult::Team1Win));
        let favourite_win = strategy
            .compute_deltas(&context([1100.0, 1100.0], [900.0, 900.0], GameResult::Team1Win));

        assert!(underdog_win[0] > favourite_win[0]);
        assert!(underdog_win[0] > 16.0);
        assert!(favourite_win[0] < 16.0);
    }

    #[test]
    fn test_deltas_sum_to_zero() {
        let strategy = SeriousElo::default();
        for result in [GameResult::Team1Win, GameResult::Team2Win, GameResult::Tie] {
            let deltas =
                strategy.compute_deltas(&context([950.0, 1030.0], [1010.0, 990.0], result));
            let sum: f64 = deltas.iter().sum();
            assert!(sum.abs() < 1e-9, "sum {sum} for {result:?}");
        }
    }

    #[test]
    fn test_winner_never_loses_points() {
        let strategy = SeriousElo::default();
        let deltas = strategy
            .compute_deltas(&context([1400.0, 1400.0], [800.0, 800.0], GameResult::Team1Win));
        assert!(deltas[0] >= 0.0);
        assert!(deltas[2] <= 0.0);
    }
}
