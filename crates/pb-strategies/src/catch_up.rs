//! Catch-up Elo: convergence-oriented variant.

use crate::traits::{GameContext, RatingStrategy};

/// Catch-Up: the Serious Elo expectation with a per-player K scaled by the
/// player's distance from the group mean.
///
/// A player below the mean gains faster and loses slower; a player above the
/// mean gains slower and loses faster. The scale is
/// `clamp(1 + |mean - R_p| / elo_const, 0.5, 2.0)` applied toward the mean,
/// which keeps new players from stagnating at the bottom of the table.
#[derive(Debug, Clone)]
pub struct CatchUp {
    pub k_factor: f64,
    pub elo_const: f64,
}

impl Default for CatchUp {
    fn default() -> Self {
        Self {
            k_factor: 32.0,
            elo_const: 400.0,
        }
    }
}

impl CatchUp {
    fn expected_team1(&self, r1: f64, r2: f64) -> f64 {
        1.0 / (1.0 + 10.0_f64.powf((r2 - r1) / self.elo_const))
    }

    /// Per-player K for a given margin sign. Gaining players scale with
    /// distance below the mean, losing players with distance above it; both
    /// clamped so no player moves less than half or more than double the
    /// configured factor.
    fn k_for(&self, rating: f64, group_mean: f64, margin: f64) -> f64 {
        let toward_mean = if margin >= 0.0 {
            group_mean - rating
        } else {
            rating - group_mean
        };
        let scale = (1.0 + toward_mean / self.elo_const).clamp(0.5, 2.0);
        self.k_factor * scale
    }
}

impl RatingStrategy for CatchUp {
    fn name(&self) -> &str {
        "Catch-Up"
    }

    fn compute_deltas(&self, ctx: &GameContext) -> [f64; 4] {
        let e1 = self.expected_team1(ctx.team1_rating(), ctx.team2_rating());
        let s1 = ctx.actual_team1();

        let margin1 = s1 - e1;
        let margin2 = (1.0 - s1) - (1.0 - e1);
        let mean = ctx.group_mean_rating;

        [
            self.k_for(ctx.team1[0], mean, margin1) * margin1,
            self.k_for(ctx.team1[1], mean, margin1) * margin1,
            self.k_for(ctx.team2[0], mean, margin2) * margin2,
            self.k_for(ctx.team2[1], mean, margin2) * margin2,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pb_core::GameResult;

    fn context(team1: [f64; 2], team2: [f64; 2], result: GameResult, mean: f64) -> GameContext {
        GameContext {
            team1,
            team2,
            result,
            score_team1: 11,
            score_team2: 9,
            group_mean_rating: mean,
        }
    }

    #[test]
    fn test_at_mean_behaves_like_serious() {
        let strategy = CatchUp::default();
        let ctx = context([1000.0, 1000.0], [1000.0, 1000.0], GameResult::Team1Win, 1000.0);

        let deltas = strategy.compute_deltas(&ctx);
        assert_eq!(deltas, [16.0, 16.0, -16.0, -16.0]);
    }

    #[test]
    fn test_low_rated_winner_moves_faster() {
        let strategy = CatchUp::default();
        // One winner far below the mean, one at it: same team margin, but the
        // lower-rated player gets the larger share.
        let ctx = context([800.0, 1000.0], [900.0, 900.0], GameResult::Team1Win, 1000.0);

        let deltas = strategy.compute_deltas(&ctx);
        assert!(deltas[0] > deltas[1]);
        assert!(deltas[0] > 0.0 && deltas[1] > 0.0);
    }

    #[test]
    fn test_low_rated_loser_moves_slower() {
        let strategy = CatchUp::default();
        let ctx = context([900.0, 900.0], [800.0, 1200.0], GameResult::Team1Win, 1000.0);

        let deltas = strategy.compute_deltas(&ctx);
        // Both team 2 players lose points, but the low-rated one loses less.
        assert!(deltas[2] < 0.0 && deltas[3] < 0.0);
        assert!(deltas[2].abs() < deltas[3].abs());
    }

    #[test]
    fn test_k_clamped_to_half_and_double() {
        let strategy = CatchUp::default();
        // 2000 points below the mean would scale 6x unclamped.
        assert_eq!(strategy.k_for(-1000.0, 1000.0, 1.0), 64.0);
        // The same player losing scales down, clamped at half.
        assert_eq!(strategy.k_for(-1000.0, 1000.0, -1.0), 16.0);
    }

    #[test]
    fn test_sign_law() {
        let strategy = CatchUp::default();
        let ctx = context([850.0, 1100.0], [950.0, 1050.0], GameResult::Team1Win, 1000.0);

        let deltas = strategy.compute_deltas(&ctx);
        assert!(deltas[0] >= 0.0 && deltas[1] >= 0.0);
        assert!(deltas[2] <= 0.0 && deltas[3] <= 0.0);
    }

    #[test]
    fn test_tie_between_even_teams_sums_to_zero() {
        let strategy = CatchUp::default();
        let ctx = context([1000.0, 1000.0], [1000.0, 1000.0], GameResult::Tie, 1000.0);

        let deltas = strategy.compute_deltas(&ctx);
        let sum: f64 = deltas.iter().sum();
        assert!(sum.abs() < 1e-9);
    }
}
