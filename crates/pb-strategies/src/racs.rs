//! Rac's Elo: score-margin-driven variant.

use crate::traits::{GameContext, RatingStrategy};

/// Rac's Elo: volatile variant where the effective K scales with the score
/// margin, so blowouts move ratings more than close games.
///
/// The expectation uses `elo_const` as a rating *ratio* constant: the
/// exponent is `(R2 - R1) / (elo_const * (R1 + R2))`. The effective K is
/// `k_factor * |s1 - s2| / max(s1 + s2, 1)`.
#[derive(Debug, Clone)]
pub struct RacsElo {
    pub k_factor: f64,
    pub elo_const: f64,
}

impl Default for RacsElo {
    fn default() -> Self {
        Self {
            k_factor: 100.0,
            elo_const: 0.3,
        }
    }
}

impl RacsElo {
    fn expected_team1(&self, r1: f64, r2: f64) -> f64 {
        let spread = self.elo_const * (r1 + r2);
        if spread == 0.0 {
            return 0.5;
        }
        1.0 / (1.0 + 10.0_f64.powf((r2 - r1) / spread))
    }

    /// Effective K for the recorded scores; ties give zero.
    fn k_effective(&self, score_team1: u32, score_team2: u32) -> f64 {
        let margin = score_team1.abs_diff(score_team2) as f64;
        let total = (score_team1 + score_team2).max(1) as f64;
        self.k_factor * margin / total
    }
}

impl RatingStrategy for RacsElo {
    fn name(&self) -> &str {
        "Rac's Elo"
    }

    fn compute_deltas(&self, ctx: &GameContext) -> [f64; 4] {
        let e1 = self.expected_team1(ctx.team1_rating(), ctx.team2_rating());
        let s1 = ctx.actual_team1();
        let k = self.k_effective(ctx.score_team1, ctx.score_team2);

        let d1 = k * (s1 - e1);
        let d2 = k * ((1.0 - s1) - (1.0 - e1));

        [d1, d1, d2, d2]
    }
}
