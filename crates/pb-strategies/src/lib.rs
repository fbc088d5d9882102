//! Rating strategies for pickleball league play.
//!
//! This crate provides the `RatingStrategy` trait and the three systems a
//! group can run on:
//! - Serious Elo: classic team Elo
//! - Catch-Up: faster movement for players far below the group mean
//! - Rac's Elo: score-margin-driven volatility

pub mod catch_up;
pub mod racs;
pub mod serious;
pub mod traits;

pub use catch_up::CatchUp;
pub use racs::RacsElo;
pub use serious::SeriousElo;
pub use traits::{strategy_for, GameContext, RatingStrategy};
