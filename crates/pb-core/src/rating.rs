//! Rating audit records and rankings.

use serde::{Deserialize, Serialize};

use crate::group::RatingSystem;
use crate::id::{EventId, GroupPlayerId};

/// Append-only audit record of one rating change.
///
/// For any player, the updates of consecutive games chain:
/// `rating_after` of one update equals `rating_before` of the next.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingUpdate {
    pub event_id: EventId,
    pub group_player_id: GroupPlayerId,
    pub rating_before: f64,
    pub rating_after: f64,
    pub delta: f64,
    pub system: RatingSystem,
}

/// Aggregated per-player rating movement from one completed event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerDelta {
    pub group_player_id: GroupPlayerId,
    pub delta: f64,
    pub rating_after: f64,
}

/// One row of a group's ranking table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingEntry {
    /// 1-based dense rank: equal ratings share a rank, no gaps.
    pub rank: u32,
    pub group_player_id: GroupPlayerId,
    pub display_name: String,
    pub rating: f64,
    pub games_played: u32,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    /// `(wins + 0.5 * ties) / games_played`, 0 before any game.
    pub win_rate: f64,
}
