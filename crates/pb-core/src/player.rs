//! Players and their group memberships.

use serde::{Deserialize, Serialize};

use crate::id::{GroupId, GroupPlayerId, PlayerId};

/// How a player belongs to a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MembershipType {
    /// Regular member, plays most events.
    Permanent,
    /// Substitute, fills in when the regulars are short.
    Sub,
}

/// Self-declared skill bracket for substitutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkillLevel {
    Advanced,
    Intermediate,
    Beginner,
}

impl SkillLevel {
    /// Offset applied to a substitute's baseline rating.
    pub fn rating_offset(self) -> f64 {
        match self {
            SkillLevel::Advanced => 100.0,
            SkillLevel::Intermediate => 0.0,
            SkillLevel::Beginner => -100.0,
        }
    }
}

/// A stable display identity, shared across groups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub display_name: String,
    pub notes: Option<String>,
}

impl Player {
    /// Create a new player with a fresh id.
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            id: PlayerId::new(),
            display_name: display_name.into(),
            notes: None,
        }
    }

    /// Builder method to attach notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// A player's membership within one group; owns the per-group rating.
///
/// The rating and the aggregate counters are mutated only by the rating
/// pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupPlayer {
    pub id: GroupPlayerId,
    pub group_id: GroupId,
    pub player_id: PlayerId,
    pub membership: MembershipType,
    /// Skill bracket, carried for substitutes only.
    pub skill_level: Option<SkillLevel>,
    /// Current rating under the group's rating system.
    pub rating: f64,
    pub games_played: u32,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

impl GroupPlayer {
    /// Create a membership with the given starting rating and zeroed counters.
    pub fn new(
        group_id: GroupId,
        player_id: PlayerId,
        membership: MembershipType,
        rating: f64,
    ) -> Self {
        Self {
            id: GroupPlayerId::new(),
            group_id,
            player_id,
            membership,
            skill_level: None,
            rating,
            games_played: 0,
            wins: 0,
            losses: 0,
            ties: 0,
        }
    }

    /// Builder method to set the skill bracket.
    pub fn with_skill_level(mut self, level: SkillLevel) -> Self {
        self.skill_level = Some(level);
        self
    }

    /// Baseline rating for this membership: the group's initial rating, with
    /// the skill offset applied for substitutes.
    pub fn baseline_rating(&self, initial_rating: f64) -> f64 {
        match (self.membership, self.skill_level) {
            (MembershipType::Sub, Some(level)) => initial_rating + level.rating_offset(),
            _ => initial_rating,
        }
    }

    /// Reset the rating to the given baseline and zero all counters.
    pub fn reset(&mut self, baseline: f64) {
        self.rating = baseline;
        self.games_played = 0;
        self.wins = 0;
        self.losses = 0;
        self.ties = 0;
    }

    /// Win rate with ties counted as half a win; 0 before any game.
    pub fn win_rate(&self) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        (self.wins as f64 + 0.5 * self.ties as f64) / self.games_played as f64
    }
}
