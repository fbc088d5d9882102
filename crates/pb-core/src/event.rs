//! Events and their lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::group::ConstraintToggles;
use crate::id::{EventId, GroupId, GroupPlayerId};

/// Lifecycle state of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    /// Created, no schedule yet.
    Draft,
    /// Schedule generated, no scores recorded.
    Generated,
    /// At least one score recorded.
    InProgress,
    /// Ratings applied; terminal.
    Completed,
}

impl EventStatus {
    /// Whether schedule generation may run from this state. Regeneration out
    /// of `Generated` additionally requires that no score has been recorded.
    pub fn can_generate(self) -> bool {
        matches!(self, EventStatus::Draft | EventStatus::Generated)
    }

    /// Whether the event may be completed from this state.
    pub fn can_complete(self) -> bool {
        matches!(self, EventStatus::Generated | EventStatus::InProgress)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, EventStatus::Completed)
    }
}

/// Record of how a schedule was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationMeta {
    /// The textual seed the search ran on.
    pub seed_used: String,
    /// The rating-balance bound from the group settings.
    pub elo_diff_configured: f64,
    /// The effective bound after any relaxation.
    pub elo_diff_used: f64,
    /// How many times the bound was relaxed.
    pub relax_iterations: u32,
    /// Candidate team partitions evaluated across the whole search.
    pub attempts: u64,
    pub duration_ms: u64,
    /// The matchup rules that were active.
    pub constraints: ConstraintToggles,
}

/// A scheduled session within a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub group_id: GroupId,
    pub name: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub courts: u32,
    pub rounds: u32,
    pub status: EventStatus,
    /// Fixed participant set, `courts * 4` members; immutable once generated.
    pub participants: Vec<GroupPlayerId>,
    pub generation_meta: Option<GenerationMeta>,
}

impl Event {
    /// Create a draft event.
    pub fn new(group_id: GroupId, courts: u32, rounds: u32, participants: Vec<GroupPlayerId>) -> Self {
        Self {
            id: EventId::new(),
            group_id,
            name: None,
            starts_at: None,
            created_at: Utc::now(),
            courts,
            rounds,
            status: EventStatus::Draft,
            participants,
            generation_meta: None,
        }
    }

    /// Builder method to set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builder method to set the scheduled start.
    pub fn with_starts_at(mut self, starts_at: DateTime<Utc>) -> Self {
        self.starts_at = Some(starts_at);
        self
    }

    /// The participant count this event requires.
    pub fn required_participants(&self) -> usize {
        self.courts as usize * 4
    }

    /// Ordering key for event history: start time when set, creation time
    /// otherwise, tie-broken by creation time.
    pub fn chronological_key(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (self.starts_at.unwrap_or(self.created_at), self.created_at)
    }
}
