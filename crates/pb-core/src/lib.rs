//! Core domain types for pickleball league scheduling and ratings.
//!
//! This crate provides the fundamental types used throughout the engine:
//! - Players and group memberships
//! - Groups and their settings
//! - Events, games and results
//! - Rating updates and rankings
//! - The shared error taxonomy

pub mod error;
pub mod event;
pub mod game;
pub mod group;
pub mod id;
pub mod player;
pub mod rating;

pub use error::{EngineError, EntityKind, Result};
pub use event::{Event, EventStatus, GenerationMeta};
pub use game::{unordered_pair, Game, GameResult, PlayerPair};
pub use group::{ConstraintToggles, Group, GroupSettings, RatingSystem};
pub use id::{EventId, GameId, GroupId, GroupPlayerId, PlayerId};
pub use player::{GroupPlayer, MembershipType, Player, SkillLevel};
pub use rating::{PlayerDelta, RankingEntry, RatingUpdate};
