//! Matchmaking and rating engine for pickleball league play.
//!
//! This crate provides:
//! - `SeededRng` - reproducible randomness keyed by a textual seed
//! - `ConstraintSet` - pure matchup predicates over a partial schedule
//! - `generate_schedule` - backtracking search with automatic relaxation
//! - `LeagueStore` / `MemoryStore` - the storage port and its in-memory impl
//! - the rating pipeline - event completion and full-group recomputation
//! - `LeagueService` - the operation surface and event lifecycle guards

pub mod constraints;
pub mod generator;
pub mod pipeline;
pub mod rng;
pub mod service;
pub mod store;

pub use constraints::{ConstraintSet, Participant, Violation};
pub use generator::{generate_schedule, DraftGame, DraftSchedule, GeneratorLimits, ScheduleRequest};
pub use pipeline::RecomputeSummary;
pub use rng::{fresh_seed, SeededRng};
pub use service::{ImportedGame, LeagueService};
pub use store::{LeagueStore, MemoryStore};
