//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use pb_core::{RatingSystem, SkillLevel};

#[derive(Parser)]
#[command(name = "pbl")]
#[command(author, version, about = "Pickleball league scheduling and ratings")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (table or json)
    #[arg(long, global = true, default_value = "table")]
    pub format: OutputFormat,

    /// Path to the league data file
    #[arg(long, global = true, default_value = "league.json")]
    pub file: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ValueEnum, Clone, Default, Copy)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a group
    CreateGroup(CreateGroupArgs),

    /// Add a player to a group
    AddPlayer(AddPlayerArgs),

    /// Create a draft event
    CreateEvent(CreateEventArgs),

    /// Generate (or regenerate) the schedule of an event
    Generate(GenerateArgs),

    /// Show an event's schedule and scores
    ShowEvent(ShowEventArgs),

    /// Record or edit a game score
    Score(ScoreArgs),

    /// Complete an event and apply ratings
    Complete(CompleteArgs),

    /// Reset and replay a group's rating history
    Recompute(RecomputeArgs),

    /// Show a group's standings
    Rankings(RankingsArgs),

    /// Import historical games from a CSV file
    Import(ImportArgs),
}

#[derive(ValueEnum, Clone, Default, Copy)]
pub enum RatingSystemChoice {
    /// Classic team Elo
    #[default]
    Serious,
    /// Faster movement below the group mean
    CatchUp,
    /// Score-margin-driven volatility
    Racs,
}

impl From<RatingSystemChoice> for RatingSystem {
    fn from(choice: RatingSystemChoice) -> Self {
        match choice {
            RatingSystemChoice::Serious => RatingSystem::SeriousElo,
            RatingSystemChoice::CatchUp => RatingSystem::CatchUp,
            RatingSystemChoice::Racs => RatingSystem::RacsElo,
        }
    }
}

#[derive(ValueEnum, Clone, Copy)]
pub enum SkillChoice {
    Advanced,
    Intermediate,
    Beginner,
}

impl From<SkillChoice> for SkillLevel {
    fn from(choice: SkillChoice) -> Self {
        match choice {
            SkillChoice::Advanced => SkillLevel::Advanced,
            SkillChoice::Intermediate => SkillLevel::Intermediate,
            SkillChoice::Beginner => SkillLevel::Beginner,
        }
    }
}

#[derive(Parser)]
pub struct CreateGroupArgs {
    /// Group name
    pub name: String,

    /// Rating system for the group
    #[arg(long, default_value = "serious")]
    pub rating_system: RatingSystemChoice,

    /// Baseline rating for new members
    #[arg(long)]
    pub initial_rating: Option<f64>,

    /// Rating volatility (defaults per system)
    #[arg(long)]
    pub k_factor: Option<f64>,

    /// Rating sensitivity constant (defaults per system)
    #[arg(long)]
    pub elo_const: Option<f64>,

    /// Rating-balance bound as a fraction (0..1)
    #[arg(long)]
    pub elo_diff: Option<f64>,

    /// Allow repeating a teammate within one event
    #[arg(long)]
    pub allow_repeat_teammate: bool,

    /// Allow repeating a teammate from the previous event
    #[arg(long)]
    pub allow_repeat_teammate_previous: bool,

    /// Allow repeating an opponent within one event
    #[arg(long)]
    pub allow_repeat_opponent: bool,

    /// Disable automatic relaxation of the rating bound
    #[arg(long)]
    pub no_auto_relax: bool,

    /// Relaxation step size
    #[arg(long)]
    pub relax_step: Option<f64>,

    /// Relaxation ceiling
    #[arg(long)]
    pub relax_max: Option<f64>,

    /// Default number of rounds offered when creating events
    #[arg(long)]
    pub default_rounds: Option<u32>,
}

#[derive(Parser)]
pub struct AddPlayerArgs {
    /// Group name
    pub group: String,

    /// Player display name
    pub name: String,

    /// Add as a substitute instead of a permanent member
    #[arg(long)]
    pub sub: bool,

    /// Skill bracket (substitutes only)
    #[arg(long)]
    pub skill: Option<SkillChoice>,

    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Parser)]
pub struct CreateEventArgs {
    /// Group name
    pub group: String,

    /// Participant names, exactly courts x 4
    #[arg(required = true)]
    pub players: Vec<String>,

    /// Event name
    #[arg(long)]
    pub name: Option<String>,

    /// Start time (RFC 3339 or YYYY-MM-DD)
    #[arg(long)]
    pub starts_at: Option<String>,

    /// Number of courts
    #[arg(long, default_value = "1")]
    pub courts: u32,

    /// Number of rounds (defaults to the group's default_rounds)
    #[arg(long)]
    pub rounds: Option<u32>,
}

#[derive(Parser)]
pub struct GenerateArgs {
    /// Event id
    pub event: String,

    /// Draw a fresh seed instead of replaying the stored one
    #[arg(long)]
    pub new_seed: bool,
}

#[derive(Parser)]
pub struct ShowEventArgs {
    /// Event id
    pub event: String,
}

#[derive(Parser)]
pub struct ScoreArgs {
    /// Event id
    pub event: String,

    /// Round index (0-based)
    #[arg(long)]
    pub round: u32,

    /// Court index (0-based)
    #[arg(long)]
    pub court: u32,

    /// Team 1 score
    pub score1: Option<u32>,

    /// Team 2 score
    pub score2: Option<u32>,

    /// Clear both scores instead of setting them
    #[arg(long, conflicts_with_all = ["score1", "score2"])]
    pub clear: bool,
}

#[derive(Parser)]
pub struct CompleteArgs {
    /// Event id
    pub event: String,
}

#[derive(Parser)]
pub struct RecomputeArgs {
    /// Group name
    pub group: String,
}

#[derive(Parser)]
pub struct RankingsArgs {
    /// Group name
    pub group: String,
}

#[derive(Parser)]
pub struct ImportArgs {
    /// Group name
    pub group: String,

    /// CSV file with one row per historical game
    pub path: PathBuf,
}
