//! Output formatting for table and JSON modes.

use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde::Serialize;

use pb_core::{Event, Game, PlayerDelta, RankingEntry};
use pb_engine::{LeagueStore, MemoryStore};

use crate::cli::OutputFormat;
use crate::league_file::member_name;

/// Output handler based on format selection.
pub struct Output {
    format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    pub fn print_json<T: Serialize>(&self, data: &T) {
        match serde_json::to_string_pretty(data) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error: {e}"),
        }
    }
}

/// Render a group's standings as a table.
pub fn render_rankings_table(group_name: &str, entries: &[RankingEntry]) {
    println!();
    println!("Standings: {group_name}");

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Rank"),
            Cell::new("Player"),
            Cell::new("Rating"),
            Cell::new("Games"),
            Cell::new("W"),
            Cell::new("L"),
            Cell::new("T"),
            Cell::new("Win %"),
        ]);

    for entry in entries {
        table.add_row(vec![
            Cell::new(entry.rank),
            Cell::new(&entry.display_name),
            Cell::new(format!("{:.2}", entry.rating)),
            Cell::new(entry.games_played),
            Cell::new(entry.wins),
            Cell::new(entry.losses),
            Cell::new(entry.ties),
            Cell::new(format!("{:.1}%", entry.win_rate * 100.0)),
        ]);
    }

    println!("{table}");
    println!();
}

/// Render an event's schedule, one row per game.
pub fn render_event_table(store: &MemoryStore, event: &Event, games: &[Game]) {
    println!();
    let title = event.name.as_deref().unwrap_or("event");
    println!("{title} ({:?}, {} courts, {} rounds)", event.status, event.courts, event.rounds);
    if let Some(meta) = &event.generation_meta {
        println!(
            "seed {} | elo diff {:.3} (configured {:.3}) | {} relax steps | {} attempts in {} ms",
            meta.seed_used,
            meta.elo_diff_used,
            meta.elo_diff_configured,
            meta.relax_iterations,
            meta.attempts,
            meta.duration_ms
        );
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Round"),
            Cell::new("Court"),
            Cell::new("Team 1"),
            Cell::new("Team 2"),
            Cell::new("Score"),
        ]);

    for game in games {
        let team = |members: &[pb_core::GroupPlayerId; 2]| -> String {
            members
                .iter()
                .map(|id| {
                    store
                        .group_player(*id)
                        .map(|gp| member_name(store, gp))
                        .unwrap_or_else(|| id.to_string())
                })
                .collect::<Vec<_>>()
                .join(" / ")
        };
        let score = match (game.score_team1, game.score_team2) {
            (Some(s1), Some(s2)) => format!("{s1} : {s2}"),
            _ => "-".to_string(),
        };
        table.add_row(vec![
            Cell::new(game.round_index),
            Cell::new(game.court_index),
            Cell::new(format!("{} ({:.0})", team(&game.team1), game.team1_elo)),
            Cell::new(format!("{} ({:.0})", team(&game.team2), game.team2_elo)),
            Cell::new(score),
        ]);
    }

    println!("{table}");
    println!();
}

/// Render the per-player deltas of a completed event.
pub fn render_deltas_table(store: &MemoryStore, deltas: &[PlayerDelta]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Player"),
            Cell::new("Delta"),
            Cell::new("Rating"),
        ]);

    for delta in deltas {
        let name = store
            .group_player(delta.group_player_id)
            .map(|gp| member_name(store, gp))
            .unwrap_or_else(|| delta.group_player_id.to_string());
        table.add_row(vec![
            Cell::new(name),
            Cell::new(format!("{:+.2}", delta.delta)),
            Cell::new(format!("{:.2}", delta.rating_after)),
        ]);
    }

    println!("{table}");
}

/// JSON payload for `show-event` and `generate`.
#[derive(Serialize)]
pub struct EventJsonOutput<'a> {
    pub event: &'a Event,
    pub games: Vec<GameJson<'a>>,
}

/// One game with resolved player names.
#[derive(Serialize)]
pub struct GameJson<'a> {
    #[serde(flatten)]
    pub game: &'a Game,
    pub team1_names: [String; 2],
    pub team2_names: [String; 2],
}

impl<'a> EventJsonOutput<'a> {
    pub fn new(store: &MemoryStore, event: &'a Event, games: &'a [Game]) -> Self {
        let name_of = |id: pb_core::GroupPlayerId| {
            store
                .group_player(id)
                .map(|gp| member_name(store, gp))
                .unwrap_or_else(|| id.to_string())
        };
        let games = games
            .iter()
            .map(|game| GameJson {
                game,
                team1_names: [name_of(game.team1[0]), name_of(game.team1[1])],
                team2_names: [name_of(game.team2[0]), name_of(game.team2[1])],
            })
            .collect();
        Self { event, games }
    }
}

/// JSON payload for `complete`.
#[derive(Serialize)]
pub struct CompletionJsonOutput<'a> {
    pub event_id: String,
    pub deltas: &'a [PlayerDelta],
}
