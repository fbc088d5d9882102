//! CSV history import.
//!
//! One row per game:
//! `event,date,round,court,team1_player1,team1_player2,team2_player1,team2_player2,score1,score2`
//!
//! Rows sharing an event name and date become one event with pre-formed
//! games; fully scored events are completed as they are imported. Unknown
//! player names join the group as permanent members on first sight.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pb_core::{Group, GroupPlayerId, MembershipType};
use pb_engine::{ImportedGame, LeagueService, MemoryStore};

use crate::cli::{ImportArgs, OutputFormat};
use crate::error::{CliError, Result};
use crate::league_file::{find_group, find_member, parse_starts_at};
use crate::output::Output;

#[derive(Debug, Deserialize)]
struct HistoryRow {
    event: String,
    date: Option<String>,
    round: u32,
    court: u32,
    team1_player1: String,
    team1_player2: String,
    team2_player1: String,
    team2_player2: String,
    score1: Option<u32>,
    score2: Option<u32>,
}

#[derive(Serialize)]
struct ImportJsonOutput {
    events_imported: u32,
    events_completed: u32,
}

pub fn run_import(args: &ImportArgs, store: &mut MemoryStore, format: OutputFormat) -> Result<()> {
    let group = find_group(store, &args.group)?.clone();

    let mut reader = csv::Reader::from_path(&args.path)?;
    let rows: Vec<HistoryRow> = reader
        .deserialize()
        .collect::<std::result::Result<_, csv::Error>>()?;
    if rows.is_empty() {
        return Err(CliError::InvalidArgument(
            "the CSV file contains no game rows".into(),
        ));
    }

    // Group rows into events, then process oldest first so ratings build up
    // in the order the games were actually played.
    let mut batches: Vec<(String, Option<DateTime<Utc>>, Vec<HistoryRow>)> = Vec::new();
    for row in rows {
        let starts_at = row.date.as_deref().map(parse_starts_at).transpose()?;
        match batches
            .iter_mut()
            .find(|(name, date, _)| *name == row.event && *date == starts_at)
        {
            Some((_, _, batch)) => batch.push(row),
            None => batches.push((row.event.clone(), starts_at, vec![row])),
        }
    }
    batches.sort_by_key(|(_, starts_at, _)| *starts_at);

    let mut events_imported = 0u32;
    let mut events_completed = 0u32;
    for (event_name, starts_at, batch) in batches {
        let mut courts = 0u32;
        let mut rounds = 0u32;
        let mut games = Vec::with_capacity(batch.len());
        for row in &batch {
            courts = courts.max(row.court + 1);
            rounds = rounds.max(row.round + 1);
            games.push(ImportedGame {
                round_index: row.round,
                court_index: row.court,
                team1: [
                    ensure_member(store, &group, &row.team1_player1)?,
                    ensure_member(store, &group, &row.team1_player2)?,
                ],
                team2: [
                    ensure_member(store, &group, &row.team2_player1)?,
                    ensure_member(store, &group, &row.team2_player2)?,
                ],
                score_team1: row.score1,
                score_team2: row.score2,
            });
        }

        let all_scored = games
            .iter()
            .all(|g| g.score_team1.is_some() && g.score_team2.is_some());

        let mut service = LeagueService::new(store);
        let event = service.create_event_with_games(
            group.id,
            Some(&event_name),
            starts_at,
            courts,
            rounds,
            games,
        )?;
        events_imported += 1;

        if all_scored {
            service.complete(event.id)?;
            events_completed += 1;
        } else {
            tracing::warn!(event = %event_name, "imported with missing scores; left in progress");
        }
    }

    let output = Output::new(format);
    if output.is_json() {
        output.print_json(&ImportJsonOutput {
            events_imported,
            events_completed,
        });
    } else {
        println!(
            "Imported {events_imported} events into '{}' ({events_completed} completed)",
            group.name
        );
    }
    Ok(())
}

/// Look a player up by name, adding them to the group on first sight.
fn ensure_member(store: &mut MemoryStore, group: &Group, name: &str) -> Result<GroupPlayerId> {
    if let Ok(member) = find_member(store, group.id, name) {
        return Ok(member.id);
    }
    let mut service = LeagueService::new(store);
    let player = service.add_player(name, None)?;
    let member =
        service.add_group_player(group.id, player.id, MembershipType::Permanent, None)?;
    Ok(member.id)
}
