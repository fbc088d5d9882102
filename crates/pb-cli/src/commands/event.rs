//! Event creation, generation and display.

use pb_core::GroupPlayerId;
use pb_engine::{LeagueService, LeagueStore, MemoryStore};

use crate::cli::{CreateEventArgs, GenerateArgs, OutputFormat, ShowEventArgs};
use crate::error::{CliError, Result};
use crate::league_file::{find_group, find_member, parse_event_id, parse_starts_at};
use crate::output::{render_event_table, EventJsonOutput, Output};

pub fn run_create_event(
    args: &CreateEventArgs,
    store: &mut MemoryStore,
    format: OutputFormat,
) -> Result<()> {
    let group = find_group(store, &args.group)?.clone();
    let rounds = args.rounds.unwrap_or(group.settings.default_rounds);
    let starts_at = args
        .starts_at
        .as_deref()
        .map(parse_starts_at)
        .transpose()?;

    let participants: Vec<GroupPlayerId> = args
        .players
        .iter()
        .map(|name| find_member(store, group.id, name).map(|m| m.id))
        .collect::<Result<_>>()?;

    let mut service = LeagueService::new(store);
    let event = service.create_event(
        group.id,
        args.name.as_deref(),
        starts_at,
        args.courts,
        rounds,
        participants,
    )?;

    let output = Output::new(format);
    if output.is_json() {
        output.print_json(&event);
    } else {
        println!(
            "Created event {} ({} courts, {} rounds); next: pbl generate {}",
            event.id, event.courts, event.rounds, event.id
        );
    }
    Ok(())
}

pub fn run_generate(
    args: &GenerateArgs,
    store: &mut MemoryStore,
    format: OutputFormat,
) -> Result<()> {
    let event_id = parse_event_id(&args.event)?;

    let mut service = LeagueService::new(store);
    let (games, _meta) = service.generate(event_id, args.new_seed)?;

    let event = store
        .event(event_id)
        .ok_or_else(|| CliError::InvalidArgument(format!("event vanished: {event_id}")))?
        .clone();

    let output = Output::new(format);
    if output.is_json() {
        output.print_json(&EventJsonOutput::new(store, &event, &games));
    } else {
        render_event_table(store, &event, &games);
    }
    Ok(())
}

pub fn run_show_event(args: &ShowEventArgs, store: &MemoryStore, format: OutputFormat) -> Result<()> {
    let event_id = parse_event_id(&args.event)?;
    let event = store
        .event(event_id)
        .ok_or_else(|| CliError::InvalidArgument(format!("no such event: {event_id}")))?;
    let games: Vec<pb_core::Game> = store
        .games_for_event(event_id)
        .into_iter()
        .cloned()
        .collect();

    let output = Output::new(format);
    if output.is_json() {
        output.print_json(&EventJsonOutput::new(store, event, &games));
    } else {
        render_event_table(store, event, &games);
    }
    Ok(())
}
