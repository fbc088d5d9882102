//! Score entry and event completion.

use pb_engine::{LeagueService, LeagueStore, MemoryStore};

use crate::cli::{CompleteArgs, OutputFormat, ScoreArgs};
use crate::error::{CliError, Result};
use crate::league_file::parse_event_id;
use crate::output::{render_deltas_table, CompletionJsonOutput, Output};

pub fn run_score(args: &ScoreArgs, store: &mut MemoryStore, format: OutputFormat) -> Result<()> {
    let event_id = parse_event_id(&args.event)?;
    let game_id = store
        .games_for_event(event_id)
        .iter()
        .find(|g| g.round_index == args.round && g.court_index == args.court)
        .map(|g| g.id)
        .ok_or(CliError::GameNotFound {
            round: args.round,
            court: args.court,
        })?;

    let (score1, score2) = if args.clear {
        (None, None)
    } else {
        match (args.score1, args.score2) {
            (Some(s1), Some(s2)) => (Some(s1), Some(s2)),
            _ => {
                return Err(CliError::InvalidArgument(
                    "provide both scores, or --clear".into(),
                ))
            }
        }
    };

    let mut service = LeagueService::new(store);
    let game = service.update_score(game_id, score1, score2)?;

    let output = Output::new(format);
    if output.is_json() {
        output.print_json(&game);
    } else {
        match (game.score_team1, game.score_team2) {
            (Some(s1), Some(s2)) => println!(
                "Round {}, court {}: {s1} : {s2} ({:?})",
                game.round_index,
                game.court_index,
                game.result()
            ),
            _ => println!(
                "Round {}, court {}: scores cleared",
                game.round_index, game.court_index
            ),
        }
    }
    Ok(())
}

pub fn run_complete(args: &CompleteArgs, store: &mut MemoryStore, format: OutputFormat) -> Result<()> {
    let event_id = parse_event_id(&args.event)?;

    let mut service = LeagueService::new(store);
    let deltas = service.complete(event_id)?;

    let output = Output::new(format);
    if output.is_json() {
        output.print_json(&CompletionJsonOutput {
            event_id: event_id.to_string(),
            deltas: &deltas,
        });
    } else {
        println!("Completed event {event_id}");
        render_deltas_table(store, &deltas);
    }
    Ok(())
}
