//! Standings and recomputation.

use pb_engine::{LeagueService, MemoryStore};

use crate::cli::{OutputFormat, RankingsArgs, RecomputeArgs};
use crate::error::Result;
use crate::league_file::find_group;
use crate::output::{render_rankings_table, Output};

pub fn run_rankings(args: &RankingsArgs, store: &mut MemoryStore, format: OutputFormat) -> Result<()> {
    let group = find_group(store, &args.group)?.clone();

    let service = LeagueService::new(store);
    let entries = service.rankings(group.id)?;

    let output = Output::new(format);
    if output.is_json() {
        output.print_json(&entries);
    } else {
        render_rankings_table(&group.name, &entries);
    }
    Ok(())
}

pub fn run_recompute(args: &RecomputeArgs, store: &mut MemoryStore, format: OutputFormat) -> Result<()> {
    let group = find_group(store, &args.group)?.clone();

    let mut service = LeagueService::new(store);
    let summary = service.recompute(group.id)?;

    let output = Output::new(format);
    if output.is_json() {
        output.print_json(&summary);
    } else {
        println!(
            "Recomputed '{}': {} events, {} players",
            group.name, summary.events_recalculated, summary.players_updated
        );
    }
    Ok(())
}
