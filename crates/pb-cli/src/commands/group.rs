//! Group creation.

use pb_core::GroupSettings;
use pb_engine::{LeagueService, MemoryStore};

use crate::cli::{CreateGroupArgs, OutputFormat};
use crate::error::Result;
use crate::output::Output;

pub fn run_create_group(
    args: &CreateGroupArgs,
    store: &mut MemoryStore,
    format: OutputFormat,
) -> Result<()> {
    let defaults = GroupSettings::default();
    let settings = GroupSettings {
        rating_system: args.rating_system.into(),
        initial_rating: args.initial_rating.unwrap_or(defaults.initial_rating),
        k_factor: args.k_factor,
        elo_const: args.elo_const,
        elo_diff: args.elo_diff.unwrap_or(defaults.elo_diff),
        no_repeat_teammate_in_event: !args.allow_repeat_teammate,
        no_repeat_teammate_from_previous_event: !args.allow_repeat_teammate_previous,
        no_repeat_opponent_in_event: !args.allow_repeat_opponent,
        auto_relax_elo_diff: !args.no_auto_relax,
        auto_relax_step: args.relax_step.unwrap_or(defaults.auto_relax_step),
        auto_relax_max_elo_diff: args.relax_max.unwrap_or(defaults.auto_relax_max_elo_diff),
        default_rounds: args.default_rounds.unwrap_or(defaults.default_rounds),
    };

    let mut service = LeagueService::new(store);
    let group = service.create_group(&args.name, settings)?;

    let output = Output::new(format);
    if output.is_json() {
        output.print_json(&group);
    } else {
        println!("Created group '{}' ({})", group.name, group.id);
    }
    Ok(())
}
