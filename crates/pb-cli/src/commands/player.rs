//! Player membership.

use pb_core::MembershipType;
use pb_engine::{LeagueService, MemoryStore};

use crate::cli::{AddPlayerArgs, OutputFormat};
use crate::error::{CliError, Result};
use crate::league_file::{find_group, find_member};
use crate::output::Output;

pub fn run_add_player(
    args: &AddPlayerArgs,
    store: &mut MemoryStore,
    format: OutputFormat,
) -> Result<()> {
    let group_id = find_group(store, &args.group)?.id;
    if find_member(store, group_id, &args.name).is_ok() {
        return Err(CliError::InvalidArgument(format!(
            "'{}' is already a member of '{}'",
            args.name, args.group
        )));
    }
    if args.skill.is_some() && !args.sub {
        return Err(CliError::InvalidArgument(
            "--skill applies to substitutes only; add --sub".into(),
        ));
    }

    let membership = if args.sub {
        MembershipType::Sub
    } else {
        MembershipType::Permanent
    };

    let mut service = LeagueService::new(store);
    let player = service.add_player(&args.name, args.notes.as_deref())?;
    let member = service.add_group_player(
        group_id,
        player.id,
        membership,
        args.skill.map(Into::into),
    )?;

    let output = Output::new(format);
    if output.is_json() {
        output.print_json(&member);
    } else {
        println!(
            "Added {} to '{}' at rating {:.0}",
            player.display_name, args.group, member.rating
        );
    }
    Ok(())
}
