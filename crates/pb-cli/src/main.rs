//! Pickleball league CLI.

mod cli;
mod commands;
mod error;
mod league_file;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> error::Result<()> {
    let cli = Cli::parse();
    let mut store = league_file::load(&cli.file)?;

    let read_only = matches!(cli.command, Commands::Rankings(_) | Commands::ShowEvent(_));
    match &cli.command {
        Commands::CreateGroup(args) => commands::run_create_group(args, &mut store, cli.format),
        Commands::AddPlayer(args) => commands::run_add_player(args, &mut store, cli.format),
        Commands::CreateEvent(args) => commands::run_create_event(args, &mut store, cli.format),
        Commands::Generate(args) => commands::run_generate(args, &mut store, cli.format),
        Commands::ShowEvent(args) => commands::run_show_event(args, &store, cli.format),
        Commands::Score(args) => commands::run_score(args, &mut store, cli.format),
        Commands::Complete(args) => commands::run_complete(args, &mut store, cli.format),
        Commands::Recompute(args) => commands::run_recompute(args, &mut store, cli.format),
        Commands::Rankings(args) => commands::run_rankings(args, &mut store, cli.format),
        Commands::Import(args) => commands::run_import(args, &mut store, cli.format),
    }?;

    if !read_only {
        league_file::save(&cli.file, &store)?;
    }
    Ok(())
}
