//! bindspec CLI - binding generator for native API specs

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::Outcome;

fn main() {
    match run() {
        Ok(Outcome::Success) => {}
        Ok(Outcome::TargetsAborted) => std::process::exit(2),
        Err(e) => {
            eprintln!("error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<Outcome> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("bindspec=debug")
    } else {
        EnvFilter::new("bindspec=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_ansi(!cli.no_color)
        .with_writer(std::io::stderr)
        .init();

    let color = commands::use_color(cli.no_color);

    match cli.command {
        Commands::Generate(args) => commands::generate::execute(args, color),
        Commands::Check(args) => commands::check::execute(args, color),
        Commands::Targets(args) => commands::targets::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
