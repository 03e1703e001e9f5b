mod cli;
mod commands;
mod loader;
mod matcher;
mod model;
mod normalize;
mod report;
mod similarity;
mod util;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{AuthenticityCommands, Cli, Commands};

fn main() {
    init_tracing();

    if let Err(err) = run() {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Persona(args) => commands::persona::run(args),
        Commands::Facts(args) => commands::facts::run(args),
        Commands::Retrieval(args) => commands::retrieval::run(args),
        Commands::Authenticity(args) => match args.command {
            AuthenticityCommands::Generate(args) => commands::authenticity::generate(args),
            AuthenticityCommands::Evaluate(args) => commands::authenticity::run(args),
        },
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
