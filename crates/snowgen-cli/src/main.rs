//! `snowgen`: generate and decode Snowflake-style IDs from the command line.

mod cli;

use clap::Parser;
use cli::commands;
use cli::config::{CliArgs, Command};
use cli::telemetry::init_telemetry;
use snowgen::Configuration;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    init_telemetry(args.log_json)?;

    let config = Configuration::try_from(&args.layout)?;
    tracing::debug!(?config, "resolved configuration");

    match args.command {
        Command::Generate { count } => commands::generate(config, count, commands::stdout()),
        Command::Decode { ids, json } => commands::decode(&config, &ids, json, commands::stdout()),
    }
}
