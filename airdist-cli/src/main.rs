//! airdist CLI - Command-line interface
//!
//! This binary imports airports into the distance cache and queries it.

mod commands;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::distance::DistanceArgs;
use commands::import::ImportArgs;
use commands::nearby::NearbyArgs;
use commands::validate::ValidateArgs;

#[derive(Parser)]
#[command(name = "airdist")]
#[command(version = airdist::VERSION)]
#[command(about = "Airport proximity search and pairwise distance cache", long_about = None)]
struct Cli {
    /// Configuration file (default: ~/.airdist/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import airports and cache every pairwise distance
    Import(ImportArgs),

    /// Re-count cached pairs and repair gaps
    Validate(ValidateArgs),

    /// List airports within a radius of another
    Nearby(NearbyArgs),

    /// Distance between two airports
    Distance(DistanceArgs),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    let result = match cli.command {
        Commands::Import(args) => commands::import::run(config_path, args),
        Commands::Validate(args) => commands::validate::run(config_path, args),
        Commands::Nearby(args) => commands::nearby::run(config_path, args),
        Commands::Distance(args) => commands::distance::run(config_path, args),
        Commands::Config(command) => commands::config::run(config_path, command),
    };

    if let Err(e) = result {
        e.exit();
    }
}
