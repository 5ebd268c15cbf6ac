//! Archery scoring client binary.
//!
//! Command-line front end over the reference data and the session store:
//! round validation, handicap and classification lookups, and session
//! scoring through the runtime.
//!
//! # Examples
//!
//! ```bash
//! archery handicap --round york --score 1000
//! archery table --round "WA 18" --handicap 40
//! archery new --round portsmouth --bow compound --gender male
//! archery end 1 X 10 9
//! archery end 1 9 9 8 --replace-at 1
//! archery score 1
//! ```

mod commands;
mod config;
mod logging;

use std::path::PathBuf;

use anyhow::Result;
use archery_core::HandicapSystem;
use clap::Parser;
use commands::{
    Classify, DeleteCommand, EndCommand, Handicap, NewSessionCommand, Remaining, Score, Table,
    Validate,
};
use config::CliConfig;

/// Archery scoring tools
#[derive(Parser)]
#[command(name = "archery")]
#[command(about = "Score archery rounds, look up handicaps and classifications", long_about = None)]
#[command(version)]
struct Cli {
    /// Reference data directory (overrides ARCHERY_DATA_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Session store directory (overrides ARCHERY_STORE_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    store_dir: Option<PathBuf>,

    /// Handicap system: agb2023 or legacy (overrides ARCHERY_HANDICAP_SYSTEM)
    #[arg(long, global = true, value_name = "SYSTEM", value_parser = commands::parse_name::<HandicapSystem>)]
    system: Option<HandicapSystem>,

    /// Score handicaps on the inner ten (overrides ARCHERY_INNER_TEN)
    #[arg(long, global = true)]
    inner_ten: Option<bool>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Validate round definition files
    Validate(Validate),

    /// Handicap for a score, or score for a handicap
    Handicap(Handicap),

    /// Handicap table excerpt around a score or handicap
    Table(Table),

    /// Classification achieved by a score
    Classify(Classify),

    /// Arrows left at each distance
    Remaining(Remaining),

    /// Start a scoring session
    New(NewSessionCommand),

    /// Append, insert or replace an end
    End(EndCommand),

    /// Delete arrows from a session
    Delete(DeleteCommand),

    /// Score sheet and statistics of a session
    Score(Score),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut config = CliConfig::from_env();
    config.data_dir = cli.data_dir.or(config.data_dir);
    config.store_dir = cli.store_dir.or(config.store_dir);
    config.handicap_system = cli.system.or(config.handicap_system);
    config.inner_ten = cli.inner_ten.or(config.inner_ten);

    let _guard = logging::setup_logging(config.log_dir.as_deref())?;

    match cli.command {
        Command::Validate(cmd) => cmd.execute(),
        Command::Handicap(cmd) => cmd.execute(&config),
        Command::Table(cmd) => cmd.execute(&config),
        Command::Classify(cmd) => cmd.execute(&config),
        Command::Remaining(cmd) => cmd.execute(&config),
        Command::New(cmd) => cmd.execute(&config).await,
        Command::End(cmd) => cmd.execute(&config).await,
        Command::Delete(cmd) => cmd.execute(&config).await,
        Command::Score(cmd) => cmd.execute(&config),
    }
}
