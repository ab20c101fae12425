//! invigilator library root.
//! Exposes the CLI parser, the high-level `run()` function and the offline
//! core (write buffer, connectivity monitor, reconciliation, submission).

pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod models;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    use crate::cli::commands as c;

    match &cli.command {
        Commands::Init => c::init::handle(cli),
        Commands::Config { .. } => c::config::handle(&cli.command, cfg),
        Commands::Db { .. } => c::db::handle(&cli.command, cfg),
        Commands::Log { .. } => c::log::handle(&cli.command, cfg),
        Commands::Login { .. } => c::login::handle(&cli.command, cfg),
        Commands::Logout => c::logout::handle(cfg),
        Commands::Exams { .. } => c::exams::handle(&cli.command, cfg),
        Commands::Students { .. } => c::students::handle(&cli.command, cfg),
        Commands::Mark { .. } => c::mark::handle(&cli.command, cfg),
        Commands::Scan { .. } => c::scan::handle(&cli.command, cfg),
        Commands::Incident { .. } => c::incident::handle(&cli.command, cfg),
        Commands::Incidents { .. } => c::incidents::handle(&cli.command, cfg),
        Commands::Report { .. } => c::report::handle(&cli.command, cfg),
        Commands::Timer { .. } => c::timer::handle(&cli.command, cfg),
        Commands::Sync => c::sync::handle(cfg),
        Commands::Watch { .. } => c::watch::handle(&cli.command, cfg),
        Commands::Status => c::status::handle(cfg),
        Commands::Barcode { .. } => c::barcode::handle(&cli.command, cfg),
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();

    // Config is loaded once, then command-line overrides apply
    let mut cfg = Config::load()?;

    if let Some(custom_db) = &cli.db {
        cfg.database = custom_db.clone();
    }
    if let Some(api) = &cli.api {
        cfg.api_base_url = api.clone();
    }
    cfg.force_offline = cli.offline;
    cfg.validate()?;

    dispatch(&cli, &cfg)
}
