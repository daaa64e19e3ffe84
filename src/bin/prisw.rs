//! PRISW binary entry point
//!
//! Dispatches to daemon mode or one-shot commands based on CLI arguments.

use clap::Parser;
use color_eyre::eyre::Result;
use prisw::{cli::Args, cli::Command, commands, config::Config, daemon, logging};

#[tokio::main]
async fn main() -> Result<()> {
    // Install color-eyre for panic handling
    color_eyre::install()?;

    let args = Args::parse();

    match args.command {
        // No subcommand - show status
        None => {
            logging::init_cli_logging();
            let config = Config::load()?;
            commands::status(&config, false)
        }

        // Daemon handles its own logging initialization (file vs stderr)
        Some(Command::Daemon {
            foreground,
            interval_ms,
        }) => {
            let config = Config::load()?;
            daemon::run(config, foreground, interval_ms).await
        }

        Some(Command::Status { json }) => {
            logging::init_cli_logging();
            let config = Config::load()?;
            commands::status(&config, json)
        }

        Some(Command::ListSinks { json }) => {
            logging::init_cli_logging();
            let config = Config::load()?;
            commands::list_sinks(&config, json)
        }

        Some(Command::ListStreams { json }) => {
            logging::init_cli_logging();
            let config = Config::load()?;
            commands::list_streams(&config, json)
        }

        Some(Command::Switch { dry_run }) => {
            logging::init_cli_logging();
            let config = Config::load()?;
            commands::switch(&config, dry_run)
        }

        Some(Command::Validate) => {
            logging::init_cli_logging();
            let config = Config::load()?;
            config.print_summary();
            Ok(())
        }
    }
}
