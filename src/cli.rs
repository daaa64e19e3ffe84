//! Command-line interface definitions
//!
//! Uses clap for argument parsing with derive macros.

use clap::{Parser, Subcommand};

/// PRISW - Priority Switcher
///
/// Keeps the highest-priority audio sink active.
#[derive(Parser)]
#[command(name = "prisw")]
#[command(version)]
#[command(about = "Priority Switcher - Automatically keep the highest-priority audio sink active")]
#[command(after_help = "\
BEHAVIOR:
  - The daemon polls the audio server at a fixed interval (default 1000 ms)
  - The preferred sink is the one with the highest priority reported by the server
  - Among equal priorities, the first sink listed wins
  - When the active sink is not the preferred one, the preferred sink becomes
    the default and every playing stream is moved to it
  - If the audio server is unreachable, the poll is skipped and retried

DAEMON:
  prisw daemon               Run the poll loop, logging to the state directory
  prisw daemon --foreground  Run with logs on stderr

QUERY COMMANDS:
  prisw status               Show sinks and whether a switch is pending (or just: prisw)
  prisw list-sinks           List sinks as parsed from the audio tool
  prisw list-streams         List playing streams
  prisw validate             Validate the config file

ONE-SHOT:
  prisw switch               Switch to the preferred sink now if needed
  prisw switch --dry-run     Show what a poll would do

AUDIO TOOLS:
  Uses pactl (default) or pacmd, selected with `tool` in config.toml.
  Report patterns and command lines can be overridden in [format] and [commands].")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Run the daemon (polls sinks and switches audio)
    Daemon {
        /// Run in foreground with logs to stderr
        #[arg(short, long)]
        foreground: bool,

        /// Poll interval in milliseconds (overrides config)
        #[arg(long, value_name = "MS", value_parser = clap::value_parser!(u64).range(1..))]
        interval_ms: Option<u64>,
    },

    /// Show sinks, the active and preferred sink
    Status {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// List sinks as parsed from the audio tool
    ListSinks {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// List playing streams (sink-inputs)
    ListStreams {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Run one poll now
    Switch {
        /// Only show what would happen
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate config file
    Validate,
}
