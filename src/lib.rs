//! `PRISW` - Priority Switcher
//!
//! Keeps the highest-priority audio sink active. The daemon polls the audio
//! server through `pactl` (or `pacmd`), parses the sink report, and when the
//! active sink is not the preferred one, makes the preferred sink the default
//! and moves every playing stream to it.
//!
//! # Layout
//! - [`server`]: the four audio server operations behind the [`server::AudioServer`] trait
//! - [`inspector`]: sink and stream report parsing
//! - [`policy`]: which sink should be active, and the switch itself
//! - [`daemon`]: the poll loop
//! - [`config`]: TOML configuration, tool presets and overrides

pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod daemon;
pub mod error;
pub mod inspector;
pub mod logging;
pub mod notification;
pub mod policy;
pub mod server;
pub mod style;
pub mod tool;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types for convenience
pub use cli::Args;
pub use config::Config;
pub use error::AudioError;
pub use inspector::{AudioOutput, AudioStream, Inspector};
