//! Audio server access
//!
//! The daemon never talks to the audio server directly. It goes through the
//! [`AudioServer`] trait, which exposes the four text operations the switcher
//! needs. [`CommandServer`] implements them by running the configured audio
//! tool (`pactl` or `pacmd`) as a child process.

use serde::Serialize;
use std::process::Command;
use tracing::{debug, trace};

use crate::error::AudioError;

/// Placeholder replaced with the sink name in `set_default`
pub const SINK_NAME_PLACEHOLDER: &str = "{sink_name}";
/// Placeholder replaced with the sink index in `move_stream`
pub const SINK_ID_PLACEHOLDER: &str = "{sink_id}";
/// Placeholder replaced with the sink-input index in `move_stream`
pub const STREAM_ID_PLACEHOLDER: &str = "{stream_id}";

/// The four logical operations of the audio server
///
/// Listings return the raw text report; parsing is the inspector's job.
pub trait AudioServer {
    /// Describe all sinks
    ///
    /// # Errors
    /// Returns [`AudioError::ExternalUnavailable`] if the server cannot be queried.
    fn list_sinks(&self) -> Result<String, AudioError>;

    /// Describe all active playback streams (sink-inputs)
    ///
    /// # Errors
    /// Returns [`AudioError::ExternalUnavailable`] if the server cannot be queried.
    fn list_streams(&self) -> Result<String, AudioError>;

    /// Make `sink_name` the default sink
    ///
    /// # Errors
    /// Returns [`AudioError::ExternalUnavailable`] if the command fails.
    fn set_default_sink(&self, sink_name: &str) -> Result<(), AudioError>;

    /// Move the stream `stream_id` to the sink `sink_id`
    ///
    /// # Errors
    /// Returns [`AudioError::ExternalUnavailable`] if the command fails.
    fn move_stream(&self, stream_id: u32, sink_id: u32) -> Result<(), AudioError>;
}

/// Command lines for each logical operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSet {
    pub list_sinks: Vec<String>,
    pub list_streams: Vec<String>,
    /// Must contain `{sink_name}`
    pub set_default: Vec<String>,
    /// Must contain `{stream_id}` and `{sink_id}`
    pub move_stream: Vec<String>,
}

impl CommandSet {
    /// Programs referenced by this command set, deduplicated
    #[must_use]
    pub fn programs(&self) -> Vec<&str> {
        let mut programs: Vec<&str> = Vec::with_capacity(4);
        for argv in [
            &self.list_sinks,
            &self.list_streams,
            &self.set_default,
            &self.move_stream,
        ] {
            if let Some(program) = argv.first()
                && !programs.contains(&program.as_str())
            {
                programs.push(program);
            }
        }
        programs
    }
}

/// Substitute `{placeholder}` tokens in every argument of a command line
#[must_use]
pub fn render(template: &[String], substitutions: &[(&str, &str)]) -> Vec<String> {
    template
        .iter()
        .map(|arg| {
            substitutions
                .iter()
                .fold(arg.clone(), |acc, (key, value)| acc.replace(key, value))
        })
        .collect()
}

/// [`AudioServer`] backed by the configured command-line tool
#[derive(Debug, Clone)]
pub struct CommandServer {
    commands: CommandSet,
}

impl CommandServer {
    #[must_use]
    pub fn new(commands: CommandSet) -> Self {
        Self { commands }
    }

    #[must_use]
    pub fn commands(&self) -> &CommandSet {
        &self.commands
    }

    /// Check that every program named in the command set can be started
    ///
    /// Returns the programs that could not be found. A missing program is not
    /// fatal for the daemon since the tool may be installed later.
    #[must_use]
    pub fn missing_programs(&self) -> Vec<String> {
        self.commands
            .programs()
            .into_iter()
            .filter(|program| Command::new(program).arg("--version").output().is_err())
            .map(String::from)
            .collect()
    }

    /// Run a command line and return its stdout
    fn run(argv: &[String]) -> Result<String, AudioError> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| AudioError::unavailable(argv, "empty command line"))?;

        trace!("Running: {}", argv.join(" "));

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| AudioError::unavailable(argv, format!("could not be started: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AudioError::unavailable(
                argv,
                format!("exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl AudioServer for CommandServer {
    fn list_sinks(&self) -> Result<String, AudioError> {
        Self::run(&self.commands.list_sinks)
    }

    fn list_streams(&self) -> Result<String, AudioError> {
        Self::run(&self.commands.list_streams)
    }

    fn set_default_sink(&self, sink_name: &str) -> Result<(), AudioError> {
        let argv = render(
            &self.commands.set_default,
            &[(SINK_NAME_PLACEHOLDER, sink_name)],
        );
        Self::run(&argv)?;
        debug!("Set default sink: {}", sink_name);
        Ok(())
    }

    fn move_stream(&self, stream_id: u32, sink_id: u32) -> Result<(), AudioError> {
        let stream = stream_id.to_string();
        let sink = sink_id.to_string();
        let argv = render(
            &self.commands.move_stream,
            &[(STREAM_ID_PLACEHOLDER, &stream), (SINK_ID_PLACEHOLDER, &sink)],
        );
        Self::run(&argv)?;
        debug!("Moved stream {} to sink {}", stream_id, sink_id);
        Ok(())
    }
}
