#![allow(dead_code)]

use std::cell::RefCell;
use std::ffi::OsString;
use std::fmt::Write;

use crate::error::AudioError;
use crate::inspector::AudioOutput;
use crate::server::AudioServer;

/// RAII helper: set `XDG_CONFIG_HOME` to a tempdir for the lifetime of this guard.
pub(crate) struct XdgTemp {
    prev: Option<OsString>,
    dir: tempfile::TempDir,
}

impl XdgTemp {
    /// Create and activate a temporary `XDG_CONFIG_HOME`.
    ///
    /// # Panics
    ///
    /// Panics if a temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir for XDG_CONFIG_HOME");
        let prev = std::env::var_os("XDG_CONFIG_HOME");
        // SAFETY: Test-only code, the guard is held by a single test
        unsafe {
            std::env::set_var("XDG_CONFIG_HOME", dir.path());
        }
        Self { prev, dir }
    }

    /// Path to the temporary `XDG_CONFIG_HOME` directory.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        self.dir.path()
    }
}

impl Drop for XdgTemp {
    fn drop(&mut self) {
        // SAFETY: Test-only code, restores the value captured in `new`
        unsafe {
            if let Some(ref val) = self.prev {
                std::env::set_var("XDG_CONFIG_HOME", val);
            } else {
                std::env::remove_var("XDG_CONFIG_HOME");
            }
        }
    }
}

/// Shorthand for building an output in tests
pub(crate) fn output(name: &str, id: u32, priority: i64, enabled: bool) -> AudioOutput {
    AudioOutput {
        name: name.to_string(),
        id,
        priority,
        enabled,
    }
}

/// Render outputs the way `pactl list sinks` lays them out
pub(crate) fn pactl_report(outputs: &[AudioOutput]) -> String {
    let mut report = String::new();
    for out in outputs {
        let state = if out.enabled { "RUNNING" } else { "SUSPENDED" };
        let _ = write!(
            report,
            "Sink #{}\n\tState: {}\n\tName: {}\n\tDescription: Test sink\n\tpriority: {}\n\n",
            out.id, state, out.name, out.priority
        );
    }
    report
}

/// Render stream ids the way `pactl list sink-inputs` lays them out
pub(crate) fn pactl_streams(ids: &[u32]) -> String {
    ids.iter()
        .map(|id| format!("Sink Input #{id}\n\tDriver: protocol-native.c\n"))
        .collect()
}

/// A command received by [`FakeServer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    ListSinks,
    ListStreams,
    SetDefault(String),
    MoveStream { stream: u32, sink: u32 },
}

/// Scripted [`AudioServer`] that records every call
pub(crate) struct FakeServer {
    sinks: Result<String, AudioError>,
    streams: Result<String, AudioError>,
    fail_set_default: bool,
    failing_moves: Vec<u32>,
    calls: RefCell<Vec<Call>>,
}

impl FakeServer {
    pub fn new(sinks: &str, streams: &str) -> Self {
        Self {
            sinks: Ok(sinks.to_string()),
            streams: Ok(streams.to_string()),
            fail_set_default: false,
            failing_moves: Vec::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Server that answers the given outputs and stream ids in `pactl` layout
    pub fn with_outputs(outputs: &[AudioOutput], streams: &[u32]) -> Self {
        Self::new(&pactl_report(outputs), &pactl_streams(streams))
    }

    /// Server where every command fails
    pub fn unavailable() -> Self {
        let err = AudioError::ExternalUnavailable {
            command: "pactl".to_string(),
            reason: "Connection failure: Connection refused".to_string(),
        };
        Self {
            sinks: Err(err.clone()),
            streams: Err(err),
            fail_set_default: true,
            failing_moves: Vec::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn failing_set_default(mut self) -> Self {
        self.fail_set_default = true;
        self
    }

    pub fn failing_move(mut self, stream: u32) -> Self {
        self.failing_moves.push(stream);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Only the calls that change server state
    pub fn switch_commands(&self) -> Vec<Call> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, Call::SetDefault(_) | Call::MoveStream { .. }))
            .cloned()
            .collect()
    }

    fn refused(command: &str) -> AudioError {
        AudioError::ExternalUnavailable {
            command: command.to_string(),
            reason: "exited with exit status: 1: Failure: No such entity".to_string(),
        }
    }
}

impl AudioServer for FakeServer {
    fn list_sinks(&self) -> Result<String, AudioError> {
        self.calls.borrow_mut().push(Call::ListSinks);
        self.sinks.clone()
    }

    fn list_streams(&self) -> Result<String, AudioError> {
        self.calls.borrow_mut().push(Call::ListStreams);
        self.streams.clone()
    }

    fn set_default_sink(&self, sink_name: &str) -> Result<(), AudioError> {
        self.calls
            .borrow_mut()
            .push(Call::SetDefault(sink_name.to_string()));
        if self.fail_set_default {
            return Err(Self::refused("set-default-sink"));
        }
        Ok(())
    }

    fn move_stream(&self, stream_id: u32, sink_id: u32) -> Result<(), AudioError> {
        self.calls.borrow_mut().push(Call::MoveStream {
            stream: stream_id,
            sink: sink_id,
        });
        if self.failing_moves.contains(&stream_id) {
            return Err(Self::refused("move-sink-input"));
        }
        Ok(())
    }
}
