//! Switch policy
//!
//! Decides whether the active output should change and performs the switch.
//!
//! The preferred output is the one with the highest priority; among equal
//! priorities the first one in report order wins. A switch happens when no
//! output is active or the active output is not the preferred one. Switching
//! sets the default sink once, then moves every playing stream over to it.

use tracing::{info, warn};

use crate::error::AudioError;
use crate::inspector::{AudioOutput, Inspector};
use crate::server::AudioServer;

/// What the policy wants to do with a snapshot of outputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision<'a> {
    /// Fewer than two outputs, nothing to choose between
    Idle,
    /// The active output is already the preferred one
    Keep(&'a AudioOutput),
    /// The preferred output should become active
    Switch {
        target: &'a AudioOutput,
        current: Option<&'a AudioOutput>,
    },
}

/// First output holding the highest priority
#[must_use]
pub fn prioritized(outputs: &[AudioOutput]) -> Option<&AudioOutput> {
    outputs.iter().fold(None, |best, candidate| match best {
        Some(best) if best.priority >= candidate.priority => Some(best),
        _ => Some(candidate),
    })
}

/// The currently active output, if the server reports one
#[must_use]
pub fn enabled(outputs: &[AudioOutput]) -> Option<&AudioOutput> {
    outputs.iter().find(|o| o.enabled)
}

/// Decide without touching the server
#[must_use]
pub fn decide(outputs: &[AudioOutput]) -> Decision<'_> {
    if outputs.len() < 2 {
        return Decision::Idle;
    }

    let Some(target) = prioritized(outputs) else {
        return Decision::Idle;
    };

    match enabled(outputs) {
        Some(current) if current == target => Decision::Keep(current),
        current => Decision::Switch { target, current },
    }
}

/// A stream that could not be moved to the new output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedMove {
    pub stream: u32,
    pub error: AudioError,
}

/// Result of a performed switch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchReport {
    pub target: AudioOutput,
    pub previous: Option<AudioOutput>,
    /// Streams successfully moved to `target`
    pub moved: Vec<u32>,
    pub failed_moves: Vec<FailedMove>,
    /// Set if the streams could not be listed after the default changed
    pub streams_error: Option<AudioError>,
}

impl SwitchReport {
    /// The default changed but some streams may still play elsewhere
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.failed_moves.is_empty() || self.streams_error.is_some()
    }
}

/// Result of one evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Idle,
    Steady(AudioOutput),
    Switched(SwitchReport),
}

/// Switch to the preferred output if it is not already active
///
/// # Errors
/// Returns an error if the default sink could not be set. Failures after the
/// default has changed do not roll it back; they are recorded in the
/// [`SwitchReport`] instead.
pub fn evaluate<S: AudioServer>(
    inspector: &Inspector<S>,
    outputs: &[AudioOutput],
) -> Result<Outcome, AudioError> {
    match decide(outputs) {
        Decision::Idle => Ok(Outcome::Idle),
        Decision::Keep(current) => Ok(Outcome::Steady(current.clone())),
        Decision::Switch { target, current } => {
            switch_to(inspector, target, current).map(Outcome::Switched)
        }
    }
}

fn switch_to<S: AudioServer>(
    inspector: &Inspector<S>,
    target: &AudioOutput,
    current: Option<&AudioOutput>,
) -> Result<SwitchReport, AudioError> {
    match current {
        Some(current) => info!(
            "Switching output: {} → {} (priority {} → {})",
            current.name, target.name, current.priority, target.priority
        ),
        None => info!(
            "No active output, switching to {} (priority {})",
            target.name, target.priority
        ),
    }

    let server = inspector.server();
    server.set_default_sink(&target.name)?;

    let mut report = SwitchReport {
        target: target.clone(),
        previous: current.cloned(),
        moved: Vec::new(),
        failed_moves: Vec::new(),
        streams_error: None,
    };

    let streams = match inspector.list_streams() {
        Ok(streams) => streams,
        Err(e) => {
            warn!("Default changed but active streams could not be listed: {}", e);
            report.streams_error = Some(e);
            return Ok(report);
        }
    };

    for stream in streams {
        match server.move_stream(stream.id, target.id) {
            Ok(()) => report.moved.push(stream.id),
            Err(error) => {
                warn!("Could not move stream {} to {}: {}", stream.id, target.name, error);
                report.failed_moves.push(FailedMove {
                    stream: stream.id,
                    error,
                });
            }
        }
    }

    info!(
        "Now playing on {} ({} streams moved, {} failed)",
        target.name,
        report.moved.len(),
        report.failed_moves.len()
    );

    Ok(report)
}
