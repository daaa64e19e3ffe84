//! Audio boundary errors
//!
//! Everything that talks to the audio tool returns [`AudioError`] so callers
//! can tell "the server is not answering" apart from "the server answered
//! with something we cannot read". Both are recoverable: the daemon skips the
//! tick and tries again on the next one.

use thiserror::Error;

/// Failure talking to, or reading from, the external audio tool
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AudioError {
    /// The command could not be spawned or exited with a nonzero status
    #[error("audio server unavailable: `{command}` {reason}")]
    ExternalUnavailable { command: String, reason: String },

    /// The listing did not have the expected shape
    #[error("malformed audio server response: {0}")]
    MalformedResponse(String),
}

impl AudioError {
    /// Short label used in logs and JSON output
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ExternalUnavailable { .. } => "external_unavailable",
            Self::MalformedResponse(_) => "malformed_response",
        }
    }

    pub(crate) fn unavailable(command: &[String], reason: impl Into<String>) -> Self {
        Self::ExternalUnavailable {
            command: command.join(" "),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse(reason.into())
    }
}
