//! Built-in audio tool presets
//!
//! Two command families report sinks in incompatible text layouts:
//!
//! - `pactl list sinks` prints `Sink #N` headers and a `State: RUNNING` line
//!   for the sink that is currently playing.
//! - `pacmd list-sinks` prints `index: N` lines and marks the default sink
//!   with a leading `*` on that same line.
//!
//! A preset bundles the command lines and the report patterns for one family.
//! Every piece can still be overridden from the config file.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::inspector::SinkFormat;
use crate::server::CommandSet;

/// Which audio tool the switcher drives
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// `pactl` (PulseAudio, or PipeWire through pipewire-pulse)
    #[default]
    Pactl,
    /// `pacmd` (PulseAudio only)
    Pacmd,
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pactl => write!(f, "pactl"),
            Self::Pacmd => write!(f, "pacmd"),
        }
    }
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| (*s).to_string()).collect()
}

fn builtin(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in report pattern is a valid regex")
}

impl Tool {
    /// Default command lines for this tool
    #[must_use]
    pub fn commands(self) -> CommandSet {
        match self {
            Self::Pactl => CommandSet {
                list_sinks: argv(&["pactl", "list", "sinks"]),
                list_streams: argv(&["pactl", "list", "sink-inputs"]),
                set_default: argv(&["pactl", "set-default-sink", "{sink_name}"]),
                move_stream: argv(&["pactl", "move-sink-input", "{stream_id}", "{sink_id}"]),
            },
            Self::Pacmd => CommandSet {
                list_sinks: argv(&["pacmd", "list-sinks"]),
                list_streams: argv(&["pacmd", "list-sink-inputs"]),
                set_default: argv(&["pacmd", "set-default-sink", "{sink_name}"]),
                move_stream: argv(&["pacmd", "move-sink-input", "{stream_id}", "{sink_id}"]),
            },
        }
    }

    /// Default report patterns for this tool
    #[must_use]
    pub fn format(self) -> SinkFormat {
        match self {
            Self::Pactl => SinkFormat {
                index: builtin(r"Sink #[0-9]+"),
                name: builtin(r"Name: .+"),
                priority: builtin(r"priority: [0-9]+"),
                state: builtin(r"State: [A-Z]+"),
                enabled_marker: "RUNNING".to_string(),
                stream_index: builtin(r"Sink Input #[0-9]+"),
            },
            // The default marker lives on the index line, so `state` reuses it
            Self::Pacmd => SinkFormat {
                index: builtin(r"(?m)^[ \t]*(?:\* )?index: [0-9]+"),
                name: builtin(r"(?m)^[ \t]*name: <[^>\n]*>"),
                priority: builtin(r"(?m)^[ \t]*priority: [0-9]+"),
                state: builtin(r"(?m)^[ \t]*(?:\* )?index: [0-9]+"),
                enabled_marker: "*".to_string(),
                stream_index: builtin(r"(?m)^[ \t]*index: [0-9]+"),
            },
        }
    }
}
