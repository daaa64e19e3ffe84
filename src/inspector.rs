//! Device inspection
//!
//! Turns the audio tool's free-text sink and sink-input reports into
//! [`AudioOutput`] and [`AudioStream`] records.
//!
//! Sink reports are read column-wise: each of the four [`SinkFormat`] patterns
//! is matched against the whole report, giving one ordered list of fragments
//! per field. The lists are then transposed so that the k-th match of every
//! pattern describes the k-th sink. A report where the lists differ in length
//! cannot be lined up and is rejected as malformed.

use regex::Regex;
use serde::Serialize;
use std::str::FromStr;
use tracing::{debug, trace};

use crate::cache::ResponseCache;
use crate::error::AudioError;
use crate::server::AudioServer;

// ============================================================================
// Records
// ============================================================================

/// One audio output sink as reported by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioOutput {
    /// Sink name, used for "set default"
    pub name: String,
    /// Sink index, used for "move stream"
    pub id: u32,
    /// Higher is preferred
    pub priority: i64,
    /// Whether this sink is the currently active output
    pub enabled: bool,
}

/// One active playback stream (sink-input)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AudioStream {
    pub id: u32,
}

// ============================================================================
// Report Format
// ============================================================================

/// Patterns describing one audio tool's report layout
#[derive(Debug, Clone)]
pub struct SinkFormat {
    /// Matches the line carrying the sink index
    pub index: Regex,
    /// Matches the line carrying the sink name
    pub name: Regex,
    /// Matches the line carrying the sink priority
    pub priority: Regex,
    /// Matches the line that may carry `enabled_marker`
    pub state: Regex,
    /// Substring marking the active sink within a `state` match
    pub enabled_marker: String,
    /// Matches the line carrying a sink-input index
    pub stream_index: Regex,
}

// ============================================================================
// Parsing
// ============================================================================

/// All non-overlapping matches of `pattern`, in document order
#[must_use]
pub fn find_all<'a>(pattern: &Regex, text: &'a str) -> Vec<&'a str> {
    pattern.find_iter(text).map(|m| m.as_str()).collect()
}

/// Turn `N` equally long columns into rows, preserving order
///
/// Row `k` holds element `k` of every column. Returns `None` if the columns
/// differ in length.
#[must_use]
pub fn transpose<T: Copy, const N: usize>(columns: &[Vec<T>; N]) -> Option<Vec<[T; N]>> {
    let rows = columns.first().map_or(0, Vec::len);
    if columns.iter().any(|column| column.len() != rows) {
        return None;
    }

    Some(
        (0..rows)
            .map(|row| std::array::from_fn(|column| columns[column][row]))
            .collect(),
    )
}

/// Integer after the last whitespace or `#` (`"Sink #3"`, `"priority: 9039"`)
fn trailing_integer<T: FromStr>(fragment: &str, field: &str) -> Result<T, AudioError> {
    let trimmed = fragment.trim_end();
    let token = trimmed
        .rsplit(|c: char| c.is_whitespace() || c == '#')
        .next()
        .unwrap_or(trimmed);

    token.parse().map_err(|_| {
        AudioError::malformed(format!("expected an integer {field} in {fragment:?}"))
    })
}

/// Last whitespace-delimited token, without surrounding angle brackets
fn trailing_name(fragment: &str) -> Result<String, AudioError> {
    fragment
        .split_whitespace()
        .last()
        .map(|token| token.trim_start_matches('<').trim_end_matches('>'))
        .filter(|name| !name.is_empty())
        .map(String::from)
        .ok_or_else(|| AudioError::malformed(format!("no sink name in {fragment:?}")))
}

/// Parse a sink report into outputs, in report order
///
/// # Errors
/// Returns [`AudioError::MalformedResponse`] if the four field patterns match a
/// different number of times, or if an index or priority is not an integer.
pub fn parse_outputs(report: &str, format: &SinkFormat) -> Result<Vec<AudioOutput>, AudioError> {
    let columns = [
        find_all(&format.index, report),
        find_all(&format.name, report),
        find_all(&format.priority, report),
        find_all(&format.state, report),
    ];

    let rows = transpose(&columns).ok_or_else(|| {
        let [index, name, priority, state] = columns.each_ref().map(Vec::len);
        AudioError::malformed(format!(
            "sink fields do not line up (index: {index}, name: {name}, priority: {priority}, state: {state})"
        ))
    })?;

    rows.into_iter()
        .map(|[index, name, priority, state]| {
            Ok(AudioOutput {
                name: trailing_name(name)?,
                id: trailing_integer(index, "sink index")?,
                priority: trailing_integer(priority, "priority")?,
                enabled: state.contains(format.enabled_marker.as_str()),
            })
        })
        .collect()
}

/// Parse a sink-input report into streams, in report order
///
/// # Errors
/// Returns [`AudioError::MalformedResponse`] if a stream index is not an integer.
pub fn parse_streams(report: &str, format: &SinkFormat) -> Result<Vec<AudioStream>, AudioError> {
    find_all(&format.stream_index, report)
        .into_iter()
        .map(|fragment| {
            Ok(AudioStream {
                id: trailing_integer(fragment, "stream index")?,
            })
        })
        .collect()
}

// ============================================================================
// Inspector
// ============================================================================

/// Queries an [`AudioServer`] and parses what it reports
pub struct Inspector<S> {
    server: S,
    format: SinkFormat,
    cache: ResponseCache<Vec<AudioOutput>>,
}

impl<S: AudioServer> Inspector<S> {
    /// Create an inspector; `cache_size` of 0 disables the parse cache
    #[must_use]
    pub fn new(server: S, format: SinkFormat, cache_size: usize) -> Self {
        Self {
            server,
            format,
            cache: ResponseCache::new(cache_size),
        }
    }

    /// The server this inspector queries, for issuing switch commands
    #[must_use]
    pub fn server(&self) -> &S {
        &self.server
    }

    #[must_use]
    pub fn format(&self) -> &SinkFormat {
        &self.format
    }

    /// Fetch and parse the current sinks
    ///
    /// # Errors
    /// Returns [`AudioError::ExternalUnavailable`] if the server cannot be queried
    /// and [`AudioError::MalformedResponse`] if the report cannot be parsed.
    pub fn list_outputs(&mut self) -> Result<Vec<AudioOutput>, AudioError> {
        let report = self.server.list_sinks()?;

        if let Some(outputs) = self.cache.get(&report) {
            trace!("Sink report unchanged ({} outputs, cached)", outputs.len());
            return Ok(outputs);
        }

        let outputs = parse_outputs(&report, &self.format)?;
        debug!("Parsed {} outputs from sink report", outputs.len());
        self.cache.insert(&report, outputs.clone());
        Ok(outputs)
    }

    /// Fetch and parse the active streams (empty if nothing is playing)
    ///
    /// # Errors
    /// Returns [`AudioError::ExternalUnavailable`] if the server cannot be queried
    /// and [`AudioError::MalformedResponse`] if the report cannot be parsed.
    pub fn list_streams(&self) -> Result<Vec<AudioStream>, AudioError> {
        let report = self.server.list_streams()?;
        let streams = parse_streams(&report, &self.format)?;
        trace!("Parsed {} active streams", streams.len());
        Ok(streams)
    }

    /// Fraction of sink reports served from the parse cache
    #[must_use]
    pub fn cache_hit_rate(&self) -> f64 {
        self.cache.hit_rate()
    }
}
