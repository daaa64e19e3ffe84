//! CLI commands
//!
//! One-shot commands that inspect the audio server or run a single poll.
//! They share the daemon's inspector and policy so what they print is exactly
//! what the daemon would see and do.

use color_eyre::eyre::Result;
use crossterm::style::Stylize;
use serde::Serialize;

use crate::config::Config;
use crate::inspector::{AudioOutput, AudioStream, Inspector};
use crate::policy::{self, Decision, Outcome};
use crate::server::CommandServer;
use crate::style::PriswStyle;

// ============================================================================
// JSON Output Structures
// ============================================================================

#[derive(Debug, Serialize)]
pub struct StatusJson<'a> {
    pub tool: String,
    pub outputs: &'a [AudioOutput],
    pub active: Option<&'a str>,
    pub preferred: Option<&'a str>,
    pub switch_pending: bool,
}

impl<'a> StatusJson<'a> {
    #[must_use]
    pub fn new(config: &Config, outputs: &'a [AudioOutput]) -> Self {
        let decision = policy::decide(outputs);
        Self {
            tool: config.settings.tool.to_string(),
            outputs,
            active: policy::enabled(outputs).map(|o| o.name.as_str()),
            preferred: policy::prioritized(outputs).map(|o| o.name.as_str()),
            switch_pending: matches!(decision, Decision::Switch { .. }),
        }
    }
}

// ============================================================================
// Commands
// ============================================================================

fn inspector(config: &Config) -> Inspector<CommandServer> {
    Inspector::new(
        CommandServer::new(config.commands.clone()),
        config.format.clone(),
        0,
    )
}

/// One line per output: marker, name, id and priority
fn print_outputs(outputs: &[AudioOutput]) {
    let preferred = policy::prioritized(outputs);

    if outputs.is_empty() {
        println!("  {}", "(none)".dim());
        return;
    }

    for out in outputs {
        let marker = if out.enabled { "* " } else { "  " };
        let star = if preferred == Some(out) && outputs.len() > 1 {
            format!(" {}", "[preferred]".success())
        } else {
            String::new()
        };
        println!("{}{}{}", marker, out.name.as_str().bold(), star);
        println!(
            "    {} {}  {} {}",
            "id".dim(),
            out.id.to_string().technical(),
            "priority".dim(),
            out.priority.to_string().technical()
        );
    }
    println!("\n  {} = active", "*".dim());
}

/// List sinks as parsed from the audio tool
///
/// # Errors
/// Returns an error if the audio tool fails or its report cannot be parsed.
pub fn list_sinks(config: &Config, json_output: bool) -> Result<()> {
    let outputs = inspector(config).list_outputs()?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&outputs)?);
    } else {
        println!("{}", "SINKS:".header());
        println!("{}", "-".repeat(6));
        print_outputs(&outputs);
    }

    Ok(())
}

/// List playing streams
///
/// # Errors
/// Returns an error if the audio tool fails or its report cannot be parsed.
pub fn list_streams(config: &Config, json_output: bool) -> Result<()> {
    let streams: Vec<AudioStream> = inspector(config).list_streams()?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&streams)?);
    } else {
        println!("{}", "STREAMS:".header());
        println!("{}", "-".repeat(8));
        if streams.is_empty() {
            println!("  {}", "(nothing playing)".dim());
        }
        for stream in &streams {
            println!("  {} {}", "sink-input".dim(), stream.id.to_string().technical());
        }
    }

    Ok(())
}

/// Show sinks and what the policy would do
///
/// # Errors
/// Returns an error if the audio tool fails or its report cannot be parsed.
pub fn status(config: &Config, json_output: bool) -> Result<()> {
    let outputs = inspector(config).list_outputs()?;

    if json_output {
        let status = StatusJson::new(config, &outputs);
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", "SINKS:".header());
    println!("{}", "-".repeat(6));
    print_outputs(&outputs);

    println!("\n{}", "STATUS:".header());
    println!("{}", "-".repeat(7));
    match policy::decide(&outputs) {
        Decision::Idle => println!(
            "  {}",
            "Fewer than two sinks, nothing to switch".dim()
        ),
        Decision::Keep(active) => println!(
            "  {} {}",
            "Steady on".success(),
            active.name.as_str().bold()
        ),
        Decision::Switch { target, current } => println!(
            "  {} {} → {}",
            "Switch pending:".warning(),
            current.map_or("(no active sink)", |c| c.name.as_str()),
            target.name.as_str().bold()
        ),
    }
    println!("  {} {}", "Tool:".dim(), config.settings.tool);

    Ok(())
}

/// Run one poll now
///
/// # Errors
/// Returns an error if the audio tool fails, its report cannot be parsed, or
/// the default sink cannot be set.
pub fn switch(config: &Config, dry_run: bool) -> Result<()> {
    let mut inspector = inspector(config);
    let outputs = inspector.list_outputs()?;

    if dry_run {
        match policy::decide(&outputs) {
            Decision::Idle => println!("Nothing to do: fewer than two sinks"),
            Decision::Keep(active) => println!("Nothing to do: {} is preferred and active", active.name),
            Decision::Switch { target, .. } => {
                let streams = inspector.list_streams()?;
                println!("Would set default sink: {}", target.name.as_str().bold());
                for stream in streams {
                    println!("Would move stream {} → sink {}", stream.id, target.id);
                }
            }
        }
        return Ok(());
    }

    match policy::evaluate(&inspector, &outputs)? {
        Outcome::Idle => println!("Nothing to do: fewer than two sinks"),
        Outcome::Steady(active) => println!("Nothing to do: {} is preferred and active", active.name),
        Outcome::Switched(report) => {
            println!(
                "{} {}",
                "Switched to".success(),
                report.target.name.as_str().bold()
            );
            if !report.moved.is_empty() {
                println!("  moved streams: {:?}", report.moved);
            }
            for failed in &report.failed_moves {
                println!(
                    "  {} stream {}: {}",
                    "failed".error(),
                    failed.stream,
                    failed.error
                );
            }
            if let Some(ref e) = report.streams_error {
                println!("  {} {}", "streams not listed:".error(), e);
            }
        }
    }

    Ok(())
}
