//! Desktop notifications
//!
//! Handles sending notifications via notify-rust and icon detection
//! using `FreeDesktop` standard icon names.

use color_eyre::eyre::{Context, Result};
use notify_rust::Notification;

use crate::policy::SwitchReport;

/// Send a desktop notification
///
/// # Errors
/// Returns an error if the notification cannot be sent (e.g., no notification daemon running).
pub fn send_notification(summary: &str, body: &str, icon: Option<&str>) -> Result<()> {
    // Use provided icon, or fall back to generic audio icon
    let icon = icon.unwrap_or("audio-card");

    Notification::new()
        .summary(summary)
        .body(body)
        .appname("PRISW")
        .icon(icon)
        .timeout(3000)
        .show()
        .context("Failed to show notification")?;

    Ok(())
}

/// Guess a `FreeDesktop` icon from a sink name
#[must_use]
pub fn get_sink_icon(sink_name: &str) -> &'static str {
    let name = sink_name.to_lowercase();

    if name.contains("hdmi") || name.contains("displayport") {
        "video-display"
    } else if name.contains("bluez")
        || name.contains("headphone")
        || name.contains("headset")
        || name.contains("a2dp")
    {
        "audio-headphones"
    } else {
        "audio-speakers"
    }
}

/// Summary and body for a switch notification
#[must_use]
pub fn switch_message(report: &SwitchReport) -> (String, String) {
    let mut body = format!("Now playing on {}", report.target.name);
    if report.is_partial() {
        body.push_str("\nSome streams could not be moved");
    }
    ("Audio output switched".to_string(), body)
}

/// Notify about a performed switch
///
/// # Errors
/// Returns an error if the notification cannot be sent.
pub fn notify_switch(report: &SwitchReport) -> Result<()> {
    let (summary, body) = switch_message(report);
    send_notification(&summary, &body, Some(get_sink_icon(&report.target.name)))
}
