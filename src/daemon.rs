//! Daemon mode
//!
//! Runs the poll loop: on every tick, inspect the sinks and let the switch
//! policy act on them. Ticks run to completion one at a time; a slow tick
//! delays the next one instead of overlapping it. Failed ticks are logged and
//! retried on the next tick, so the daemon recovers once the audio server
//! comes back.

use color_eyre::eyre::{self, Context, Result};
use sd_notify::NotifyState;
use std::time::Duration;
use tokio::signal;
use tokio::signal::unix::SignalKind;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use crate::config::Config;
use crate::error::AudioError;
use crate::inspector::Inspector;
use crate::logging;
use crate::notification::notify_switch;
use crate::policy::{self, Outcome};
use crate::server::{AudioServer, CommandServer};

/// Run one inspection + policy evaluation
///
/// # Errors
/// Returns an error if the sinks cannot be listed or parsed, or if the
/// default sink cannot be set.
pub fn tick<S: AudioServer>(inspector: &mut Inspector<S>) -> Result<Outcome, AudioError> {
    let outputs = inspector.list_outputs()?;
    policy::evaluate(inspector, &outputs)
}

/// Tracks consecutive failed ticks so an outage is reported once, not every tick
#[derive(Debug, Default)]
pub struct TickHealth {
    consecutive_failures: u32,
}

impl TickHealth {
    #[must_use]
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Log the result of a tick
    pub fn record(&mut self, result: &Result<Outcome, AudioError>) {
        match result {
            Ok(outcome) => {
                if self.consecutive_failures > 0 {
                    info!(
                        "Audio server readable again after {} failed polls",
                        self.consecutive_failures
                    );
                }
                self.consecutive_failures = 0;

                match outcome {
                    Outcome::Idle => trace!("Fewer than two outputs, nothing to do"),
                    Outcome::Steady(active) => trace!("Steady on {}", active.name),
                    Outcome::Switched(report) if report.is_partial() => {
                        warn!("Switched to {} but not every stream followed", report.target.name);
                    }
                    Outcome::Switched(_) => {}
                }
            }
            Err(e) => {
                self.consecutive_failures += 1;
                if self.consecutive_failures == 1 {
                    warn!("Poll failed ({}), retrying every tick: {}", e.kind(), e);
                } else {
                    debug!("Poll failed again (#{}): {}", self.consecutive_failures, e);
                }
            }
        }
    }
}

/// Run the daemon with the given configuration
///
/// # Errors
/// Returns an error if logging or signal handlers cannot be set up. Audio
/// server failures never end the loop.
pub async fn run(config: Config, foreground: bool, interval_ms: Option<u64>) -> Result<()> {
    let _log_guard = logging::init_daemon_logging(&config, foreground)?;

    let interval_ms = interval_ms.unwrap_or(config.settings.poll_interval_ms);
    if interval_ms == 0 {
        eyre::bail!("Poll interval must be greater than 0 ms");
    }

    info!("Starting PRISW daemon");
    info!(
        "Tool: {}, polling every {} ms",
        config.settings.tool, interval_ms
    );

    let server = CommandServer::new(config.commands.clone());
    let missing = server.missing_programs();
    if !missing.is_empty() {
        warn!(
            "Audio tool not found in PATH: {}. Polls will fail until it is installed.",
            missing.join(", ")
        );
    }

    let mut inspector = Inspector::new(server, config.format.clone(), config.settings.cache_size);

    let mut ticker = time::interval(Duration::from_millis(interval_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut terminate =
        signal::unix::signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;

    if let Err(e) = sd_notify::notify(false, &[NotifyState::Ready]) {
        debug!("sd_notify READY failed: {}", e);
    }

    let mut health = TickHealth::default();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let result = tick(&mut inspector);
                health.record(&result);

                if let Ok(Outcome::Switched(report)) = &result
                    && config.settings.notify_switch
                    && let Err(e) = notify_switch(report)
                {
                    warn!("Could not send switch notification: {}", e);
                }
            }

            _ = signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }

            _ = terminate.recv() => {
                info!("Received SIGTERM, shutting down");
                break;
            }
        }
    }

    debug!("Parse cache hit rate: {:.2}", inspector.cache_hit_rate());
    let _ = sd_notify::notify(false, &[NotifyState::Stopping]);

    Ok(())
}
